//! Find devices on the local network
use std::{
    net::{IpAddr, SocketAddr, UdpSocket},
    vec,
};

use chrono::{DateTime, Utc};

use crate::{
    commands::Connection,
    config::DiscoveryConfig,
    devices::Device,
    error::Result,
    protocol::{self, DefaultProtocol, Protocol},
};

pub(crate) const QUERY: &str = r#"{"system":{"get_sysinfo":null}}"#;

/// Something that can list the addresses of devices answering right now
pub trait Discover {
    fn discover(&self) -> Result<Vec<SocketAddr>>;
}

/// UDP broadcast of a sysinfo query, collecting every address that answers
pub struct BroadcastDiscovery {
    config: DiscoveryConfig,
}

impl BroadcastDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }
}

impl Discover for BroadcastDiscovery {
    fn discover(&self) -> Result<Vec<SocketAddr>> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.set_broadcast(true)?;
        socket.set_read_timeout(Some(self.config.timeout))?;

        let req = protocol::encrypt(QUERY)?;

        for _ in 0..self.config.broadcasts {
            socket.send_to(&req[4..req.len()], self.config.broadcast)?;
        }

        let mut buf = [0_u8; 4096];

        let mut found = Vec::new();
        while let Ok((size, addr)) = socket.recv_from(&mut buf) {
            if found.contains(&addr) {
                continue;
            }
            let data = protocol::decrypt(&mut buf[0..size]);
            debug!("discovery reply from {}: {}", addr, data);
            found.push(addr);
        }

        Ok(found)
    }
}

type ProtocolFactory = Box<dyn Fn() -> Box<dyn Protocol>>;

/// Turns discovered addresses into devices, one scan at a time.
pub struct Scanner {
    discovery: Box<dyn Discover>,
    protocol: ProtocolFactory,
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_config(DiscoveryConfig::default())
    }

    pub fn with_config(config: DiscoveryConfig) -> Self {
        let command_timeout = config.command_timeout;
        Self::with_transport(
            Box::new(BroadcastDiscovery::new(config)),
            Box::new(move || {
                Box::new(DefaultProtocol::with_timeout(command_timeout)) as Box<dyn Protocol>
            }),
        )
    }

    /// Use another discovery mechanism and transport, each device getting
    /// its own protocol instance from `protocol`.
    pub fn with_transport(discovery: Box<dyn Discover>, protocol: ProtocolFactory) -> Self {
        Self {
            discovery,
            protocol,
        }
    }

    /// One discovery pass. Devices are contacted as the iterator is
    /// advanced; those that fail to answer are skipped.
    pub fn scan(&self) -> Result<Scan<'_>> {
        let started = Utc::now();
        let pending = self.discovery.discover()?;
        debug!("discovered {} device(s)", pending.len());
        Ok(Scan {
            scanner: self,
            pending: pending.into_iter(),
            started,
        })
    }

    /// The device at `host`, if a full scan finds it
    pub fn get_device(&self, host: IpAddr) -> Result<Option<Device>> {
        Ok(self.scan()?.find(|device| device.host() == host))
    }

    /// The device with this alias, ignoring case, if a full scan finds it
    pub fn find_by_alias(&self, alias: &str) -> Result<Option<Device>> {
        let alias = alias.to_lowercase();
        Ok(self
            .scan()?
            .find(|device| device.sysinfo().alias.to_lowercase() == alias))
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Scan<'a> {
    scanner: &'a Scanner,
    pending: vec::IntoIter<SocketAddr>,
    started: DateTime<Utc>,
}

impl<'a> Scan<'a> {
    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Addresses not contacted yet
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl<'a> Iterator for Scan<'a> {
    type Item = Device;

    fn next(&mut self) -> Option<Device> {
        for addr in &mut self.pending {
            let conn = Connection::with_protocol(addr, (self.scanner.protocol)());
            match Device::connect_with(conn) {
                Ok(device) => return Some(device),
                Err(err) => warn!("skipping {}: {}", addr, err),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.pending.len()))
    }
}
