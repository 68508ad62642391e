//! Discovery and connection settings
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use crate::error::{Error, Result};

/// Port every Kasa device listens on, for both TCP commands and UDP discovery
pub const DEFAULT_PORT: u16 = 9999;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Where discovery datagrams are sent
    pub broadcast: SocketAddr,
    /// How long to keep listening for discovery replies
    pub timeout: Duration,
    /// Number of discovery datagrams sent per scan
    pub broadcasts: u8,
    /// Upper bound on each command sent to a device
    pub command_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            broadcast: SocketAddr::from(([255, 255, 255, 255], DEFAULT_PORT)),
            timeout: Duration::from_secs(3),
            broadcasts: 3,
            command_timeout: Duration::from_secs(5),
        }
    }
}

impl DiscoveryConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_broadcast(mut self, broadcast: SocketAddr) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn with_command_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }
}

/// Parse `host` or `host:port`, defaulting to the Kasa port.
pub fn parse_addr(value: &str) -> Result<SocketAddr> {
    let value = value.trim();
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }
    value
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_PORT))
        .map_err(|_| Error::InvalidArguments(format!("'{}' is not a device address", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_addr_defaults_port() {
        assert_eq!(
            "192.168.1.64:9999".parse::<SocketAddr>().unwrap(),
            parse_addr("192.168.1.64").unwrap()
        );
        assert_eq!(
            "192.168.1.64:10000".parse::<SocketAddr>().unwrap(),
            parse_addr(" 192.168.1.64:10000 ").unwrap()
        );
    }

    #[test]
    fn parse_addr_rejects_garbage() {
        assert!(matches!(
            parse_addr("living-room"),
            Err(Error::InvalidArguments(_))
        ));
        assert!(matches!(parse_addr(""), Err(Error::InvalidArguments(_))));
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = DiscoveryConfig::default()
            .with_timeout(Duration::from_millis(500))
            .with_broadcast("192.168.1.255:9999".parse().unwrap());

        assert_eq!(Duration::from_millis(500), config.timeout);
        assert_eq!(3, config.broadcasts);
        assert_eq!(Duration::from_secs(5), config.command_timeout);
    }
}
