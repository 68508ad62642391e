use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpStream},
    time::Duration,
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

const INITIAL_KEY: u8 = 0xAB;

// Largest response we are prepared to buffer from a single device
const MAX_RESPONSE_LEN: u32 = 64 * 1024;

// Prepare and encrypt message to send to the device
// see: https://www.softscheck.com/en/reverse-engineering-tp-link-hs110/
pub fn encrypt(plain: &str) -> Result<Vec<u8>> {
    let msgbytes = plain.as_bytes();
    let mut cipher = Vec::with_capacity(msgbytes.len() + 4);
    cipher.write_u32::<BigEndian>(msgbytes.len() as u32)?;

    let mut key = INITIAL_KEY;
    for byte in msgbytes {
        key ^= byte;
        cipher.push(key);
    }

    Ok(cipher)
}

// Decrypt received string
// see: https://www.softscheck.com/en/reverse-engineering-tp-link-hs110/
pub fn decrypt(cipher: &mut [u8]) -> String {
    let mut key = INITIAL_KEY;
    let mut next: u8;

    for item in cipher.iter_mut() {
        next = *item;
        *item ^= key;
        key = next;
    }

    String::from_utf8_lossy(cipher).into_owned()
}

/// Transport for one request/response exchange with a device.
pub trait Protocol {
    fn send(&self, addr: SocketAddr, msg: &str) -> Result<String>;
}

/// Length-prefixed TCP exchange on the device's port, bounded by a timeout.
pub struct DefaultProtocol {
    timeout: Duration,
}

impl DefaultProtocol {
    pub fn new() -> DefaultProtocol {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> DefaultProtocol {
        DefaultProtocol { timeout }
    }

    fn exchange(&self, addr: SocketAddr, payload: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.write_all(payload)?;

        let length = stream.read_u32::<BigEndian>()?;
        if length > MAX_RESPONSE_LEN {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("response of {} bytes is too large", length),
            ));
        }

        let mut resp = vec![0_u8; length as usize];
        stream.read_exact(&mut resp)?;
        Ok(resp)
    }
}

impl Default for DefaultProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for DefaultProtocol {
    fn send(&self, addr: SocketAddr, msg: &str) -> Result<String> {
        debug!("-> {}: {}", addr, msg);
        let payload = encrypt(msg)?;
        let mut resp = self
            .exchange(addr, &payload)
            .map_err(|err| Error::unreachable(addr, err))?;

        let decrypted = decrypt(&mut resp);
        debug!("<- {}: {}", addr, decrypted);

        Ok(decrypted)
    }
}
