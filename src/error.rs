//! Error types
use std::{io, net::SocketAddr, result};

use thiserror::Error;

use crate::capabilities::Capability;

#[derive(Debug, Error)]
pub enum Error {
    /// Connecting to, writing to or reading from a single device failed
    #[error("device at {addr} is unreachable: {source}")]
    DeviceUnreachable {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not supported by this device")]
    UnsupportedCapability(Capability),
    #[error("invalid color: {0}")]
    InvalidColorSpec(String),
    /// No web color has exactly this RGB value
    #[error("no color name for rgb({0}, {1}, {2})")]
    UnknownColorName(u8, u8, u8),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("could not parse the response received from the device: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("response data error: {0}")]
    TPLink(#[from] SectionError),
    #[error("network error: {0}")]
    IO(#[from] io::Error),
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn unreachable(addr: SocketAddr, source: io::Error) -> Self {
        Error::DeviceUnreachable { addr, source }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::DeviceUnreachable { .. })
    }
}

pub type Result<T> = result::Result<T, Error>;

/// The `{"err_code": .., "err_msg": ..}` object a device returns in place of a
/// module or method result.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Error)]
#[error("({err_code}) {err_msg}")]
pub struct SectionError {
    pub err_code: i16,
    pub err_msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_error_display() {
        let err = Error::from(SectionError {
            err_code: -1,
            err_msg: String::from("module not support"),
        });

        assert_eq!(
            "response data error: (-1) module not support",
            err.to_string()
        );
    }

    #[test]
    fn unreachable_is_detected() {
        let err = Error::unreachable(
            "10.0.0.2:9999".parse().unwrap(),
            io::Error::new(io::ErrorKind::TimedOut, "timed out"),
        );

        assert!(err.is_unreachable());
        assert!(err.to_string().starts_with("device at 10.0.0.2:9999"));
        assert!(!Error::Other(String::from("x")).is_unreachable());
    }
}
