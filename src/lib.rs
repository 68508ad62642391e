//! Discover TPLink Kasa plugs and bulbs on the local network and drive them
//! through one [`Device`](devices::Device) type, whatever their capabilities.
extern crate byteorder;

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;

pub mod capabilities;
pub mod color;
pub mod commands;
pub mod config;
pub mod datatypes;
pub mod devices;
pub mod discovery;
pub mod error;
pub mod protocol;

#[cfg(test)]
mod testing;

pub use crate::{
    color::Color,
    devices::{Device, Snapshot},
    discovery::Scanner,
    error::{Error, Result},
};
