//! Telnet transport layer.
//!
//! This module provides connection parameters and TCP connection setup.
//! Byte-level protocol handling lives in [`crate::channel`].

pub mod config;
mod telnet;

pub use config::{DEFAULT_TELNET_PORT, DeviceAddress};
pub use telnet::dial;
