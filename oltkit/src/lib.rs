//! # oltkit
//!
//! Async device-communication engine for GPON OLT provisioning and ONU
//! monitoring.
//!
//! oltkit talks to an OLT over two southbound channels: an interactive
//! telnet command session used to push configuration and capture
//! diagnostics, and SNMP v2c polling used to enumerate ONUs and read their
//! optical and status values.
//!
//! ## Features
//!
//! - Telnet session state machine with IAC stripping and prompt matching
//! - Batch execution with a `>>> command` transcript and per-command outcomes
//! - Two-layer timeouts: per-read deadline plus an overall request deadline
//! - Vendor OID computation from (board, PON, ONU) and per-field decoding
//! - Parsers for attenuation and unconfigured-ONU listings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oltkit::{CommandRequest, CommandRunner, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = CommandRunner::new(EngineConfig::default());
//!     let address = runner.address("192.168.1.1", "admin", "secret");
//!     let request = CommandRequest::new(address, ["show gpon onu state gpon-olt_1/1/1"]);
//!
//!     let result = runner.run(&request).await;
//!     println!("{}", result.output);
//! }
//! ```
//!
//! ```rust,no_run
//! use oltkit::{EngineConfig, SnmpEngine};
//!
//! # async fn example() -> Result<(), oltkit::Error> {
//! let engine = SnmpEngine::new(EngineConfig::default());
//! let request = engine.request("192.168.1.1", "public", 1, 1);
//! for onu in engine.discover(&request).await?.onus {
//!     println!("{} {} {}", onu.id, onu.name, onu.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod onu;
pub mod parse;
pub mod snmp;
pub mod transport;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use driver::{
    CommandExecutionResult, CommandOutcome, CommandRequest, CommandRunner, Session,
    SessionBuilder,
};
pub use error::Error;
pub use onu::{OnuAddress, PonAddress};
pub use snmp::{DiscoveryResult, EmptySlot, OnuInfo, SnmpEngine, SnmpRequest};
pub use transport::DeviceAddress;
