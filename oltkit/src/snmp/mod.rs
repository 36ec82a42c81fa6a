//! SNMP discovery and decoding of GPON ONU tables.
//!
//! - [`profile`] computes vendor OIDs from (board, PON, ONU).
//! - [`decode`] turns raw values into record fields.
//! - [`SnmpEngine`] runs discovery, targeted reads and empty-slot scans.

pub mod decode;
mod engine;
pub mod profile;
mod record;
mod source;
mod value;

pub use engine::{
    SnmpEngine, SnmpRequest, discover_with, empty_slots_from, onu_details_with,
};
pub use profile::{BOARD_PROFILES, BoardProfile, OidProfile, OnuField};
pub use record::{DiscoveryResult, EmptySlot, OnuInfo};
pub use source::OnuSource;
pub use value::RawValue;
