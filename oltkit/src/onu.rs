//! ONU and PON addressing.
//!
//! An OLT names a PON port by `(board, pon)` and an ONU by
//! `(board, pon, onu)`. Callers may also supply the slot/port form or the
//! CLI interface names (`gpon-olt_1/2/3`, `gpon-onu_1/2/3:4`); all of them
//! normalize into the same types here, with slot == board and port == PON.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AddressError;
use crate::snmp::BoardProfile;

/// Lowest PON id.
pub const PON_MIN: u32 = 1;
/// Highest PON id.
pub const PON_MAX: u32 = 16;
/// Lowest ONU id.
pub const ONU_MIN: u32 = 1;
/// Highest ONU id.
pub const ONU_MAX: u32 = 128;

static OLT_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gpon-olt_(\d+)/(\d+)/(\d+)$").expect("valid regex"));

static ONU_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gpon-onu_(\d+)/(\d+)/(\d+):(\d+)$").expect("valid regex"));

/// A PON port on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PonAddress {
    pub board: u32,
    pub pon: u32,
}

impl PonAddress {
    /// Validate and create a PON address.
    pub fn new(board: u32, pon: u32) -> Result<Self, AddressError> {
        BoardProfile::lookup(board)?;
        if !(PON_MIN..=PON_MAX).contains(&pon) {
            return Err(AddressError::PonOutOfRange {
                pon,
                min: PON_MIN,
                max: PON_MAX,
            });
        }
        Ok(Self { board, pon })
    }

    /// Create from the slot/port form.
    pub fn from_slot_port(slot: u32, port: u32) -> Result<Self, AddressError> {
        Self::new(slot, port)
    }

    /// Address an ONU on this PON.
    pub fn onu(self, onu: u32) -> Result<OnuAddress, AddressError> {
        OnuAddress::new(self.board, self.pon, onu)
    }

    /// CLI interface name, e.g. `gpon-olt_1/2/3`.
    pub fn interface_name(&self) -> String {
        format!("gpon-olt_1/{}/{}", self.board, self.pon)
    }
}

impl fmt::Display for PonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.board, self.pon)
    }
}

impl FromStr for PonAddress {
    type Err = AddressError;

    /// Parse a `gpon-olt_<rack>/<slot>/<port>` interface name.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidInterface {
            name: name.to_string(),
        };
        let caps = OLT_INTERFACE.captures(name.trim()).ok_or_else(invalid)?;
        let slot = caps[2].parse().map_err(|_| invalid())?;
        let port = caps[3].parse().map_err(|_| invalid())?;
        Self::from_slot_port(slot, port)
    }
}

/// One ONU on a PON port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OnuAddress {
    pub board: u32,
    pub pon: u32,
    pub onu: u32,
}

impl OnuAddress {
    /// Validate and create an ONU address.
    pub fn new(board: u32, pon: u32, onu: u32) -> Result<Self, AddressError> {
        PonAddress::new(board, pon)?;
        if !(ONU_MIN..=ONU_MAX).contains(&onu) {
            return Err(AddressError::OnuOutOfRange {
                onu,
                min: ONU_MIN,
                max: ONU_MAX,
            });
        }
        Ok(Self { board, pon, onu })
    }

    /// Create from the slot/port form.
    pub fn from_slot_port(slot: u32, port: u32, onu: u32) -> Result<Self, AddressError> {
        Self::new(slot, port, onu)
    }

    /// The PON this ONU hangs off.
    pub fn pon_address(&self) -> PonAddress {
        PonAddress {
            board: self.board,
            pon: self.pon,
        }
    }

    /// CLI interface name, e.g. `gpon-onu_1/2/3:4`.
    pub fn interface_name(&self) -> String {
        format!("gpon-onu_1/{}/{}:{}", self.board, self.pon, self.onu)
    }
}

impl fmt::Display for OnuAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.board, self.pon, self.onu)
    }
}

impl FromStr for OnuAddress {
    type Err = AddressError;

    /// Parse a `gpon-onu_<rack>/<slot>/<port>:<onu>` interface name.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidInterface {
            name: name.to_string(),
        };
        let caps = ONU_INTERFACE.captures(name.trim()).ok_or_else(invalid)?;
        let slot = caps[2].parse().map_err(|_| invalid())?;
        let port = caps[3].parse().map_err(|_| invalid())?;
        let onu = caps[4].parse().map_err(|_| invalid())?;
        Self::from_slot_port(slot, port, onu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_onu_interface() {
        let addr: OnuAddress = "gpon-onu_1/2/3:4".parse().unwrap();
        assert_eq!(addr, OnuAddress::new(2, 3, 4).unwrap());
        assert_eq!(addr.interface_name(), "gpon-onu_1/2/3:4");
        assert_eq!(addr.pon_address().interface_name(), "gpon-olt_1/2/3");
    }

    #[test]
    fn test_parse_olt_interface() {
        let pon: PonAddress = " gpon-olt_1/1/16 ".parse().unwrap();
        assert_eq!(pon, PonAddress::new(1, 16).unwrap());
        assert_eq!(pon.to_string(), "1/16");
    }

    #[test]
    fn test_slot_port_matches_board_pon() {
        assert_eq!(
            OnuAddress::from_slot_port(1, 5, 9).unwrap(),
            PonAddress::new(1, 5).unwrap().onu(9).unwrap()
        );
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            PonAddress::new(1, 0),
            Err(AddressError::PonOutOfRange { pon: 0, .. })
        ));
        assert!(matches!(
            PonAddress::new(2, 17),
            Err(AddressError::PonOutOfRange { pon: 17, .. })
        ));
        assert!(matches!(
            OnuAddress::new(1, 1, 129),
            Err(AddressError::OnuOutOfRange { onu: 129, .. })
        ));
        assert!(matches!(
            OnuAddress::new(5, 1, 1),
            Err(AddressError::UnknownBoard { board: 5 })
        ));
    }

    #[test]
    fn test_rejects_malformed_names() {
        for name in ["gpon-onu_1/2/3", "gpon-olt_1/2", "epon-onu_1/1/1:1", "gpon-onu_1/x/3:4"] {
            assert!(
                name.parse::<OnuAddress>().is_err(),
                "{name} should not parse as an ONU"
            );
        }
        assert!(matches!(
            "gpon-olt_1/2".parse::<PonAddress>(),
            Err(AddressError::InvalidInterface { .. })
        ));
    }
}
