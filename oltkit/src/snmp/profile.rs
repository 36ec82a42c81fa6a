//! Vendor OID addressing for GPON ONU tables.
//!
//! Every per-ONU object is indexed either by the PON interface index or by
//! the ONU type index, both derived from a per-board base value:
//!
//! ```text
//! interface_index = interface_base + pon
//! type_index      = type_base + (pon - 1) * 256
//! ```

use std::fmt;

use async_snmp::Oid;

use crate::error::AddressError;
use crate::onu::{OnuAddress, PonAddress};

/// Enterprise subtree for ONU configuration and optical tables.
pub const E1082: &[u32] = &[1, 3, 6, 1, 4, 1, 3902, 1082];

/// Enterprise subtree for ONU type, transmit power and IP tables.
pub const E1012: &[u32] = &[1, 3, 6, 1, 4, 1, 3902, 1012];

/// Per-board index bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardProfile {
    /// Board (slot) number.
    pub board: u32,
    /// Base of the PON interface index.
    pub interface_base: u32,
    /// Base of the ONU type index.
    pub type_base: u32,
}

/// Known boards.
pub const BOARD_PROFILES: &[BoardProfile] = &[
    BoardProfile {
        board: 1,
        interface_base: 285_278_464,
        type_base: 268_501_248,
    },
    BoardProfile {
        board: 2,
        interface_base: 285_278_720,
        type_base: 268_566_784,
    },
];

impl BoardProfile {
    /// Look up the profile of a board.
    pub fn lookup(board: u32) -> Result<&'static BoardProfile, AddressError> {
        BOARD_PROFILES
            .iter()
            .find(|p| p.board == board)
            .ok_or(AddressError::UnknownBoard { board })
    }
}

/// The indices of one (board, PON) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OidProfile {
    /// The PON this profile addresses.
    pub pon: PonAddress,
    /// Index used by the E1082 tables.
    pub interface_index: u32,
    /// Index used by the E1012 tables.
    pub type_index: u32,
}

impl OidProfile {
    /// Compute the indices for a PON.
    pub fn new(pon: PonAddress) -> Result<Self, AddressError> {
        let board = BoardProfile::lookup(pon.board)?;
        Ok(Self {
            pon,
            interface_index: board.interface_base + pon.pon,
            type_index: board.type_base + (pon.pon - 1) * 256,
        })
    }

    /// The WALK root of the name column for this PON.
    pub fn name_column(&self) -> Oid {
        let mut arcs = OnuField::Name.column().to_vec();
        arcs.push(self.interface_index);
        Oid::from_slice(&arcs)
    }

    /// The full OID of a field for one ONU id.
    pub fn field_oid(&self, field: OnuField, onu: u32) -> Oid {
        let mut arcs = field.column().to_vec();
        arcs.push(match field.index() {
            FieldIndex::Interface => self.interface_index,
            FieldIndex::Type => self.type_index,
        });
        arcs.push(onu);
        if field.has_instance_suffix() {
            arcs.push(1);
        }
        Oid::from_slice(&arcs)
    }

    /// The full OID of a field for an ONU address on this PON.
    pub fn onu_oid(&self, field: OnuField, onu: &OnuAddress) -> Oid {
        self.field_oid(field, onu.onu)
    }
}

/// Which index a field's table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldIndex {
    Interface,
    Type,
}

/// The per-ONU fields read over SNMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnuField {
    Name,
    Description,
    Type,
    SerialNumber,
    RxPower,
    TxPower,
    Status,
    IpAddress,
    LastOnline,
    LastOffline,
    LastOfflineReason,
    OpticalDistance,
}

impl OnuField {
    /// Fields read by GET in a discovery (the name comes from the WALK).
    pub const DETAIL_FIELDS: [OnuField; 11] = [
        OnuField::Type,
        OnuField::Description,
        OnuField::SerialNumber,
        OnuField::RxPower,
        OnuField::TxPower,
        OnuField::Status,
        OnuField::IpAddress,
        OnuField::LastOnline,
        OnuField::LastOffline,
        OnuField::LastOfflineReason,
        OnuField::OpticalDistance,
    ];

    /// The table column OID, without index arcs.
    pub fn column(self) -> &'static [u32] {
        match self {
            OnuField::Name => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 3, 1, 2],
            OnuField::Description => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 3, 1, 3],
            OnuField::SerialNumber => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 3, 1, 18],
            OnuField::RxPower => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 20, 2, 2, 2, 1, 10],
            OnuField::Status => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 8, 1, 4],
            OnuField::LastOnline => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 8, 1, 5],
            OnuField::LastOffline => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 8, 1, 6],
            OnuField::LastOfflineReason => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 8, 1, 7],
            OnuField::OpticalDistance => &[1, 3, 6, 1, 4, 1, 3902, 1082, 500, 10, 2, 3, 10, 1, 2],
            OnuField::Type => &[1, 3, 6, 1, 4, 1, 3902, 1012, 3, 50, 11, 2, 1, 17],
            OnuField::TxPower => &[1, 3, 6, 1, 4, 1, 3902, 1012, 3, 50, 12, 1, 1, 14],
            OnuField::IpAddress => &[1, 3, 6, 1, 4, 1, 3902, 1012, 3, 50, 16, 1, 1, 10],
        }
    }

    fn index(self) -> FieldIndex {
        match self {
            OnuField::Type | OnuField::TxPower | OnuField::IpAddress => FieldIndex::Type,
            _ => FieldIndex::Interface,
        }
    }

    fn has_instance_suffix(self) -> bool {
        matches!(
            self,
            OnuField::RxPower | OnuField::TxPower | OnuField::IpAddress
        )
    }

    /// Field name as used in records.
    pub fn name(self) -> &'static str {
        match self {
            OnuField::Name => "name",
            OnuField::Description => "description",
            OnuField::Type => "onu_type",
            OnuField::SerialNumber => "serial_number",
            OnuField::RxPower => "rx_power",
            OnuField::TxPower => "tx_power",
            OnuField::Status => "status",
            OnuField::IpAddress => "ip_address",
            OnuField::LastOnline => "last_online",
            OnuField::LastOffline => "last_offline",
            OnuField::LastOfflineReason => "last_offline_reason",
            OnuField::OpticalDistance => "gpon_optical_distance",
        }
    }
}

impl fmt::Display for OnuField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
