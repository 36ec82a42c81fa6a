//! Records produced by the SNMP engine.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::onu::OnuAddress;

/// Everything known about one ONU.
///
/// Fields that could not be read stay empty; their names are listed in
/// `unavailable`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OnuInfo {
    pub board: u32,
    pub pon: u32,
    #[serde(rename = "onu_id")]
    pub id: u32,
    pub name: String,
    pub description: String,
    pub onu_type: String,
    pub serial_number: String,
    pub rx_power: String,
    pub tx_power: String,
    pub status: String,
    pub ip_address: String,
    pub last_online: String,
    pub last_offline: String,
    pub last_offline_reason: String,
    pub uptime: String,
    pub gpon_optical_distance: String,

    /// Names of fields whose read failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

impl OnuInfo {
    /// An empty record for an address.
    pub fn new(address: OnuAddress) -> Self {
        Self {
            board: address.board,
            pon: address.pon,
            id: address.onu,
            ..Default::default()
        }
    }

    /// Whether every field was read.
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }
}

/// All ONUs found on one PON.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    pub host: String,
    pub board: u32,
    pub pon: u32,
    pub total: usize,

    /// Sorted by id, ids unique.
    pub onus: Vec<OnuInfo>,

    #[serde(rename = "execution_time", serialize_with = "serialize_seconds")]
    pub elapsed: Duration,

    pub timestamp: DateTime<Utc>,
}

impl DiscoveryResult {
    /// Look up an ONU by id.
    pub fn get(&self, id: u32) -> Option<&OnuInfo> {
        self.onus
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &self.onus[i])
    }
}

/// An ONU id with no registered ONU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptySlot {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
}

fn serialize_seconds<S: Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:.2}s", elapsed.as_secs_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onu_info_json_keeps_empty_fields() {
        let info = OnuInfo::new(OnuAddress::new(1, 2, 3).unwrap());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["onu_id"], 3);
        assert!(json.get("id").is_none());
        assert_eq!(json["serial_number"], "");
        assert!(json.get("unavailable").is_none());
        assert!(info.is_complete());
    }

    #[test]
    fn test_discovery_json_shape() {
        let result = DiscoveryResult {
            host: "10.0.0.1".into(),
            board: 1,
            pon: 1,
            total: 0,
            onus: Vec::new(),
            elapsed: Duration::from_millis(1234),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["execution_time"], "1.23s");
        assert!(json["timestamp"].is_string());
    }
}
