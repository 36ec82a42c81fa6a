//! Unconfigured ONU listing extraction.
//!
//! Reads the output of `show pon onu uncfg`:
//!
//! ```text
//! OltIndex            Model                    SN
//! -----------------------------------------------------------
//! gpon-olt_1/1/14     F660V8.0                 RTEGC6A1BF4D
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::clean::clean_output;

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(gpon-olt_\d+/\d+/\d+)\s+(\w+\S*)\s+(\w+)$").expect("valid regex")
});

static SLOT_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gpon-olt_\d+/(\d+)/(\d+)").expect("valid regex"));

/// One ONU waiting for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnconfiguredOnu {
    pub olt_index: String,
    pub model: String,
    pub serial_number: String,
    pub board: u32,
    pub pon: u32,
}

/// All unconfigured ONUs seen on a device.
#[derive(Debug, Clone, Serialize)]
pub struct UnconfiguredList {
    pub host: String,
    pub total_count: usize,
    pub onus: Vec<UnconfiguredOnu>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub grouped_by_slot: BTreeMap<u32, Vec<UnconfiguredOnu>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_output: String,
}

impl UnconfiguredList {
    pub fn status(&self) -> UnconfiguredStatus {
        UnconfiguredStatus::from_count(self.total_count)
    }
}

/// How much configuration work is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnconfiguredStatus {
    AllConfigured,
    FewUnconfigured,
    SomeUnconfigured,
    ManyUnconfigured,
}

impl UnconfiguredStatus {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => UnconfiguredStatus::AllConfigured,
            1..=5 => UnconfiguredStatus::FewUnconfigured,
            6..=15 => UnconfiguredStatus::SomeUnconfigured,
            _ => UnconfiguredStatus::ManyUnconfigured,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UnconfiguredStatus::AllConfigured => "All ONUs are properly configured",
            UnconfiguredStatus::FewUnconfigured => "Few ONUs need configuration (1-5 units)",
            UnconfiguredStatus::SomeUnconfigured => {
                "Several ONUs need configuration (6-15 units)"
            }
            UnconfiguredStatus::ManyUnconfigured => "Many ONUs need configuration (>15 units)",
        }
    }
}

/// Human-readable family of an ONU model string.
pub fn model_description(model: &str) -> String {
    let upper = model.to_uppercase();
    let family = [
        ("F660V8", "ZTE F660V8 GPON ONU (Latest)"),
        ("F660V5", "ZTE F660V5 GPON ONU (Mid-gen)"),
        ("F660V3", "ZTE F660V3 GPON ONU (Older)"),
        ("F660", "ZTE F660 Series GPON ONU"),
        ("F620", "ZTE F620 Series GPON ONU"),
        ("F601", "ZTE F601 GPON ONU"),
        ("AN5506", "Fiberhome AN5506 Series ONU"),
        ("HG8245", "Huawei HG8245 Series ONU"),
    ]
    .into_iter()
    .find(|(key, _)| upper.contains(key));

    match family {
        Some((_, description)) => description.to_string(),
        None => format!("Unknown ONU Model: {}", model),
    }
}

/// `(slot, port)` of a `gpon-olt_<rack>/<slot>/<port>` index, `(0, 0)` if malformed.
fn slot_port(olt_index: &str) -> (u32, u32) {
    SLOT_PORT
        .captures(olt_index)
        .and_then(|c| Some((c[1].parse().ok()?, c[2].parse().ok()?)))
        .unwrap_or((0, 0))
}

/// Parse an unconfigured-ONU transcript.
pub fn parse_unconfigured(host: &str, raw: &str) -> UnconfiguredList {
    let text = clean_output(raw);

    let onus: Vec<UnconfiguredOnu> = text
        .lines()
        .filter(|line| !line.contains("OltIndex") && !line.contains("----"))
        .filter_map(|line| ENTRY.captures(line))
        .map(|caps| {
            let (board, pon) = slot_port(&caps[1]);
            UnconfiguredOnu {
                olt_index: caps[1].to_string(),
                model: caps[2].to_string(),
                serial_number: caps[3].to_string(),
                board,
                pon,
            }
        })
        .collect();

    let mut grouped_by_slot: BTreeMap<u32, Vec<UnconfiguredOnu>> = BTreeMap::new();
    for onu in &onus {
        grouped_by_slot.entry(onu.board).or_default().push(onu.clone());
    }

    UnconfiguredList {
        host: host.to_string(),
        total_count: onus.len(),
        onus,
        grouped_by_slot,
        raw_output: raw.to_string(),
    }
}
