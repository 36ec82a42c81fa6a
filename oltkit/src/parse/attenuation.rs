//! Optical attenuation table extraction.
//!
//! Reads the output of `show pon power attenuation`, which looks like:
//!
//! ```text
//!            OLT                  ONU              Attenuation
//! --------------------------------------------------------------------------
//!  up      Rx :-28.827(dbm)      Tx:2.200(dbm)        31.027(dB)
//!  down    Rx :-24.100(dbm)      Tx:4.000(dbm)        28.100(dB)
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::clean::clean_output;
use crate::onu::OnuAddress;

static UP: LazyLock<Regex> = LazyLock::new(|| direction_regex("up"));
static DOWN: LazyLock<Regex> = LazyLock::new(|| direction_regex("down"));

fn direction_regex(direction: &str) -> Regex {
    Regex::new(&format!(
        r"(?i){direction}\s+Rx\s*:(?P<rx>[-\d.]+)\s*\(dbm\)\s*Tx\s*:(?P<tx>[-\d.]+)\s*\(dbm\)\s+(?P<att>[-\d.]+)\s*\(db\)"
    ))
    .expect("valid regex")
}

/// Which directions were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Both,
}

/// Link quality band of an attenuation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Excellent,
    Good,
    Normal,
    Warning,
    Critical,
    Error,
    Unknown,
}

impl LinkStatus {
    /// Classify an attenuation in dB.
    pub fn from_attenuation(db: f64) -> Self {
        if db < 0.0 {
            LinkStatus::Error
        } else if db <= 10.0 {
            LinkStatus::Excellent
        } else if db <= 15.0 {
            LinkStatus::Good
        } else if db <= 25.0 {
            LinkStatus::Normal
        } else if db <= 30.0 {
            LinkStatus::Warning
        } else {
            LinkStatus::Critical
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LinkStatus::Excellent => "Excellent signal quality (< 10 dB)",
            LinkStatus::Good => "Good signal quality (10-15 dB)",
            LinkStatus::Normal => "Normal signal quality (15-25 dB)",
            LinkStatus::Warning => "Warning: High attenuation (25-30 dB)",
            LinkStatus::Critical => "Critical: Very high attenuation (> 30 dB)",
            LinkStatus::Error => "Error: Invalid data",
            LinkStatus::Unknown => "Unknown status",
        }
    }
}

/// Parsed attenuation of one ONU link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attenuation {
    pub host: String,
    pub slot: u32,
    pub port: u32,
    pub onu: u32,
    pub direction: Option<Direction>,
    #[serde(rename = "olt_rx_power_dbm")]
    pub olt_rx_power: f64,
    #[serde(rename = "olt_tx_power_dbm")]
    pub olt_tx_power: f64,
    #[serde(rename = "onu_rx_power_dbm")]
    pub onu_rx_power: f64,
    #[serde(rename = "onu_tx_power_dbm")]
    pub onu_tx_power: f64,
    #[serde(rename = "attenuation_db")]
    pub attenuation: f64,
    pub status: LinkStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw_output: String,
}

/// One matched direction line: (rx, tx, attenuation).
fn direction_values(re: &Regex, text: &str) -> Option<(f64, f64, f64)> {
    let caps = re.captures(text)?;
    let num = |name: &str| caps[name].parse::<f64>().unwrap_or(0.0);
    Some((num("rx"), num("tx"), num("att")))
}

/// Parse an attenuation transcript for one ONU.
///
/// The up line sets the OLT receive, ONU transmit and attenuation values;
/// the down line sets OLT transmit and ONU receive. The down attenuation is
/// used only when no up line is present.
pub fn parse_attenuation(host: &str, onu: OnuAddress, raw: &str) -> Attenuation {
    let mut data = Attenuation {
        host: host.to_string(),
        slot: onu.board,
        port: onu.pon,
        onu: onu.onu,
        direction: None,
        olt_rx_power: 0.0,
        olt_tx_power: 0.0,
        onu_rx_power: 0.0,
        onu_tx_power: 0.0,
        attenuation: 0.0,
        status: LinkStatus::Unknown,
        raw_output: raw.to_string(),
    };
    let text = clean_output(raw);

    if let Some((rx, tx, att)) = direction_values(&UP, &text) {
        data.direction = Some(Direction::Up);
        data.olt_rx_power = rx;
        data.onu_tx_power = tx;
        data.attenuation = att;
        data.status = LinkStatus::from_attenuation(att);
    }

    if let Some((rx, tx, att)) = direction_values(&DOWN, &text) {
        data.olt_tx_power = tx;
        data.onu_rx_power = rx;
        if data.direction == Some(Direction::Up) {
            data.direction = Some(Direction::Both);
        } else {
            data.direction = Some(Direction::Down);
            data.attenuation = att;
            data.status = LinkStatus::from_attenuation(att);
        }
    }

    data
}
