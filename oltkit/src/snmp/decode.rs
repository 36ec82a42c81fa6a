//! Decoders from raw SNMP values to ONU record fields.
//!
//! Each decoder handles exactly one field. Decoders that cannot fail map
//! unexpected value kinds to a fixed text; the others return
//! [`SnmpError::Decode`].

use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};

use super::value::RawValue;
use crate::error::SnmpError;

/// Output format of decoded timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats accepted when computing uptime from a last-online timestamp.
const UPTIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.3fZ",
    "%Y-%m-%d %H:%M:%S%.3f",
];

/// Uptime assumed when the last-online time is unusable.
const FALLBACK_UPTIME: Duration = Duration::from_secs(60);

const UNKNOWN: &str = "Unknown";

/// Optical power in dBm: `raw * 0.002 - 30`, two decimals.
pub fn power(value: &RawValue) -> Result<String, SnmpError> {
    let raw = value.as_integer().ok_or_else(|| {
        SnmpError::decode(format!("power: expected integer, got {}", value.kind()))
    })?;
    Ok(format!("{:.2}", raw as f64 * 0.002 - 30.0))
}

/// ONU phase state.
pub fn status(value: &RawValue) -> &'static str {
    match value.as_integer() {
        Some(1) => "Logging",
        Some(2) => "LOS",
        Some(3) => "Synchronization",
        Some(4) => "Online",
        Some(5) => "Dying Gasp",
        Some(6) => "Auth Failed",
        Some(7) => "Offline",
        _ => UNKNOWN,
    }
}

/// Reason of the last transition to offline.
pub fn offline_reason(value: &RawValue) -> &'static str {
    match value.as_integer() {
        Some(2) => "LOS",
        Some(3) => "LOSi",
        Some(4) => "LOFi",
        Some(5) => "sfi",
        Some(6) => "loai",
        Some(7) => "loami",
        Some(8) => "AuthFail",
        Some(9) => "PowerOff",
        Some(10) => "deactiveSucc",
        Some(11) => "deactiveFail",
        Some(12) => "Reboot",
        Some(13) => "Shutdown",
        _ => UNKNOWN,
    }
}

/// Free text (name, description, type, IP). Non-text values read "Unknown".
pub fn text(value: &RawValue) -> String {
    match value.as_bytes() {
        Some(b) => String::from_utf8_lossy(b).into_owned(),
        None => UNKNOWN.to_string(),
    }
}

/// Serial number with the vendor `1,` prefix removed. Non-text values read empty.
pub fn serial(value: &RawValue) -> String {
    match value.as_bytes() {
        Some(b) => {
            let s = String::from_utf8_lossy(b);
            s.strip_prefix("1,").unwrap_or(&s[..]).to_string()
        }
        None => String::new(),
    }
}

/// An 8-byte date-and-time value as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn timestamp(value: &RawValue) -> Result<String, SnmpError> {
    let bytes = value.as_bytes().ok_or_else(|| {
        SnmpError::decode(format!(
            "timestamp: expected octet string, got {}",
            value.kind()
        ))
    })?;
    timestamp_bytes(bytes)
}

/// Decode the 8-byte layout: year (BE u16), month, day, hour, minute, second, deci-seconds.
pub fn timestamp_bytes(bytes: &[u8]) -> Result<String, SnmpError> {
    let bytes: &[u8; 8] = bytes.try_into().map_err(|_| {
        SnmpError::decode(format!(
            "invalid byte array length: expected 8 bytes, got {}",
            bytes.len()
        ))
    })?;

    let year = i32::from(u16::from_be_bytes([bytes[0], bytes[1]]));
    let [month, day, hour, minute, second] =
        [bytes[2], bytes[3], bytes[4], bytes[5], bytes[6]].map(u32::from);

    let check = |name: &str, v: u32, lo: u32, hi: u32| {
        if (lo..=hi).contains(&v) {
            Ok(())
        } else {
            Err(SnmpError::decode(format!("invalid {name}: {v}")))
        }
    };
    check("month", month, 1, 12)?;
    check("day", day, 1, 31)?;
    check("hour", hour, 0, 23)?;
    check("minute", minute, 0, 59)?;
    check("second", second, 0, 59)?;

    // Days past the end of the month roll into the next one (Feb 30 -> Mar 1).
    let datetime = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.checked_add_days(Days::new(u64::from(day - 1))))
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| SnmpError::decode(format!("invalid date: {year}-{month}-{day}")))?;

    Ok(datetime.format(TIMESTAMP_FORMAT).to_string())
}

/// Uptime since `last_online`, measured now.
pub fn uptime(last_online: &str) -> String {
    uptime_at(last_online, Utc::now())
}

/// Uptime since `last_online`, measured at `now`.
///
/// Unparseable input and times in the future yield one minute.
pub fn uptime_at(last_online: &str, now: DateTime<Utc>) -> String {
    let since = UPTIME_INPUT_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(last_online, f).ok())
        .map(|t| t.and_utc());

    let elapsed = since
        .and_then(|t| (now - t).to_std().ok())
        .unwrap_or(FALLBACK_UPTIME);

    format_duration(elapsed)
}

/// Render a duration as `"<d> days <h> hours <m> minutes <s> seconds"`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{} days {} hours {} minutes {} seconds",
        secs / 86_400,
        secs % 86_400 / 3_600,
        secs % 3_600 / 60,
        secs % 60
    )
}

/// Optical distance in kilometres from a metre count.
pub fn distance(value: &RawValue) -> String {
    match value {
        RawValue::Integer(m) => format!("{:.1}km", *m as f64 / 1000.0),
        RawValue::OctetString(b) => integer_text(&String::from_utf8_lossy(b)),
        RawValue::Unknown { text, .. } => integer_text(text),
    }
}

fn integer_text(text: &str) -> String {
    match text.trim().parse::<i64>() {
        Ok(v) => v.to_string(),
        Err(_) => UNKNOWN.to_string(),
    }
}
