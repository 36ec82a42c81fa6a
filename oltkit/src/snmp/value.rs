//! Wire values as the decoders see them.

use async_snmp::Value;
use bytes::Bytes;

use crate::error::SnmpError;

/// An SNMP value reduced to the kinds the ONU decoders distinguish.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Any integer-like type (INTEGER, Counter32/64, Gauge32, TimeTicks).
    Integer(i64),
    /// OCTET STRING, also used for the dotted text of an IpAddress.
    OctetString(Bytes),
    /// Anything else, with the value kind and its display text.
    Unknown { kind: &'static str, text: String },
}

impl RawValue {
    /// Convert a varbind value. Exception values mean the agent has no
    /// instance for `oid`.
    pub fn from_value(oid: &str, value: &Value) -> Result<Self, SnmpError> {
        let raw = match value {
            Value::Integer(v) => RawValue::Integer(i64::from(*v)),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => {
                RawValue::Integer(i64::from(*v))
            }
            Value::Counter64(v) => match i64::try_from(*v) {
                Ok(v) => RawValue::Integer(v),
                Err(_) => RawValue::Unknown {
                    kind: "counter64",
                    text: v.to_string(),
                },
            },
            Value::OctetString(data) => RawValue::OctetString(data.clone()),
            Value::IpAddress(a) => RawValue::OctetString(Bytes::from(format!(
                "{}.{}.{}.{}",
                a[0], a[1], a[2], a[3]
            ))),
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
                return Err(SnmpError::FieldUnavailable {
                    oid: oid.to_string(),
                });
            }
            Value::Null => RawValue::Unknown {
                kind: "null",
                text: String::new(),
            },
            Value::ObjectIdentifier(o) => RawValue::Unknown {
                kind: "oid",
                text: o.to_string(),
            },
            other => RawValue::Unknown {
                kind: "other",
                text: other.to_string(),
            },
        };
        Ok(raw)
    }

    /// The integer, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RawValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// The bytes, if this is an octet string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RawValue::OctetString(b) => Some(b),
            _ => None,
        }
    }

    /// Human-readable kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Integer(_) => "integer",
            RawValue::OctetString(_) => "octet string",
            RawValue::Unknown { kind, .. } => kind,
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Integer(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(v: Vec<u8>) -> Self {
        RawValue::OctetString(Bytes::from(v))
    }
}
