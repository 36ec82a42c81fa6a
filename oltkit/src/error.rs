//! Error types for oltkit.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for oltkit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid addressing input (prompt pattern, board/PON/ONU triple)
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    /// TCP transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Read loop and pattern matching errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session lifecycle errors (login, state)
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// SNMP query and decode errors
    #[error("SNMP error: {0}")]
    Snmp(#[from] SnmpError),
}

impl Error {
    /// Text the device produced before the failure, if any was captured.
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            Error::Channel(err) => err.partial_output(),
            Error::Session(SessionError::Auth { transcript, .. }) => Some(transcript),
            _ => None,
        }
    }

    /// Whether the failure came from the overall operation deadline.
    pub fn is_deadline_exceeded(&self) -> bool {
        match self {
            Error::Channel(ChannelError::DeadlineExceeded { .. }) => true,
            Error::Session(SessionError::Auth { source, .. }) => source.is_deadline_exceeded(),
            _ => false,
        }
    }
}

/// Invalid input detected before any network access.
#[derive(Error, Debug)]
pub enum AddressError {
    /// The prompt pattern did not compile
    #[error("invalid prompt regex: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// No OID profile exists for the board
    #[error("unknown board {board}")]
    UnknownBoard { board: u32 },

    /// PON id outside the supported range
    #[error("pon {pon} out of range {min}..={max}")]
    PonOutOfRange { pon: u32, min: u32, max: u32 },

    /// ONU id outside the supported range
    #[error("onu {onu} out of range {min}..={max}")]
    OnuOutOfRange { onu: u32, min: u32, max: u32 },

    /// Interface name that does not follow the gpon-olt/gpon-onu form
    #[error("invalid interface name '{name}'")]
    InvalidInterface { name: String },
}

/// Transport layer errors (TCP connection).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("dial error: connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Connect did not finish in time
    #[error("dial error: connection to {host}:{port} timed out after {timeout:?}")]
    Timeout {
        host: String,
        port: u16,
        timeout: Duration,
    },

    /// Write did not finish in time
    #[error("write timeout after {0:?}")]
    WriteTimeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Read loop errors. Each variant keeps whatever text was buffered.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// No pattern matched before the read deadline
    #[error("read timeout after {timeout:?}")]
    ReadTimeout { timeout: Duration, partial: String },

    /// The peer closed the stream
    #[error("EOF")]
    EndOfStream { partial: String },

    /// The overall operation deadline passed between reads
    #[error("operation deadline exceeded")]
    DeadlineExceeded { partial: String },

    /// Any other transport failure during a read
    #[error("read error: {source}")]
    Io {
        #[source]
        source: io::Error,
        partial: String,
    },
}

impl ChannelError {
    /// Text buffered before the failure.
    pub fn partial_output(&self) -> Option<&str> {
        let partial = match self {
            ChannelError::ReadTimeout { partial, .. }
            | ChannelError::EndOfStream { partial }
            | ChannelError::DeadlineExceeded { partial }
            | ChannelError::Io { partial, .. } => partial,
        };
        Some(partial.as_str())
    }
}

/// Session lifecycle errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation requires a connected transport
    #[error("connection is nil")]
    NotConnected,

    /// Login sequence failed; `transcript` holds the text seen so far
    #[error("{stage}: {source}")]
    Auth {
        stage: &'static str,
        transcript: String,
        #[source]
        source: Box<Error>,
    },
}

/// SNMP query and decode errors.
#[derive(Error, Debug)]
pub enum SnmpError {
    /// Client construction, GET or WALK failure
    #[error("{0}")]
    Client(#[from] Box<async_snmp::Error>),

    /// The agent answered without a usable value for the field
    #[error("no response for {oid}")]
    FieldUnavailable { oid: String },

    /// A value could not be decoded into its domain type
    #[error("decode error: {message}")]
    Decode { message: String },
}

impl SnmpError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        SnmpError::Decode {
            message: message.into(),
        }
    }
}

/// Result type alias using oltkit's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_call() -> std::result::Result<(), Box<async_snmp::Error>> {
        Err(Box::new(async_snmp::Error::Config("no community".into())))
    }

    fn snmp_query() -> std::result::Result<(), SnmpError> {
        agent_call()?;
        Ok(())
    }

    fn engine_query() -> Result<()> {
        agent_call().map_err(SnmpError::from)?;
        Ok(())
    }

    #[test]
    fn test_boxed_client_error_converts() {
        let err = snmp_query().unwrap_err();
        assert!(matches!(err, SnmpError::Client(_)));
        assert_eq!(err.to_string(), "configuration error: no community");
    }

    #[test]
    fn test_client_error_reaches_top_level() {
        let err = engine_query().unwrap_err();
        assert!(matches!(err, Error::Snmp(SnmpError::Client(_))));
        assert_eq!(
            err.to_string(),
            "SNMP error: configuration error: no community"
        );
        assert!(err.partial_output().is_none());
        assert!(!err.is_deadline_exceeded());
    }
}
