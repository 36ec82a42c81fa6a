//! Engine-wide configuration.
//!
//! [`EngineConfig`] holds the defaults shared by the command runner and the
//! SNMP engine. It can be built in code with the setters or deserialized by
//! the caller from any serde format; missing keys take the defaults and
//! durations are given in whole seconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::transport::DEFAULT_TELNET_PORT;

/// Default per-operation command timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(8);

/// Default SNMP request timeout.
pub const DEFAULT_SNMP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default SNMP retry count.
pub const DEFAULT_SNMP_RETRIES: u32 = 3;

/// Default SNMP agent port.
pub const DEFAULT_SNMP_PORT: u16 = 161;

/// Commands sent after login to disable output paging. Errors are ignored,
/// so the list covers several vendors' dialects.
pub const PAGINATION_COMMANDS: [&str; 3] = [
    "terminal length 0",
    "screen-length 0 temporary",
    "disable clipaging",
];

/// Defaults for command sessions and SNMP queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-operation timeout for telnet reads and writes.
    #[serde(deserialize_with = "seconds")]
    pub command_timeout: Duration,

    /// Overall deadline multiplier for ordinary runs.
    pub run_multiplier: u32,

    /// Overall deadline multiplier for long administrative runs.
    pub long_run_multiplier: u32,

    /// Telnet port used when a request does not name one.
    pub telnet_port: u16,

    /// Commands sent after login to disable paging.
    pub pagination_commands: Vec<String>,

    /// SNMP request timeout.
    #[serde(deserialize_with = "seconds")]
    pub snmp_timeout: Duration,

    /// SNMP retries per request (fixed, no backoff).
    pub snmp_retries: u32,

    /// SNMP agent port used when a request does not name one.
    pub snmp_port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            run_multiplier: 3,
            long_run_multiplier: 5,
            telnet_port: DEFAULT_TELNET_PORT,
            pagination_commands: PAGINATION_COMMANDS.iter().map(|c| c.to_string()).collect(),
            snmp_timeout: DEFAULT_SNMP_TIMEOUT,
            snmp_retries: DEFAULT_SNMP_RETRIES,
            snmp_port: DEFAULT_SNMP_PORT,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-operation command timeout.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the SNMP request timeout.
    pub fn snmp_timeout(mut self, timeout: Duration) -> Self {
        self.snmp_timeout = timeout;
        self
    }

    /// Set the SNMP retry count.
    pub fn snmp_retries(mut self, retries: u32) -> Self {
        self.snmp_retries = retries;
        self
    }

    /// Replace the pagination-disable command list.
    pub fn pagination_commands<I, C>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.pagination_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Overall deadline budget for an ordinary run.
    pub fn run_budget(&self) -> Duration {
        self.command_timeout * self.run_multiplier
    }

    /// Overall deadline budget for a long run.
    ///
    /// A zero or absent override falls back to the configured timeout.
    pub fn long_run_budget(&self, timeout: Option<Duration>) -> Duration {
        self.long_run_timeout(timeout) * self.long_run_multiplier
    }

    /// Per-operation timeout for a long run.
    ///
    /// A zero or absent override falls back to the configured timeout.
    pub fn long_run_timeout(&self, timeout: Option<Duration>) -> Duration {
        match timeout {
            Some(t) if !t.is_zero() => t,
            _ => self.command_timeout,
        }
    }
}

fn seconds<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_secs)
}
