//! Builder for telnet sessions.

use std::time::Duration;

use tokio::time::Instant;

use super::session::Session;
use crate::config::DEFAULT_COMMAND_TIMEOUT;
use crate::error::Result;
use crate::transport::{DEFAULT_TELNET_PORT, DeviceAddress};

/// Builder for constructing [`Session`]s.
///
/// # Example
///
/// ```rust,no_run
/// use oltkit::driver::SessionBuilder;
///
/// # async fn example() -> Result<(), oltkit::Error> {
/// let mut session = SessionBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .connect()
///     .await?;
/// let output = session.exec("show gpon onu state").await?;
/// session.close().await;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    host: String,
    port: u16,
    username: String,
    password: String,
    prompt: Option<String>,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl SessionBuilder {
    /// Create a new session builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_TELNET_PORT,
            username: String::new(),
            password: String::new(),
            prompt: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
            deadline: None,
        }
    }

    /// Start from an existing address.
    pub fn from_address(address: &DeviceAddress) -> AddressSessionBuilder {
        AddressSessionBuilder {
            address: address.clone(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            deadline: None,
        }
    }

    /// Set the telnet port (default: 23).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the login username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the login password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the command prompt pattern.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the per-operation timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the overall deadline.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn into_address_builder(self) -> AddressSessionBuilder {
        let mut address =
            DeviceAddress::new(self.host, self.username, self.password).with_port(self.port);
        address.prompt = self.prompt;
        AddressSessionBuilder {
            address,
            timeout: self.timeout,
            deadline: self.deadline,
        }
    }

    /// Build a disconnected session. The prompt pattern is validated here.
    pub fn build(self) -> Result<Session> {
        self.into_address_builder().build()
    }

    /// Build, dial and log in.
    pub async fn connect(self) -> Result<Session> {
        self.into_address_builder().connect().await
    }
}

/// Session builder over a ready-made [`DeviceAddress`].
pub struct AddressSessionBuilder {
    address: DeviceAddress,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl AddressSessionBuilder {
    /// Set the per-operation timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the overall deadline.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Build a disconnected session. The prompt pattern is validated here.
    pub fn build(self) -> Result<Session> {
        let mut session = Session::new(self.address, self.timeout)?;
        if let Some(deadline) = self.deadline {
            session.set_deadline(deadline);
        }
        Ok(session)
    }

    /// Build, dial and log in.
    ///
    /// The session is closed before an error is returned.
    pub async fn connect(self) -> Result<Session> {
        let mut session = self.build()?;
        session.dial().await?;
        if let Err(e) = session.login().await {
            session.close().await;
            return Err(e);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SessionState;
    use crate::error::Error;

    #[test]
    fn test_build_applies_settings() {
        let session = SessionBuilder::new("10.0.0.9")
            .port(2323)
            .username("admin")
            .password("pw")
            .prompt(r"OLT#\s*$")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.address().socket_addr(), "10.0.0.9:2323");
        assert_eq!(session.timeout(), Duration::from_secs(3));
        assert!(!session.deadline_exceeded());
    }

    #[test]
    fn test_build_rejects_bad_prompt() {
        let err = SessionBuilder::new("h").prompt("[").build().err().unwrap();
        assert!(matches!(err, Error::Address(_)));
    }

    #[test]
    fn test_from_address() {
        let address = DeviceAddress::new("10.0.0.1", "u", "p");
        let session = SessionBuilder::from_address(&address)
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        assert_eq!(session.address().host, "10.0.0.1");
    }
}
