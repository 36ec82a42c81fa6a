//! Device connection parameters.

use secrecy::SecretString;

/// Default telnet port.
pub const DEFAULT_TELNET_PORT: u16 = 23;

/// Address and credentials of one OLT command session.
///
/// Immutable for the lifetime of a session. The password is only exposed
/// when it is written to the wire.
#[derive(Debug, Clone)]
pub struct DeviceAddress {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Telnet port (default: 23).
    pub port: u16,

    /// Username for login.
    pub username: String,

    /// Password for login.
    pub password: SecretString,

    /// Command prompt pattern override. `None` selects the generic prompt.
    pub prompt: Option<String>,
}

impl DeviceAddress {
    /// Create an address with the default telnet port and prompt.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_TELNET_PORT,
            username: username.into(),
            password: SecretString::from(password.into()),
            prompt: None,
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the command prompt pattern.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let addr = DeviceAddress::new("10.0.0.1", "admin", "hunter2");
        let printed = format!("{:?}", addr);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_socket_addr() {
        let addr = DeviceAddress::new("10.0.0.1", "admin", "pw").with_port(2323);
        assert_eq!(addr.socket_addr(), "10.0.0.1:2323");
        assert!(addr.prompt.is_none());
    }
}
