//! TCP connection setup for telnet sessions.

use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;

use super::config::DeviceAddress;
use crate::error::{Result, TransportError};

/// Open a TCP connection to the device, bounded by `timeout`.
///
/// No retry is attempted; the first failure is returned.
pub async fn dial(address: &DeviceAddress, timeout: Duration) -> Result<TcpStream> {
    debug!("dialing {} (timeout {:?})", address.socket_addr(), timeout);

    let stream = tokio::time::timeout(
        timeout,
        TcpStream::connect((address.host.as_str(), address.port)),
    )
    .await
    .map_err(|_| TransportError::Timeout {
        host: address.host.clone(),
        port: address.port,
        timeout,
    })?
    .map_err(|source| TransportError::ConnectionFailed {
        host: address.host.clone(),
        port: address.port,
        source,
    })?;

    // Command lines are small; send them immediately.
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed: {}", e);
    }

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_dial_refused() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let addr = DeviceAddress::new("127.0.0.1", "u", "p").with_port(port);
        let err = dial(&addr, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::ConnectionFailed { .. })
        ));
        assert!(err.to_string().contains("dial error"));
    }

    #[tokio::test]
    async fn test_dial_ok() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let addr = DeviceAddress::new("127.0.0.1", "u", "p").with_port(port);
        let stream = dial(&addr, Duration::from_secs(2)).await.unwrap();
        assert_eq!(stream.peer_addr().unwrap().port(), port);
    }
}
