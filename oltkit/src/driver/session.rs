//! Telnet session protocol engine.
//!
//! A [`Session`] owns one transport connection and drives the OLT command
//! interpreter through a small state machine:
//!
//! ```text
//! Disconnected -> Connected -> Authenticating -> Ready -> Closed
//! ```
//!
//! `Closed` is reachable from every state on explicit close or on a failure
//! that leaves the transport unusable. Sessions are never reused: one is
//! built per request and closed when the request completes.

use std::time::Duration;

use log::{debug, trace, warn};
use regex::bytes::Regex;
use secrecy::ExposeSecret;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;

use super::response::{BatchOutput, CommandOutcome};
use crate::channel::{PatternBuffer, PromptKind, PromptTable};
use crate::error::{ChannelError, Error, Result, SessionError, TransportError};
use crate::transport::{self, DeviceAddress};

/// Size of a single transport read.
const READ_CHUNK: usize = 4096;

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport yet.
    Disconnected,
    /// Transport open, login not attempted.
    Connected,
    /// Login handshake in progress.
    Authenticating,
    /// Logged in; commands may be executed.
    Ready,
    /// Transport shut down or unusable.
    Closed,
}

/// Text returned by [`Session::read_until`] together with the prompt that ended it.
#[derive(Debug, Clone)]
pub struct ReadMatch {
    /// Everything accumulated up to and including the matched prompt.
    pub output: String,

    /// Which prompt pattern matched.
    pub matched: PromptKind,
}

/// One telnet command session against an OLT.
pub struct Session<S = TcpStream> {
    /// Where to connect and how to log in.
    address: DeviceAddress,

    /// Compiled prompt patterns.
    prompts: PromptTable,

    /// Per-operation read/write timeout.
    timeout: Duration,

    /// Overall deadline for the whole request, if any.
    deadline: Option<Instant>,

    /// The transport (None until connected and after close).
    stream: Option<S>,

    /// Accumulated, IAC-free output of the current read.
    buffer: PatternBuffer,

    state: SessionState,
}

impl Session<TcpStream> {
    /// Create a disconnected session.
    ///
    /// The prompt pattern is compiled here, so an invalid pattern fails
    /// before any network access.
    pub fn new(address: DeviceAddress, timeout: Duration) -> Result<Self> {
        let prompts = PromptTable::new(address.prompt.as_deref())?;
        Ok(Self {
            address,
            prompts,
            timeout,
            deadline: None,
            stream: None,
            buffer: PatternBuffer::new(),
            state: SessionState::Disconnected,
        })
    }

    /// Open the TCP connection.
    ///
    /// The connect timeout is the per-operation timeout, clamped to the
    /// overall deadline. A failure closes the session; there is no retry.
    pub async fn dial(&mut self) -> Result<()> {
        if self.state != SessionState::Disconnected {
            return Err(SessionError::NotConnected.into());
        }

        let timeout = match self.deadline {
            Some(d) => self
                .timeout
                .min(d.saturating_duration_since(Instant::now())),
            None => self.timeout,
        };

        match transport::dial(&self.address, timeout).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Create a session over an already connected stream.
    pub fn with_stream(address: DeviceAddress, timeout: Duration, stream: S) -> Result<Self> {
        let prompts = PromptTable::new(address.prompt.as_deref())?;
        Ok(Self {
            address,
            prompts,
            timeout,
            deadline: None,
            stream: Some(stream),
            buffer: PatternBuffer::new(),
            state: SessionState::Connected,
        })
    }

    /// Bound every subsequent read and write by an overall deadline.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Whether the overall deadline has passed.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Per-operation timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The device this session talks to.
    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// The compiled prompt table.
    pub fn prompts(&self) -> &PromptTable {
        &self.prompts
    }

    /// Number of bytes read but not yet returned to a caller.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Read until one of the prompt kinds matches the accumulated output.
    ///
    /// On a match the whole accumulated text is returned and the buffer is
    /// cleared. On failure the buffered text is moved into the error.
    pub async fn read_until(&mut self, kinds: &[PromptKind]) -> Result<ReadMatch> {
        let stream = match self.state {
            SessionState::Connected | SessionState::Authenticating | SessionState::Ready => {
                self.stream.as_mut().ok_or(SessionError::NotConnected)?
            }
            _ => return Err(SessionError::NotConnected.into()),
        };

        let op_deadline = Instant::now() + self.timeout;
        let (read_deadline, bounded_by_overall) = match self.deadline {
            Some(d) if d < op_deadline => (d, true),
            _ => (op_deadline, false),
        };

        let patterns: Vec<&Regex> = kinds.iter().map(|k| self.prompts.get(*k)).collect();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(ChannelError::DeadlineExceeded {
                    partial: self.buffer.take_string(),
                }
                .into());
            }

            match tokio::time::timeout_at(read_deadline, stream.read(&mut chunk)).await {
                Err(_) => {
                    let partial = self.buffer.take_string();
                    debug!(
                        "read_until {:?}: deadline hit with {} bytes buffered",
                        kinds,
                        partial.len()
                    );
                    return Err(if bounded_by_overall {
                        ChannelError::DeadlineExceeded { partial }
                    } else {
                        ChannelError::ReadTimeout {
                            timeout: self.timeout,
                            partial,
                        }
                    }
                    .into());
                }
                Ok(Ok(0)) => {
                    self.state = SessionState::Closed;
                    return Err(ChannelError::EndOfStream {
                        partial: self.buffer.take_string(),
                    }
                    .into());
                }
                Ok(Ok(n)) => {
                    self.buffer.extend(&chunk[..n]);
                    trace!("read {} bytes, buffer: {} bytes", n, self.buffer.len());

                    if let Some(idx) = self.buffer.first_match(&patterns) {
                        return Ok(ReadMatch {
                            output: self.buffer.take_string(),
                            matched: kinds[idx],
                        });
                    }
                }
                Ok(Err(source)) => {
                    return Err(ChannelError::Io {
                        source,
                        partial: self.buffer.take_string(),
                    }
                    .into());
                }
            }
        }
    }

    /// Write one line terminated by CRLF.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        trace!("write_line: {:?}", line);
        self.write_raw(line).await
    }

    /// Write a line without logging it.
    async fn write_hidden(&mut self, line: &str) -> Result<()> {
        trace!("write_line: <hidden>");
        self.write_raw(line).await
    }

    async fn write_raw(&mut self, line: &str) -> Result<()> {
        let stream = match self.state {
            SessionState::Connected | SessionState::Authenticating | SessionState::Ready => {
                self.stream.as_mut().ok_or(SessionError::NotConnected)?
            }
            _ => return Err(SessionError::NotConnected.into()),
        };

        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(b"\r\n");

        let mut write_deadline = Instant::now() + self.timeout;
        if let Some(d) = self.deadline {
            write_deadline = write_deadline.min(d);
        }

        tokio::time::timeout_at(write_deadline, async {
            stream.write_all(&data).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| TransportError::WriteTimeout(self.timeout))?
        .map_err(TransportError::Io)?;

        Ok(())
    }

    /// Run the login handshake.
    ///
    /// Returns the text seen before the credentials were sent followed by
    /// the text up to the first command prompt.
    pub async fn login(&mut self) -> Result<String> {
        self.state = SessionState::Authenticating;

        let first = match self
            .read_until(&[
                PromptKind::Username,
                PromptKind::Password,
                PromptKind::Command,
            ])
            .await
        {
            Ok(m) => m.output,
            Err(e) => {
                // Keep going: the final prompt wait decides the outcome.
                debug!("login: initial read failed: {}", e);
                e.partial_output().unwrap_or_default().to_string()
            }
        };

        let saw_username = self
            .prompts
            .get(PromptKind::Username)
            .is_match(first.as_bytes());
        let saw_password = self
            .prompts
            .get(PromptKind::Password)
            .is_match(first.as_bytes());

        if saw_username {
            debug!("login: sending username");
            let username = self.address.username.clone();
            if let Err(e) = self.write_line(&username).await {
                return Err(self.auth_failed("write username", first, e));
            }
            if let Err(e) = self.read_until(&[PromptKind::Password]).await {
                return Err(self.auth_failed("waiting password", first, e));
            }
        }

        if saw_username || saw_password {
            debug!("login: sending password");
            let password = self.address.password.expose_secret().to_owned();
            if let Err(e) = self.write_hidden(&password).await {
                return Err(self.auth_failed("write password", first, e));
            }
        }

        match self.read_until(&[PromptKind::Command]).await {
            Ok(m) => {
                self.state = SessionState::Ready;
                debug!("login: ready on {}", self.address.socket_addr());
                Ok(first + &m.output)
            }
            Err(e) => {
                let transcript = first + e.partial_output().unwrap_or_default();
                Err(self.auth_failed("waiting prompt", transcript, e))
            }
        }
    }

    fn auth_failed(&mut self, stage: &'static str, transcript: String, source: Error) -> Error {
        warn!(
            "login to {} failed at '{}': {}",
            self.address.socket_addr(),
            stage,
            source
        );
        self.state = SessionState::Closed;
        SessionError::Auth {
            stage,
            transcript,
            source: Box::new(source),
        }
        .into()
    }

    /// Execute one command and wait for the command prompt.
    ///
    /// A blank command is a no-op returning empty output.
    pub async fn exec(&mut self, command: &str) -> Result<String> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(String::new());
        }

        self.write_line(command).await?;
        let m = self.read_until(&[PromptKind::Command]).await?;
        Ok(m.output)
    }

    /// Execute a list of commands, recording failures in the transcript.
    ///
    /// Blank lines and `#` comments are skipped. Each executed command is
    /// framed as `>>> <command>` followed by its output; a failed command
    /// gets an `ERR: <message>` line right after its block. A failure never
    /// stops the remaining commands, and the batch itself never fails.
    pub async fn exec_batch<I, C>(&mut self, commands: I) -> BatchOutput
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut batch = BatchOutput::default();

        for command in commands {
            let command = command.as_ref().trim();
            if command.is_empty() || command.starts_with('#') {
                continue;
            }

            let outcome = match self.exec(command).await {
                Ok(output) => CommandOutcome::success(command, output),
                Err(e) => {
                    debug!("batch: '{}' failed: {}", command, e);
                    if e.is_deadline_exceeded() {
                        batch.deadline_exceeded = true;
                    }
                    let output = e.partial_output().unwrap_or_default().to_string();
                    CommandOutcome::failed(command, output, e.to_string())
                }
            };

            batch.push(outcome);
        }

        batch
    }

    /// Shut the transport down. Safe to call more than once.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("close {}: shutdown failed: {}", self.address.socket_addr(), e);
            }
        }
        self.buffer.clear();
        self.state = SessionState::Closed;
    }
}

impl<S> Drop for Session<S> {
    fn drop(&mut self) {
        if self.stream.is_some() {
            warn!(
                "Session to {} dropped without close()",
                self.address.socket_addr()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokio_test::io::Builder;

    fn address() -> DeviceAddress {
        DeviceAddress::new("10.0.0.1", "admin", "secret")
    }

    fn session<S>(stream: S) -> Session<S>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        Session::with_stream(address(), Duration::from_secs(5), stream).unwrap()
    }

    #[tokio::test]
    async fn test_login_username_and_password() {
        let mock = Builder::new()
            .read(b"\r\nUsername: ")
            .write(b"admin\r\n")
            .read(b"Password: ")
            .write(b"secret\r\n")
            .read(b"\r\nzxan#")
            .build();

        let mut s = session(mock);
        let text = s.login().await.unwrap();
        assert_eq!(text, "\r\nUsername: \r\nzxan#");
        assert_eq!(s.state(), SessionState::Ready);
        assert_eq!(s.buffered_len(), 0);
    }

    #[tokio::test]
    async fn test_login_then_batch_leaves_no_residue() {
        let mock = Builder::new()
            .read(b"\r\nUsername: ")
            .write(b"admin\r\n")
            .read(b"Password: ")
            .write(b"secret\r\n")
            .read(b"\r\nzxan#")
            .write(b"show clock\r\n")
            .read(b"show clock\r\n")
            .read(b"12:00:00\r\nzxan#")
            .build();

        let mut s = session(mock);
        s.login().await.unwrap();
        assert_eq!(s.buffered_len(), 0);

        let batch = s.exec_batch(["show clock"]).await;
        assert_eq!(
            batch.transcript,
            ">>> show clock\nshow clock\r\n12:00:00\r\nzxan#\n"
        );
        assert_eq!(batch.failures(), 0);
        assert_eq!(s.buffered_len(), 0);
        assert_eq!(s.state(), SessionState::Ready);
        s.close().await;
    }

    #[tokio::test]
    async fn test_read_until_returns_whole_buffer() {
        let mock = Builder::new()
            .read(b"show clock\r\nzxan#\r\n% late banner")
            .build();

        let mut s = session(mock);
        let m = s.read_until(&[PromptKind::Command]).await.unwrap();
        assert_eq!(m.matched, PromptKind::Command);
        assert_eq!(m.output, "show clock\r\nzxan#\r\n% late banner");
        assert_eq!(s.buffered_len(), 0);
        s.close().await;
    }

    #[tokio::test]
    async fn test_login_password_only() {
        let mock = Builder::new()
            .read(b"Password:")
            .write(b"secret\r\n")
            .read(b"\r\nOLT>")
            .build();

        let mut s = session(mock);
        let text = s.login().await.unwrap();
        assert_eq!(text, "Password:\r\nOLT>");
        assert_eq!(s.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_login_already_at_prompt() {
        let mock = Builder::new().read(b"Welcome\r\nzxan#").build();

        let mut s = session(mock);
        // No credentials are written; the final wait sees end of stream.
        let err = s.login().await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::Auth { .. })));
        assert_eq!(err.partial_output(), Some("Welcome\r\nzxan#"));
        assert_eq!(s.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_login_eof_reports_auth_error() {
        let mock = Builder::new()
            .read(b"Username: ")
            .write(b"admin\r\n")
            .read(b"Password: ")
            .write(b"secret\r\n")
            .read(b"% Bad password\r\n")
            .build();

        let mut s = session(mock);
        let err = s.login().await.unwrap_err();
        match err {
            Error::Session(SessionError::Auth {
                stage, transcript, ..
            }) => {
                assert_eq!(stage, "waiting prompt");
                assert_eq!(transcript, "Username: % Bad password\r\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exec_blank_is_noop() {
        let mut s = session(Builder::new().build());
        assert_eq!(s.exec("   ").await.unwrap(), "");
        s.close().await;
    }

    #[tokio::test]
    async fn test_exec_trims_command() {
        let mock = Builder::new()
            .write(b"show clock\r\n")
            .read(b"show clock\r\n12:00:00\r\nzxan#")
            .build();

        let mut s = session(mock);
        let out = s.exec("  show clock \n").await.unwrap();
        assert_eq!(out, "show clock\r\n12:00:00\r\nzxan#");
    }

    #[tokio::test]
    async fn test_exec_strips_iac() {
        let mock = Builder::new()
            .write(b"show ver\r\n")
            .read(&[0xFF, 0xFB, 0x01, b'v', b'1', b'\r', b'\n'])
            .read(b"zxan#")
            .build();

        let mut s = session(mock);
        assert_eq!(s.exec("show ver").await.unwrap(), "v1\r\nzxan#");
    }

    #[tokio::test]
    async fn test_batch_continues_after_error() {
        let mock = Builder::new()
            .write(b"show a\r\n")
            .read(b"a-out\r\nzxan#")
            .write(b"show b\r\n")
            .read(b"partial")
            .read_error(io::Error::other("boom"))
            .write(b"show c\r\n")
            .read(b"c-out\r\nzxan#")
            .build();

        let mut s = session(mock);
        let batch = s
            .exec_batch(["show a", "", "# comment", "show b", "show c"])
            .await;

        let expected = "\
>>> show a\na-out\r\nzxan#\n\
>>> show b\npartial\n\
ERR: Channel error: read error: boom\n\
>>> show c\nc-out\r\nzxan#\n";
        assert_eq!(batch.transcript, expected);

        assert_eq!(batch.outcomes.len(), 3);
        assert!(batch.outcomes[0].is_success());
        assert!(!batch.outcomes[1].is_success());
        assert!(batch.outcomes[2].is_success());
        assert!(!batch.deadline_exceeded);
    }

    #[tokio::test]
    async fn test_read_timeout_keeps_partial() {
        let (client, mut server) = tokio::io::duplex(64);
        server.write_all(b"still working").await.unwrap();

        let mut s = Session::with_stream(address(), Duration::from_millis(100), client).unwrap();
        let err = s.read_until(&[PromptKind::Command]).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Channel(ChannelError::ReadTimeout { .. })
        ));
        assert_eq!(err.partial_output(), Some("still working"));
        assert_eq!(s.buffered_len(), 0);
        assert_eq!(s.state(), SessionState::Connected);
        s.close().await;
    }

    #[tokio::test]
    async fn test_overall_deadline_wins() {
        let (client, _server) = tokio::io::duplex(64);

        let mut s = Session::with_stream(address(), Duration::from_secs(30), client).unwrap();
        s.set_deadline(Instant::now() + Duration::from_millis(50));

        let err = s.read_until(&[PromptKind::Command]).await.unwrap_err();
        assert!(err.is_deadline_exceeded());
        assert!(s.deadline_exceeded());
        s.close().await;
    }

    #[tokio::test]
    async fn test_eof_closes_session() {
        let mock = Builder::new().read(b"bye").build();

        let mut s = session(mock);
        let err = s.read_until(&[PromptKind::Command]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Channel(ChannelError::EndOfStream { .. })
        ));
        assert_eq!(err.partial_output(), Some("bye"));
        assert_eq!(s.state(), SessionState::Closed);

        let err = s.exec("show run").await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NotConnected)));
    }

    #[test]
    fn test_invalid_prompt_rejected_before_connect() {
        let addr = address().with_prompt("zxan(#");
        let err = Session::new(addr, Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, Error::Address(_)));
    }
}
