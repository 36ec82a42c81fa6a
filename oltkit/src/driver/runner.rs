//! Command orchestration over a single ephemeral session.
//!
//! [`CommandRunner`] turns a [`CommandRequest`] into a
//! [`CommandExecutionResult`]: it builds a session under an overall
//! deadline, logs in, disables paging, runs the batch and closes the
//! transport on every exit path. It never returns an error; failures are
//! reported in the result.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::Instant;

use super::builder::SessionBuilder;
use super::response::CommandExecutionResult;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::transport::DeviceAddress;

/// Error text used when the overall deadline was exceeded.
pub const TIMEOUT_ADVISORY: &str = "Operation timed out. The save configuration process may take \
several minutes on busy OLTs. Consider increasing the timeout parameter.";

/// A device and the commands to run on it.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    /// Where to connect and how to log in.
    pub address: DeviceAddress,

    /// Commands in order. Blank lines and `#` comments are skipped.
    pub commands: Vec<String>,
}

impl CommandRequest {
    /// Create a request.
    pub fn new<I, C>(address: DeviceAddress, commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            address,
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a request from a newline-separated script.
    pub fn from_script(address: DeviceAddress, script: &str) -> Self {
        Self::new(address, script.lines())
    }
}

/// Runs command requests against OLTs.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    config: EngineConfig,
}

impl CommandRunner {
    /// Create a runner with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The runner's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a device address on the configured telnet port.
    pub fn address(
        &self,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> DeviceAddress {
        DeviceAddress::new(host, username, password).with_port(self.config.telnet_port)
    }

    /// Run a request under the ordinary deadline budget.
    pub async fn run(&self, request: &CommandRequest) -> CommandExecutionResult {
        self.execute(request, self.config.command_timeout, self.config.run_budget()).await
    }

    /// Run a long administrative request such as saving configuration.
    ///
    /// `timeout` overrides the per-operation timeout for every read and
    /// sizes the overall deadline; `None` or zero selects the configured
    /// default.
    pub async fn run_long(
        &self,
        request: &CommandRequest,
        timeout: Option<Duration>,
    ) -> CommandExecutionResult {
        self.execute(
            request,
            self.config.long_run_timeout(timeout),
            self.config.long_run_budget(timeout),
        )
        .await
    }

    async fn execute(
        &self,
        request: &CommandRequest,
        timeout: Duration,
        budget: Duration,
    ) -> CommandExecutionResult {
        let start = Instant::now();
        let deadline = start + budget;
        let address = &request.address;
        let host = address.host.clone();

        debug!(
            "running {} commands on {} (timeout {:?}, budget {:?})",
            request.commands.len(),
            address.socket_addr(),
            timeout,
            budget
        );

        let mut session = match SessionBuilder::from_address(address)
            .timeout(timeout)
            .deadline(deadline)
            .build()
        {
            Ok(session) => session,
            Err(e) => {
                return CommandExecutionResult::failed(
                    host,
                    "",
                    format!("session creation failed: {}", e),
                    start.elapsed(),
                );
            }
        };

        if let Err(e) = session.dial().await {
            warn!("connect to {} failed: {}", address.socket_addr(), e);
            return CommandExecutionResult::failed(
                host,
                "",
                format!("connect failed: {}", e),
                start.elapsed(),
            );
        }

        let header = format!("== {} ==\n", address.socket_addr());

        if let Err(e) = session.login().await {
            session.close().await;
            let output = header + e.partial_output().unwrap_or_default();
            return CommandExecutionResult::failed(
                host,
                output,
                failure_text("login failed", &e),
                start.elapsed(),
            );
        }

        for command in &self.config.pagination_commands {
            if let Err(e) = session.exec(command).await {
                debug!("pagination command '{}' ignored: {}", command, e);
            }
        }

        let batch = session.exec_batch(&request.commands).await;
        session.close().await;

        let output = header + &batch.transcript;
        let elapsed = start.elapsed();

        if batch.deadline_exceeded {
            warn!(
                "request on {} exceeded its {:?} deadline",
                address.socket_addr(),
                budget
            );
            let mut result = CommandExecutionResult::failed(host, output, TIMEOUT_ADVISORY, elapsed);
            result.commands = batch.outcomes;
            return result;
        }

        info!(
            "{}: {} commands in {:?} ({} failed)",
            address.socket_addr(),
            batch.outcomes.len(),
            elapsed,
            batch.failures()
        );
        CommandExecutionResult::success(host, output, elapsed, batch.outcomes)
    }
}

fn failure_text(stage: &str, err: &Error) -> String {
    if err.is_deadline_exceeded() {
        TIMEOUT_ADVISORY.to_string()
    } else {
        format!("{}: {}", stage, err)
    }
}
