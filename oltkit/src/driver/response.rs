//! Result types for command execution.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Outcome of one command inside a batch.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    /// The command as sent (trimmed).
    pub command: String,

    /// Output up to and including the prompt, or the partial text on failure.
    pub output: String,

    /// Failure message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutcome {
    /// Create a successful outcome.
    pub fn success(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            error: None,
        }
    }

    /// Create a failed outcome.
    pub fn failed(
        command: impl Into<String>,
        output: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            error: Some(error.into()),
        }
    }

    /// Check if the command succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Output of [`Session::exec_batch`](super::Session::exec_batch).
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    /// `>>> command` framed transcript with `ERR:` lines after failures.
    pub transcript: String,

    /// Per-command outcomes in execution order.
    pub outcomes: Vec<CommandOutcome>,

    /// Set when a command failed because the overall deadline passed.
    pub deadline_exceeded: bool,
}

impl BatchOutput {
    /// Append an outcome and its transcript block.
    pub fn push(&mut self, outcome: CommandOutcome) {
        let _ = write!(
            self.transcript,
            ">>> {}\n{}\n",
            outcome.command, outcome.output
        );
        if let Some(error) = &outcome.error {
            let _ = writeln!(self.transcript, "ERR: {}", error);
        }
        self.outcomes.push(outcome);
    }

    /// Number of failed commands.
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}

/// Result of one orchestrated command request.
///
/// Always produced, even on failure. `output` carries whatever transcript
/// was captured, starting with the `== host:port ==` header once the
/// session was established.
#[derive(Debug, Clone, Serialize)]
pub struct CommandExecutionResult {
    /// Device host.
    pub host: String,

    /// Aggregated transcript.
    pub output: String,

    /// Whether the request completed. Individual command failures inside
    /// the transcript do not clear this flag.
    pub success: bool,

    /// Failure text when `success` is false.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,

    /// Wall time of the whole request.
    #[serde(rename = "execution_time", serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,

    /// Structured per-command outcomes.
    pub commands: Vec<CommandOutcome>,
}

impl CommandExecutionResult {
    /// Create a successful result.
    pub fn success(
        host: impl Into<String>,
        output: impl Into<String>,
        elapsed: Duration,
        commands: Vec<CommandOutcome>,
    ) -> Self {
        Self {
            host: host.into(),
            output: output.into(),
            success: true,
            error: String::new(),
            elapsed,
            commands,
        }
    }

    /// Create a failed result.
    pub fn failed(
        host: impl Into<String>,
        output: impl Into<String>,
        error: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            output: output.into(),
            success: false,
            error: error.into(),
            elapsed,
            commands: Vec::new(),
        }
    }

    /// Check if the request completed.
    pub fn is_success(&self) -> bool {
        self.success
    }
}

fn serialize_elapsed<S: Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:?}", elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_framing() {
        let mut batch = BatchOutput::default();
        batch.push(CommandOutcome::success("show a", "a#"));
        batch.push(CommandOutcome::failed("show b", "", "EOF"));
        assert_eq!(batch.transcript, ">>> show a\na#\n>>> show b\n\nERR: EOF\n");
        assert_eq!(batch.failures(), 1);
    }

    #[test]
    fn test_result_json_shape() {
        let result = CommandExecutionResult::success(
            "10.0.0.1",
            "== 10.0.0.1:23 ==\n",
            Duration::from_millis(1500),
            vec![CommandOutcome::success("show clock", "zxan#")],
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["host"], "10.0.0.1");
        assert_eq!(json["success"], true);
        assert_eq!(json["execution_time"], "1.5s");
        assert!(json.get("error").is_none());
        assert!(json["commands"][0].get("error").is_none());
    }

    #[test]
    fn test_failed_result_keeps_error() {
        let result = CommandExecutionResult::failed("h", "", "login failed: EOF", Duration::ZERO);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "login failed: EOF");
        assert!(!result.is_success());
    }
}
