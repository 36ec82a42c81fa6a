//! Telnet session driver and command orchestration.
//!
//! [`Session`] speaks the OLT command-line protocol over one connection.
//! [`CommandRunner`] wraps a session per request with an overall deadline
//! and always produces a [`CommandExecutionResult`].

mod builder;
pub(crate) mod response;
mod runner;
mod session;

pub use builder::{AddressSessionBuilder, SessionBuilder};
pub use response::{BatchOutput, CommandExecutionResult, CommandOutcome};
pub use runner::{CommandRequest, CommandRunner, TIMEOUT_ADVISORY};
pub use session::{ReadMatch, Session, SessionState};
