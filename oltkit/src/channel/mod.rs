//! Channel layer for telnet byte handling and prompt detection.
//!
//! This module handles the inbound side of a session: stripping telnet
//! negotiation, accumulating output and matching it against the named
//! prompt table.

mod buffer;
mod iac;
mod patterns;

pub use buffer::PatternBuffer;
pub use iac::{IAC, strip_iac};
pub use patterns::{DEFAULT_PROMPT, PASSWORD_PROMPT, PromptKind, PromptTable, USERNAME_PROMPT};
