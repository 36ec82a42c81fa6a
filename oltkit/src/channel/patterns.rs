//! Named prompt patterns recognised by the session protocol.
//!
//! All patterns a session reacts to live in one [`PromptTable`], compiled
//! once when the session is built. The table is immutable afterwards.

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::AddressError;

/// Default command prompt: `>` or `#` at the end of a line.
pub const DEFAULT_PROMPT: &str = r"(?m)[>#]\s?$";

/// Username prompt emitted by the device before login.
pub const USERNAME_PROMPT: &str = r"(?i)(username|login)\s*:\s*$";

/// Password prompt emitted by the device before login.
pub const PASSWORD_PROMPT: &str = r"(?i)password\s*:\s*$";

/// The recognised protocol states, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Device asks for a username.
    Username,
    /// Device asks for a password.
    Password,
    /// Device command interpreter is ready.
    Command,
}

impl PromptKind {
    /// Table key for this prompt.
    pub fn name(self) -> &'static str {
        match self {
            PromptKind::Username => "username",
            PromptKind::Password => "password",
            PromptKind::Command => "command",
        }
    }
}

/// Immutable table of compiled prompt patterns keyed by [`PromptKind`].
#[derive(Debug, Clone)]
pub struct PromptTable {
    patterns: IndexMap<PromptKind, Regex>,
}

impl PromptTable {
    /// Compile the table with an optional command prompt override.
    ///
    /// An empty or absent override selects [`DEFAULT_PROMPT`].
    pub fn new(command_prompt: Option<&str>) -> Result<Self, AddressError> {
        let command_prompt = match command_prompt {
            Some(p) if !p.is_empty() => p,
            _ => DEFAULT_PROMPT,
        };

        let mut patterns = IndexMap::with_capacity(3);
        patterns.insert(PromptKind::Username, Regex::new(USERNAME_PROMPT)?);
        patterns.insert(PromptKind::Password, Regex::new(PASSWORD_PROMPT)?);
        patterns.insert(PromptKind::Command, Regex::new(command_prompt)?);
        Ok(Self { patterns })
    }

    /// Get the compiled pattern for a prompt kind.
    pub fn get(&self, kind: PromptKind) -> &Regex {
        // All three kinds are inserted by `new`.
        &self.patterns[&kind]
    }

    /// Iterate over `(kind, pattern)` in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (PromptKind, &Regex)> {
        self.patterns.iter().map(|(k, v)| (*k, v))
    }

    /// Check which prompt kinds match the text, in priority order.
    pub fn matching(&self, data: &[u8]) -> Vec<PromptKind> {
        self.iter()
            .filter(|(_, re)| re.is_match(data))
            .map(|(kind, _)| kind)
            .collect()
    }
}
