//! Validation for process identifiers
//!
//! Process identifiers are the keys that tie an owned block to the process
//! holding it. They come from user input, so they are checked once at the
//! boundary and carried around as a [`ProcessId`] afterwards.

use crate::error::{AllocError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A validated process identifier
///
/// # Rules
/// - At least one character
/// - No whitespace (identifiers are single command tokens)
///
/// Case is preserved and significant: `P1` and `p1` are different processes.
///
/// # Examples
///
/// ```
/// use contigalloc::ProcessId;
///
/// let pid = ProcessId::new("P1").unwrap();
/// assert_eq!(pid.as_str(), "P1");
///
/// assert!(ProcessId::new("").is_err());
/// assert!(ProcessId::new("P 1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProcessId(String);

impl ProcessId {
    /// Pattern for a single whitespace-free token
    const PATTERN: &'static str = r"^\S+$";

    /// Create a new validated identifier
    ///
    /// # Errors
    ///
    /// Returns `InvalidProcessId` if the identifier is empty or contains
    /// whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        Self::validate_id(&id)?;
        Ok(ProcessId(id))
    }

    fn validate_id(id: &str) -> Result<()> {
        static RE: OnceLock<Regex> = OnceLock::new();

        if id.is_empty() {
            return Err(AllocError::InvalidProcessId(id.to_string()));
        }

        let re = RE.get_or_init(|| Regex::new(Self::PATTERN).expect("static pattern compiles"));
        if !re.is_match(id) {
            return Err(AllocError::InvalidProcessId(id.to_string()));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProcessId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProcessId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProcessId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<String> for ProcessId {
    type Error = AllocError;

    fn try_from(value: String) -> Result<Self> {
        ProcessId::new(value)
    }
}

impl TryFrom<&str> for ProcessId {
    type Error = AllocError;

    fn try_from(value: &str) -> Result<Self> {
        ProcessId::new(value)
    }
}

impl From<ProcessId> for String {
    fn from(id: ProcessId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
