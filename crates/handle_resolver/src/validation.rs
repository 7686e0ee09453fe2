//! Local handle validation. Pure, no I/O.

use crate::errors::ValidationError;
use std::collections::HashSet;

pub const MIN_HANDLE_LEN: usize = 3;
pub const MAX_HANDLE_LEN: usize = 20;

/// Platform-reserved names that can never be claimed.
pub const RESERVED_HANDLES: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "sys",
    "support",
    "help",
    "moderator",
    "mod",
    "staff",
    "official",
    "security",
    "ippan",
    "validator",
    "treasury",
    "null",
    "undefined",
    "anonymous",
    "everyone",
    "here",
];

/// Lowercase, drop every `@`, trim surrounding whitespace.
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace('@', "").trim().to_string()
}

/// Validation rules applied to normalized input.
#[derive(Debug, Clone)]
pub struct HandleRules {
    reserved: HashSet<String>,
}

impl HandleRules {
    /// Built-in reserved set only
    pub fn new() -> Self {
        Self {
            reserved: RESERVED_HANDLES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Built-in reserved set plus `extra`, normalized like user input
    pub fn with_extra_reserved<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::new();
        rules.reserved.extend(
            extra
                .into_iter()
                .map(|word| normalize(word.as_ref()))
                .filter(|word| !word.is_empty()),
        );
        rules
    }

    pub fn is_reserved(&self, handle: &str) -> bool {
        self.reserved.contains(handle)
    }

    /// Checks run in order; the first failure wins.
    pub fn validate(&self, handle: &str) -> Result<(), ValidationError> {
        let len = handle.chars().count();
        if len < MIN_HANDLE_LEN {
            return Err(ValidationError::TooShort);
        }
        if len > MAX_HANDLE_LEN {
            return Err(ValidationError::TooLong);
        }
        if !handle
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ValidationError::InvalidCharacters);
        }
        if self.is_reserved(handle) {
            return Err(ValidationError::Reserved);
        }
        Ok(())
    }
}

impl Default for HandleRules {
    fn default() -> Self {
        Self::new()
    }
}
