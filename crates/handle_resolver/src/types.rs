//! Types for handle resolution

use crate::errors::{AvailabilityError, ValidationError};
use crate::validation::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Human-readable handle, stored normalized and without the leading `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Handle(String);

impl Handle {
    /// Create a handle; the name is normalized, validity is not checked
    pub fn new(handle: impl AsRef<str>) -> Self {
        Self(normalize(handle.as_ref()))
    }

    /// Get the handle as string, without the `@`
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Handle {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Resolver state. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleStatus {
    #[default]
    Empty,
    Invalid,
    Checking,
    Available,
    Taken,
}

impl fmt::Display for HandleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandleStatus::Empty => "empty",
            HandleStatus::Invalid => "invalid",
            HandleStatus::Checking => "checking",
            HandleStatus::Available => "available",
            HandleStatus::Taken => "taken",
        };
        f.write_str(s)
    }
}

/// Point-in-time view of the resolver handed to observers.
///
/// `reason` is only ever set for `Invalid` and `Taken`; the constructors below
/// are the only way the resolver builds snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSnapshot {
    pub status: HandleStatus,
    pub reason: Option<String>,
    pub candidate: Option<Handle>,
}

impl ResolverSnapshot {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn invalid(candidate: Handle, error: ValidationError) -> Self {
        Self {
            status: HandleStatus::Invalid,
            reason: Some(error.to_string()),
            candidate: Some(candidate),
        }
    }

    pub(crate) fn checking(candidate: Handle) -> Self {
        Self {
            status: HandleStatus::Checking,
            reason: None,
            candidate: Some(candidate),
        }
    }

    pub(crate) fn available(candidate: Handle) -> Self {
        Self {
            status: HandleStatus::Available,
            reason: None,
            candidate: Some(candidate),
        }
    }

    pub(crate) fn taken(candidate: Handle) -> Self {
        Self {
            status: HandleStatus::Taken,
            reason: Some(format!("{candidate} is already taken")),
            candidate: Some(candidate),
        }
    }
}

/// Identifies the most recently dispatched availability query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryToken(pub u64);

impl QueryToken {
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A clean answer from the availability collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
}

impl Availability {
    /// Decode a remote response. Only an object carrying a boolean
    /// `available` field counts; anything else yields `None`.
    pub fn interpret(response: &Value) -> Option<Self> {
        match response.get("available")?.as_bool()? {
            true => Some(Availability::Available),
            false => Some(Availability::Taken),
        }
    }

    /// Like [`Availability::interpret`], reporting unusable bodies as
    /// [`AvailabilityError::Malformed`].
    pub fn from_response(response: &Value) -> Result<Self, AvailabilityError> {
        Self::interpret(response).ok_or_else(|| AvailabilityError::Malformed(response.to_string()))
    }
}

/// Result of a [`crate::HandleResolver::commit`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Identity created for the handle; the resolver is finished.
    Created(Handle),
    /// Resolver was not in `Available` (or already finished); nothing was called.
    NotReady,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handle_displays_with_at_sign() {
        assert_eq!(Handle::new("alice").to_string(), "@alice");
    }

    #[test]
    fn interpret_accepts_only_boolean_available() {
        assert_eq!(
            Availability::interpret(&json!({ "available": true })),
            Some(Availability::Available)
        );
        assert_eq!(
            Availability::interpret(&json!({ "available": false, "extra": 1 })),
            Some(Availability::Taken)
        );
        assert_eq!(Availability::interpret(&json!({ "available": "yes" })), None);
        assert_eq!(Availability::interpret(&json!({ "taken": true })), None);
        assert_eq!(Availability::interpret(&json!(true)), None);
        assert_eq!(Availability::interpret(&Value::Null), None);
    }

    #[test]
    fn from_response_reports_malformed_body() {
        let err = Availability::from_response(&json!({ "available": 1 })).unwrap_err();
        assert!(matches!(err, AvailabilityError::Malformed(ref body) if body.contains("available")));
        assert_eq!(
            Availability::from_response(&json!({ "available": false })).unwrap(),
            Availability::Taken
        );
    }

    #[test]
    fn handle_new_normalizes() {
        assert_eq!(Handle::new(" @Alice "), Handle::new("alice"));
        let decoded: Handle = serde_json::from_str(r#""@Bob""#).unwrap();
        assert_eq!(decoded.as_str(), "bob");
    }

    #[test]
    fn taken_reason_names_handle() {
        let snapshot = ResolverSnapshot::taken(Handle::new("validname"));
        assert_eq!(snapshot.reason.as_deref(), Some("@validname is already taken"));
    }
}
