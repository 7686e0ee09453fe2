//! Error types for handle resolution

use thiserror::Error;

/// Local validation failures. These never leave the resolver as errors; they
/// become `HandleStatus::Invalid` with the message as the reason.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("too short")]
    TooShort,

    #[error("too long")]
    TooLong,

    #[error("invalid characters")]
    InvalidCharacters,

    #[error("reserved")]
    Reserved,
}

/// Failure to obtain an availability answer from the remote collaborator.
#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("availability backend error: {0}")]
    Backend(String),

    #[error("availability check timed out")]
    Timeout,

    #[error("malformed availability response: {0}")]
    Malformed(String),
}

/// Failure reported by the identity-creation collaborator.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("handle already registered: {handle}")]
    AlreadyRegistered { handle: String },

    #[error("identity backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by [`crate::HandleResolver::commit`].
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("identity creation failed for {handle}: {source}")]
    IdentityCreation {
        handle: String,
        #[source]
        source: IdentityError,
    },

    #[error("a commit is already in flight")]
    CommitInProgress,
}

pub type Result<T> = std::result::Result<T, ResolverError>;
