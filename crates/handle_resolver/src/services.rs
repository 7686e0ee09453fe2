//! Outbound collaborators of the resolver.

use crate::errors::{AvailabilityError, IdentityError};
use crate::types::Handle;
use async_trait::async_trait;
use serde_json::Value;

/// Remote availability lookup.
///
/// The raw response body is returned; the resolver decodes it with
/// [`crate::Availability::interpret`] and treats any shape other than
/// `{"available": <bool>}` as a failed check.
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    async fn check_availability(&self, candidate: &Handle) -> Result<Value, AvailabilityError>;
}

/// Downstream identity creation, invoked once on commit.
#[async_trait]
pub trait IdentityCreator: Send + Sync {
    async fn create_identity(&self, handle: &Handle) -> Result<(), IdentityError>;
}
