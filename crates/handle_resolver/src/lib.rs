//! Handle resolution for first-run identity creation
//!
//! Maps raw keystrokes for a human-readable handle such as `@alice` onto a
//! small set of states (empty, invalid, checking, available, taken). Local
//! validation runs synchronously; availability is checked remotely after a
//! debounce delay, and responses to superseded queries are discarded.

pub mod config;
pub mod errors;
pub mod registry;
pub mod resolver;
pub mod services;
pub mod types;
pub mod validation;

pub use config::ResolverConfig;
pub use errors::{AvailabilityError, IdentityError, ResolverError, ValidationError};
pub use registry::InMemoryHandleRegistry;
pub use resolver::HandleResolver;
pub use services::{AvailabilityService, IdentityCreator};
pub use types::*;
pub use validation::{normalize, HandleRules};
