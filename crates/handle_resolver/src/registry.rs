//! In-memory handle registry
//!
//! Backs both collaborators of the resolver with a single lock-guarded map.
//! Used by the CLI driver and by tests; a networked deployment swaps in its
//! own [`AvailabilityService`] and [`IdentityCreator`].

use crate::errors::{AvailabilityError, IdentityError};
use crate::services::{AvailabilityService, IdentityCreator};
use crate::types::Handle;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Registration record kept per handle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleRecord {
    /// Registration timestamp (seconds since UNIX_EPOCH)
    pub created_at: u64,
}

impl HandleRecord {
    fn now() -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self { created_at }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHandleRegistry {
    handles: RwLock<HashMap<Handle, HandleRecord>>,
    latency: Duration,
    queries: AtomicUsize,
}

impl InMemoryHandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `taken` already registered
    pub fn with_taken<I>(taken: I) -> Self
    where
        I: IntoIterator<Item = Handle>,
    {
        let registry = Self::new();
        {
            let mut handles = registry.handles.write();
            for handle in taken {
                handles.insert(handle, HandleRecord::now());
            }
        }
        registry
    }

    /// Delay every availability lookup and registration by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn is_registered(&self, handle: &Handle) -> bool {
        self.handles.read().contains_key(handle)
    }

    pub fn get(&self, handle: &Handle) -> Option<HandleRecord> {
        self.handles.read().get(handle).cloned()
    }

    /// Number of availability lookups served so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl AvailabilityService for InMemoryHandleRegistry {
    async fn check_availability(&self, candidate: &Handle) -> Result<Value, AvailabilityError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        let available = !self.is_registered(candidate);
        debug!(handle = %candidate, available, "registry availability lookup");
        Ok(json!({ "available": available }))
    }
}

#[async_trait]
impl IdentityCreator for InMemoryHandleRegistry {
    async fn create_identity(&self, handle: &Handle) -> Result<(), IdentityError> {
        self.simulate_latency().await;
        let mut handles = self.handles.write();
        if handles.contains_key(handle) {
            return Err(IdentityError::AlreadyRegistered {
                handle: handle.to_string(),
            });
        }
        handles.insert(handle.clone(), HandleRecord::now());
        Ok(())
    }
}
