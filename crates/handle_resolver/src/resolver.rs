//! Debounced handle resolution state machine

use crate::config::ResolverConfig;
use crate::errors::*;
use crate::services::{AvailabilityService, IdentityCreator};
use crate::types::*;
use crate::validation::{normalize, HandleRules};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// Handle resolver
///
/// Turns keystrokes into a [`HandleStatus`]. Valid input is checked remotely
/// after a debounce delay; every input change bumps the pending query token so
/// that only the response to the latest query can touch the state.
///
/// Must be driven from within a Tokio runtime. Dropping the resolver tears it
/// down: the debounce timer is canceled and late responses are discarded.
pub struct HandleResolver {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<ResolverState>,
    availability: Arc<dyn AvailabilityService>,
    identity: Arc<dyn IdentityCreator>,
    rules: HandleRules,
    debounce: Duration,
    updates: watch::Sender<ResolverSnapshot>,
}

#[derive(Default)]
struct ResolverState {
    raw_input: String,
    snapshot: ResolverSnapshot,
    pending_query: QueryToken,
    debounce_timer: Option<JoinHandle<()>>,
    committing: bool,
    finished: bool,
}

impl ResolverState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.debounce_timer.take() {
            timer.abort();
        }
    }
}

impl HandleResolver {
    /// Create a new resolver in the `Empty` state
    pub fn new(
        availability: Arc<dyn AvailabilityService>,
        identity: Arc<dyn IdentityCreator>,
        config: &ResolverConfig,
    ) -> Self {
        let (updates, _) = watch::channel(ResolverSnapshot::empty());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ResolverState::default()),
                availability,
                identity,
                rules: config.rules(),
                debounce: config.debounce(),
                updates,
            }),
        }
    }

    /// Feed the latest text from the input field
    pub fn on_input_changed(&self, text: &str) {
        let mut state = self.inner.state.lock();
        if state.finished {
            debug!("input ignored: resolver finished");
            return;
        }
        if state.committing {
            debug!("input ignored: commit in flight");
            return;
        }

        state.cancel_timer();
        // In-flight queries keep running; bumping the token makes them stale.
        state.pending_query = state.pending_query.next();

        let normalized = normalize(text);
        state.raw_input.clone_from(&normalized);

        if normalized.is_empty() {
            self.inner.publish(&mut state, ResolverSnapshot::empty());
            return;
        }

        let candidate = Handle::new(normalized);
        if let Err(error) = self.inner.rules.validate(candidate.as_str()) {
            debug!(handle = %candidate, %error, "handle failed local validation");
            self.inner
                .publish(&mut state, ResolverSnapshot::invalid(candidate, error));
            return;
        }

        let token = state.pending_query;
        self.inner
            .publish(&mut state, ResolverSnapshot::checking(candidate.clone()));

        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.debounce;
        debug!(handle = %candidate, query = token.0, ?delay, "scheduling availability check");
        state.debounce_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                Inner::dispatch_query(&inner, candidate, token);
            }
        }));
    }

    /// Create the identity for the current candidate.
    ///
    /// Only acts in `Available`; otherwise returns [`CommitOutcome::NotReady`]
    /// without calling out. On failure the status stays `Available` so the
    /// caller can retry.
    pub async fn commit(&self) -> Result<CommitOutcome> {
        let handle = {
            let mut state = self.inner.state.lock();
            if state.committing {
                return Err(ResolverError::CommitInProgress);
            }
            if state.finished || state.snapshot.status != HandleStatus::Available {
                return Ok(CommitOutcome::NotReady);
            }
            let Some(handle) = state.snapshot.candidate.clone() else {
                return Ok(CommitOutcome::NotReady);
            };
            state.committing = true;
            handle
        };
        // Clears `committing` if this future is dropped mid-flight.
        let mut guard = CommitGuard {
            inner: &self.inner,
            armed: true,
        };

        let result = self.inner.identity.create_identity(&handle).await;

        let mut state = self.inner.state.lock();
        state.committing = false;
        guard.armed = false;
        match result {
            Ok(()) => {
                state.finished = true;
                state.cancel_timer();
                info!(handle = %handle, "identity created");
                Ok(CommitOutcome::Created(handle))
            }
            Err(source) => {
                warn!(handle = %handle, error = %source, "identity creation failed");
                Err(ResolverError::IdentityCreation {
                    handle: handle.to_string(),
                    source,
                })
            }
        }
    }

    /// Tear down: cancel the debounce timer and ignore everything afterwards
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        if !state.finished {
            debug!("handle resolver shut down");
        }
        state.finished = true;
        state.cancel_timer();
    }

    pub fn status(&self) -> HandleStatus {
        self.inner.state.lock().snapshot.status
    }

    pub fn reason(&self) -> Option<String> {
        self.inner.state.lock().snapshot.reason.clone()
    }

    pub fn candidate(&self) -> Option<Handle> {
        self.inner.state.lock().snapshot.candidate.clone()
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        self.inner.state.lock().snapshot.clone()
    }

    /// Latest input after normalization
    pub fn raw_input(&self) -> String {
        self.inner.state.lock().raw_input.clone()
    }

    /// Token of the query that is currently allowed to update the state
    pub fn pending_query(&self) -> QueryToken {
        self.inner.state.lock().pending_query
    }

    /// True once shut down or after a successful commit
    pub fn is_finished(&self) -> bool {
        self.inner.state.lock().finished
    }

    /// Receive every snapshot the resolver publishes
    pub fn subscribe(&self) -> watch::Receiver<ResolverSnapshot> {
        self.inner.updates.subscribe()
    }
}

struct CommitGuard<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("commit abandoned before identity creation finished");
            self.inner.state.lock().committing = false;
        }
    }
}

impl Drop for HandleResolver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn publish(&self, state: &mut ResolverState, snapshot: ResolverSnapshot) {
        state.snapshot = snapshot.clone();
        self.updates.send_replace(snapshot);
    }

    /// Debounce fired: issue the remote query unless superseded meanwhile.
    fn dispatch_query(inner: &Arc<Inner>, candidate: Handle, token: QueryToken) {
        let mut state = inner.state.lock();
        if state.finished || state.pending_query != token {
            return;
        }
        // The timer is the task running this; detach rather than abort it.
        state.debounce_timer = None;

        let service = Arc::clone(&inner.availability);
        let weak: Weak<Inner> = Arc::downgrade(inner);
        debug!(handle = %candidate, query = token.0, "dispatching availability check");
        tokio::spawn(async move {
            let response = service.check_availability(&candidate).await;
            match weak.upgrade() {
                Some(inner) => inner.apply_availability(candidate, token, response),
                None => debug!(handle = %candidate, "resolver dropped before availability response"),
            }
        });
    }

    fn apply_availability(
        &self,
        candidate: Handle,
        token: QueryToken,
        response: std::result::Result<Value, AvailabilityError>,
    ) {
        let mut state = self.state.lock();
        if state.finished {
            debug!(handle = %candidate, "availability response after shutdown dropped");
            return;
        }
        if state.pending_query != token {
            debug!(
                handle = %candidate,
                query = token.0,
                current = state.pending_query.0,
                "stale availability response dropped"
            );
            return;
        }

        // Any failure counts as available; the server decides at commit time.
        let answer = response.and_then(|body| Availability::from_response(&body));
        let snapshot = match answer {
            Ok(Availability::Available) => ResolverSnapshot::available(candidate),
            Ok(Availability::Taken) => ResolverSnapshot::taken(candidate),
            Err(error) => {
                warn!(handle = %candidate, %error, "availability check failed, failing open");
                ResolverSnapshot::available(candidate)
            }
        };
        self.publish(&mut state, snapshot);
    }
}
