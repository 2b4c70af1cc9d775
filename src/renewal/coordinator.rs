//! Single-flight coordination for access token renewal.
//!
//! The coordinator is owned by one [`crate::ApiClient`] and shared by all of
//! its clones. It holds the renewal state, the queue of callers waiting on an
//! in-flight renewal and the current access token with its generation.
//!
//! Flow Overview:
//! 1. A caller that saw a 401 calls `acquire_or_enqueue` with the generation it
//!    dispatched under.
//! 2. If the token was renewed since then, it gets the fresh token right away.
//! 3. If idle, it becomes the leader and must perform the renewal call.
//! 4. If a renewal is in progress, it is queued on a oneshot channel.
//! 5. The leader calls `release_and_drain`; the state returns to idle and every
//!    queued caller receives the same outcome, in arrival order. If the session
//!    was cleared or replaced while the renewal ran, the result is discarded
//!    and callers get the current token instead.
//!
//! The lock is never held across an `.await`.

use crate::error::RenewalError;
use secrecy::SecretString;
use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tokio::sync::oneshot;
use tracing::{debug, warn};

type Outcome = Result<SecretString, RenewalError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenewalState {
    Idle,
    InProgress,
}

/// What a caller has to do after observing an authorization failure.
#[derive(Debug)]
pub enum Ticket<'a> {
    /// The token was renewed after the caller dispatched; replay with it.
    Renewed(SecretString),
    /// The caller owns the renewal and must release the lease with its outcome.
    Leader(RenewalLease<'a>),
    /// A renewal is already in flight; wait for its outcome.
    Queued(PendingRenewal),
}

/// Snapshot of the credential used for a dispatch.
#[derive(Clone, Debug)]
pub struct Credential {
    pub token: Option<SecretString>,
    pub generation: u64,
}

#[derive(Debug)]
struct State {
    phase: RenewalState,
    queue: VecDeque<oneshot::Sender<Outcome>>,
    token: Option<SecretString>,
    generation: u64,
}

#[derive(Debug)]
pub struct RenewalCoordinator {
    state: Mutex<State>,
}

impl Default for RenewalCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RenewalCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                phase: RenewalState::Idle,
                queue: VecDeque::new(),
                token: None,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> RenewalState {
        self.lock().phase
    }

    /// Number of callers waiting on the in-flight renewal.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    #[must_use]
    pub fn credential(&self) -> Credential {
        let state = self.lock();
        Credential {
            token: state.token.clone(),
            generation: state.generation,
        }
    }

    /// Installs a token obtained outside the renewal flow (e.g. after login).
    pub fn set_token(&self, token: SecretString) {
        let mut state = self.lock();
        state.token = Some(token);
        state.generation += 1;
    }

    /// Forgets the current token (logout).
    pub fn clear_token(&self) {
        let mut state = self.lock();
        if state.token.take().is_some() {
            state.generation += 1;
        }
    }

    /// Joins or starts a renewal.
    ///
    /// `observed` is the generation the caller dispatched under; pass `None` to
    /// always renew (or join the renewal already in flight).
    pub fn acquire_or_enqueue(&self, observed: Option<u64>) -> Ticket<'_> {
        let mut state = self.lock();

        if let (Some(observed), Some(token)) = (observed, state.token.as_ref()) {
            if state.generation > observed {
                debug!(
                    observed,
                    current = state.generation,
                    "token already renewed since dispatch"
                );
                return Ticket::Renewed(token.clone());
            }
        }

        match state.phase {
            RenewalState::InProgress => {
                let (tx, rx) = oneshot::channel();
                state.queue.push_back(tx);
                debug!(queued = state.queue.len(), "renewal in progress; request queued");
                Ticket::Queued(PendingRenewal { rx })
            }
            RenewalState::Idle => {
                state.phase = RenewalState::InProgress;
                Ticket::Leader(RenewalLease {
                    coordinator: self,
                    generation: state.generation,
                    released: false,
                })
            }
        }
    }

    /// Settles the renewal started at `generation`. A token installed or
    /// cleared since then wins over the refresh result, which is discarded.
    fn finish(&self, generation: u64, outcome: Outcome) -> (Outcome, usize) {
        let (outcome, waiters) = {
            let mut state = self.lock();
            let outcome = if state.generation == generation {
                match &outcome {
                    Ok(token) => {
                        state.token = Some(token.clone());
                        state.generation += 1;
                    }
                    Err(_) => {
                        if state.token.take().is_some() {
                            state.generation += 1;
                        }
                    }
                }
                outcome
            } else {
                debug!(
                    started = generation,
                    current = state.generation,
                    "session changed during renewal; discarding refresh result"
                );
                state.token.clone().ok_or(RenewalError::SessionCleared)
            };
            state.phase = RenewalState::Idle;
            (outcome, std::mem::take(&mut state.queue))
        };

        let released = waiters.len();
        for waiter in waiters {
            // A closed receiver means the queued caller went away; nothing to release.
            let _ = waiter.send(outcome.clone());
        }
        (outcome, released)
    }
}

/// Exclusive right to perform the renewal call. Dropping it without releasing
/// rejects every queued caller with `RenewalError::Abandoned`.
#[derive(Debug)]
pub struct RenewalLease<'a> {
    coordinator: &'a RenewalCoordinator,
    generation: u64,
    released: bool,
}

impl RenewalLease<'_> {
    /// Records the outcome, returns the state to idle and releases the queue in
    /// arrival order.
    ///
    /// Returns the outcome every caller observed (the refresh result, unless the
    /// session was cleared or replaced meanwhile) and how many queued callers
    /// were released.
    pub fn release_and_drain(
        mut self,
        outcome: Result<SecretString, RenewalError>,
    ) -> (Result<SecretString, RenewalError>, usize) {
        self.released = true;
        self.coordinator.finish(self.generation, outcome)
    }
}

impl Drop for RenewalLease<'_> {
    fn drop(&mut self) {
        if !self.released {
            let (_, released) = self
                .coordinator
                .finish(self.generation, Err(RenewalError::Abandoned));
            warn!(released, "renewal lease dropped before completion");
        }
    }
}

/// A queued caller waiting on the in-flight renewal.
#[derive(Debug)]
pub struct PendingRenewal {
    rx: oneshot::Receiver<Outcome>,
}

impl PendingRenewal {
    /// Waits for the leader's outcome.
    ///
    /// # Errors
    /// Returns the leader's renewal error, or `RenewalError::Abandoned` if the
    /// coordinator went away without answering.
    pub async fn wait(self) -> Result<SecretString, RenewalError> {
        self.rx.await.unwrap_or(Err(RenewalError::Abandoned))
    }
}
