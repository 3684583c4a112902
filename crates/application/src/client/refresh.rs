//! Single-flight coordination of token refreshes.
//!
//! The in-flight flag and the waiter queue live behind one synchronous mutex
//! that is never held across an `.await`. Checking the flag and claiming the
//! refresh happen in the same lock section, so two callers can never both
//! start an exchange.

use std::mem;
use std::sync::{Mutex, PoisonError};

use clipper_domain::ExpiryReason;
use tokio::sync::oneshot;

/// What a refresh cycle ends with: the new access token or why it failed.
pub(crate) type RefreshOutcome = Result<String, ExpiryReason>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// What a caller holding a stale token should do.
pub(crate) enum Turn<'a> {
    /// Run the exchange and settle the lease.
    Lead(RefreshLease<'a>),
    /// Another caller is refreshing; await its outcome.
    Wait(oneshot::Receiver<RefreshOutcome>),
    /// The stored pair changed since the request was sent; use it.
    Changed,
}

/// Refresh state owned by one API client.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    /// Decide the caller's role for a 401 received on a request sent at
    /// token generation `seen`.
    ///
    /// `current` reads the store's generation; it runs inside the critical
    /// section.
    pub(crate) fn begin(&self, seen: u64, current: impl FnOnce() -> u64) -> Turn<'_> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            return Turn::Wait(rx);
        }

        if current() != seen {
            return Turn::Changed;
        }

        state.in_flight = true;
        Turn::Lead(RefreshLease {
            coordinator: self,
            settled: false,
        })
    }

    /// Number of callers queued on the current cycle.
    pub(crate) fn waiting(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .len()
    }

    /// Returns true while an exchange is outstanding.
    pub(crate) fn in_flight(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight
    }

    fn finish(&self) -> Vec<oneshot::Sender<RefreshOutcome>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = false;
        mem::take(&mut state.waiters)
    }
}

/// Exclusive right to run the current refresh exchange.
///
/// Dropping an unsettled lease (the leader's future was cancelled) still
/// ends the cycle: the flag is cleared and waiters see a closed channel.
pub(crate) struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// End the cycle and release every waiter, in queue order.
    pub(crate) fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        for waiter in self.coordinator.finish() {
            // A waiter whose caller gave up has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            drop(self.coordinator.finish());
        }
    }
}
