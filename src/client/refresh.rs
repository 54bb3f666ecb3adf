// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-flight coordination of access token refreshes.
//!
//! The first request to see a 401 while the coordinator is idle becomes the
//! initiator of a refresh episode. Every other request that sees a 401 before
//! the episode settles is queued and receives the episode's outcome instead
//! of starting a refresh of its own.

use crate::error::RefreshError;
use std::collections::VecDeque;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// New access token, or the reason there is none.
pub type RefreshOutcome = Result<String, RefreshError>;

#[derive(Debug, Default)]
enum RefreshState {
    #[default]
    Idle,
    Refreshing {
        waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
    },
}

/// Refresh state owned by a single client instance.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// A request's role in the current refresh episode.
pub enum Ticket<'a> {
    /// Perform the refresh and settle the episode.
    Initiator(RefreshEpisode<'a>),
    /// Wait for the initiator's outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current refresh episode, starting one if none is running.
    pub fn join(&self) -> Ticket<'_> {
        let mut state = self.state();

        if let RefreshState::Refreshing { waiters } = &mut *state {
            let (tx, rx) = oneshot::channel();
            waiters.push_back(tx);
            tracing::debug!(queued = waiters.len(), "Refresh in progress, queueing request");
            return Ticket::Waiter(rx);
        }

        *state = RefreshState::Refreshing {
            waiters: VecDeque::new(),
        };
        Ticket::Initiator(RefreshEpisode {
            coordinator: self,
            settled: false,
        })
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state(), RefreshState::Refreshing { .. })
    }

    /// Number of requests waiting on the current episode.
    pub fn queued(&self) -> usize {
        match &*self.state() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Return to idle, then hand `outcome` to every waiter in arrival order.
    fn finish(&self, outcome: RefreshOutcome) {
        let waiters = match mem::take(&mut *self.state()) {
            RefreshState::Refreshing { waiters } => waiters,
            RefreshState::Idle => VecDeque::new(),
        };

        for waiter in waiters {
            // A waiter whose caller gave up has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }

    fn state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the initiator for the duration of a refresh episode.
///
/// Dropping it without calling [`settle`](Self::settle) (panic, cancelled
/// future) still returns the coordinator to idle and fails the waiters.
pub struct RefreshEpisode<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshEpisode<'_> {
    pub fn settle(mut self, outcome: RefreshOutcome) {
        self.settled = true;
        self.coordinator.finish(outcome);
    }
}

impl Drop for RefreshEpisode<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Token refresh abandoned before completing");
            self.coordinator.finish(Err(RefreshError::Abandoned));
        }
    }
}

/// Wait on a queued request's ticket.
pub async fn wait(rx: oneshot::Receiver<RefreshOutcome>) -> RefreshOutcome {
    rx.await.unwrap_or(Err(RefreshError::Abandoned))
}
