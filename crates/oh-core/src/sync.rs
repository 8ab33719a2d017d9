//! Synchronization primitives for session workers
//!
//! Cooperative cancellation and manual-reset events shared between the
//! session manager and the rendering host's worker activities.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation token handed to each worker activity.
///
/// Workers observe cancellation between iterations; nothing is ever
/// interrupted mid-step. Clones share the same underlying flag.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

struct TokenInner {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: Mutex::new(false),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Request cancellation and wake every waiting worker.
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Sleep until `timeout` elapses or the token is cancelled.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            if self
                .inner
                .condvar
                .wait_until(&mut cancelled, deadline)
                .timed_out()
            {
                return *cancelled;
            }
        }
        true
    }

    /// Block until the token is cancelled.
    pub fn wait(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            self.inner.condvar.wait(&mut cancelled);
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Manual-reset event.
///
/// Once set, every current and future waiter passes until `reset` is
/// called. Used for the GPU-done completion signal, the
/// surface-availability wake-up, and the translation gate.
pub struct ResetEvent {
    state: Mutex<bool>,
    condvar: Condvar,
}

impl ResetEvent {
    pub fn new(set: bool) -> Self {
        Self {
            state: Mutex::new(set),
            condvar: Condvar::new(),
        }
    }

    pub fn set(&self) {
        let mut state = self.state.lock();
        *state = true;
        self.condvar.notify_all();
    }

    pub fn reset(&self) {
        *self.state.lock() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.state.lock()
    }

    /// Block until the event is set.
    pub fn wait(&self) {
        let mut state = self.state.lock();
        while !*state {
            self.condvar.wait(&mut state);
        }
    }

    /// Wait until the event is set or `timeout` elapses.
    ///
    /// Returns `true` if the event was observed set.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !*state {
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                return *state;
            }
        }
        true
    }
}
