//! Cooperative shutdown signal.
//!
//! A [`Shutdown`] handle is cloned into whatever can request a stop (the
//! Ctrl-C handler thread, a test fake) and into the sampling loop.  The
//! loop checks it at every iteration boundary and sleeps on it between
//! iterations, so a trigger wakes the loop immediately instead of after
//! the full poll interval.
//!
//! ```text
//! ┌──────────────┐  trigger()  ┌──────────┐  wait_timeout()  ┌──────────────┐
//! │ Ctrl-C / TERM│────────────▶│ Shutdown │◀─────────────────│ SamplingLoop │
//! └──────────────┘             └──────────┘                  └──────────────┘
//! ```

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Inner {
    requested: Mutex<bool>,
    wake: Condvar,
}

/// Cloneable, thread-safe cancellation signal.  Once triggered it stays
/// triggered.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown and wake any waiter.
    pub fn trigger(&self) {
        let mut requested = self
            .inner
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *requested = true;
        self.inner.wake.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self
            .inner
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for at most `timeout`.  Returns `true` as soon as shutdown has
    /// been requested, `false` if the timeout elapsed first.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut requested = self
            .inner
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Loop to absorb spurious wakeups.
        while !*requested {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            requested = self
                .inner
                .wake
                .wait_timeout(requested, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

impl core::fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Shutdown")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
