//! Background blink task handle and its cancellation token.
//!
//! ```text
//!   blink_led ──spawn──▶ worker ──writes──▶ pin (under state lock)
//!       │                  ▲  │
//!       └── BlinkTask ─────┘  └── mark_finished (always, via guard)
//!            cancel() / wait_finished() / join()
//! ```
//!
//! Every token carries the generation it was created for. The controller
//! bumps its generation on every start and stop, and the worker compares
//! before each pin write, so a task that outlives its stop can no longer
//! touch the pin.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::warn;
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct Signal {
    cancelled: bool,
    finished: bool,
}

/// Shared cancel/finish flags for one blink generation.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: u64,
    shared: Arc<(Mutex<Signal>, Condvar)>,
}

impl CancelToken {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            shared: Arc::new((Mutex::new(Signal::default()), Condvar::new())),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.shared;
        lock.lock().cancelled = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.0.lock().cancelled
    }

    /// Sleep for up to `timeout`, waking early on cancel.
    /// Returns `true` if the token is cancelled.
    pub fn sleep(&self, timeout: Duration) -> bool {
        self.wait_for(timeout, |s| s.cancelled)
    }

    /// Called by the worker on exit (see [`FinishGuard`]).
    pub fn mark_finished(&self) {
        let (lock, cvar) = &*self.shared;
        lock.lock().finished = true;
        cvar.notify_all();
    }

    /// Wait up to `timeout` for the worker to finish.
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        self.wait_for(timeout, |s| s.finished)
    }

    fn wait_for(&self, timeout: Duration, done: impl Fn(&Signal) -> bool) -> bool {
        let (lock, cvar) = &*self.shared;
        let deadline = Instant::now() + timeout;
        let mut signal = lock.lock();
        while !done(&signal) {
            if cvar.wait_until(&mut signal, deadline).timed_out() {
                break;
            }
        }
        done(&signal)
    }
}

/// Marks the token finished when dropped, including on worker panic.
pub struct FinishGuard(pub CancelToken);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.mark_finished();
    }
}

/// The one live blink worker: its token plus join handle.
#[derive(Debug)]
pub struct BlinkTask {
    token: CancelToken,
    handle: JoinHandle<()>,
}

impl BlinkTask {
    pub fn new(token: CancelToken, handle: JoinHandle<()>) -> Self {
        Self { token, handle }
    }

    pub fn generation(&self) -> u64 {
        self.token.generation()
    }

    /// Cancel and join, waiting at most `bound` for the worker to notice.
    ///
    /// Returns `false` if the worker missed the bound and was detached.
    pub fn stop(self, bound: Duration) -> bool {
        self.token.cancel();
        if !self.token.wait_finished(bound) {
            warn!(
                "blink: worker gen {} did not stop within {:?}, detaching",
                self.token.generation(),
                bound
            );
            return false;
        }
        if self.handle.join().is_err() {
            warn!("blink: worker gen {} panicked", self.token.generation());
        }
        true
    }
}
