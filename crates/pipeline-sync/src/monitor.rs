use std::sync::{Condvar, Mutex};

/// A sticky, broadcast, manually-resettable edge.
///
/// Distinct from a plain condition variable because the signaled state is
/// remembered until explicitly [`reset`](Monitor::reset) — a signal delivered
/// before any waiter arrives is observed by the first [`wait`](Monitor::wait)
/// instead of being lost.
///
/// [`BoundedQueue`](crate::BoundedQueue) keeps three of these (`not_full`,
/// `not_empty`, `drained`) to coordinate three independent predicates without
/// busy-waiting or timed waits.
#[derive(Debug, Default)]
pub struct Monitor {
    signaled: Mutex<bool>,
    condition: Condvar,
}

impl Monitor {
    /// Creates a monitor in the unsignaled state.
    pub fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            condition: Condvar::new(),
        }
    }

    /// Sets the flag and wakes every waiter.
    ///
    /// Calling `signal` on an already-signaled monitor is a no-op beyond
    /// re-broadcasting — it does not need to be idempotent-guarded by callers.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock().unwrap_or_else(|e| e.into_inner());
        *signaled = true;
        self.condition.notify_all();
    }

    /// Clears the flag without waking anyone.
    pub fn reset(&self) {
        let mut signaled = self.signaled.lock().unwrap_or_else(|e| e.into_inner());
        *signaled = false;
    }

    /// Blocks until the flag is observed true.
    ///
    /// On return the flag is left set; callers that want edge semantics for
    /// the next cycle must call [`reset`](Monitor::reset) themselves. This
    /// mirrors the "reset-then-wait" dance in `BoundedQueue`'s put/get loops.
    pub fn wait(&self) {
        let guard = self.signaled.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = self
            .condition
            .wait_while(guard, |signaled| !*signaled)
            .unwrap_or_else(|e| e.into_inner());
    }
}
