use thiserror::Error;

/// Errors returned by [`BoundedQueue`](crate::BoundedQueue) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// `put` was called (or its critical section began) after
    /// `signal_finished` had already taken effect.
    ///
    /// The caller retains ownership of the item it tried to enqueue — unlike
    /// the C original, there is no separate "leak" failure mode to report,
    /// since the item is simply returned to the caller as part of the `Err`.
    #[error("queue is finished, no further items are accepted")]
    AlreadyFinished,
}
