use pipeline_sync::QueueError;
use thiserror::Error;

/// Errors returned by [`Stage`](crate::Stage) operations.
#[derive(Debug, Error)]
pub enum StageError {
    /// A method that requires `init` to have run first was called on a
    /// stage that is uninitialized (or has already been `finalize`d).
    #[error("stage {0:?} is not initialized")]
    NotInitialized(String),

    /// `init` was called twice without an intervening `finalize`.
    #[error("stage {0:?} is already initialized")]
    AlreadyInitialized(String),

    /// `init` was called with a non-positive queue capacity.
    #[error("invalid queue capacity: {0}")]
    InvalidCapacity(usize),

    /// The OS refused to spawn the stage's worker thread.
    #[error("stage {0:?} failed to spawn worker thread: {1}")]
    ThreadSpawnFailed(String, #[source] std::io::Error),

    /// `finalize` was called from inside the stage's own worker thread.
    #[error("stage {0:?} cannot finalize itself from its own worker thread")]
    FinalizeFromWorker(String),

    /// The stage's worker thread panicked instead of exiting cleanly.
    #[error("stage {0:?} worker thread panicked")]
    WorkerPanicked(String),

    /// The underlying queue rejected an operation.
    #[error("stage {0:?} queue error: {1}")]
    Queue(String, #[source] QueueError),
}
