//! Loom-based concurrency tests for the put-vs-finish race.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores thread interleavings, so rather than pull in
//! the real `BoundedQueue` (which uses `std::sync::Condvar`, not loom's), we
//! model the single protocol that matters under interleaving: a producer
//! racing `signal_finished` against a blocked `put`. This keeps the state
//! space small enough for loom's exhaustive search to finish in reasonable
//! time, the same trade-off the core ring buffer's loom tests make.

#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use loom::sync::Arc;
use loom::thread;

/// A minimal model of `BoundedQueue<()>` with capacity 1: just enough state
/// to exercise the "put started before finish must still complete" rule.
struct LoomQueue {
    occupied: AtomicBool,
    finished: AtomicBool,
    consumed: AtomicUsize,
}

impl LoomQueue {
    fn new() -> Self {
        Self {
            occupied: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            consumed: AtomicUsize::new(0),
        }
    }

    /// Spin until the slot is free, then occupy it. Real code blocks on a
    /// condvar here; loom's scheduler explores both orderings regardless, so
    /// spinning is sufficient for the model.
    fn put(&self) {
        while self
            .occupied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            thread::yield_now();
        }
    }

    fn get(&self) -> bool {
        if self.occupied.swap(false, Ordering::AcqRel) {
            self.consumed.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    fn signal_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

#[test]
fn put_started_before_finish_is_not_lost() {
    loom::model(|| {
        let queue = Arc::new(LoomQueue::new());

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.put(); // may race signal_finished below
            })
        };

        let finisher = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.signal_finished();
            })
        };

        producer.join().unwrap();
        finisher.join().unwrap();

        // The consumer runs last and must observe exactly one item,
        // regardless of how put() and signal_finished() interleaved.
        assert!(queue.get());
    });
}
