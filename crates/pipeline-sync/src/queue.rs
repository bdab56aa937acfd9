use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::QueueError;
use crate::invariants::{debug_assert_bounded_count, debug_assert_drained, debug_assert_finished_monotonic};
use crate::monitor::Monitor;

struct QueueState<T> {
    items: VecDeque<T>,
    finished: bool,
}

/// A FIFO, capacity-bounded, blocking producer/consumer queue with a
/// distinguished *finished* state.
///
/// Three [`Monitor`]s coordinate the three predicates a producer/consumer
/// pair needs: `not_full` (wakes blocked producers), `not_empty` (wakes
/// blocked consumers), and `drained` (wakes [`wait_finished`](Self::wait_finished)
/// callers). One [`Mutex`] protects `items` and `finished` together; the lock
/// order is always state-mutex before monitor-mutex, never the reverse, so a
/// waiter never holds the state lock while it blocks.
pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    not_full: Monitor,
    not_empty: Monitor,
    drained: Monitor,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero — callers that need to validate a
    /// user-supplied capacity before construction (e.g. the CLI) should do so
    /// themselves and report `InvalidCapacity` rather than relying on this.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "capacity must be at least 1");
        Self {
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                finished: false,
            }),
            not_full: Monitor::new(),
            not_empty: Monitor::new(),
            drained: Monitor::new(),
        }
    }

    /// The queue's fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `signal_finished` has been called.
    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocks while the queue is full; fails immediately if already finished.
    ///
    /// A `put` whose critical section begins before `finished` is observed
    /// true is allowed to complete normally even if `signal_finished` races
    /// in while it is blocked on a full queue — it keeps waiting for space,
    /// not for `finished` to flip, and succeeds once a consumer makes room.
    pub fn put(&self, item: T) -> Result<(), (QueueError, T)> {
        let mut guard = self.lock();
        if guard.finished {
            return Err((QueueError::AlreadyFinished, item));
        }

        // A `put` that reaches this point is allowed to complete even if
        // `signal_finished` races in while we wait below — we only bail out
        // on the `finished` check above, never inside this loop.
        while guard.items.len() >= self.capacity {
            self.not_full.reset();
            drop(guard);
            self.not_full.wait();
            guard = self.lock();
        }

        guard.items.push_back(item);
        let count = guard.items.len();
        drop(guard);

        debug_assert_bounded_count!(count, self.capacity);

        self.not_empty.signal();
        Ok(())
    }

    /// Blocks while empty and not finished; returns `None` iff the queue is
    /// both empty and finished.
    pub fn get(&self) -> Option<T> {
        let mut guard = self.lock();
        while guard.items.is_empty() && !guard.finished {
            self.not_empty.reset();
            drop(guard);
            self.not_empty.wait();
            guard = self.lock();
        }

        if guard.items.is_empty() && guard.finished {
            return None;
        }

        let item = guard.items.pop_front();
        let became_empty_after_finish = guard.items.is_empty() && guard.finished;
        drop(guard);

        self.not_full.signal();
        if became_empty_after_finish {
            self.drained.signal();
        }

        item
    }

    /// Idempotently transitions `finished` to true and wakes all consumers
    /// and `wait_finished` waiters so they can observe termination.
    pub fn signal_finished(&self) {
        let mut guard = self.lock();
        let was_finished = guard.finished;
        if was_finished {
            return;
        }
        guard.finished = true;
        debug_assert_finished_monotonic!(was_finished, guard.finished);
        drop(guard);

        // Wake wait_finished's phase-1 waiters and any consumers blocked on
        // empty; if we are already drained, the same signal also satisfies
        // wait_finished's phase-2 check once it re-acquires the lock.
        self.drained.signal();
        self.not_empty.signal();
    }

    /// Blocks until `finished && count == 0`.
    pub fn wait_finished(&self) {
        let mut guard = self.lock();

        if guard.finished && guard.items.is_empty() {
            debug_assert_drained!(guard.finished, guard.items.len());
            return;
        }

        // Phase 1: wait for `finished`.
        while !guard.finished {
            self.drained.reset();
            drop(guard);
            self.drained.wait();
            guard = self.lock();
        }

        // Phase 2: wait until drained.
        while !guard.items.is_empty() {
            self.drained.reset();
            drop(guard);
            self.drained.wait();
            guard = self.lock();
        }

        debug_assert_drained!(guard.finished, guard.items.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn fifo_single_producer() {
        let q = BoundedQueue::new(8);
        for i in 0..5 {
            q.put(i).unwrap();
        }
        for i in 0..5 {
            assert_eq!(q.get(), Some(i));
        }
    }

    #[test]
    fn bounded_blocks_producer() {
        let q = Arc::new(BoundedQueue::new(1));
        q.put(1).unwrap();

        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || {
            q2.put(2).unwrap();
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());

        assert_eq!(q.get(), Some(1));
        handle.join().unwrap();
        assert_eq!(q.get(), Some(2));
    }

    #[test]
    fn get_blocks_until_finished_returns_none() {
        let q = Arc::new(BoundedQueue::<i32>::new(4));
        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.get());

        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());

        q.signal_finished();
        assert_eq!(handle.join().unwrap(), None);
    }

    #[test]
    fn put_after_finished_rejected_and_item_returned() {
        let q = BoundedQueue::new(4);
        q.signal_finished();
        match q.put(42) {
            Err((QueueError::AlreadyFinished, item)) => assert_eq!(item, 42),
            Ok(()) => panic!("expected AlreadyFinished"),
        }
    }

    #[test]
    fn blocked_put_during_finish_completes_once_space_frees() {
        let q = Arc::new(BoundedQueue::new(1));
        q.put(1).unwrap();

        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.put(2));

        thread::sleep(Duration::from_millis(30));
        q.signal_finished(); // races the blocked put; must not reject it

        assert_eq!(q.get(), Some(1)); // frees space
        assert!(handle.join().unwrap().is_ok());
        assert_eq!(q.get(), Some(2));
    }

    #[test]
    fn wait_finished_returns_only_when_drained() {
        let q = Arc::new(BoundedQueue::new(4));
        q.put(1).unwrap();
        q.put(2).unwrap();
        q.signal_finished();

        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.wait_finished());

        thread::sleep(Duration::from_millis(30));
        assert!(!handle.is_finished());

        q.get();
        q.get();
        handle.join().unwrap();
    }

    #[test]
    fn signal_finished_is_idempotent() {
        let q = BoundedQueue::<i32>::new(4);
        q.signal_finished();
        q.signal_finished();
        assert!(q.is_finished());
    }

    #[test]
    fn at_most_once_consumption() {
        let q = Arc::new(BoundedQueue::new(64));
        for i in 0..64 {
            q.put(i).unwrap();
        }
        q.signal_finished();

        let mut handles = vec![];
        for _ in 0..4 {
            let q = Arc::clone(&q);
            handles.push(thread::spawn(move || {
                let mut got = vec![];
                while let Some(item) = q.get() {
                    got.push(item);
                }
                got
            }));
        }

        let mut all: Vec<i32> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..64).collect::<Vec<_>>());
    }
}
