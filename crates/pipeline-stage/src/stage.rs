use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

use pipeline_sync::BoundedQueue;
use tracing::{debug, warn};

use crate::error::StageError;
use crate::transform::{is_sentinel, Transform};

/// The downstream hand-off capability: move an owned item directly into the
/// next stage's queue. Unlike the public [`Stage::place_work`] entry point
/// (which copies), this is a zero-copy move used only for stage-to-stage
/// forwarding inside the worker loop.
///
/// On failure the item is handed back so the caller can log it — it is then
/// simply dropped, which is what "free it" means once there is no longer a
/// raw pointer to double-free.
pub(crate) type PlaceWork = Arc<dyn Fn(String) -> Result<(), String> + Send + Sync>;

struct Links {
    downstream: Option<PlaceWork>,
    attached: bool,
}

struct Inner {
    queue: Arc<BoundedQueue<String>>,
    links: Arc<Mutex<Links>>,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
}

/// One stage of the pipeline: a bounded queue, a dedicated worker thread, and
/// the attach/place_work/finalize protocol that wires stages together and
/// tears them down.
///
/// A `Stage` cycles Uninitialized -> Running -> (attached) -> Draining ->
/// Finished -> Uninitialized, matching the state machine in the
/// specification. Unlike the C original's process-wide module globals, each
/// `Stage` is an ordinary owned value — the pipeline controller holds one
/// per loaded module instance.
pub struct Stage {
    name: String,
    transform: Arc<dyn Transform>,
    inner: Mutex<Option<Inner>>,
}

impl Stage {
    /// Creates an uninitialized stage wrapping `transform`.
    pub fn new(transform: Arc<dyn Transform>) -> Self {
        Self {
            name: transform.name().to_string(),
            transform,
            inner: Mutex::new(None),
        }
    }

    /// This stage's diagnostic name (the transform's name).
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Constructs the queue, spawns the worker, and transitions to Running.
    pub fn init(&self, capacity: usize) -> Result<(), StageError> {
        if capacity == 0 {
            return Err(StageError::InvalidCapacity(capacity));
        }

        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return Err(StageError::AlreadyInitialized(self.name.clone()));
        }

        let queue = Arc::new(BoundedQueue::new(capacity));
        let links = Arc::new(Mutex::new(Links {
            downstream: None,
            attached: false,
        }));

        let worker_queue = Arc::clone(&queue);
        let worker_links = Arc::clone(&links);
        let worker_transform = Arc::clone(&self.transform);
        let worker_name = self.name.clone();

        let handle = thread::Builder::new()
            .name(format!("stage-{}", worker_name))
            .spawn(move || worker_loop(worker_name, worker_queue, worker_transform, worker_links))
            .map_err(|e| StageError::ThreadSpawnFailed(self.name.clone(), e))?;
        let worker_id = handle.thread().id();

        *guard = Some(Inner {
            queue,
            links,
            worker: Some(handle),
            worker_id,
        });
        Ok(())
    }

    /// Wires this stage's downstream to `next` (`None` marks this stage as
    /// terminal). Double-attach is ignored with a warning, matching the
    /// original's lenient re-attach behavior, rather than treated as fatal.
    pub fn attach(&self, next: Option<&Stage>) -> Result<(), StageError> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = guard
            .as_ref()
            .ok_or_else(|| StageError::NotInitialized(self.name.clone()))?;

        let mut links = inner.links.lock().unwrap_or_else(|e| e.into_inner());
        if links.attached {
            warn!(stage = %self.name, "attach called more than once, ignoring");
            return Ok(());
        }

        let downstream = match next {
            Some(next_stage) => Some(next_stage.downstream_handle()?),
            None => None,
        };
        links.downstream = downstream;
        links.attached = true;
        Ok(())
    }

    /// Builds the zero-copy hand-off closure other stages use to forward
    /// items into this stage's queue.
    fn downstream_handle(&self) -> Result<PlaceWork, StageError> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = guard
            .as_ref()
            .ok_or_else(|| StageError::NotInitialized(self.name.clone()))?;
        let queue = Arc::clone(&inner.queue);
        Ok(Arc::new(move |item: String| {
            queue.put(item).map_err(|(_, item)| item)
        }))
    }

    /// Duplicates `item` into a fresh owned buffer and enqueues it.
    ///
    /// This is the copying entry point used by external callers (the
    /// pipeline controller feeding stage 0); stage-to-stage forwarding uses
    /// the zero-copy [`downstream_handle`](Self::downstream_handle) instead.
    pub fn place_work(&self, item: &str) -> Result<(), StageError> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let inner = guard
            .as_ref()
            .ok_or_else(|| StageError::NotInitialized(self.name.clone()))?;
        inner
            .queue
            .put(item.to_owned())
            .map_err(|(e, _)| StageError::Queue(self.name.clone(), e))
    }

    /// Blocks until this stage's queue is finished and drained.
    pub fn wait_finished(&self) -> Result<(), StageError> {
        let queue = {
            let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let inner = guard
                .as_ref()
                .ok_or_else(|| StageError::NotInitialized(self.name.clone()))?;
            Arc::clone(&inner.queue)
        };
        queue.wait_finished();
        Ok(())
    }

    /// Drains, joins the worker, releases the queue, and returns this stage
    /// to the Uninitialized state so it could be `init`ialized again.
    ///
    /// Refuses (rather than deadlocking) if called from the stage's own
    /// worker thread. A second call after a successful `finalize` returns
    /// `NotInitialized`.
    pub fn finalize(&self) -> Result<(), StageError> {
        let (queue, worker_id) = {
            let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let inner = guard
                .as_ref()
                .ok_or_else(|| StageError::NotInitialized(self.name.clone()))?;
            (Arc::clone(&inner.queue), inner.worker_id)
        };

        if thread::current().id() == worker_id {
            return Err(StageError::FinalizeFromWorker(self.name.clone()));
        }

        queue.wait_finished();

        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut inner = guard
            .take()
            .ok_or_else(|| StageError::NotInitialized(self.name.clone()))?;

        if let Some(handle) = inner.worker.take() {
            handle
                .join()
                .map_err(|_| StageError::WorkerPanicked(self.name.clone()))?;
        }

        debug!(stage = %self.name, "finalized");
        // `inner` (and its queue) drops here, releasing any residual items.
        Ok(())
    }
}

/// The worker loop: block on `get`, propagate the sentinel exactly once, or
/// transform and forward a payload, then repeat until the sentinel is seen.
fn worker_loop(
    name: String,
    queue: Arc<BoundedQueue<String>>,
    transform: Arc<dyn Transform>,
    links: Arc<Mutex<Links>>,
) {
    loop {
        let item = match queue.get() {
            Some(item) => item,
            None => return,
        };

        if is_sentinel(&item) {
            forward_or_drop(&name, &links, item);
            queue.signal_finished();
            debug!(stage = %name, "sentinel observed, stage draining");
            return;
        }

        match transform.apply(item) {
            None => {
                warn!(stage = %name, "transform rejected item");
            }
            Some(output) => {
                debug!(stage = %name, "item processed");
                forward_or_drop(&name, &links, output);
            }
        }
    }
}

/// Forwards `item` downstream if wired, otherwise drops it (the terminal
/// case — any side effect the transform wanted has already happened).
fn forward_or_drop(name: &str, links: &Mutex<Links>, item: String) {
    let downstream = {
        let links = links.lock().unwrap_or_else(|e| e.into_inner());
        links.downstream.clone()
    };
    if let Some(downstream) = downstream {
        if let Err(_rejected) = downstream(item) {
            warn!(stage = %name, "downstream forward failed, item dropped");
        }
    }
    // Terminal stage, or not yet attached: item drops here.
}
