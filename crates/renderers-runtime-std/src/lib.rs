//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform traits
//! defined in `renderers-core`: a scheduler that hosts can block on, and a
//! small worker pool that runs diff jobs off the UI thread. [`StdRuntime`]
//! bundles both with a [`renderers_core::Runtime`].

use std::fmt;
use std::sync::{mpsc, Arc, Condvar, Mutex, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use renderers_core::{BackgroundExecutor, BackgroundJob, Runtime, RuntimeHandle, RuntimeScheduler};

/// Upper bound for the default worker count.
pub const DEFAULT_MAX_WORKERS: usize = 4;

type DrainWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records drain requests and optionally wakes an event loop.
pub struct StdScheduler {
    drain_requested: Mutex<bool>,
    requested: Condvar,
    drain_waker: RwLock<Option<DrainWaker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            drain_requested: Mutex::new(false),
            requested: Condvar::new(),
            drain_waker: RwLock::new(None),
        }
    }

    /// Returns whether a drain has been requested since the last call.
    pub fn take_drain_request(&self) -> bool {
        let mut requested = self
            .drain_requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *requested, false)
    }

    /// Blocks until a drain is requested or `timeout` elapses.
    ///
    /// Consumes the request and returns `true` if one arrived.
    pub fn wait_for_drain_request(&self, timeout: Duration) -> bool {
        let requested = self
            .drain_requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (mut requested, _) = self
            .requested
            .wait_timeout_while(requested, timeout, |requested| !*requested)
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *requested, false)
    }

    /// Registers a waker that will be invoked whenever a drain is scheduled.
    pub fn set_drain_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .drain_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    /// Clears any registered drain waker.
    pub fn clear_drain_waker(&self) {
        *self
            .drain_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn wake(&self) {
        let waker = self
            .drain_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requested = *self
            .drain_requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("StdScheduler")
            .field("drain_requested", &requested)
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_drain(&self) {
        *self
            .drain_requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
        self.requested.notify_all();
        self.wake();
    }
}

/// Fixed-size pool of worker threads fed through a shared job queue.
///
/// Dropping the executor closes the queue and joins the workers after they
/// finish the jobs already queued.
pub struct StdExecutor {
    sender: Mutex<Option<mpsc::Sender<BackgroundJob>>>,
    workers: Vec<JoinHandle<()>>,
}

impl StdExecutor {
    /// Spawns `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (sender, receiver) = mpsc::channel::<BackgroundJob>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..worker_count)
            .filter_map(|index| {
                let receiver = Arc::clone(&receiver);
                std::thread::Builder::new()
                    .name(format!("renderers-worker-{index}"))
                    .spawn(move || worker_loop(&receiver))
                    .map_err(|err| log::error!("failed to spawn diff worker {index}: {err}"))
                    .ok()
            })
            .collect::<Vec<_>>();
        log::debug!("started {} diff worker(s)", workers.len());
        Self {
            sender: Mutex::new(Some(sender)),
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(receiver: &Mutex<mpsc::Receiver<BackgroundJob>>) {
    loop {
        let job = receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv();
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

impl Default for StdExecutor {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1);
        Self::new(available.min(DEFAULT_MAX_WORKERS))
    }
}

impl BackgroundExecutor for StdExecutor {
    fn execute(&self, job: BackgroundJob) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let job = match sender.as_ref() {
            Some(sender) => match sender.send(job) {
                Ok(()) => return,
                Err(mpsc::SendError(job)) => job,
            },
            None => job,
        };
        drop(sender);
        // No live worker to take it: run inline so the result still arrives.
        log::warn!("diff executor has no workers; running job inline");
        job();
    }
}

impl Drop for StdExecutor {
    fn drop(&mut self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("diff worker panicked");
            }
        }
    }
}

impl fmt::Debug for StdExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdExecutor")
            .field("workers", &self.workers.len())
            .finish()
    }
}

/// Convenience container bundling the standard scheduler, executor and runtime.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    executor: Arc<StdExecutor>,
    runtime: Runtime,
}

impl StdRuntime {
    /// Creates a runtime with a default-sized worker pool.
    pub fn new() -> Self {
        Self::with_executor(StdExecutor::default())
    }

    pub fn with_executor(executor: StdExecutor) -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self {
            scheduler,
            executor: Arc::new(executor),
            runtime,
        }
    }

    /// Returns the [`renderers_core::Runtime`] driven by the standard scheduler.
    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn executor(&self) -> Arc<StdExecutor> {
        Arc::clone(&self.executor)
    }

    /// Returns whether a drain was requested since the last poll.
    pub fn take_drain_request(&self) -> bool {
        self.scheduler.take_drain_request()
    }

    /// Waits up to `timeout` for a drain request and drains if one arrived.
    ///
    /// Returns whether UI work was drained.
    pub fn pump(&self, timeout: Duration) -> bool {
        if self.scheduler.wait_for_drain_request(timeout) || self.runtime.needs_drain() {
            self.runtime.drain_ui();
            return true;
        }
        false
    }

    pub fn set_drain_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_drain_waker(waker);
    }

    pub fn clear_drain_waker(&self) {
        self.scheduler.clear_drain_waker();
    }

    pub fn drain_ui(&self) {
        self.runtime.drain_ui();
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("executor", &self.executor)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/std_runtime_tests.rs"]
mod tests;
