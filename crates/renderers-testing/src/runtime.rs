use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use renderers_core::{Runtime, RuntimeHandle, RuntimeScheduler};

/// Scheduler that counts drain requests instead of waking an event loop.
#[derive(Default)]
pub struct TestScheduler {
    requests: AtomicUsize,
}

impl TestScheduler {
    pub fn drain_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for TestScheduler {
    fn schedule_drain(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Runtime for tests, drained explicitly on the test thread.
pub struct TestRuntime {
    runtime: Runtime,
    scheduler: Arc<TestScheduler>,
}

impl TestRuntime {
    pub fn new() -> Self {
        let scheduler = Arc::new(TestScheduler::default());
        Self {
            runtime: Runtime::new(scheduler.clone()),
            scheduler,
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn scheduler(&self) -> &TestScheduler {
        &self.scheduler
    }

    /// Runs every queued UI task and delivered continuation.
    pub fn drain(&self) {
        self.runtime.drain_ui();
    }

    pub fn needs_drain(&self) -> bool {
        self.runtime.needs_drain()
    }
}

impl Default for TestRuntime {
    fn default() -> Self {
        Self::new()
    }
}
