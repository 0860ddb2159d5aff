use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use renderers_core::{BackgroundExecutor, BackgroundJob};

/// Executor that only runs jobs when the test says so.
///
/// Jobs can be completed in submission order or newest first, which lets a
/// test finish an older diff after a newer one.
#[derive(Default)]
pub struct ManualExecutor {
    jobs: Mutex<VecDeque<BackgroundJob>>,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Runs the oldest queued job. Returns `false` if none was queued.
    pub fn run_next(&self) -> bool {
        let job = self.lock().pop_front();
        Self::run(job)
    }

    /// Runs the newest queued job. Returns `false` if none was queued.
    pub fn run_last(&self) -> bool {
        let job = self.lock().pop_back();
        Self::run(job)
    }

    /// Runs queued jobs oldest first, including jobs queued while running.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    fn run(job: Option<BackgroundJob>) -> bool {
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<BackgroundJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BackgroundExecutor for ManualExecutor {
    fn execute(&self, job: BackgroundJob) {
        self.lock().push_back(job);
    }
}

/// Executor running each job on the submitting thread immediately.
///
/// Results still travel through the UI queue, so they apply on the next
/// drain rather than inside `submit_list`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl BackgroundExecutor for InlineExecutor {
    fn execute(&self, job: BackgroundJob) {
        job();
    }
}
