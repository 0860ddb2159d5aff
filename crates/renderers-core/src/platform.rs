//! Platform abstraction traits for the adapter runtime.
//!
//! These traits let the host decide how the UI thread is woken up and where
//! background work runs, so the adapter never spawns threads or touches an
//! event loop directly.

/// A unit of work handed to a [`BackgroundExecutor`].
pub type BackgroundJob = Box<dyn FnOnce() + Send + 'static>;

/// Wakes the UI thread when work is queued for it.
///
/// Implementations must be safe to call from any thread: background jobs use
/// the scheduler to request a drain after posting their results.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host drain the runtime's UI queue soon.
    fn schedule_drain(&self);
}

/// Runs jobs off the UI thread.
///
/// Jobs must not assume any ordering relative to each other. Results travel
/// back to the UI thread through [`crate::UiDispatcher`].
pub trait BackgroundExecutor: Send + Sync {
    /// Runs `job` at some point in the future, on any thread.
    fn execute(&self, job: BackgroundJob);
}

/// Scheduler that never wakes anyone; the host polls [`crate::Runtime::needs_drain`].
#[derive(Debug, Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_drain(&self) {}
}
