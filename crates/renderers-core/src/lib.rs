#![doc = r"Runtime pieces shared by the Renderers adapter crates."]

pub mod collections;
pub mod platform;
pub mod runtime;

pub use platform::{BackgroundExecutor, BackgroundJob, DefaultScheduler, RuntimeScheduler};
pub use runtime::{ContinuationId, Runtime, RuntimeHandle, UiDispatcher};

/// Identifier of the container node a view holder is inflated under.
pub type NodeId = usize;
