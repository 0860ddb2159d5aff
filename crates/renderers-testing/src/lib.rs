//! Testing utilities and headless harness for the Renderers adapter

pub mod executor;
pub mod recording;
pub mod recycler;
pub mod runtime;

// Re-export testing utilities
pub use executor::*;
pub use recording::*;
pub use recycler::*;
pub use runtime::*;

pub mod prelude {
    pub use crate::executor::*;
    pub use crate::recording::*;
    pub use crate::recycler::*;
    pub use crate::runtime::*;
    pub use renderers_foundation::prelude::*;
}
