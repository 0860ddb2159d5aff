//! Hash map aliases used across the workspace.
//!
//! `rustc-hash` is the default; the `std-hash` feature swaps in the standard
//! library's SipHash maps for hosts that key on untrusted data.

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}
