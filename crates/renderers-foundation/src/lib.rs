//! Foundation of the Renderers adapter: renderers and view holders, runtime
//! renderer selection, list diffing and the async renderer adapter.

pub mod adapter;
pub mod diff;
pub mod error;
pub mod renderer;

// Re-export commonly used items
pub use adapter::{
    AsyncListDiffer, AsyncRendererAdapter, ExtraValues, ListenerId, RecyclerAdapter, Snapshot,
};
pub use diff::{
    calculate_diff, DiffResult, DifferConfig, FnItemCallback, ItemCallback, KeyedItemCallback,
    ListUpdate, ListUpdateCallback,
};
pub use error::RendererError;
pub use renderer::{
    InflationContext, Payload, PoolStats, RecyclePolicy, RecycledViewPool, Renderer,
    RendererBuilder, RendererResolver, RendererViewHolder, SlotId, ViewHolderArena, ViewType,
    DEFAULT_MAX_RECYCLED_PER_TYPE,
};

pub mod prelude {
    pub use crate::adapter::{AsyncRendererAdapter, RecyclerAdapter, Snapshot};
    pub use crate::diff::{
        DifferConfig, FnItemCallback, ItemCallback, KeyedItemCallback, ListUpdateCallback,
    };
    pub use crate::error::RendererError;
    pub use crate::renderer::{
        InflationContext, Payload, Renderer, RendererBuilder, RendererResolver,
        RendererViewHolder, ViewType,
    };
}
