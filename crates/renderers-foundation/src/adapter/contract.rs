//! Callback contract between a scrollable container and its adapter.
//!
//! This module defines the [`RecyclerAdapter`] trait which the container
//! drives to count, classify, create and bind the items it lays out.

use crate::error::RendererError;
use crate::renderer::{InflationContext, Payload, RendererViewHolder, ViewType};

/// Everything a recycling container needs from its data source.
///
/// All methods run on the UI thread. Positions refer to the last applied
/// snapshot, so they stay valid between structural update notifications.
pub trait RecyclerAdapter<T> {
    /// The number of items in the current snapshot.
    fn item_count(&self) -> usize;

    /// Returns the stable id for the item at the given position.
    ///
    /// If not overridden, defaults to the position itself.
    fn item_id(&self, position: usize) -> u64 {
        position as u64
    }

    /// Returns the view type for the item at `position`.
    ///
    /// Holders are only reused between positions of the same view type.
    fn item_view_type(&self, position: usize) -> Result<ViewType, RendererError>;

    /// Builds a new holder for `view_type`.
    fn create_view_holder(
        &self,
        context: &InflationContext,
        view_type: ViewType,
    ) -> Result<RendererViewHolder<T>, RendererError>;

    /// Binds the item at `position` into `holder`.
    ///
    /// An empty `payloads` slice asks for a full bind.
    fn bind_view_holder(
        &self,
        holder: &mut RendererViewHolder<T>,
        position: usize,
        payloads: &[Payload],
    ) -> Result<(), RendererError>;

    fn on_view_attached(&self, holder: &mut RendererViewHolder<T>) -> Result<(), RendererError>;

    fn on_view_detached(&self, holder: &mut RendererViewHolder<T>) -> Result<(), RendererError>;

    /// Called once the holder leaves the screen for the recycle pool.
    fn on_view_recycled(&self, holder: &mut RendererViewHolder<T>) -> Result<(), RendererError>;
}
