//! Renderers and the view holders that own them.
//!
//! A [`Renderer`] paints one shape of content. The container never talks to a
//! renderer directly: it keeps [`RendererViewHolder`]s, each wrapping exactly
//! one renderer for its whole recycling lifetime, and hands them back to the
//! adapter for binding and lifecycle notifications.

mod arena;
mod builder;
mod pool;

pub use arena::*;
pub use builder::*;
pub use pool::*;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use renderers_core::NodeId;

use crate::error::RendererError;

/// Hint describing which fields of an item changed.
///
/// An empty payload slice at bind time means a full render.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Stable identifier of a renderer binding.
///
/// This is the registration index inside a [`RendererBuilder`], so it stays
/// the same for a given renderer for as long as the builder lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewType(pub usize);

impl ViewType {
    #[inline]
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view type {}", self.0)
    }
}

/// Where a new view holder is being inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InflationContext {
    /// Container node the holder's view will be attached under.
    pub parent: NodeId,
}

impl InflationContext {
    pub fn new(parent: NodeId) -> Self {
        Self { parent }
    }
}

/// Paints one shape of content.
///
/// Content and position are overwritten on every bind; the lifecycle hooks are
/// called by the container through the adapter. `render` receives the payloads
/// of a partial bind, or an empty slice for a full one.
pub trait Renderer<T>: 'static {
    fn set_content(&mut self, content: T);

    fn content(&self) -> Option<&T>;

    /// Drops the current content so a recycled renderer holds nothing stale.
    fn clear_content(&mut self);

    fn set_position(&mut self, position: usize);

    fn position(&self) -> usize;

    fn render(&mut self, payloads: &[Payload]);

    fn on_attached(&mut self) {}

    fn on_detached(&mut self) {}

    fn on_recycled(&mut self) {}

    /// Exposes the concrete renderer for hooks that inject extra values.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Reusable container owning one renderer.
///
/// The renderer is never swapped. Only placeholders built with
/// [`RendererViewHolder::placeholder`], or holders torn down with
/// [`RendererViewHolder::take_renderer`], are without one.
pub struct RendererViewHolder<T> {
    view_type: ViewType,
    renderer: Option<Box<dyn Renderer<T>>>,
    bound_position: Option<usize>,
}

impl<T: 'static> RendererViewHolder<T> {
    pub fn new(view_type: ViewType, renderer: Box<dyn Renderer<T>>) -> Self {
        Self {
            view_type,
            renderer: Some(renderer),
            bound_position: None,
        }
    }

    /// A holder reserved for `view_type` before any renderer exists.
    pub fn placeholder(view_type: ViewType) -> Self {
        Self {
            view_type,
            renderer: None,
            bound_position: None,
        }
    }

    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn renderer(&self) -> Option<&dyn Renderer<T>> {
        self.renderer.as_deref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut dyn Renderer<T>> {
        self.renderer.as_deref_mut()
    }

    /// Downcasts the wrapped renderer to its concrete type.
    pub fn renderer_as_mut<R: Renderer<T>>(&mut self) -> Option<&mut R> {
        self.renderer_mut()?.as_any_mut().downcast_mut::<R>()
    }

    /// Removes the renderer, leaving the holder unusable for binding.
    pub fn take_renderer(&mut self) -> Option<Box<dyn Renderer<T>>> {
        self.bound_position = None;
        self.renderer.take()
    }

    /// Position of the last bind, cleared when the holder is recycled.
    pub fn bound_position(&self) -> Option<usize> {
        self.bound_position
    }

    pub(crate) fn set_bound_position(&mut self, position: usize) {
        self.bound_position = Some(position);
    }

    pub fn on_attached(&mut self) -> Result<(), RendererError> {
        self.require_renderer()?.on_attached();
        Ok(())
    }

    pub fn on_detached(&mut self) -> Result<(), RendererError> {
        self.require_renderer()?.on_detached();
        Ok(())
    }

    /// Forwards the recycle notification, then drops the bound content.
    pub fn on_recycled(&mut self) -> Result<(), RendererError> {
        let renderer = self.require_renderer()?;
        renderer.on_recycled();
        renderer.clear_content();
        self.bound_position = None;
        Ok(())
    }

    pub(crate) fn require_renderer(&mut self) -> Result<&mut dyn Renderer<T>, RendererError> {
        let view_type = self.view_type;
        self.renderer_mut()
            .ok_or(RendererError::NullRenderer { view_type })
    }
}

impl<T> fmt::Debug for RendererViewHolder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererViewHolder")
            .field("view_type", &self.view_type)
            .field("has_renderer", &self.renderer.is_some())
            .field("bound_position", &self.bound_position)
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/view_holder_tests.rs"]
mod tests;
