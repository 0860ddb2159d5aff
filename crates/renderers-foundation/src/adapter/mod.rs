//! The renderer adapter a recycling container binds against.
//!
//! [`AsyncRendererAdapter`] combines a [`RendererResolver`] that picks a
//! renderer per item with an [`AsyncListDiffer`] that keeps the item list and
//! reports minimal structural updates to the attached container.

mod contract;
mod differ;

pub use contract::*;
pub use differ::*;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use renderers_core::{BackgroundExecutor, RuntimeHandle};

use crate::diff::{DifferConfig, ItemCallback, ListUpdateCallback};
use crate::error::RendererError;
use crate::renderer::{
    InflationContext, Payload, Renderer, RendererResolver, RendererViewHolder, ViewType,
};

/// Hook injecting values beyond content and position into a renderer.
///
/// Runs on every bind, after content and position are set and before
/// `render`. Receives the item, the renderer and the bound position.
pub type ExtraValues<T> = Box<dyn Fn(&T, &mut dyn Renderer<T>, usize)>;

/// Adapter dispatching each item to a renderer chosen at runtime, with list
/// updates computed off the UI thread.
pub struct AsyncRendererAdapter<T> {
    resolver: Box<dyn RendererResolver<T>>,
    differ: AsyncListDiffer<T>,
    extra_values: Option<ExtraValues<T>>,
}

impl<T> AsyncRendererAdapter<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        resolver: impl RendererResolver<T>,
        item_callback: impl ItemCallback<T>,
        runtime: RuntimeHandle,
        executor: Arc<dyn BackgroundExecutor>,
    ) -> Self {
        Self::with_config(
            resolver,
            item_callback,
            runtime,
            executor,
            DifferConfig::default(),
        )
    }

    pub fn with_config(
        resolver: impl RendererResolver<T>,
        item_callback: impl ItemCallback<T>,
        runtime: RuntimeHandle,
        executor: Arc<dyn BackgroundExecutor>,
        config: DifferConfig,
    ) -> Self {
        Self {
            resolver: Box::new(resolver),
            differ: AsyncListDiffer::new(runtime, executor, Arc::new(item_callback), config),
            extra_values: None,
        }
    }

    pub fn with_extra_values(
        mut self,
        hook: impl Fn(&T, &mut dyn Renderer<T>, usize) + 'static,
    ) -> Self {
        self.extra_values = Some(Box::new(hook));
        self
    }

    pub fn set_extra_values(&mut self, hook: Option<ExtraValues<T>>) {
        self.extra_values = hook;
    }

    /// Associates the adapter with the container receiving list updates.
    pub fn attach(&self, container: Rc<dyn ListUpdateCallback>) {
        self.differ.attach(container);
    }

    pub fn detach(&self) -> Option<Rc<dyn ListUpdateCallback>> {
        self.differ.detach()
    }

    pub fn submit_list(&self, list: impl Into<Snapshot<T>>) {
        self.differ.submit_list(list);
    }

    pub fn submit_list_with_commit(
        &self,
        list: impl Into<Snapshot<T>>,
        commit: impl FnOnce() + 'static,
    ) {
        self.differ.submit_list_with_commit(list, commit);
    }

    pub fn get_item(&self, position: usize) -> Result<T, RendererError> {
        self.differ.get_item(position)
    }

    pub fn current_list(&self) -> Snapshot<T> {
        self.differ.current_list()
    }

    pub fn differ(&self) -> &AsyncListDiffer<T> {
        &self.differ
    }

    pub fn resolver(&self) -> &dyn RendererResolver<T> {
        self.resolver.as_ref()
    }
}

impl<T> RecyclerAdapter<T> for AsyncRendererAdapter<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn item_count(&self) -> usize {
        self.differ.item_count()
    }

    fn item_view_type(&self, position: usize) -> Result<ViewType, RendererError> {
        let list = self.differ.current_list();
        let item = list.get(position).ok_or(RendererError::IndexOutOfRange {
            index: position,
            len: list.len(),
        })?;
        self.resolver.view_type(item)
    }

    fn create_view_holder(
        &self,
        context: &InflationContext,
        view_type: ViewType,
    ) -> Result<RendererViewHolder<T>, RendererError> {
        self.resolver
            .create_view_holder(view_type, context)?
            .ok_or(RendererError::NullViewHolder { view_type })
    }

    fn bind_view_holder(
        &self,
        holder: &mut RendererViewHolder<T>,
        position: usize,
        payloads: &[Payload],
    ) -> Result<(), RendererError> {
        let list = self.differ.current_list();
        let item = list.get(position).ok_or(RendererError::IndexOutOfRange {
            index: position,
            len: list.len(),
        })?;
        let renderer = holder.require_renderer()?;
        renderer.set_content(item.clone());
        renderer.set_position(position);
        if let Some(hook) = &self.extra_values {
            hook(item, &mut *renderer, position);
        }
        renderer.render(payloads);
        holder.set_bound_position(position);
        log::trace!(
            "bound position {position} into {} ({} payloads)",
            holder.view_type(),
            payloads.len()
        );
        Ok(())
    }

    fn on_view_attached(&self, holder: &mut RendererViewHolder<T>) -> Result<(), RendererError> {
        holder.on_attached()
    }

    fn on_view_detached(&self, holder: &mut RendererViewHolder<T>) -> Result<(), RendererError> {
        holder.on_detached()
    }

    fn on_view_recycled(&self, holder: &mut RendererViewHolder<T>) -> Result<(), RendererError> {
        holder.on_recycled()
    }
}

impl<T> fmt::Debug for AsyncRendererAdapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRendererAdapter")
            .field("differ", &self.differ)
            .field("extra_values", &self.extra_values.is_some())
            .finish()
    }
}
