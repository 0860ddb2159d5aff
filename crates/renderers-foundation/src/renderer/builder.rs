//! Runtime selection of renderers from content.
//!
//! [`RendererBuilder`] keeps an ordered list of `(predicate, factory)`
//! bindings. Classification walks the list and picks the first predicate that
//! accepts the content, so more specific predicates must be registered before
//! broad fallbacks. The index of the winning binding is the [`ViewType`].

use std::fmt;

use super::{InflationContext, Renderer, RendererViewHolder, ViewType};
use crate::error::RendererError;

/// Classifies content and manufactures view holders.
///
/// `view_type` must be deterministic and free of side effects: the container
/// may call it many times for the same position within one list version.
pub trait RendererResolver<T>: 'static {
    fn view_type(&self, content: &T) -> Result<ViewType, RendererError>;

    /// Builds a fresh holder around a new renderer for `view_type`.
    ///
    /// `Ok(None)` means the resolver produced nothing; the adapter reports it
    /// as [`RendererError::NullViewHolder`].
    fn create_view_holder(
        &self,
        view_type: ViewType,
        context: &InflationContext,
    ) -> Result<Option<RendererViewHolder<T>>, RendererError>;
}

type Predicate<T> = Box<dyn Fn(&T) -> bool>;
type Factory<T> = Box<dyn Fn(&InflationContext) -> Option<Box<dyn Renderer<T>>>>;

struct Binding<T> {
    label: &'static str,
    predicate: Predicate<T>,
    factory: Factory<T>,
}

/// Ordered registry of renderer bindings; first match wins.
///
/// # Example
///
/// ```rust,ignore
/// let builder = RendererBuilder::new()
///     .bind(|item: &Item| item.is_header(), |_| HeaderRenderer::default())
///     .bind(|_| true, |_| RowRenderer::default());
/// ```
pub struct RendererBuilder<T> {
    bindings: Vec<Binding<T>>,
}

impl<T: 'static> RendererBuilder<T> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Registers a renderer for content accepted by `predicate`.
    pub fn bind<R, P, F>(mut self, predicate: P, factory: F) -> Self
    where
        R: Renderer<T>,
        P: Fn(&T) -> bool + 'static,
        F: Fn(&InflationContext) -> R + 'static,
    {
        self.bindings.push(Binding {
            label: std::any::type_name::<R>(),
            predicate: Box::new(predicate),
            factory: Box::new(move |context| Some(Box::new(factory(context)))),
        });
        self
    }

    /// Registers a factory that may fail to produce a renderer.
    ///
    /// A factory returning `None` makes holder creation fail with
    /// [`RendererError::HandleConstruction`].
    pub fn bind_fallible<P, F>(mut self, label: &'static str, predicate: P, factory: F) -> Self
    where
        P: Fn(&T) -> bool + 'static,
        F: Fn(&InflationContext) -> Option<Box<dyn Renderer<T>>> + 'static,
    {
        self.bindings.push(Binding {
            label,
            predicate: Box::new(predicate),
            factory: Box::new(factory),
        });
        self
    }

    /// Registers a renderer for any content not matched by earlier bindings.
    pub fn fallback<R, F>(self, factory: F) -> Self
    where
        R: Renderer<T>,
        F: Fn(&InflationContext) -> R + 'static,
    {
        self.bind(|_| true, factory)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Name of the renderer registered under `view_type`.
    pub fn label(&self, view_type: ViewType) -> Option<&'static str> {
        self.bindings
            .get(view_type.raw())
            .map(|binding| binding.label)
    }
}

impl<T: 'static> Default for RendererBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> RendererResolver<T> for RendererBuilder<T> {
    fn view_type(&self, content: &T) -> Result<ViewType, RendererError> {
        self.bindings
            .iter()
            .position(|binding| (binding.predicate)(content))
            .map(ViewType)
            .ok_or(RendererError::UnresolvedContent {
                content_type: std::any::type_name::<T>(),
            })
    }

    fn create_view_holder(
        &self,
        view_type: ViewType,
        context: &InflationContext,
    ) -> Result<Option<RendererViewHolder<T>>, RendererError> {
        let binding =
            self.bindings
                .get(view_type.raw())
                .ok_or(RendererError::HandleConstruction {
                    view_type,
                    reason: "no renderer registered under this view type",
                })?;
        let renderer = (binding.factory)(context).ok_or(RendererError::HandleConstruction {
            view_type,
            reason: "renderer factory returned nothing",
        })?;
        log::trace!(
            "inflated {} for {view_type} under node {}",
            binding.label,
            context.parent
        );
        Ok(Some(RendererViewHolder::new(view_type, renderer)))
    }
}

impl<T> fmt::Debug for RendererBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|binding| binding.label))
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod tests;
