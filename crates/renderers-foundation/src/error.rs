use crate::renderer::ViewType;

/// Failures surfaced by the resolver, the view holders and the adapter.
///
/// Every variant except [`RendererError::IndexOutOfRange`] signals a wiring
/// bug between the registered renderers and the submitted content. None of
/// them are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererError {
    /// No registered binding accepts the content.
    UnresolvedContent { content_type: &'static str },
    /// The resolver could not build a view holder for `view_type`.
    HandleConstruction {
        view_type: ViewType,
        reason: &'static str,
    },
    /// The resolver returned no view holder.
    NullViewHolder { view_type: ViewType },
    /// A view holder reached bind or a lifecycle hook without a renderer.
    NullRenderer { view_type: ViewType },
    /// `index` is outside the current snapshot.
    IndexOutOfRange { index: usize, len: usize },
}

impl RendererError {
    /// Returns whether the error comes from resolver or holder configuration.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, RendererError::IndexOutOfRange { .. })
    }
}

impl std::fmt::Display for RendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererError::UnresolvedContent { content_type } => {
                write!(
                    f,
                    "no renderer registered for content of type {content_type}"
                )
            }
            RendererError::HandleConstruction { view_type, reason } => {
                write!(f, "cannot build view holder for {view_type}: {reason}")
            }
            RendererError::NullViewHolder { view_type } => {
                write!(f, "resolver returned no view holder for {view_type}")
            }
            RendererError::NullRenderer { view_type } => {
                write!(f, "view holder for {view_type} carries no renderer")
            }
            RendererError::IndexOutOfRange { index, len } => {
                write!(f, "position {index} out of range for list of {len} items")
            }
        }
    }
}

impl std::error::Error for RendererError {}
