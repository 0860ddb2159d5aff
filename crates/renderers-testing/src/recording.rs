use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use renderers_foundation::{ListUpdate, ListUpdateCallback, Payload, Renderer};

/// Container stand-in that records every structural update.
#[derive(Default)]
pub struct RecordingUpdateCallback {
    updates: RefCell<Vec<ListUpdate>>,
}

impl RecordingUpdateCallback {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn updates(&self) -> Vec<ListUpdate> {
        self.updates.borrow().clone()
    }

    pub fn take(&self) -> Vec<ListUpdate> {
        std::mem::take(&mut *self.updates.borrow_mut())
    }
}

impl ListUpdateCallback for RecordingUpdateCallback {
    fn on_inserted(&self, position: usize, count: usize) {
        self.updates
            .borrow_mut()
            .push(ListUpdate::Inserted { position, count });
    }

    fn on_removed(&self, position: usize, count: usize) {
        self.updates
            .borrow_mut()
            .push(ListUpdate::Removed { position, count });
    }

    fn on_moved(&self, from: usize, to: usize) {
        self.updates
            .borrow_mut()
            .push(ListUpdate::Moved { from, to });
    }

    fn on_changed(&self, position: usize, count: usize, payload: Option<Payload>) {
        self.updates.borrow_mut().push(ListUpdate::Changed {
            position,
            count,
            payload,
        });
    }
}

/// What a [`RecordingRenderer`] went through.
#[derive(Clone, Debug, PartialEq)]
pub enum RendererEvent<T> {
    Rendered {
        label: &'static str,
        content: T,
        position: usize,
        payloads: usize,
    },
    Attached {
        label: &'static str,
    },
    Detached {
        label: &'static str,
    },
    Recycled {
        label: &'static str,
    },
}

/// Log shared by every renderer of a test.
pub type RendererLog<T> = Rc<RefCell<Vec<RendererEvent<T>>>>;

/// Renderer that appends its lifecycle to a shared [`RendererLog`].
pub struct RecordingRenderer<T> {
    label: &'static str,
    content: Option<T>,
    position: usize,
    /// Free-form value injected by an extra-values hook.
    pub extra: Option<String>,
    log: RendererLog<T>,
}

impl<T> RecordingRenderer<T> {
    pub fn new(label: &'static str, log: RendererLog<T>) -> Self {
        Self {
            label,
            content: None,
            position: 0,
            extra: None,
            log,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<T: Clone + 'static> Renderer<T> for RecordingRenderer<T> {
    fn set_content(&mut self, content: T) {
        self.content = Some(content);
    }

    fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    fn clear_content(&mut self) {
        self.content = None;
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    fn position(&self) -> usize {
        self.position
    }

    fn render(&mut self, payloads: &[Payload]) {
        let Some(content) = self.content.clone() else {
            log::warn!("{} rendered without content", self.label);
            return;
        };
        self.log.borrow_mut().push(RendererEvent::Rendered {
            label: self.label,
            content,
            position: self.position,
            payloads: payloads.len(),
        });
    }

    fn on_attached(&mut self) {
        self.log
            .borrow_mut()
            .push(RendererEvent::Attached { label: self.label });
    }

    fn on_detached(&mut self) {
        self.log
            .borrow_mut()
            .push(RendererEvent::Detached { label: self.label });
    }

    fn on_recycled(&mut self) {
        self.log
            .borrow_mut()
            .push(RendererEvent::Recycled { label: self.label });
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
