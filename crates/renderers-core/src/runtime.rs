use crate::collections::map::HashMap;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::ThreadId;

use crate::platform::RuntimeScheduler;

/// Identifier of a registered UI continuation.
pub type ContinuationId = u64;

enum UiMessage {
    Task(Box<dyn FnOnce() + Send + 'static>),
    Invoke {
        id: ContinuationId,
        value: Box<dyn Any + Send>,
    },
}

type UiContinuation = Box<dyn FnOnce(Box<dyn Any>) + 'static>;
type UiContinuationMap = HashMap<ContinuationId, UiContinuation>;

struct UiDispatcherInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    tx: mpsc::Sender<UiMessage>,
    pending: AtomicUsize,
}

impl UiDispatcherInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>, tx: mpsc::Sender<UiMessage>) -> Self {
        Self {
            scheduler,
            tx,
            pending: AtomicUsize::new(0),
        }
    }

    fn send(&self, message: UiMessage) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(message).is_err() {
            // Receiver lives in the runtime; once it is gone nothing will drain.
            self.pending.fetch_sub(1, Ordering::SeqCst);
            log::warn!("UI message posted after the runtime was dropped");
            return;
        }
        self.scheduler.schedule_drain();
    }

    fn has_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }
}

struct PendingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> PendingGuard<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        Self { counter }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let previous = self.counter.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "UI dispatcher pending count underflowed");
    }
}

/// Thread-safe sender half of the runtime's UI queue.
///
/// Background jobs hold a clone of the dispatcher and use it to hand results
/// back to the UI thread. Messages are delivered in the order they were posted.
#[derive(Clone)]
pub struct UiDispatcher {
    inner: Arc<UiDispatcherInner>,
}

impl UiDispatcher {
    fn new(inner: Arc<UiDispatcherInner>) -> Self {
        Self { inner }
    }

    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        self.inner.send(UiMessage::Task(Box::new(task)));
    }

    /// Delivers `value` to the continuation registered under `id`; dropped if
    /// it was cancelled meanwhile.
    pub fn post_invoke<T>(&self, id: ContinuationId, value: T)
    where
        T: Send + 'static,
    {
        self.inner.send(UiMessage::Invoke {
            id,
            value: Box::new(value),
        });
    }

    pub fn has_pending(&self) -> bool {
        self.inner.has_pending()
    }
}

impl fmt::Debug for UiDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiDispatcher")
            .field("pending", &self.inner.pending.load(Ordering::SeqCst))
            .finish()
    }
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_drain: Cell<bool>,
    ui_dispatcher: Arc<UiDispatcherInner>,
    ui_rx: RefCell<mpsc::Receiver<UiMessage>>,
    local_tasks: RefCell<VecDeque<Box<dyn FnOnce() + 'static>>>,
    ui_conts: RefCell<UiContinuationMap>,
    next_cont_id: Cell<ContinuationId>,
    ui_thread_id: ThreadId,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let (tx, rx) = mpsc::channel();
        let dispatcher = Arc::new(UiDispatcherInner::new(scheduler.clone(), tx));
        Self {
            scheduler,
            needs_drain: Cell::new(false),
            ui_dispatcher: dispatcher,
            ui_rx: RefCell::new(rx),
            local_tasks: RefCell::new(VecDeque::new()),
            ui_conts: RefCell::new(UiContinuationMap::default()),
            next_cont_id: Cell::new(1),
            ui_thread_id: std::thread::current().id(),
        }
    }

    fn schedule(&self) {
        self.needs_drain.set(true);
        self.scheduler.schedule_drain();
    }

    fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        self.local_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn drain_ui(&self) {
        loop {
            let mut executed = false;

            // Messages are pulled one at a time so that a task may post more
            // work (or register continuations) while it runs.
            loop {
                let message = self.ui_rx.borrow_mut().try_recv();
                let Ok(message) = message else {
                    break;
                };
                executed = true;
                let _guard = PendingGuard::new(&self.ui_dispatcher.pending);
                match message {
                    UiMessage::Task(task) => task(),
                    UiMessage::Invoke { id, value } => self.invoke_ui_cont(id, value),
                }
            }

            loop {
                let task = self.local_tasks.borrow_mut().pop_front();
                match task {
                    Some(task) => {
                        executed = true;
                        task();
                    }
                    None => break,
                }
            }

            if !executed {
                break;
            }
        }
        if !self.has_pending_ui() {
            self.needs_drain.set(false);
        }
    }

    fn has_pending_ui(&self) -> bool {
        let local_pending = self
            .local_tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        local_pending || self.ui_dispatcher.has_pending()
    }

    fn register_ui_cont<T: 'static>(&self, f: impl FnOnce(T) + 'static) -> ContinuationId {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "UI continuation registered off the runtime thread",
        );
        let id = self.next_cont_id.get();
        self.next_cont_id.set(id + 1);
        self.ui_conts.borrow_mut().insert(
            id,
            Box::new(move |value: Box<dyn Any>| match value.downcast::<T>() {
                Ok(value) => f(*value),
                Err(_) => log::error!(
                    "UI continuation {id} expected a {}",
                    std::any::type_name::<T>()
                ),
            }),
        );
        id
    }

    fn invoke_ui_cont(&self, id: ContinuationId, value: Box<dyn Any + Send>) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "UI continuation invoked off the runtime thread",
        );
        let callback = self.ui_conts.borrow_mut().remove(&id);
        match callback {
            Some(callback) => {
                let value: Box<dyn Any> = value;
                callback(value);
            }
            None => log::trace!("dropping value for cancelled UI continuation {id}"),
        }
    }

    fn cancel_ui_cont(&self, id: ContinuationId) -> bool {
        self.ui_conts.borrow_mut().remove(&id).is_some()
    }

    fn pending_continuations(&self) -> usize {
        self.ui_conts.borrow().len()
    }
}

/// Owner of the UI-thread side of the adapter runtime.
///
/// The runtime is single-threaded: create it on the thread that drives the
/// container and call [`Runtime::drain_ui`] whenever the scheduler asks for it.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
            dispatcher: UiDispatcher::new(self.inner.ui_dispatcher.clone()),
            ui_thread_id: self.inner.ui_thread_id,
        }
    }

    pub fn needs_drain(&self) -> bool {
        self.inner.needs_drain.get() || self.inner.ui_dispatcher.has_pending()
    }

    pub fn drain_ui(&self) {
        self.inner.drain_ui();
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("needs_drain", &self.needs_drain())
            .field("continuations", &self.inner.pending_continuations())
            .finish()
    }
}

/// Weak, cloneable handle to a [`Runtime`].
///
/// The handle itself is not `Send`; hand [`RuntimeHandle::dispatcher`] to
/// background work instead.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
    dispatcher: UiDispatcher,
    ui_thread_id: ThreadId,
}

impl RuntimeHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Schedules work on the runtime thread, or runs it now if the runtime is gone.
    pub fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.enqueue_ui_task(task);
        } else {
            task();
        }
    }

    pub fn post_ui(&self, task: impl FnOnce() + Send + 'static) {
        self.dispatcher.post(task);
    }

    /// Registers a continuation resumed through [`UiDispatcher::post_invoke`].
    pub fn register_ui_cont<T: 'static>(
        &self,
        f: impl FnOnce(T) + 'static,
    ) -> Option<ContinuationId> {
        self.inner.upgrade().map(|inner| inner.register_ui_cont(f))
    }

    /// Forgets a continuation; a value posted for it later is discarded.
    pub fn cancel_ui_cont(&self, id: ContinuationId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.cancel_ui_cont(id))
            .unwrap_or(false)
    }

    pub fn drain_ui(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_pending_ui(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_ui())
            .unwrap_or_else(|| self.dispatcher.has_pending())
    }

    pub fn assert_ui_thread(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "adapter touched off the runtime's UI thread"
        );
    }

    pub fn dispatcher(&self) -> UiDispatcher {
        self.dispatcher.clone()
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("alive", &self.is_alive())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
