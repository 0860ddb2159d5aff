//! Background list diffing with UI-thread application.
//!
//! [`AsyncListDiffer`] owns the current [`Snapshot`]. Each submission either
//! latches synchronously (first list, cleared list, same snapshot) or becomes
//! one job on the background executor. The job posts its [`DiffResult`] back
//! through the runtime's UI queue, where it is applied only if no newer list
//! was submitted in the meantime.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use renderers_core::{BackgroundExecutor, ContinuationId, RuntimeHandle};
use web_time::Instant;

use crate::diff::{calculate_diff, DiffResult, DifferConfig, ItemCallback, ListUpdateCallback};
use crate::error::RendererError;

/// Immutable list version. Replaced wholesale whenever a diff is applied.
pub type Snapshot<T> = Arc<[T]>;

/// Identifier returned by [`AsyncListDiffer::add_list_listener`].
pub type ListenerId = u64;

type ListListener<T> = Rc<dyn Fn(&Snapshot<T>, &Snapshot<T>)>;

struct PendingDiff {
    generation: u64,
    continuation: ContinuationId,
    superseded: Arc<AtomicBool>,
}

impl PendingDiff {
    fn cancel(self, runtime: &RuntimeHandle) {
        self.superseded.store(true, Ordering::Release);
        if runtime.cancel_ui_cont(self.continuation) {
            log::trace!("superseded diff generation {}", self.generation);
        }
    }
}

struct DifferState<T> {
    current: Snapshot<T>,
    max_scheduled_generation: u64,
    pending: Option<PendingDiff>,
}

struct DiffOutcome<T> {
    list: Snapshot<T>,
    result: DiffResult,
}

struct DifferInner<T> {
    runtime: RuntimeHandle,
    executor: Arc<dyn BackgroundExecutor>,
    item_callback: Arc<dyn ItemCallback<T>>,
    config: DifferConfig,
    state: RefCell<DifferState<T>>,
    update_callback: RefCell<Option<Rc<dyn ListUpdateCallback>>>,
    listeners: RefCell<Vec<(ListenerId, ListListener<T>)>>,
    next_listener_id: Cell<ListenerId>,
}

/// Computes list diffs off the UI thread and applies the latest one.
///
/// Only the most recent submission can ever be applied. Earlier diffs still in
/// flight are cancelled: their jobs skip the computation if they have not
/// started, and any result they post is dropped unseen.
pub struct AsyncListDiffer<T> {
    inner: Rc<DifferInner<T>>,
}

impl<T> AsyncListDiffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(
        runtime: RuntimeHandle,
        executor: Arc<dyn BackgroundExecutor>,
        item_callback: Arc<dyn ItemCallback<T>>,
        config: DifferConfig,
    ) -> Self {
        Self {
            inner: Rc::new(DifferInner {
                runtime,
                executor,
                item_callback,
                config,
                state: RefCell::new(DifferState {
                    current: Arc::from(Vec::new()),
                    max_scheduled_generation: 0,
                    pending: None,
                }),
                update_callback: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(1),
            }),
        }
    }

    /// Routes structural updates to `container`, replacing any previous one.
    pub fn attach(&self, container: Rc<dyn ListUpdateCallback>) {
        let previous = self.inner.update_callback.replace(Some(container));
        if previous.is_some() {
            log::debug!("differ re-attached to a new container");
        }
    }

    pub fn detach(&self) -> Option<Rc<dyn ListUpdateCallback>> {
        self.inner.update_callback.take()
    }

    pub fn submit_list(&self, list: impl Into<Snapshot<T>>) {
        self.inner.submit(list.into(), None);
    }

    /// Like [`AsyncListDiffer::submit_list`], running `commit` once the list
    /// is the current one. A superseded submission never runs its callback.
    pub fn submit_list_with_commit(
        &self,
        list: impl Into<Snapshot<T>>,
        commit: impl FnOnce() + 'static,
    ) {
        self.inner.submit(list.into(), Some(Box::new(commit)));
    }

    pub fn current_list(&self) -> Snapshot<T> {
        Arc::clone(&self.inner.state.borrow().current)
    }

    pub fn item_count(&self) -> usize {
        self.inner.state.borrow().current.len()
    }

    pub fn get_item(&self, position: usize) -> Result<T, RendererError> {
        let state = self.inner.state.borrow();
        state
            .current
            .get(position)
            .cloned()
            .ok_or(RendererError::IndexOutOfRange {
                index: position,
                len: state.current.len(),
            })
    }

    /// Whether a submitted list is still waiting for its diff.
    pub fn has_pending_diff(&self) -> bool {
        self.inner.state.borrow().pending.is_some()
    }

    pub fn config(&self) -> &DifferConfig {
        &self.inner.config
    }

    /// Calls `listener(previous, current)` after every applied list change.
    pub fn add_list_listener(
        &self,
        listener: impl Fn(&Snapshot<T>, &Snapshot<T>) + 'static,
    ) -> ListenerId {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn remove_list_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(candidate, _)| *candidate != id);
        listeners.len() != before
    }
}

type Commit = Box<dyn FnOnce()>;

impl<T> DifferInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn submit(self: &Rc<Self>, list: Snapshot<T>, commit: Option<Commit>) {
        self.runtime.assert_ui_thread();
        let (generation, previous) = {
            let mut state = self.state.borrow_mut();
            state.max_scheduled_generation += 1;
            if let Some(pending) = state.pending.take() {
                pending.cancel(&self.runtime);
            }
            (state.max_scheduled_generation, Arc::clone(&state.current))
        };

        if Arc::ptr_eq(&previous, &list) {
            if let Some(commit) = commit {
                commit();
            }
            return;
        }

        if list.is_empty() {
            let removed = previous.len();
            self.latch(list, |callback| {
                if removed > 0 {
                    callback.on_removed(0, removed);
                }
            });
            self.finish(&previous, commit);
            return;
        }

        if previous.is_empty() {
            let inserted = list.len();
            self.latch(list, |callback| callback.on_inserted(0, inserted));
            self.finish(&previous, commit);
            return;
        }

        self.schedule(generation, previous, list, commit);
    }

    fn schedule(
        self: &Rc<Self>,
        generation: u64,
        old: Snapshot<T>,
        new: Snapshot<T>,
        commit: Option<Commit>,
    ) {
        if !self.runtime.is_alive() {
            log::warn!("runtime is gone; applying diff generation {generation} inline");
            let result = calculate_diff(&old, &new, self.item_callback.as_ref(), &self.config);
            self.apply(generation, DiffOutcome { list: new, result }, commit);
            return;
        }

        let weak: Weak<Self> = Rc::downgrade(self);
        let on_ui = move |outcome: DiffOutcome<T>| {
            if let Some(inner) = weak.upgrade() {
                inner.apply(generation, outcome, commit);
            }
        };
        let Some(continuation) = self.runtime.register_ui_cont(on_ui) else {
            log::warn!("runtime dropped while scheduling diff generation {generation}");
            return;
        };

        let superseded = Arc::new(AtomicBool::new(false));
        self.state.borrow_mut().pending = Some(PendingDiff {
            generation,
            continuation,
            superseded: Arc::clone(&superseded),
        });
        log::debug!(
            "scheduling diff generation {generation}: {} -> {} items",
            old.len(),
            new.len()
        );

        let item_callback = Arc::clone(&self.item_callback);
        let config = self.config.clone();
        let dispatcher = self.runtime.dispatcher();
        self.executor.execute(Box::new(move || {
            if superseded.load(Ordering::Acquire) {
                log::trace!("skipping superseded diff generation {generation}");
                return;
            }
            let started = Instant::now();
            let result = calculate_diff(&old, &new, item_callback.as_ref(), &config);
            log::debug!(
                "diff generation {generation} took {:?} ({} updates)",
                started.elapsed(),
                result.updates().len()
            );
            dispatcher.post_invoke(continuation, DiffOutcome { list: new, result });
        }));
    }

    fn apply(&self, generation: u64, outcome: DiffOutcome<T>, commit: Option<Commit>) {
        {
            let mut state = self.state.borrow_mut();
            if state.max_scheduled_generation != generation {
                log::trace!("discarding stale diff generation {generation}");
                return;
            }
            state.pending = None;
        }
        let DiffOutcome { list, result } = outcome;
        let previous = self.latch(list, |callback| result.dispatch_updates_to(callback));
        self.finish(&previous, commit);
    }

    /// Publishes `list` and notifies the container; returns the old snapshot.
    fn latch(
        &self,
        list: Snapshot<T>,
        notify: impl FnOnce(&dyn ListUpdateCallback),
    ) -> Snapshot<T> {
        let previous = std::mem::replace(&mut self.state.borrow_mut().current, list);
        let container = self.update_callback.borrow().clone();
        if let Some(container) = container {
            notify(container.as_ref());
        }
        previous
    }

    fn finish(&self, previous: &Snapshot<T>, commit: Option<Commit>) {
        let current = Arc::clone(&self.state.borrow().current);
        let listeners: Vec<ListListener<T>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(previous, &current);
        }
        if let Some(commit) = commit {
            commit();
        }
    }
}

impl<T> Drop for DifferInner<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.state.get_mut().pending.take() {
            pending.cancel(&self.runtime);
        }
    }
}

impl<T> fmt::Debug for AsyncListDiffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("AsyncListDiffer")
            .field("items", &state.current.len())
            .field("generation", &state.max_scheduled_generation)
            .field("pending", &state.pending.is_some())
            .field("config", &self.inner.config)
            .finish()
    }
}
