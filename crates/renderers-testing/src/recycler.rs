//! Headless recycling container.
//!
//! [`TestRecycler`] follows the structural updates reported by the adapter the
//! way a scrolling list would: rows keep their holders across inserts, moves
//! and removals, changed rows are rebound with their payloads, and holders
//! that leave the list go through detach and recycle into the pool.

use std::cell::RefCell;

use renderers_core::NodeId;
use renderers_foundation::{
    InflationContext, ListUpdate, ListUpdateCallback, Payload, PoolStats, RecyclePolicy,
    RecyclerAdapter, Renderer, RendererError, RendererViewHolder, SlotId, ViewHolderArena,
};

enum Rebind {
    Full,
    Partial(Vec<Payload>),
}

impl Rebind {
    fn merge(current: Option<Rebind>, payload: Option<Payload>) -> Rebind {
        match (current, payload) {
            (Some(Rebind::Partial(mut payloads)), Some(payload)) => {
                payloads.push(payload);
                Rebind::Partial(payloads)
            }
            (None, Some(payload)) => Rebind::Partial(vec![payload]),
            _ => Rebind::Full,
        }
    }
}

#[derive(Default)]
struct Row {
    slot: Option<SlotId>,
    rebind: Option<Rebind>,
}

struct RecyclerState<T> {
    arena: ViewHolderArena<T>,
    rows: Vec<Row>,
    removed: Vec<SlotId>,
    updates: Vec<ListUpdate>,
}

/// Outcome of one [`TestRecycler::layout`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub created: usize,
    pub bound: usize,
    pub recycled: usize,
}

/// Minimal recycling container driving a [`RecyclerAdapter`].
pub struct TestRecycler<T> {
    node: NodeId,
    viewport: Option<usize>,
    state: RefCell<RecyclerState<T>>,
}

impl<T: 'static> TestRecycler<T> {
    pub fn new(node: NodeId) -> Self {
        Self::with_policy(node, RecyclePolicy::default())
    }

    pub fn with_policy(node: NodeId, policy: RecyclePolicy) -> Self {
        Self {
            node,
            viewport: None,
            state: RefCell::new(RecyclerState {
                arena: ViewHolderArena::with_policy(policy),
                rows: Vec::new(),
                removed: Vec::new(),
                updates: Vec::new(),
            }),
        }
    }

    /// Lays out at most `rows` positions; the rest stay unbound.
    pub fn with_viewport(mut self, rows: usize) -> Self {
        self.viewport = Some(rows);
        self
    }

    /// Structural updates received since the last [`TestRecycler::take_updates`].
    pub fn take_updates(&self) -> Vec<ListUpdate> {
        std::mem::take(&mut self.state.borrow_mut().updates)
    }

    pub fn row_count(&self) -> usize {
        self.state.borrow().rows.len()
    }

    pub fn attached_count(&self) -> usize {
        self.state.borrow().arena.live_count()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.state.borrow().arena.pool().stats()
    }

    /// Runs `f` on the concrete renderer bound at `position`.
    pub fn with_renderer<R, U>(&self, position: usize, f: impl FnOnce(&mut R) -> U) -> Option<U>
    where
        R: Renderer<T>,
    {
        let mut state = self.state.borrow_mut();
        let RecyclerState { arena, rows, .. } = &mut *state;
        let slot = rows.get(position)?.slot?;
        arena.get_mut(slot)?.renderer_as_mut::<R>().map(f)
    }

    pub fn with_holder<U>(
        &self,
        position: usize,
        f: impl FnOnce(&RendererViewHolder<T>) -> U,
    ) -> Option<U> {
        let state = self.state.borrow();
        let slot = state.rows.get(position)?.slot?;
        state.arena.get(slot).map(f)
    }

    /// Brings every row in the viewport up to date with `adapter`.
    ///
    /// Errors stop the pass at the failing row; rows before it stay laid out.
    pub fn layout(&self, adapter: &dyn RecyclerAdapter<T>) -> Result<LayoutReport, RendererError> {
        let mut state = self.state.borrow_mut();
        let RecyclerState {
            arena,
            rows,
            removed,
            ..
        } = &mut *state;
        let mut report = LayoutReport::default();

        for slot in removed.drain(..) {
            recycle(adapter, arena, slot, &mut report)?;
        }

        let count = adapter.item_count();
        if rows.len() != count {
            log::warn!(
                "recycler tracked {} rows but adapter reports {count}; resyncing",
                rows.len()
            );
            for row in rows.drain(count.min(rows.len())..) {
                if let Some(slot) = row.slot {
                    recycle(adapter, arena, slot, &mut report)?;
                }
            }
            rows.resize_with(count, Row::default);
        }

        let visible = self.viewport.map_or(count, |rows| rows.min(count));
        let context = InflationContext::new(self.node);
        for (position, row) in rows.iter_mut().enumerate() {
            if position >= visible {
                if let Some(slot) = row.slot.take() {
                    recycle(adapter, arena, slot, &mut report)?;
                }
                row.rebind = None;
                continue;
            }

            let view_type = adapter.item_view_type(position)?;
            if let Some(slot) = row.slot {
                let matches = arena
                    .get(slot)
                    .is_some_and(|holder| holder.view_type() == view_type);
                if !matches {
                    row.slot = None;
                    recycle(adapter, arena, slot, &mut report)?;
                }
            }

            match row.slot {
                Some(slot) => {
                    let Some(holder) = arena.get_mut(slot) else {
                        continue;
                    };
                    let rebind = row.rebind.take().or_else(|| {
                        (holder.bound_position() != Some(position)).then_some(Rebind::Full)
                    });
                    match rebind {
                        Some(Rebind::Full) => adapter.bind_view_holder(holder, position, &[])?,
                        Some(Rebind::Partial(payloads)) => {
                            adapter.bind_view_holder(holder, position, &payloads)?
                        }
                        None => continue,
                    }
                    report.bound += 1;
                }
                None => {
                    let before = arena.pool().stats().created;
                    let slot = arena.acquire(view_type, || {
                        adapter.create_view_holder(&context, view_type)
                    })?;
                    report.created += arena.pool().stats().created - before;
                    row.slot = Some(slot);
                    row.rebind = None;
                    let Some(holder) = arena.get_mut(slot) else {
                        continue;
                    };
                    adapter.bind_view_holder(holder, position, &[])?;
                    adapter.on_view_attached(holder)?;
                    report.bound += 1;
                }
            }
        }
        Ok(report)
    }
}

fn recycle<T: 'static>(
    adapter: &dyn RecyclerAdapter<T>,
    arena: &mut ViewHolderArena<T>,
    slot: SlotId,
    report: &mut LayoutReport,
) -> Result<(), RendererError> {
    if let Some(holder) = arena.get_mut(slot) {
        adapter.on_view_detached(holder)?;
        adapter.on_view_recycled(holder)?;
    }
    arena.release(slot);
    report.recycled += 1;
    Ok(())
}

impl<T: 'static> ListUpdateCallback for TestRecycler<T> {
    fn on_inserted(&self, position: usize, count: usize) {
        let mut state = self.state.borrow_mut();
        let at = position.min(state.rows.len());
        state
            .rows
            .splice(at..at, (0..count).map(|_| Row::default()));
        state.updates.push(ListUpdate::Inserted { position, count });
    }

    fn on_removed(&self, position: usize, count: usize) {
        let mut state = self.state.borrow_mut();
        let len = state.rows.len();
        let range = position.min(len)..(position + count).min(len);
        let slots: Vec<SlotId> = state.rows.drain(range).filter_map(|row| row.slot).collect();
        state.removed.extend(slots);
        state.updates.push(ListUpdate::Removed { position, count });
    }

    fn on_moved(&self, from: usize, to: usize) {
        let mut state = self.state.borrow_mut();
        if from < state.rows.len() {
            let row = state.rows.remove(from);
            let to = to.min(state.rows.len());
            state.rows.insert(to, row);
        } else {
            log::warn!("move from {from} outside {} rows", state.rows.len());
        }
        state.updates.push(ListUpdate::Moved { from, to });
    }

    fn on_changed(&self, position: usize, count: usize, payload: Option<Payload>) {
        let mut state = self.state.borrow_mut();
        let len = state.rows.len();
        for row in &mut state.rows[position.min(len)..(position + count).min(len)] {
            row.rebind = Some(Rebind::merge(row.rebind.take(), payload.clone()));
        }
        state.updates.push(ListUpdate::Changed {
            position,
            count,
            payload,
        });
    }
}
