//! A console "scroll view" that keeps one holder per row and prints them.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use renderers_core::NodeId;
use renderers_foundation::{
    InflationContext, ListUpdateCallback, Payload, RecyclerAdapter, RendererError, SlotId,
    ViewHolderArena,
};

/// Lines painted by renderers, keyed by row position.
pub type Screen = Rc<RefCell<BTreeMap<usize, String>>>;

struct Row {
    slot: Option<SlotId>,
    payloads: Option<Vec<Payload>>,
}

struct ListState<T> {
    arena: ViewHolderArena<T>,
    rows: Vec<Row>,
    removed: Vec<SlotId>,
}

pub struct ConsoleList<T> {
    node: NodeId,
    screen: Screen,
    state: RefCell<ListState<T>>,
}

impl<T: 'static> ConsoleList<T> {
    pub fn new(node: NodeId, screen: Screen) -> Self {
        Self {
            node,
            screen,
            state: RefCell::new(ListState {
                arena: ViewHolderArena::new(),
                rows: Vec::new(),
                removed: Vec::new(),
            }),
        }
    }

    /// Binds new and changed rows, recycling holders of removed ones.
    pub fn layout(&self, adapter: &dyn RecyclerAdapter<T>) -> Result<(), RendererError> {
        let mut state = self.state.borrow_mut();
        let ListState {
            arena,
            rows,
            removed,
        } = &mut *state;

        for slot in removed.drain(..) {
            if let Some(holder) = arena.get_mut(slot) {
                adapter.on_view_detached(holder)?;
                adapter.on_view_recycled(holder)?;
            }
            arena.release(slot);
        }

        let context = InflationContext::new(self.node);
        self.screen.borrow_mut().clear();
        for (position, row) in rows.iter_mut().enumerate() {
            let slot = match row.slot {
                Some(slot) => slot,
                None => {
                    let view_type = adapter.item_view_type(position)?;
                    let slot = arena.acquire(view_type, || {
                        adapter.create_view_holder(&context, view_type)
                    })?;
                    if let Some(holder) = arena.get_mut(slot) {
                        adapter.on_view_attached(holder)?;
                    }
                    row.slot = Some(slot);
                    slot
                }
            };
            let Some(holder) = arena.get_mut(slot) else {
                continue;
            };
            // Rows are repainted every pass; only changed rows carry payloads.
            let payloads = row.payloads.take().unwrap_or_default();
            adapter.bind_view_holder(holder, position, &payloads)?;
        }
        Ok(())
    }

    pub fn print(&self) {
        for line in self.screen.borrow().values() {
            println!("  {line}");
        }
        let stats = self.state.borrow().arena.pool().stats();
        println!(
            "  [holders created {}, reused {}, recycled {}]",
            stats.created, stats.reused, stats.recycled
        );
    }
}

impl<T: 'static> ListUpdateCallback for ConsoleList<T> {
    fn on_inserted(&self, position: usize, count: usize) {
        log::info!("insert {count} at {position}");
        let mut state = self.state.borrow_mut();
        let at = position.min(state.rows.len());
        state.rows.splice(
            at..at,
            (0..count).map(|_| Row {
                slot: None,
                payloads: None,
            }),
        );
    }

    fn on_removed(&self, position: usize, count: usize) {
        log::info!("remove {count} at {position}");
        let mut state = self.state.borrow_mut();
        let len = state.rows.len();
        let slots: Vec<SlotId> = state
            .rows
            .drain(position.min(len)..(position + count).min(len))
            .filter_map(|row| row.slot)
            .collect();
        state.removed.extend(slots);
    }

    fn on_moved(&self, from: usize, to: usize) {
        log::info!("move {from} -> {to}");
        let mut state = self.state.borrow_mut();
        if from < state.rows.len() {
            let row = state.rows.remove(from);
            let to = to.min(state.rows.len());
            state.rows.insert(to, row);
        }
    }

    fn on_changed(&self, position: usize, count: usize, payload: Option<Payload>) {
        log::info!(
            "change {count} at {position}{}",
            if payload.is_some() { " (partial)" } else { "" }
        );
        let mut state = self.state.borrow_mut();
        let len = state.rows.len();
        for row in &mut state.rows[position.min(len)..(position + count).min(len)] {
            let payloads = row.payloads.get_or_insert_with(Vec::new);
            if let Some(payload) = &payload {
                payloads.push(payload.clone());
            }
        }
    }
}
