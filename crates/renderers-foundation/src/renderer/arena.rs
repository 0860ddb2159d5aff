use std::fmt;

use super::{RecyclePolicy, RecycledViewPool, RendererViewHolder, ViewType};
use crate::error::RendererError;

/// Handle to a live view holder inside a [`ViewHolderArena`].
///
/// Ids are reused after [`ViewHolderArena::release`]; a stale id simply finds
/// whatever holder took its place, so containers must drop ids they release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl SlotId {
    #[inline]
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }
}

/// Owns the view holders a container is currently using.
///
/// Live holders sit in slots addressed by [`SlotId`]. Released holders go to
/// the backing [`RecycledViewPool`] and come back out of
/// [`ViewHolderArena::acquire`] before a new one is built.
pub struct ViewHolderArena<T> {
    slots: Vec<Option<RendererViewHolder<T>>>,
    free: Vec<usize>,
    pool: RecycledViewPool<T>,
}

impl<T: 'static> ViewHolderArena<T> {
    pub fn new() -> Self {
        Self::with_policy(RecyclePolicy::default())
    }

    pub fn with_policy(policy: RecyclePolicy) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            pool: RecycledViewPool::with_policy(policy),
        }
    }

    /// Places a holder of `view_type` in a slot.
    ///
    /// A recycled holder is preferred; `create` runs only when the pool has
    /// none for that view type. Its error is returned untouched and no slot is
    /// taken.
    pub fn acquire<F>(&mut self, view_type: ViewType, create: F) -> Result<SlotId, RendererError>
    where
        F: FnOnce() -> Result<RendererViewHolder<T>, RendererError>,
    {
        let holder = match self.pool.try_acquire(view_type) {
            Some(holder) => holder,
            None => {
                let holder = create()?;
                self.pool.record_created();
                log::debug!(
                    "created view holder for {view_type} ({} live)",
                    self.live_count() + 1
                );
                holder
            }
        };
        Ok(self.insert(holder))
    }

    /// Places an existing holder in a free slot.
    pub fn insert(&mut self, holder: RendererViewHolder<T>) -> SlotId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(holder);
                SlotId(index)
            }
            None => {
                self.slots.push(Some(holder));
                SlotId(self.slots.len() - 1)
            }
        }
    }

    /// Frees the slot and hands its holder back to the caller.
    pub fn take(&mut self, slot: SlotId) -> Option<RendererViewHolder<T>> {
        let holder = self.slots.get_mut(slot.0)?.take()?;
        self.free.push(slot.0);
        Some(holder)
    }

    /// Frees the slot and offers its holder to the recycle pool.
    ///
    /// Returns whether the pool kept the holder. The caller is expected to
    /// have delivered the recycle notification already.
    pub fn release(&mut self, slot: SlotId) -> bool {
        match self.take(slot) {
            Some(holder) => self.pool.put_recycled(holder),
            None => false,
        }
    }

    pub fn get(&self, slot: SlotId) -> Option<&RendererViewHolder<T>> {
        self.slots.get(slot.0)?.as_ref()
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut RendererViewHolder<T>> {
        self.slots.get_mut(slot.0)?.as_mut()
    }

    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &RendererViewHolder<T>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((SlotId(index), slot.as_ref()?)))
    }

    pub fn pool(&self) -> &RecycledViewPool<T> {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut RecycledViewPool<T> {
        &mut self.pool
    }
}

impl<T: 'static> Default for ViewHolderArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ViewHolderArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHolderArena")
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .field("pool", &self.pool)
            .finish()
    }
}
