//! Recycled view holders kept for reuse, grouped by view type.
//!
//! A holder is only ever handed back out for the view type it was built for,
//! so a recycled renderer always matches the content it is rebound to.

use renderers_core::collections::map::HashMap;

use super::{RendererViewHolder, ViewType};

/// Default number of holders kept per view type.
pub const DEFAULT_MAX_RECYCLED_PER_TYPE: usize = 5;

/// Policy for keeping recycled holders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecyclePolicy {
    /// Maximum number of holders to keep for each view type.
    pub max_holders_per_type: usize,

    /// Whether recycled holders are kept at all.
    pub enabled: bool,
}

impl Default for RecyclePolicy {
    fn default() -> Self {
        Self {
            max_holders_per_type: DEFAULT_MAX_RECYCLED_PER_TYPE,
            enabled: true,
        }
    }
}

impl RecyclePolicy {
    pub fn new(max_holders_per_type: usize) -> Self {
        Self {
            max_holders_per_type,
            enabled: true,
        }
    }

    /// Every recycled holder is dropped.
    pub fn disabled() -> Self {
        Self {
            max_holders_per_type: 0,
            enabled: false,
        }
    }
}

/// Counters describing how well the pool is serving its container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Holders built because no recycled one was available.
    pub created: usize,
    /// Holders accepted into the pool.
    pub recycled: usize,
    /// Holders handed back out.
    pub reused: usize,
    /// Holders dropped because their view type was full or pooling is off.
    pub dropped: usize,
}

/// Pool of recycled holders organised by view type.
pub struct RecycledViewPool<T> {
    available: HashMap<ViewType, Vec<RendererViewHolder<T>>>,
    limits: HashMap<ViewType, usize>,
    policy: RecyclePolicy,
    stats: PoolStats,
}

impl<T: 'static> RecycledViewPool<T> {
    pub fn new() -> Self {
        Self::with_policy(RecyclePolicy::default())
    }

    pub fn with_policy(policy: RecyclePolicy) -> Self {
        Self {
            available: HashMap::default(),
            limits: HashMap::default(),
            policy,
            stats: PoolStats::default(),
        }
    }

    pub fn policy(&self) -> &RecyclePolicy {
        &self.policy
    }

    /// Overrides the per-type limit for one view type.
    ///
    /// Holders above the new limit are dropped immediately.
    pub fn set_max_recycled(&mut self, view_type: ViewType, max: usize) {
        self.limits.insert(view_type, max);
        if let Some(holders) = self.available.get_mut(&view_type) {
            if holders.len() > max {
                self.stats.dropped += holders.len() - max;
                holders.truncate(max);
            }
        }
    }

    fn limit_for(&self, view_type: ViewType) -> usize {
        self.limits
            .get(&view_type)
            .copied()
            .unwrap_or(self.policy.max_holders_per_type)
    }

    /// Takes a recycled holder built for `view_type`, if one is available.
    pub fn try_acquire(&mut self, view_type: ViewType) -> Option<RendererViewHolder<T>> {
        if !self.policy.enabled {
            return None;
        }
        let holder = self.available.get_mut(&view_type)?.pop()?;
        self.stats.reused += 1;
        Some(holder)
    }

    /// Offers a holder for reuse.
    ///
    /// Returns `false` when the holder was dropped instead of kept.
    pub fn put_recycled(&mut self, holder: RendererViewHolder<T>) -> bool {
        let view_type = holder.view_type();
        if !self.policy.enabled || !holder.has_renderer() {
            self.stats.dropped += 1;
            return false;
        }
        let limit = self.limit_for(view_type);
        let holders = self.available.entry(view_type).or_default();
        if holders.len() >= limit {
            self.stats.dropped += 1;
            log::trace!("recycled pool full for {view_type}; dropping holder");
            return false;
        }
        holders.push(holder);
        self.stats.recycled += 1;
        true
    }

    /// Returns the number of holders waiting for reuse.
    pub fn available_count(&self) -> usize {
        self.available.values().map(Vec::len).sum()
    }

    pub fn available_for(&self, view_type: ViewType) -> usize {
        self.available.get(&view_type).map_or(0, Vec::len)
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub(crate) fn record_created(&mut self) {
        self.stats.created += 1;
    }

    /// Drops every pooled holder. Limits and statistics are kept.
    pub fn clear(&mut self) {
        self.available.clear();
    }
}

impl<T: 'static> Default for RecycledViewPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for RecycledViewPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecycledViewPool")
            .field(
                "available",
                &self.available.values().map(Vec::len).sum::<usize>(),
            )
            .field("policy", &self.policy)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::tests::CountingRenderer;

    fn holder(view_type: usize) -> RendererViewHolder<u32> {
        RendererViewHolder::new(
            ViewType(view_type),
            Box::new(CountingRenderer::default()),
        )
    }

    #[test]
    fn recycled_holder_is_reused() {
        let mut pool = RecycledViewPool::new();
        assert!(pool.put_recycled(holder(0)));
        assert_eq!(pool.available_count(), 1);

        let reused = pool.try_acquire(ViewType(0));
        assert!(reused.is_some());
        assert_eq!(pool.available_count(), 0);
        assert_eq!(
            pool.stats(),
            PoolStats {
                created: 0,
                recycled: 1,
                reused: 1,
                dropped: 0
            }
        );
    }

    #[test]
    fn view_type_must_match() {
        let mut pool = RecycledViewPool::new();
        pool.put_recycled(holder(1));
        pool.put_recycled(holder(2));

        let reused = pool.try_acquire(ViewType(1)).expect("holder of type 1");
        assert_eq!(reused.view_type(), ViewType(1));
        assert!(pool.try_acquire(ViewType(3)).is_none());
        assert_eq!(pool.available_for(ViewType(2)), 1);
    }

    #[test]
    fn per_type_limit_drops_extra_holders() {
        let mut pool = RecycledViewPool::with_policy(RecyclePolicy::new(2));
        for _ in 0..5 {
            pool.put_recycled(holder(0));
        }
        assert_eq!(pool.available_count(), 2);
        assert_eq!(pool.stats().dropped, 3);

        pool.set_max_recycled(ViewType(0), 1);
        assert_eq!(pool.available_count(), 1);
        assert_eq!(pool.stats().dropped, 4);

        pool.set_max_recycled(ViewType(1), 0);
        assert!(!pool.put_recycled(holder(1)));
    }

    #[test]
    fn disabled_pool_keeps_nothing() {
        let mut pool = RecycledViewPool::with_policy(RecyclePolicy::disabled());
        assert!(!pool.put_recycled(holder(0)));
        assert!(pool.try_acquire(ViewType(0)).is_none());
    }

    #[test]
    fn placeholder_holders_are_not_pooled() {
        let mut pool = RecycledViewPool::new();
        let placeholder = RendererViewHolder::<u32>::placeholder(ViewType(0));
        assert!(!pool.put_recycled(placeholder));
        assert_eq!(pool.available_count(), 0);
    }
}
