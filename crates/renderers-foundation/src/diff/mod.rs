//! List diffing: item comparison, update notifications and the diff engine.
//!
//! [`calculate_diff`] compares two snapshots and produces a [`DiffResult`]
//! whose [`ListUpdate`]s turn the old list into the new one when applied in
//! order through a [`ListUpdateCallback`].

mod myers;
mod result;

pub use result::{calculate_diff, DiffResult};

use std::fmt;
use std::sync::Arc;

use crate::renderer::Payload;

/// Decides how two versions of the list relate.
///
/// Implementations run on the background executor, hence `Send + Sync`.
pub trait ItemCallback<T>: Send + Sync + 'static {
    /// Whether `old` and `new` represent the same logical item.
    fn are_items_the_same(&self, old: &T, new: &T) -> bool;

    /// Whether the visible content of two same items is unchanged.
    ///
    /// Only called for pairs already accepted by
    /// [`ItemCallback::are_items_the_same`].
    fn are_contents_the_same(&self, old: &T, new: &T) -> bool;

    /// Optional hint forwarded with the change notification.
    fn change_payload(&self, _old: &T, _new: &T) -> Option<Payload> {
        None
    }
}

/// [`ItemCallback`] built from two closures.
pub struct FnItemCallback<S, C> {
    same_item: S,
    same_content: C,
}

impl<S, C> FnItemCallback<S, C> {
    pub fn new(same_item: S, same_content: C) -> Self {
        Self {
            same_item,
            same_content,
        }
    }
}

impl<T, S, C> ItemCallback<T> for FnItemCallback<S, C>
where
    S: Fn(&T, &T) -> bool + Send + Sync + 'static,
    C: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
    fn are_items_the_same(&self, old: &T, new: &T) -> bool {
        (self.same_item)(old, new)
    }

    fn are_contents_the_same(&self, old: &T, new: &T) -> bool {
        (self.same_content)(old, new)
    }
}

/// Identity by key, content by `PartialEq`.
pub struct KeyedItemCallback<F> {
    key: F,
}

impl<F> KeyedItemCallback<F> {
    pub fn new(key: F) -> Self {
        Self { key }
    }
}

impl<T, K, F> ItemCallback<T> for KeyedItemCallback<F>
where
    T: PartialEq,
    K: PartialEq,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    fn are_items_the_same(&self, old: &T, new: &T) -> bool {
        (self.key)(old) == (self.key)(new)
    }

    fn are_contents_the_same(&self, old: &T, new: &T) -> bool {
        old == new
    }
}

/// Tuning for [`calculate_diff`] and the async differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifferConfig {
    /// Pair reordered items as moves. When off, a reordered item is removed
    /// from its old position and inserted at the new one.
    pub detect_moves: bool,
}

impl Default for DifferConfig {
    fn default() -> Self {
        Self { detect_moves: true }
    }
}

impl DifferConfig {
    pub fn without_moves() -> Self {
        Self {
            detect_moves: false,
        }
    }
}

/// Receiver of structural list updates, usually the scrollable container.
///
/// Positions refer to the list as it looks after every earlier notification
/// of the same batch has been applied.
pub trait ListUpdateCallback {
    fn on_inserted(&self, position: usize, count: usize);

    fn on_removed(&self, position: usize, count: usize);

    fn on_moved(&self, from: usize, to: usize);

    fn on_changed(&self, position: usize, count: usize, payload: Option<Payload>);
}

/// One structural update produced by a diff.
#[derive(Clone)]
pub enum ListUpdate {
    Inserted {
        position: usize,
        count: usize,
    },
    Removed {
        position: usize,
        count: usize,
    },
    Moved {
        from: usize,
        to: usize,
    },
    Changed {
        position: usize,
        count: usize,
        payload: Option<Payload>,
    },
}

impl ListUpdate {
    pub fn dispatch(&self, callback: &dyn ListUpdateCallback) {
        match self {
            ListUpdate::Inserted { position, count } => callback.on_inserted(*position, *count),
            ListUpdate::Removed { position, count } => callback.on_removed(*position, *count),
            ListUpdate::Moved { from, to } => callback.on_moved(*from, *to),
            ListUpdate::Changed {
                position,
                count,
                payload,
            } => callback.on_changed(*position, *count, payload.clone()),
        }
    }
}

pub(crate) fn same_payload(a: &Option<Payload>, b: &Option<Payload>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

impl PartialEq for ListUpdate {
    fn eq(&self, other: &Self) -> bool {
        use ListUpdate::*;
        match (self, other) {
            (
                Inserted { position, count },
                Inserted {
                    position: p,
                    count: c,
                },
            )
            | (
                Removed { position, count },
                Removed {
                    position: p,
                    count: c,
                },
            ) => position == p && count == c,
            (Moved { from, to }, Moved { from: f, to: t }) => from == f && to == t,
            (
                Changed {
                    position,
                    count,
                    payload,
                },
                Changed {
                    position: p,
                    count: c,
                    payload: q,
                },
            ) => position == p && count == c && same_payload(payload, q),
            _ => false,
        }
    }
}

impl fmt::Debug for ListUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListUpdate::Inserted { position, count } => {
                write!(f, "Inserted({position}, {count})")
            }
            ListUpdate::Removed { position, count } => write!(f, "Removed({position}, {count})"),
            ListUpdate::Moved { from, to } => write!(f, "Moved({from} -> {to})"),
            ListUpdate::Changed {
                position,
                count,
                payload,
            } => write!(
                f,
                "Changed({position}, {count}{})",
                if payload.is_some() { ", payload" } else { "" }
            ),
        }
    }
}
