use smallvec::SmallVec;

use super::myers::{find_diagonals, Diagonal};
use super::{same_payload, DifferConfig, ItemCallback, ListUpdate, ListUpdateCallback};
use crate::renderer::Payload;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MatchKind {
    /// Part of the longest common subsequence; stays in place.
    Anchored,
    /// Paired outside the subsequence; reaches its position through a move.
    Moved,
}

#[derive(Clone, Copy, Debug)]
struct Match {
    other: usize,
    kind: MatchKind,
    same_content: bool,
}

/// Outcome of [`calculate_diff`].
///
/// Updates are ordered so that dispatching them one after another turns the
/// old list into the new one: removals from the back, then moves, then
/// insertions from the front, then content changes at their final positions.
#[derive(Clone, Debug, Default)]
pub struct DiffResult {
    updates: SmallVec<[ListUpdate; 4]>,
    old_to_new: Vec<Option<usize>>,
    new_to_old: Vec<Option<usize>>,
}

impl DiffResult {
    pub fn updates(&self) -> &[ListUpdate] {
        &self.updates
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn old_len(&self) -> usize {
        self.old_to_new.len()
    }

    pub fn new_len(&self) -> usize {
        self.new_to_old.len()
    }

    /// New position of the item at `old_position`, or `None` if it was removed.
    pub fn old_position_to_new(&self, old_position: usize) -> Option<usize> {
        self.old_to_new.get(old_position).copied().flatten()
    }

    /// Old position of the item at `new_position`, or `None` if it was inserted.
    pub fn new_position_to_old(&self, new_position: usize) -> Option<usize> {
        self.new_to_old.get(new_position).copied().flatten()
    }

    pub fn dispatch_updates_to(&self, callback: &dyn ListUpdateCallback) {
        for update in &self.updates {
            update.dispatch(callback);
        }
    }
}

/// Computes the updates turning `old` into `new`.
///
/// Identity matches on a longest common subsequence stay in place; every
/// other identity match becomes one move, so the number of moves is minimal.
/// Matched pairs whose contents differ are reported as changes.
pub fn calculate_diff<T: 'static>(
    old: &[T],
    new: &[T],
    callback: &dyn ItemCallback<T>,
    config: &DifferConfig,
) -> DiffResult {
    let diagonals = find_diagonals(old.len(), new.len(), |x, y| {
        callback.are_items_the_same(&old[x], &new[y])
    });

    let mut old_matches: Vec<Option<Match>> = vec![None; old.len()];
    let mut new_matches: Vec<Option<Match>> = vec![None; new.len()];
    for &Diagonal { x, y, size } in &diagonals {
        for offset in 0..size {
            let (x, y) = (x + offset, y + offset);
            pair(
                &mut old_matches,
                &mut new_matches,
                x,
                y,
                MatchKind::Anchored,
                callback.are_contents_the_same(&old[x], &new[y]),
            );
        }
    }

    if config.detect_moves {
        for x in 0..old.len() {
            if old_matches[x].is_some() {
                continue;
            }
            let candidate = (0..new.len()).find(|&y| {
                new_matches[y].is_none() && callback.are_items_the_same(&old[x], &new[y])
            });
            if let Some(y) = candidate {
                pair(
                    &mut old_matches,
                    &mut new_matches,
                    x,
                    y,
                    MatchKind::Moved,
                    callback.are_contents_the_same(&old[x], &new[y]),
                );
            }
        }
    }

    let mut updates = SmallVec::new();
    push_removals(&mut updates, &old_matches);
    push_moves(&mut updates, &old_matches, &new_matches);
    push_insertions(&mut updates, &new_matches);
    push_changes(&mut updates, &new_matches, |x, y| {
        callback.change_payload(&old[x], &new[y])
    });

    DiffResult {
        updates,
        old_to_new: old_matches.iter().map(|m| m.map(|m| m.other)).collect(),
        new_to_old: new_matches.iter().map(|m| m.map(|m| m.other)).collect(),
    }
}

fn pair(
    old_matches: &mut [Option<Match>],
    new_matches: &mut [Option<Match>],
    x: usize,
    y: usize,
    kind: MatchKind,
    same_content: bool,
) {
    old_matches[x] = Some(Match {
        other: y,
        kind,
        same_content,
    });
    new_matches[y] = Some(Match {
        other: x,
        kind,
        same_content,
    });
}

type Updates = SmallVec<[ListUpdate; 4]>;

fn push_removals(updates: &mut Updates, old_matches: &[Option<Match>]) {
    // Walk from the back so every position is still an old-list index.
    let mut run: Option<(usize, usize)> = None;
    for x in (0..old_matches.len()).rev() {
        if old_matches[x].is_some() {
            continue;
        }
        run = match run {
            Some((start, count)) if start == x + 1 => Some((x, count + 1)),
            Some((start, count)) => {
                updates.push(ListUpdate::Removed {
                    position: start,
                    count,
                });
                Some((x, 1))
            }
            None => Some((x, 1)),
        };
    }
    if let Some((position, count)) = run {
        updates.push(ListUpdate::Removed { position, count });
    }
}

fn push_moves(
    updates: &mut Updates,
    old_matches: &[Option<Match>],
    new_matches: &[Option<Match>],
) {
    // Surviving items in their current order, named by their new index.
    let mut order: Vec<usize> = old_matches.iter().flatten().map(|m| m.other).collect();
    let mut previous_matched = None;
    for (target, matched) in new_matches.iter().enumerate() {
        let Some(matched) = matched else {
            continue;
        };
        if matched.kind == MatchKind::Moved {
            // Every matched item before `target` is already in sorted order,
            // so placing `target` right behind its predecessor keeps it sorted.
            let Some(from) = order.iter().position(|&item| item == target) else {
                continue;
            };
            order.remove(from);
            let to = match previous_matched {
                Some(predecessor) => order
                    .iter()
                    .position(|&item| item == predecessor)
                    .map_or(0, |index| index + 1),
                None => 0,
            };
            order.insert(to, target);
            if from != to {
                updates.push(ListUpdate::Moved { from, to });
            }
        }
        previous_matched = Some(target);
    }
}

fn push_insertions(updates: &mut Updates, new_matches: &[Option<Match>]) {
    let mut run: Option<(usize, usize)> = None;
    for (y, matched) in new_matches.iter().enumerate() {
        if matched.is_some() {
            continue;
        }
        run = match run {
            Some((start, count)) if start + count == y => Some((start, count + 1)),
            Some((start, count)) => {
                updates.push(ListUpdate::Inserted {
                    position: start,
                    count,
                });
                Some((y, 1))
            }
            None => Some((y, 1)),
        };
    }
    if let Some((position, count)) = run {
        updates.push(ListUpdate::Inserted { position, count });
    }
}

fn push_changes<P>(updates: &mut Updates, new_matches: &[Option<Match>], payload_for: P)
where
    P: Fn(usize, usize) -> Option<Payload>,
{
    let mut run: Option<(usize, usize, Option<Payload>)> = None;
    for (y, matched) in new_matches.iter().enumerate() {
        let Some(matched) = matched else {
            continue;
        };
        if matched.same_content {
            continue;
        }
        let payload = payload_for(matched.other, y);
        run = match run {
            Some((start, count, current))
                if start + count == y && same_payload(&current, &payload) =>
            {
                Some((start, count + 1, current))
            }
            Some((start, count, current)) => {
                updates.push(ListUpdate::Changed {
                    position: start,
                    count,
                    payload: current,
                });
                Some((y, 1, payload))
            }
            None => Some((y, 1, payload)),
        };
    }
    if let Some((position, count, payload)) = run {
        updates.push(ListUpdate::Changed {
            position,
            count,
            payload,
        });
    }
}

#[cfg(test)]
#[path = "../tests/diff_tests.rs"]
mod tests;
