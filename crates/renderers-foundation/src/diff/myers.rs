//! Linear-space Myers diff over an identity predicate.
//!
//! The search splits the edit graph at the middle snake of each range and
//! keeps the split halves on an explicit stack, so no recursion depth grows
//! with the list size. Output is the set of diagonals (runs of identity
//! matches) forming a longest common subsequence, sorted by old index.

/// A run of `size` matches starting at old index `x` and new index `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Diagonal {
    pub x: usize,
    pub y: usize,
    pub size: usize,
}

#[derive(Clone, Copy, Debug)]
struct Range {
    old_start: isize,
    old_end: isize,
    new_start: isize,
    new_end: isize,
}

impl Range {
    fn old_size(&self) -> isize {
        self.old_end - self.old_start
    }

    fn new_size(&self) -> isize {
        self.new_end - self.new_start
    }
}

#[derive(Clone, Copy, Debug)]
struct Snake {
    start_x: isize,
    start_y: isize,
    end_x: isize,
    end_y: isize,
    reverse: bool,
}

impl Snake {
    fn has_addition_or_removal(&self) -> bool {
        self.end_y - self.start_y != self.end_x - self.start_x
    }

    fn is_addition(&self) -> bool {
        self.end_y - self.start_y > self.end_x - self.start_x
    }

    fn diagonal_size(&self) -> isize {
        (self.end_x - self.start_x).min(self.end_y - self.start_y)
    }

    /// The matching run of the snake, stripped of its single edit edge.
    fn to_diagonal(self) -> Diagonal {
        let size = self.diagonal_size() as usize;
        let (x, y) = if !self.has_addition_or_removal() || self.reverse {
            (self.start_x, self.start_y)
        } else if self.is_addition() {
            (self.start_x, self.start_y + 1)
        } else {
            (self.start_x + 1, self.start_y)
        };
        Diagonal {
            x: x as usize,
            y: y as usize,
            size,
        }
    }
}

/// Array indexed by diagonal number `k` in `-max..=max`.
struct CenteredArray {
    data: Vec<isize>,
    mid: isize,
}

impl CenteredArray {
    fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            mid: (size / 2) as isize,
        }
    }

    #[inline]
    fn get(&self, k: isize) -> isize {
        self.data[(k + self.mid) as usize]
    }

    #[inline]
    fn set(&mut self, k: isize, value: isize) {
        self.data[(k + self.mid) as usize] = value;
    }
}

pub(crate) fn find_diagonals<F>(old_len: usize, new_len: usize, same_item: F) -> Vec<Diagonal>
where
    F: Fn(usize, usize) -> bool,
{
    let mut diagonals = Vec::new();
    let mut stack = vec![Range {
        old_start: 0,
        old_end: old_len as isize,
        new_start: 0,
        new_end: new_len as isize,
    }];
    let max = (old_len + new_len).div_ceil(2);
    let mut forward = CenteredArray::new(max * 2 + 1);
    let mut backward = CenteredArray::new(max * 2 + 1);

    while let Some(range) = stack.pop() {
        let Some(snake) = mid_point(&range, &same_item, &mut forward, &mut backward) else {
            continue;
        };
        if snake.diagonal_size() > 0 {
            diagonals.push(snake.to_diagonal());
        }
        stack.push(Range {
            old_start: range.old_start,
            old_end: snake.start_x,
            new_start: range.new_start,
            new_end: snake.start_y,
        });
        stack.push(Range {
            old_start: snake.end_x,
            old_end: range.old_end,
            new_start: snake.end_y,
            new_end: range.new_end,
        });
    }

    diagonals.sort_unstable_by_key(|diagonal| diagonal.x);
    diagonals
}

fn mid_point<F>(
    range: &Range,
    same_item: &F,
    forward: &mut CenteredArray,
    backward: &mut CenteredArray,
) -> Option<Snake>
where
    F: Fn(usize, usize) -> bool,
{
    if range.old_size() < 1 || range.new_size() < 1 {
        return None;
    }
    let max = (range.old_size() + range.new_size()).unsigned_abs().div_ceil(2) as isize;
    forward.set(1, range.old_start);
    backward.set(1, range.old_end);
    for d in 0..max {
        if let Some(snake) = forward_snake(range, same_item, forward, backward, d) {
            return Some(snake);
        }
        if let Some(snake) = backward_snake(range, same_item, forward, backward, d) {
            return Some(snake);
        }
    }
    None
}

fn forward_snake<F>(
    range: &Range,
    same_item: &F,
    forward: &mut CenteredArray,
    backward: &CenteredArray,
    d: isize,
) -> Option<Snake>
where
    F: Fn(usize, usize) -> bool,
{
    let delta = range.old_size() - range.new_size();
    let check_for_snake = !delta.unsigned_abs().is_multiple_of(2);
    let mut k = -d;
    while k <= d {
        let from_above = k == -d || (k != d && forward.get(k + 1) > forward.get(k - 1));
        let (start_x, mut x) = if from_above {
            let x = forward.get(k + 1);
            (x, x)
        } else {
            let x = forward.get(k - 1);
            (x, x + 1)
        };
        let mut y = range.new_start + (x - range.old_start) - k;
        let start_y = if d == 0 || x != start_x { y } else { y - 1 };
        while x < range.old_end && y < range.new_end && same_item(x as usize, y as usize) {
            x += 1;
            y += 1;
        }
        forward.set(k, x);
        if check_for_snake {
            let backward_k = delta - k;
            if backward_k > -d && backward_k < d && backward.get(backward_k) <= x {
                return Some(Snake {
                    start_x,
                    start_y,
                    end_x: x,
                    end_y: y,
                    reverse: false,
                });
            }
        }
        k += 2;
    }
    None
}

fn backward_snake<F>(
    range: &Range,
    same_item: &F,
    forward: &CenteredArray,
    backward: &mut CenteredArray,
    d: isize,
) -> Option<Snake>
where
    F: Fn(usize, usize) -> bool,
{
    let delta = range.old_size() - range.new_size();
    let check_for_snake = delta.unsigned_abs().is_multiple_of(2);
    let mut k = -d;
    while k <= d {
        let from_above = k == -d || (k != d && backward.get(k + 1) < backward.get(k - 1));
        let (start_x, mut x) = if from_above {
            let x = backward.get(k + 1);
            (x, x)
        } else {
            let x = backward.get(k - 1);
            (x, x - 1)
        };
        let mut y = range.new_end - ((range.old_end - x) - k);
        let start_y = if d == 0 || x != start_x { y } else { y + 1 };
        while x > range.old_start
            && y > range.new_start
            && same_item((x - 1) as usize, (y - 1) as usize)
        {
            x -= 1;
            y -= 1;
        }
        backward.set(k, x);
        if check_for_snake {
            let forward_k = delta - k;
            if (-d..=d).contains(&forward_k) && forward.get(forward_k) >= x {
                return Some(Snake {
                    start_x: x,
                    start_y: y,
                    end_x: start_x,
                    end_y: start_y,
                    reverse: true,
                });
            }
        }
        k += 2;
    }
    None
}
