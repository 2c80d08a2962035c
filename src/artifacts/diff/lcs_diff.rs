use std::ops::Range;

use crate::domain::change::{Change, DiffResult, concatenate_changes};
use crate::domain::sequence::Sequence;

use super::post_process::prettify_changes;

/// Deepest search layer whose frontier snapshots are kept for path
/// reconstruction. Past this depth the search stops snapshotting and, on
/// meeting, splits at the meeting point and recurses on both halves instead
/// of walking the history back. The same value bounds the layer count, so a
/// pathological comparison gives up instead of going quadratic.
pub const MAX_DIFFERENCES_HISTORY: usize = 1447;

/// Called between search layers with the furthest original index reached so
/// far and the number of elements matched on the way there. Returning
/// `false` aborts the search; the unresolved region collapses into one
/// coarse change and the result is flagged `quit_early`.
pub type ContinueProcessingPredicate<'p> = dyn Fn(usize, usize) -> bool + 'p;

/// Bidirectional Myers shortest-edit-script search between two sequences.
///
/// Forward and reverse frontiers are advanced one difference layer at a
/// time until they cross; the layer histories are then walked back from the
/// crossing point to reconstruct the edit path. An instance is built per
/// comparison and holds no state across calls.
pub struct LcsDiff<'d, S: Sequence> {
    original: &'d S,
    modified: &'d S,
    continue_processing_predicate: Option<&'d ContinueProcessingPredicate<'d>>,
    max_differences: usize,
}

enum RecursionPoint {
    Solved(Vec<Change>),
    Split {
        mid_original: usize,
        mid_modified: usize,
    },
}

impl<'d, S: Sequence> LcsDiff<'d, S> {
    pub fn new(original: &'d S, modified: &'d S) -> Self {
        Self {
            original,
            modified,
            continue_processing_predicate: None,
            max_differences: MAX_DIFFERENCES_HISTORY,
        }
    }

    pub fn with_continue_processing_predicate(
        mut self,
        predicate: &'d ContinueProcessingPredicate<'d>,
    ) -> Self {
        self.continue_processing_predicate = Some(predicate);
        self
    }

    pub fn with_max_differences(mut self, max_differences: usize) -> Self {
        self.max_differences = max_differences.max(1);
        self
    }

    pub fn compute_diff(&self, pretty: bool) -> DiffResult {
        let mut quit_early = false;
        let mut changes = self.compute_diff_recursive(
            0..self.original.element_count(),
            0..self.modified.element_count(),
            &mut quit_early,
        );

        if pretty && !quit_early {
            changes = prettify_changes(self.original, self.modified, changes);
        }

        DiffResult::new(quit_early, changes)
    }

    fn elements_equal(&self, original_index: usize, modified_index: usize) -> bool {
        self.original.element_hash(original_index) == self.modified.element_hash(modified_index)
    }

    fn compute_diff_recursive(
        &self,
        mut original: Range<usize>,
        mut modified: Range<usize>,
        quit_early: &mut bool,
    ) -> Vec<Change> {
        while original.start < original.end
            && modified.start < modified.end
            && self.elements_equal(original.start, modified.start)
        {
            original.start += 1;
            modified.start += 1;
        }
        while original.end > original.start
            && modified.end > modified.start
            && self.elements_equal(original.end - 1, modified.end - 1)
        {
            original.end -= 1;
            modified.end -= 1;
        }

        if original.is_empty() || modified.is_empty() {
            if !modified.is_empty() {
                return vec![Change::new(original.start, 0, modified.start, modified.len())];
            }
            if !original.is_empty() {
                return vec![Change::new(original.start, original.len(), modified.start, 0)];
            }
            return Vec::new();
        }

        match self.compute_recursion_point(&original, &modified, quit_early) {
            RecursionPoint::Solved(changes) => changes,
            RecursionPoint::Split {
                mid_original,
                mid_modified,
            } => {
                let left = self.compute_diff_recursive(
                    original.start..mid_original,
                    modified.start..mid_modified,
                    quit_early,
                );
                let right = if *quit_early {
                    // the left half already gave up, so the right half
                    // collapses into one coarse change
                    vec![Change::new(
                        mid_original,
                        original.end - mid_original,
                        mid_modified,
                        modified.end - mid_modified,
                    )]
                } else {
                    self.compute_diff_recursive(
                        mid_original..original.end,
                        mid_modified..modified.end,
                        quit_early,
                    )
                };
                concatenate_changes(left, right)
            }
        }
    }

    /// Runs the bidirectional layer search on a region whose first and last
    /// elements are known to differ on both sides.
    fn compute_recursion_point(
        &self,
        original: &Range<usize>,
        modified: &Range<usize>,
        quit_early: &mut bool,
    ) -> RecursionPoint {
        let m = original.len() as isize;
        let n = modified.len() as isize;
        let delta = m - n;
        let delta_is_odd = delta.rem_euclid(2) == 1;
        // diagonals run from -n (everything inserted) to m (everything
        // deleted); k = x - y throughout
        let (low, high) = (-n, m);

        let eq = |x: isize, y: isize| {
            self.elements_equal(original.start + x as usize, modified.start + y as usize)
        };
        // the reverse search is a forward search over both sequences
        // reversed; primed point (x', y') corresponds to (m - x', n - y')
        let eq_reversed = |x: isize, y: isize| eq(m - 1 - x, n - 1 - y);

        let mut forward = DiagonalRow::new(low, high);
        let mut reverse = DiagonalRow::new(low, high);
        // the caller trimmed the common prefix and suffix, so both layer-0
        // snakes stay at the origin
        let mut forward_history = vec![forward.snapshot(0, 0)];
        let mut reverse_history = vec![reverse.snapshot(0, 0)];

        // the frontiers must cross within this many layers
        let natural_limit = ((m + n) / 2 + 1) as usize;
        let layer_limit = natural_limit.min(self.max_differences);

        let mut furthest = (0isize, 0isize);
        let mut layers_done = 0;

        for d in 1..=layer_limit {
            let layer = d as isize;
            let k_low = clip_diagonal(-layer, low, high);
            let k_high = clip_diagonal(layer, low, high);

            furthest = (0, 0);
            let mut k = k_low;
            while k <= k_high {
                let mut x = if k == k_low || (k != k_high && forward.get(k - 1) < forward.get(k + 1))
                {
                    forward.get(k + 1)
                } else {
                    forward.get(k - 1) + 1
                };
                let mut y = x - k;
                let snake_start = x;
                while x < m && y < n && eq(x, y) {
                    x += 1;
                    y += 1;
                }
                forward.set(k, x);
                if x + y > furthest.0 + furthest.1 {
                    furthest = (x, y);
                }

                if delta_is_odd {
                    // the reverse frontier finished layer d - 1
                    let reverse_k = delta - k;
                    if reverse_k.abs() <= layer - 1 && (low..=high).contains(&reverse_k) {
                        let reverse_x = m - reverse.get(reverse_k);
                        if x >= reverse_x {
                            let reverse_y = reverse_x - k;
                            if snake_start <= reverse_x && d <= MAX_DIFFERENCES_HISTORY + 1 {
                                let forward_half = walk_path(
                                    &forward_history,
                                    d,
                                    reverse_x,
                                    reverse_y,
                                    low,
                                    high,
                                );
                                let reverse_half = walk_path(
                                    &reverse_history,
                                    d - 1,
                                    m - reverse_x,
                                    n - reverse_y,
                                    low,
                                    high,
                                );
                                return RecursionPoint::Solved(splice_halves(
                                    original,
                                    modified,
                                    forward_half,
                                    reverse_half,
                                ));
                            }
                            return RecursionPoint::Split {
                                mid_original: original.start + x as usize,
                                mid_modified: modified.start + y as usize,
                            };
                        }
                    }
                }
                k += 2;
            }
            layers_done = d;

            // a caller-supplied budget can abort the search between layers
            if let Some(predicate) = self.continue_processing_predicate {
                let matched = ((furthest.0 + furthest.1 - layer) / 2).max(0) as usize;
                if !predicate(original.start + furthest.0 as usize, matched) {
                    return self.give_up(
                        original,
                        modified,
                        d,
                        furthest,
                        &forward_history,
                        low,
                        high,
                        quit_early,
                    );
                }
            }

            let mut k = k_low;
            while k <= k_high {
                let mut x = if k == k_low || (k != k_high && reverse.get(k - 1) < reverse.get(k + 1))
                {
                    reverse.get(k + 1)
                } else {
                    reverse.get(k - 1) + 1
                };
                let mut y = x - k;
                let snake_start = x;
                while x < m && y < n && eq_reversed(x, y) {
                    x += 1;
                    y += 1;
                }
                reverse.set(k, x);

                if !delta_is_odd {
                    // the forward frontier finished layer d on the same
                    // absolute diagonal
                    let forward_k = delta - k;
                    if forward_k.abs() <= layer && (low..=high).contains(&forward_k) {
                        let forward_x = forward.get(forward_k);
                        let reverse_x = m - x;
                        if reverse_x <= forward_x {
                            let forward_y = forward_x - forward_k;
                            if m - snake_start >= forward_x && d <= MAX_DIFFERENCES_HISTORY + 1 {
                                let forward_half = walk_path(
                                    &forward_history,
                                    d,
                                    forward_x,
                                    forward_y,
                                    low,
                                    high,
                                );
                                let reverse_half = walk_path(
                                    &reverse_history,
                                    d,
                                    m - forward_x,
                                    n - forward_y,
                                    low,
                                    high,
                                );
                                return RecursionPoint::Solved(splice_halves(
                                    original,
                                    modified,
                                    forward_half,
                                    reverse_half,
                                ));
                            }
                            return RecursionPoint::Split {
                                mid_original: original.start + reverse_x as usize,
                                mid_modified: modified.start + (n - y) as usize,
                            };
                        }
                    }
                }
                k += 2;
            }

            if d <= MAX_DIFFERENCES_HISTORY {
                forward_history.push(forward.snapshot(k_low, k_high));
                reverse_history.push(reverse.snapshot(k_low, k_high));
            }
        }

        // the difference ceiling was hit without the frontiers crossing
        self.give_up(
            original,
            modified,
            layers_done,
            furthest,
            &forward_history,
            low,
            high,
            quit_early,
        )
    }

    /// Abandons the search: the path walked so far (when the history still
    /// covers it) stays fine-grained, and the rest of the region becomes
    /// one coarse change.
    #[allow(clippy::too_many_arguments)]
    fn give_up(
        &self,
        original: &Range<usize>,
        modified: &Range<usize>,
        layers: usize,
        furthest: (isize, isize),
        forward_history: &[DiagonalRow],
        low: isize,
        high: isize,
        quit_early: &mut bool,
    ) -> RecursionPoint {
        *quit_early = true;

        let m = original.len();
        let n = modified.len();
        let (resolved, tail_original, tail_modified) = if layers <= MAX_DIFFERENCES_HISTORY + 1 {
            let resolved = walk_path(forward_history, layers, furthest.0, furthest.1, low, high);
            (resolved, furthest.0 as usize, furthest.1 as usize)
        } else {
            (Vec::new(), 0, 0)
        };

        let mut changes = offset_changes(resolved, original.start, modified.start);
        if tail_original < m || tail_modified < n {
            let tail = Change::new(
                original.start + tail_original,
                m - tail_original,
                modified.start + tail_modified,
                n - tail_modified,
            );
            changes = concatenate_changes(changes, vec![tail]);
        }

        RecursionPoint::Solved(changes)
    }
}

/// Furthest-reaching x per diagonal, addressed by diagonal number.
struct DiagonalRow {
    base: isize,
    points: Vec<isize>,
}

impl DiagonalRow {
    fn new(low: isize, high: isize) -> Self {
        Self {
            base: low - 1,
            points: vec![0; (high - low + 3) as usize],
        }
    }

    fn get(&self, k: isize) -> isize {
        self.points[(k - self.base) as usize]
    }

    fn set(&mut self, k: isize, x: isize) {
        let base = self.base;
        self.points[(k - base) as usize] = x;
    }

    /// Copies the `low..=high` slice of the row, padded by one diagonal on
    /// each side so a path walk can read the neighbours of boundary
    /// diagonals.
    fn snapshot(&self, low: isize, high: isize) -> DiagonalRow {
        let low = (low - 1).max(self.base);
        let high = (high + 1).min(self.base + self.points.len() as isize - 1);
        let start = (low - self.base) as usize;
        let end = (high - self.base) as usize;
        DiagonalRow {
            base: low,
            points: self.points[start..=end].to_vec(),
        }
    }
}

/// Clamps a diagonal into `[low, high]`, preserving its parity so it stays
/// reachable within its layer.
fn clip_diagonal(k: isize, low: isize, high: isize) -> isize {
    if k < low {
        if (low - k) % 2 == 0 { low } else { low + 1 }
    } else if k > high {
        if (k - high) % 2 == 0 { high } else { high - 1 }
    } else {
        k
    }
}

/// Walks the frontier history back from `(x, y)` at `layers` differences to
/// the origin, folding the edit moves into sorted, merged changes in local
/// coordinates.
fn walk_path(
    history: &[DiagonalRow],
    layers: usize,
    x: isize,
    y: isize,
    low: isize,
    high: isize,
) -> Vec<Change> {
    let (mut x, mut y) = (x, y);
    // (is_insertion, x, y) per edit, collected end to start
    let mut moves: Vec<(bool, isize, isize)> = Vec::with_capacity(layers);

    for layer in (1..=layers).rev() {
        let snapshot = &history[layer - 1];
        let step = layer as isize;
        let k = x - y;
        let k_low = clip_diagonal(-step, low, high);
        let k_high = clip_diagonal(step, low, high);

        if k == k_low || (k != k_high && snapshot.get(k - 1) < snapshot.get(k + 1)) {
            // entered this diagonal by consuming one modified element
            x = snapshot.get(k + 1);
            y = x - (k + 1);
            moves.push((true, x, y));
        } else {
            x = snapshot.get(k - 1);
            y = x - (k - 1);
            moves.push((false, x, y));
        }
    }

    let mut changes: Vec<Change> = Vec::with_capacity(moves.len());
    for &(is_insertion, move_x, move_y) in moves.iter().rev() {
        let (move_x, move_y) = (move_x as usize, move_y as usize);
        match changes.last_mut() {
            Some(last) if last.original_end() == move_x && last.modified_end() == move_y => {
                if is_insertion {
                    last.modified_length += 1;
                } else {
                    last.original_length += 1;
                }
            }
            _ if is_insertion => changes.push(Change::new(move_x, 0, move_y, 1)),
            _ => changes.push(Change::new(move_x, 1, move_y, 0)),
        }
    }

    changes
}

fn offset_changes(
    changes: Vec<Change>,
    original_offset: usize,
    modified_offset: usize,
) -> Vec<Change> {
    changes
        .into_iter()
        .map(|change| {
            Change::new(
                original_offset + change.original_start,
                change.original_length,
                modified_offset + change.modified_start,
                change.modified_length,
            )
        })
        .collect()
}

/// Reflects changes found on the reversed sequences back into forward
/// coordinates and splices them after the forward half.
fn splice_halves(
    original: &Range<usize>,
    modified: &Range<usize>,
    forward_half: Vec<Change>,
    reverse_half: Vec<Change>,
) -> Vec<Change> {
    let m = original.len();
    let n = modified.len();
    let mirrored: Vec<Change> = reverse_half
        .into_iter()
        .rev()
        .map(|change| {
            Change::new(
                m - change.original_end(),
                change.original_length,
                n - change.modified_end(),
                change.modified_length,
            )
        })
        .collect();

    concatenate_changes(
        offset_changes(forward_half, original.start, modified.start),
        offset_changes(mirrored, original.start, modified.start),
    )
}
