use crate::domain::change::{Change, join_changes, merge_touching_changes};
use crate::domain::sequence::Sequence;

/// Shifts change boundaries toward positions that read well without
/// altering what the changes reconstruct.
///
/// Each change first slides as far down (toward the end) as neighbouring
/// equal elements allow, which cuddles changes up against their successors;
/// touching changes are merged; each change then slides back up to the
/// position with the best boundary score.
pub(crate) fn prettify_changes<S: Sequence>(
    original: &S,
    modified: &S,
    mut changes: Vec<Change>,
) -> Vec<Change> {
    for i in 0..changes.len() {
        let (original_stop, modified_stop) = match changes.get(i + 1) {
            Some(next) => (next.original_start, next.modified_start),
            None => (original.element_count(), modified.element_count()),
        };
        let check_original = changes[i].original_length > 0;
        let check_modified = changes[i].modified_length > 0;

        loop {
            let change = &changes[i];
            if change.original_end() >= original_stop || change.modified_end() >= modified_stop {
                break;
            }
            if check_original
                && original.element_hash(change.original_start)
                    != original.element_hash(change.original_end())
            {
                break;
            }
            if check_modified
                && modified.element_hash(change.modified_start)
                    != modified.element_hash(change.modified_end())
            {
                break;
            }

            // elements can hash equal without being strictly equal (trimmed
            // lines); never slide a strictly-equal boundary pair into the
            // change while leaving a lax pair outside
            let start_strict =
                strict_equal(original, change.original_start, modified, change.modified_start);
            let end_strict =
                strict_equal(original, change.original_end(), modified, change.modified_end());
            if end_strict && !start_strict {
                break;
            }

            changes[i].original_start += 1;
            changes[i].modified_start += 1;
        }
    }

    changes = merge_touching_changes(changes);

    for i in (0..changes.len()).rev() {
        let (original_floor, modified_floor) = if i > 0 {
            (changes[i - 1].original_end(), changes[i - 1].modified_end())
        } else {
            (0, 0)
        };
        let check_original = changes[i].original_length > 0;
        let check_modified = changes[i].modified_length > 0;

        let mut best_delta = 0;
        let mut best_score = boundary_score_at(original, modified, &changes[i], 0);

        let mut delta = 1;
        loop {
            let change = &changes[i];
            if change.original_start < original_floor + delta
                || change.modified_start < modified_floor + delta
            {
                break;
            }
            if check_original
                && original.element_hash(change.original_start - delta)
                    != original.element_hash(change.original_end() - delta)
            {
                break;
            }
            if check_modified
                && modified.element_hash(change.modified_start - delta)
                    != modified.element_hash(change.modified_end() - delta)
            {
                break;
            }

            let score = boundary_score_at(original, modified, &changes[i], delta);
            if score > best_score {
                best_score = score;
                best_delta = delta;
            }
            delta += 1;
        }

        changes[i].original_start -= best_delta;
        changes[i].modified_start -= best_delta;
    }

    merge_touching_changes(changes)
}

/// Folds changes separated by an unchanged run shorter than `minimum_run`
/// elements on both sides into a single change.
pub(crate) fn merge_short_equal_runs(changes: Vec<Change>, minimum_run: usize) -> Vec<Change> {
    let mut merged: Vec<Change> = Vec::with_capacity(changes.len());
    for change in changes {
        match merged.last_mut() {
            Some(last)
                if change.original_start < last.original_end() + minimum_run
                    && change.modified_start < last.modified_end() + minimum_run =>
            {
                *last = join_changes(last, &change);
            }
            _ => merged.push(change),
        }
    }
    merged
}

fn strict_equal<S: Sequence>(
    original: &S,
    original_index: usize,
    modified: &S,
    modified_index: usize,
) -> bool {
    match (
        original.strict_element(original_index),
        modified.strict_element(modified_index),
    ) {
        (Some(left), Some(right)) => left == right,
        _ => true,
    }
}

fn boundary_score_at<S: Sequence>(
    original: &S,
    modified: &S,
    change: &Change,
    delta: usize,
) -> u32 {
    original.boundary_score(change.original_start - delta)
        + original.boundary_score(change.original_end() - delta)
        + modified.boundary_score(change.modified_start - delta)
        + modified.boundary_score(change.modified_end() - delta)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::artifacts::diff::lcs_diff::LcsDiff;
    use crate::domain::sequence::{CharSequence, LineSequence};

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|line| line.to_string()).collect()
    }

    #[rstest]
    fn an_insertion_slides_to_the_whitespace_boundary() {
        let original = CharSequence::from_text("foo bar");
        let modified = CharSequence::from_text("foo baz bar");

        let result = LcsDiff::new(&original, &modified).compute_diff(true);

        // without the pass the insertion would sit mid-word at "foo ba|z ba|r"
        assert_eq!(result.changes, vec![Change::new(4, 0, 4, 4)]);
    }

    #[rstest]
    fn a_duplicated_line_stays_where_the_engine_found_it_absent_a_better_boundary() {
        let original = lines(&["a", "b", "b", "c"]);
        let modified = lines(&["a", "b", "b", "b", "c"]);
        let original = LineSequence::new(&original, false);
        let modified = LineSequence::new(&modified, false);

        let result = LcsDiff::new(&original, &modified).compute_diff(true);

        assert_eq!(result.changes, vec![Change::new(3, 0, 3, 1)]);
    }

    #[rstest]
    fn an_insertion_slides_toward_a_blank_line_boundary() {
        let original = lines(&["fn a() {}", "", "fn c() {}"]);
        let modified = lines(&["fn a() {}", "", "fn b() {}", "", "fn c() {}"]);
        let original = LineSequence::new(&original, false);
        let modified = LineSequence::new(&modified, false);

        let result = LcsDiff::new(&original, &modified).compute_diff(true);

        // the inserted block is ["fn b() {}", ""] rather than a split
        // straddling the existing blank line
        assert_eq!(result.changes.len(), 1);
        let change = result.changes[0];
        assert_eq!(change.original_length, 0);
        assert_eq!(change.modified_length, 2);
    }

    #[rstest]
    fn short_equal_runs_between_changes_are_folded() {
        let changes = vec![Change::new(0, 1, 0, 1), Change::new(3, 1, 3, 1)];

        assert_eq!(
            merge_short_equal_runs(changes, 3),
            vec![Change::new(0, 4, 0, 4)]
        );
    }

    #[rstest]
    fn long_equal_runs_between_changes_are_kept() {
        let changes = vec![Change::new(0, 1, 0, 1), Change::new(4, 1, 4, 1)];

        assert_eq!(merge_short_equal_runs(changes.clone(), 3), changes);
    }
}
