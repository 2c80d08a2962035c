use std::time::{Duration, Instant};

use derive_new::new;

use crate::domain::change::Change;
use crate::domain::sequence::{CharSequence, LineSequence, Position};

use super::lcs_diff::LcsDiff;
use super::post_process::merge_short_equal_runs;

/// Character changes separated by fewer matching characters than this get
/// folded into one change during post-processing.
const MINIMUM_MATCHING_CHARACTERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    pub should_compute_char_changes: bool,
    pub should_post_process_char_changes: bool,
    pub should_ignore_trim_whitespace: bool,
    pub should_make_pretty_diff: bool,
    pub max_computation_time: Option<Duration>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            should_compute_char_changes: false,
            should_post_process_char_changes: false,
            should_ignore_trim_whitespace: false,
            should_make_pretty_diff: true,
            max_computation_time: None,
        }
    }
}

/// An intra-line change nested inside a [`LineChange`]; positions are
/// absolute within the compared texts, ends exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct CharChange {
    pub original_start: Position,
    pub original_end: Position,
    pub modified_start: Position,
    pub modified_end: Position,
}

/// A line-level change, optionally refined with the character changes
/// inside the replaced region.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct LineChange {
    pub change: Change,
    pub char_changes: Option<Vec<CharChange>>,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct LineDiffResult {
    pub quit_early: bool,
    pub changes: Vec<LineChange>,
}

/// Line-level diffing between two texts with optional character-level
/// refinement per change, whitespace-insensitive line matching, and a
/// wall-clock budget. When the budget runs out the result is flagged
/// `quit_early` and stays valid, only coarser; this never fails.
#[derive(new)]
pub struct DiffComputer<'d> {
    original_lines: &'d [String],
    modified_lines: &'d [String],
    options: DiffOptions,
}

impl DiffComputer<'_> {
    pub fn compute(&self) -> LineDiffResult {
        let original = LineSequence::new(
            self.original_lines,
            self.options.should_ignore_trim_whitespace,
        );
        let modified = LineSequence::new(
            self.modified_lines,
            self.options.should_ignore_trim_whitespace,
        );

        let deadline = self
            .options
            .max_computation_time
            .map(|budget| Instant::now() + budget);
        let keep_going = move |_furthest_original: usize, _matched: usize| {
            deadline.is_none_or(|deadline| Instant::now() < deadline)
        };

        let result = LcsDiff::new(&original, &modified)
            .with_continue_processing_predicate(&keep_going)
            .compute_diff(self.options.should_make_pretty_diff);

        let quit_early = result.quit_early;
        let changes = result
            .changes
            .into_iter()
            .map(|change| {
                let char_changes = (self.options.should_compute_char_changes
                    && !quit_early
                    && change.original_length > 0
                    && change.modified_length > 0)
                    .then(|| self.compute_char_changes(&change, deadline));
                LineChange::new(change, char_changes)
            })
            .collect();

        LineDiffResult::new(quit_early, changes)
    }

    fn compute_char_changes(&self, change: &Change, deadline: Option<Instant>) -> Vec<CharChange> {
        let original =
            CharSequence::from_lines(self.original_lines, change.original_start..change.original_end());
        let modified =
            CharSequence::from_lines(self.modified_lines, change.modified_start..change.modified_end());

        let keep_going = move |_furthest_original: usize, _matched: usize| {
            deadline.is_none_or(|deadline| Instant::now() < deadline)
        };

        let result = LcsDiff::new(&original, &modified)
            .with_continue_processing_predicate(&keep_going)
            .compute_diff(true);

        let mut changes = result.changes;
        if self.options.should_post_process_char_changes {
            changes = merge_short_equal_runs(changes, MINIMUM_MATCHING_CHARACTERS);
        }

        changes
            .into_iter()
            .map(|change| {
                CharChange::new(
                    original.position_at(change.original_start),
                    original.position_at(change.original_end()),
                    modified.position_at(change.modified_start),
                    modified.position_at(change.modified_end()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|line| line.to_string()).collect()
    }

    fn apply_line_changes(
        original: &[String],
        modified: &[String],
        changes: &[LineChange],
    ) -> Vec<String> {
        let mut result = Vec::new();
        let mut cursor = 0;
        for line_change in changes {
            let change = &line_change.change;
            result.extend_from_slice(&original[cursor..change.original_start]);
            result.extend_from_slice(&modified[change.modified_start..change.modified_end()]);
            cursor = change.original_end();
        }
        result.extend_from_slice(&original[cursor..]);
        result
    }

    #[rstest]
    fn reports_line_level_changes() {
        let original = lines(&["one", "two", "three"]);
        let modified = lines(&["one", "2", "three"]);

        let result = DiffComputer::new(&original, &modified, DiffOptions::default()).compute();

        assert!(!result.quit_early);
        assert_eq!(
            result.changes,
            vec![LineChange::new(Change::new(1, 1, 1, 1), None)]
        );
    }

    #[rstest]
    fn trim_whitespace_matching_ignores_reindentation() {
        let original = lines(&["  fn main() {", "}"]);
        let modified = lines(&["fn main() {", "}"]);

        let strict = DiffComputer::new(&original, &modified, DiffOptions::default()).compute();
        let lax = DiffComputer::new(
            &original,
            &modified,
            DiffOptions {
                should_ignore_trim_whitespace: true,
                ..DiffOptions::default()
            },
        )
        .compute();

        assert_eq!(strict.changes.len(), 1);
        assert_eq!(lax.changes, vec![]);
    }

    #[rstest]
    fn char_changes_pinpoint_the_modified_span() {
        let original = lines(&["the quick fox"]);
        let modified = lines(&["the slow fox"]);
        let options = DiffOptions {
            should_compute_char_changes: true,
            should_post_process_char_changes: true,
            ..DiffOptions::default()
        };

        let result = DiffComputer::new(&original, &modified, options).compute();

        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].change, Change::new(0, 1, 0, 1));
        assert_eq!(
            result.changes[0].char_changes,
            Some(vec![CharChange::new(
                Position::new(0, 4),
                Position::new(0, 9),
                Position::new(0, 4),
                Position::new(0, 8),
            )])
        );
    }

    #[rstest]
    fn char_changes_are_skipped_for_pure_insertions() {
        let original = lines(&["one"]);
        let modified = lines(&["one", "two"]);
        let options = DiffOptions {
            should_compute_char_changes: true,
            ..DiffOptions::default()
        };

        let result = DiffComputer::new(&original, &modified, options).compute();

        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].char_changes, None);
    }

    #[rstest]
    fn an_exhausted_budget_degrades_instead_of_failing() {
        let original = lines(&["a", "b", "c"]);
        let modified = lines(&["x", "y", "z"]);
        let options = DiffOptions {
            max_computation_time: Some(Duration::ZERO),
            ..DiffOptions::default()
        };

        let result = DiffComputer::new(&original, &modified, options).compute();

        assert!(result.quit_early);
        assert_eq!(
            apply_line_changes(&original, &modified, &result.changes),
            modified
        );
    }
}
