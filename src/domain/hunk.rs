use std::ops::Range;

use crate::domain::change::Change;

/// A group of nearby changes printed together with `context` unchanged
/// lines around them, unified-diff style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    original_range: Range<usize>,
    modified_range: Range<usize>,
    changes: Vec<Change>,
}

impl Hunk {
    /// Groups sorted changes into hunks. Two changes land in the same hunk
    /// when their context windows would touch or overlap.
    pub fn build(
        changes: &[Change],
        context: usize,
        original_count: usize,
        modified_count: usize,
    ) -> Vec<Hunk> {
        let mut hunks = Vec::new();
        let mut group: Vec<Change> = Vec::new();

        for &change in changes {
            if let Some(last) = group.last()
                && change.original_start > last.original_end() + 2 * context
            {
                Self::push_group(
                    &mut hunks,
                    std::mem::take(&mut group),
                    context,
                    original_count,
                    modified_count,
                );
            }
            group.push(change);
        }
        Self::push_group(&mut hunks, group, context, original_count, modified_count);

        hunks
    }

    fn push_group(
        hunks: &mut Vec<Hunk>,
        group: Vec<Change>,
        context: usize,
        original_count: usize,
        modified_count: usize,
    ) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            return;
        };

        let original_range = first.original_start.saturating_sub(context)
            ..(last.original_end() + context).min(original_count);
        let modified_range = first.modified_start.saturating_sub(context)
            ..(last.modified_end() + context).min(modified_count);

        hunks.push(Hunk {
            original_range,
            modified_range,
            changes: group,
        });
    }

    /// Git-style hunk header; starts are one-based, except that an empty
    /// side keeps the zero-based line it would be inserted after.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            display_start(&self.original_range),
            self.original_range.len(),
            display_start(&self.modified_range),
            self.modified_range.len(),
        )
    }

    pub fn original_range(&self) -> Range<usize> {
        self.original_range.clone()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }
}

fn display_start(range: &Range<usize>) -> usize {
    if range.is_empty() {
        range.start
    } else {
        range.start + 1
    }
}
