use derive_new::new;

/// One contiguous difference between two sequences: the span
/// `original_start..original_start + original_length` of the original was
/// replaced by the span `modified_start..modified_start + modified_length`
/// of the modified sequence. A zero length on one side makes the change a
/// pure insertion or deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Change {
    pub original_start: usize,
    pub original_length: usize,
    pub modified_start: usize,
    pub modified_length: usize,
}

impl Change {
    pub fn original_end(&self) -> usize {
        self.original_start + self.original_length
    }

    pub fn modified_end(&self) -> usize {
        self.modified_start + self.modified_length
    }

    pub fn is_insertion(&self) -> bool {
        self.original_length == 0
    }

    pub fn is_deletion(&self) -> bool {
        self.modified_length == 0
    }
}

/// The outcome of a diff computation. `quit_early` reports that the search
/// gave up before finding a minimal script; the changes are then coarser but
/// still reconstruct the modified sequence from the original.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct DiffResult {
    pub quit_early: bool,
    pub changes: Vec<Change>,
}

pub(crate) fn changes_touch(left: &Change, right: &Change) -> bool {
    left.original_end() >= right.original_start || left.modified_end() >= right.modified_start
}

/// Joins `left` with a `right` that starts at or after it.
pub(crate) fn join_changes(left: &Change, right: &Change) -> Change {
    Change::new(
        left.original_start,
        right.original_end() - left.original_start,
        left.modified_start,
        right.modified_end() - left.modified_start,
    )
}

/// Appends `right` after `left`, joining changes that touch at the seam so
/// the result stays sorted and non-overlapping.
pub(crate) fn concatenate_changes(mut left: Vec<Change>, right: Vec<Change>) -> Vec<Change> {
    for change in right {
        match left.last_mut() {
            Some(last) if changes_touch(last, &change) => *last = join_changes(last, &change),
            _ => left.push(change),
        }
    }
    left
}

pub(crate) fn merge_touching_changes(changes: Vec<Change>) -> Vec<Change> {
    concatenate_changes(Vec::new(), changes)
}
