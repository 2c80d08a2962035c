use std::hash::{DefaultHasher, Hash, Hasher};
use std::ops::Range;

use derive_new::new;

/// A (line, column) position, zero-based, columns counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, new)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// An indexed sequence the diff engine can compare.
///
/// Elements compare equal when their hashes are equal; a sequence whose
/// hashes are coarser than the raw elements (e.g. trimmed lines) can expose
/// the raw elements through `strict_element` so the prettify pass prefers
/// exactly-equal boundaries when sliding changes around.
pub trait Sequence {
    fn element_count(&self) -> usize;

    fn element_hash(&self, index: usize) -> u64;

    fn strict_element(&self, _index: usize) -> Option<&str> {
        None
    }

    /// Quality score for cutting the sequence just before `index`
    /// (`index == element_count()` addresses the cut after the last
    /// element). Higher scores attract change boundaries during the
    /// prettify pass.
    fn boundary_score(&self, _index: usize) -> u32 {
        0
    }
}

/// A character sequence that remembers the (line, column) position of every
/// character, so character-level changes can be mapped back into document
/// coordinates.
pub struct CharSequence {
    chars: Vec<char>,
    positions: Vec<Position>,
    base_line: usize,
}

impl CharSequence {
    pub fn from_text(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut positions = Vec::with_capacity(text.len());
        let mut position = Position::new(0, 0);

        for ch in text.chars() {
            chars.push(ch);
            positions.push(position);
            if ch == '\n' {
                position = Position::new(position.line + 1, 0);
            } else {
                position.column += 1;
            }
        }

        Self {
            chars,
            positions,
            base_line: 0,
        }
    }

    /// Builds the character view of `lines[range]`, with an implicit newline
    /// between consecutive lines. Positions are line indices into `lines`,
    /// not offsets into the range.
    pub fn from_lines(lines: &[String], range: Range<usize>) -> Self {
        let mut chars = Vec::new();
        let mut positions = Vec::new();

        for line_index in range.clone() {
            let mut column = 0;
            for ch in lines[line_index].chars() {
                chars.push(ch);
                positions.push(Position::new(line_index, column));
                column += 1;
            }
            if line_index + 1 < range.end {
                chars.push('\n');
                positions.push(Position::new(line_index, column));
            }
        }

        Self {
            chars,
            positions,
            base_line: range.start,
        }
    }

    /// Position of the character at `index`; `index == element_count()`
    /// addresses the position one past the last character.
    pub fn position_at(&self, index: usize) -> Position {
        if let Some(&position) = self.positions.get(index) {
            return position;
        }
        match self.positions.last() {
            Some(&last) => Position::new(last.line, last.column + 1),
            None => Position::new(self.base_line, 0),
        }
    }
}

impl Sequence for CharSequence {
    fn element_count(&self) -> usize {
        self.chars.len()
    }

    fn element_hash(&self, index: usize) -> u64 {
        self.chars[index] as u64
    }

    fn boundary_score(&self, index: usize) -> u32 {
        let before = index.checked_sub(1).and_then(|i| self.chars.get(i));
        let after = self.chars.get(index);

        match (before, after) {
            (None, _) | (_, None) => 5,
            (Some('\n'), _) | (_, Some('\n')) => 4,
            (Some(before), _) if before.is_whitespace() => 3,
            (_, Some(after)) if after.is_whitespace() => 2,
            _ => 0,
        }
    }
}

/// A line sequence comparing lines by hash, optionally after trimming
/// leading and trailing whitespace. With trimming on, `strict_element`
/// still exposes the raw lines for exact-equality tie-breaking.
pub struct LineSequence<'a> {
    lines: &'a [String],
    hashes: Vec<u64>,
}

impl<'a> LineSequence<'a> {
    pub fn new(lines: &'a [String], ignore_trim_whitespace: bool) -> Self {
        let hashes = lines
            .iter()
            .map(|line| {
                let comparable = if ignore_trim_whitespace {
                    line.trim()
                } else {
                    line.as_str()
                };
                let mut hasher = DefaultHasher::new();
                comparable.hash(&mut hasher);
                hasher.finish()
            })
            .collect();

        Self { lines, hashes }
    }
}

impl Sequence for LineSequence<'_> {
    fn element_count(&self) -> usize {
        self.lines.len()
    }

    fn element_hash(&self, index: usize) -> u64 {
        self.hashes[index]
    }

    fn strict_element(&self, index: usize) -> Option<&str> {
        Some(&self.lines[index])
    }

    fn boundary_score(&self, index: usize) -> u32 {
        if index == 0 || index == self.lines.len() {
            return 3;
        }
        let blank_before = self.lines[index - 1].trim().is_empty();
        let blank_after = self.lines[index].trim().is_empty();
        if blank_before || blank_after { 2 } else { 0 }
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

    #[rstest]
    fn char_positions_track_lines_and_columns() {
        let sequence = CharSequence::from_text("ab\ncd");

        assert_eq!(sequence.element_count(), 5);
        assert_eq!(sequence.position_at(0), Position::new(0, 0));
        assert_eq!(sequence.position_at(2), Position::new(0, 2));
        assert_eq!(sequence.position_at(3), Position::new(1, 0));
        assert_eq!(sequence.position_at(5), Position::new(1, 2));
    }

    #[rstest]
    fn char_view_of_a_line_range_keeps_absolute_line_numbers() {
        let lines = lines(&["zero", "one", "two"]);
        let sequence = CharSequence::from_lines(&lines, 1..3);

        // "one\ntwo"
        assert_eq!(sequence.element_count(), 7);
        assert_eq!(sequence.position_at(0), Position::new(1, 0));
        assert_eq!(sequence.position_at(3), Position::new(1, 3));
        assert_eq!(sequence.position_at(4), Position::new(2, 0));
        assert_eq!(sequence.position_at(7), Position::new(2, 3));
    }

    #[rstest]
    fn empty_char_view_positions_at_the_base_line() {
        let lines = lines(&["zero", "", "two"]);
        let sequence = CharSequence::from_lines(&lines, 1..2);

        assert_eq!(sequence.element_count(), 0);
        assert_eq!(sequence.position_at(0), Position::new(1, 0));
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, true)]
    fn trimmed_line_hashes_ignore_indentation(
        #[case] ignore_trim_whitespace: bool,
        #[case] expected_equal: bool,
    ) {
        let original = lines(&["  indented"]);
        let modified = lines(&["indented  "]);
        let original = LineSequence::new(&original, ignore_trim_whitespace);
        let modified = LineSequence::new(&modified, ignore_trim_whitespace);

        assert_eq!(
            original.element_hash(0) == modified.element_hash(0),
            expected_equal
        );
    }

    #[rstest]
    fn char_boundaries_prefer_edges_then_newlines_then_spaces() {
        let sequence = CharSequence::from_text("a b\nc");

        assert_eq!(sequence.boundary_score(0), 5);
        assert_eq!(sequence.boundary_score(5), 5);
        assert_eq!(sequence.boundary_score(4), 4);
        assert_eq!(sequence.boundary_score(2), 3);
        assert_eq!(sequence.boundary_score(1), 2);
    }

    #[rstest]
    fn line_boundaries_prefer_edges_then_blank_lines() {
        let lines = lines(&["fn main() {", "}", "", "fn other() {"]);
        let sequence = LineSequence::new(&lines, false);

        assert_eq!(sequence.boundary_score(0), 3);
        assert_eq!(sequence.boundary_score(4), 3);
        assert_eq!(sequence.boundary_score(2), 2);
        assert_eq!(sequence.boundary_score(3), 2);
        assert_eq!(sequence.boundary_score(1), 0);
    }
}
