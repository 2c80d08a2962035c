use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::io::Write;

use colored::Colorize;

use crate::artifacts::diff::diff_computer::{LineChange, LineDiffResult};
use crate::domain::change::{Change, DiffResult};
use crate::domain::hunk::Hunk;
use crate::domain::sequence::Position;

/// Per-line character ranges to accent inside printed hunk lines.
type HighlightMap = HashMap<usize, Vec<(usize, usize)>>;

#[derive(Clone, Copy)]
enum Paint {
    Removed,
    Added,
}

/// Prints diff results through an injected writer, so output can go to
/// stdout, the pager, or a test buffer alike.
pub struct DiffPrinter {
    writer: RefCell<Box<dyn Write>>,
}

impl DiffPrinter {
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer: RefCell::new(writer),
        }
    }

    fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    /// Prints a line diff as unified hunks with `context` unchanged lines
    /// around each hunk. Identical files produce no output at all.
    pub fn print_line_diff(
        &self,
        original_path: &str,
        modified_path: &str,
        original_lines: &[String],
        modified_lines: &[String],
        result: &LineDiffResult,
        context: usize,
    ) -> anyhow::Result<()> {
        if result.changes.is_empty() {
            return Ok(());
        }

        writeln!(self.writer(), "{}", format!("--- {original_path}").bold())?;
        writeln!(self.writer(), "{}", format!("+++ {modified_path}").bold())?;

        let changes: Vec<Change> = result
            .changes
            .iter()
            .map(|line_change| line_change.change)
            .collect();
        let (original_highlights, modified_highlights) = collect_highlights(&result.changes);

        for hunk in Hunk::build(
            &changes,
            context,
            original_lines.len(),
            modified_lines.len(),
        ) {
            self.print_hunk(
                &hunk,
                original_lines,
                modified_lines,
                &original_highlights,
                &modified_highlights,
            )?;
        }

        Ok(())
    }

    fn print_hunk(
        &self,
        hunk: &Hunk,
        original_lines: &[String],
        modified_lines: &[String],
        original_highlights: &HighlightMap,
        modified_highlights: &HighlightMap,
    ) -> anyhow::Result<()> {
        writeln!(self.writer(), "{}", hunk.header().cyan())?;

        let mut cursor = hunk.original_range().start;
        for change in hunk.changes() {
            for line in &original_lines[cursor..change.original_start] {
                writeln!(self.writer(), " {line}")?;
            }
            for index in change.original_start..change.original_end() {
                let line = paint_line(
                    &original_lines[index],
                    original_highlights.get(&index),
                    Paint::Removed,
                );
                writeln!(self.writer(), "{}{line}", "-".red())?;
            }
            for index in change.modified_start..change.modified_end() {
                let line = paint_line(
                    &modified_lines[index],
                    modified_highlights.get(&index),
                    Paint::Added,
                );
                writeln!(self.writer(), "{}{line}", "+".green())?;
            }
            cursor = change.original_end();
        }
        for line in &original_lines[cursor..hunk.original_range().end] {
            writeln!(self.writer(), " {line}")?;
        }

        Ok(())
    }

    /// Prints a character diff as a single inline edit script, with deleted
    /// runs in `[-...]` and inserted runs in `[+...]`.
    pub fn print_char_diff(
        &self,
        original_text: &str,
        modified_text: &str,
        result: &DiffResult,
    ) -> anyhow::Result<()> {
        if result.changes.is_empty() {
            return Ok(());
        }

        let original: Vec<char> = original_text.chars().collect();
        let modified: Vec<char> = modified_text.chars().collect();

        let mut rendered = String::new();
        let mut cursor = 0;
        for change in &result.changes {
            rendered.extend(&original[cursor..change.original_start]);
            if change.original_length > 0 {
                let deleted: String = original[change.original_start..change.original_end()]
                    .iter()
                    .collect();
                rendered.push_str(&format!("[-{}]", deleted.red()));
            }
            if change.modified_length > 0 {
                let inserted: String = modified[change.modified_start..change.modified_end()]
                    .iter()
                    .collect();
                rendered.push_str(&format!("[+{}]", inserted.green()));
            }
            cursor = change.original_end();
        }
        rendered.extend(&original[cursor..]);

        writeln!(self.writer(), "{rendered}")?;

        Ok(())
    }
}

fn collect_highlights(changes: &[LineChange]) -> (HighlightMap, HighlightMap) {
    let mut original = HighlightMap::new();
    let mut modified = HighlightMap::new();

    for line_change in changes {
        let Some(char_changes) = &line_change.char_changes else {
            continue;
        };
        for char_change in char_changes {
            push_span(&mut original, char_change.original_start, char_change.original_end);
            push_span(&mut modified, char_change.modified_start, char_change.modified_end);
        }
    }

    (original, modified)
}

fn push_span(map: &mut HighlightMap, start: Position, end: Position) {
    for line in start.line..=end.line {
        let from = if line == start.line { start.column } else { 0 };
        let to = if line == end.line { end.column } else { usize::MAX };
        if from < to {
            map.entry(line).or_default().push((from, to));
        }
    }
}

fn paint_line(line: &str, ranges: Option<&Vec<(usize, usize)>>, paint: Paint) -> String {
    let Some(ranges) = ranges else {
        return color(line, paint, false);
    };

    let chars: Vec<char> = line.chars().collect();
    let mut rendered = String::new();
    let mut cursor = 0;
    for &(from, to) in ranges {
        let from = from.min(chars.len());
        let to = to.min(chars.len()).max(from);
        if cursor < from {
            rendered.push_str(&color(&collect(&chars[cursor..from]), paint, false));
        }
        if from < to {
            rendered.push_str(&color(&collect(&chars[from..to]), paint, true));
        }
        cursor = cursor.max(to);
    }
    if cursor < chars.len() {
        rendered.push_str(&color(&collect(&chars[cursor..]), paint, false));
    }

    rendered
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

fn color(text: &str, paint: Paint, accent: bool) -> String {
    let styled = match paint {
        Paint::Removed => text.red(),
        Paint::Added => text.green(),
    };
    let styled = if accent {
        styled.bold().underline()
    } else {
        styled
    };
    styled.to_string()
}
