use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use sediff::artifacts::diff::diff_computer::{DiffComputer, DiffOptions};
use sediff::artifacts::diff::lcs_diff::LcsDiff;
use sediff::commands::diff::DiffPrinter;
use sediff::commands::pager::OutputTarget;
use sediff::domain::sequence::CharSequence;

#[derive(Parser)]
#[command(
    name = "sediff",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A sequence diff tool",
    long_about = "Computes minimal diffs between two files using a \
    bidirectional shortest-edit-script search, and prints them either as \
    unified hunks or as an inline character-level edit script.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(index = 1, help = "The original file")]
    original: PathBuf,
    #[arg(index = 2, help = "The modified file")]
    modified: PathBuf,
    #[arg(
        short = 'U',
        long = "unified",
        default_value_t = 3,
        help = "Unchanged context lines shown around each hunk"
    )]
    context: usize,
    #[arg(long, help = "Diff character by character instead of line by line")]
    chars: bool,
    #[arg(long, help = "Accent intra-line changes inside hunks")]
    inline: bool,
    #[arg(
        long,
        help = "Skip the pass that shifts change boundaries toward whitespace and line breaks"
    )]
    no_pretty: bool,
    #[arg(long, help = "Ignore leading and trailing whitespace when matching lines")]
    ignore_trim_whitespace: bool,
    #[arg(
        long,
        value_name = "MILLIS",
        help = "Fall back to a coarser diff after this much computation time"
    )]
    timeout: Option<u64>,
    #[arg(long, help = "Do not page long output")]
    no_pager: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let original_text = std::fs::read_to_string(&cli.original)
        .with_context(|| format!("Failed to read {}", cli.original.display()))?;
    let modified_text = std::fs::read_to_string(&cli.modified)
        .with_context(|| format!("Failed to read {}", cli.modified.display()))?;

    let output = OutputTarget::detect(cli.no_pager);
    let printer = DiffPrinter::new(output.writer());

    if cli.chars {
        let original = CharSequence::from_text(&original_text);
        let modified = CharSequence::from_text(&modified_text);
        let deadline = cli
            .timeout
            .map(|millis| Instant::now() + Duration::from_millis(millis));
        let keep_going = move |_furthest_original: usize, _matched: usize| {
            deadline.is_none_or(|deadline| Instant::now() < deadline)
        };

        let result = LcsDiff::new(&original, &modified)
            .with_continue_processing_predicate(&keep_going)
            .compute_diff(!cli.no_pretty);

        printer.print_char_diff(&original_text, &modified_text, &result)?;
    } else {
        let original_lines: Vec<String> = original_text.lines().map(str::to_owned).collect();
        let modified_lines: Vec<String> = modified_text.lines().map(str::to_owned).collect();
        let options = DiffOptions {
            should_compute_char_changes: cli.inline,
            should_post_process_char_changes: cli.inline,
            should_ignore_trim_whitespace: cli.ignore_trim_whitespace,
            should_make_pretty_diff: !cli.no_pretty,
            max_computation_time: cli.timeout.map(Duration::from_millis),
        };

        let result = DiffComputer::new(&original_lines, &modified_lines, options).compute();

        printer.print_line_diff(
            &cli.original.display().to_string(),
            &cli.modified.display().to_string(),
            &original_lines,
            &modified_lines,
            &result,
            cli.context,
        )?;
    }

    drop(printer);
    output.finish()
}
