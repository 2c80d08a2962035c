//! Diff computation
//!
//! This module implements the diff pipeline:
//!
//! - `lcs_diff`: bidirectional shortest-edit-script search over sequences
//! - `post_process`: boundary shifting and merging for readable diffs
//! - `diff_computer`: line-level diffing with optional character refinement
//!
//! The engine works on any [`crate::domain::sequence::Sequence`]; lines and
//! characters are the two sequence kinds shipped with the crate.

pub mod diff_computer;
pub mod lcs_diff;
pub mod post_process;
