//! sediff: a minimal-edit-script differ for lines and characters.
//!
//! The core is a bidirectional Myers-style shortest-edit-script search
//! ([`artifacts::diff::lcs_diff::LcsDiff`]) over hashed element sequences,
//! followed by a prettify pass that shifts change boundaries toward natural
//! ones (line breaks, whitespace). Consumers build on it through
//! [`artifacts::diff::diff_computer::DiffComputer`] for line-level diffs with
//! optional character refinement, and through the hunk/rendering layer used
//! by the CLI.

pub mod artifacts;
pub mod commands;
pub mod domain;
