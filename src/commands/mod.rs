//! Command implementations
//!
//! - `diff`: rendering line and character diffs through an injected writer
//! - `pager`: routing long output through the minus pager when stdout is a
//!   terminal

pub mod diff;
pub mod pager;
