//! Diff data structures and algorithms
//!
//! - `diff`: the shortest-edit-script engine, its post-processing pass and
//!   the line/character diff computer built on top of it

pub mod diff;
