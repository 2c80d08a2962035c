pub mod change;
pub mod hunk;
pub mod sequence;
