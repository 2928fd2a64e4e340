//! Numberlink: puzzle files, cell patterns, CNF encoding and decoding

pub mod encoder;
pub mod pattern;
pub mod puzzle;
pub mod solution;

pub use encoder::{EncodingOptions, NumberlinkClauseBreakdown, NumberlinkEncoding};
pub use pattern::{CellPattern, Direction};
pub use puzzle::{NumberlinkHint, NumberlinkPuzzle};
pub use solution::NumberlinkSolution;
