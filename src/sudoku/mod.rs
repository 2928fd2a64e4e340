//! 9x9 Sudoku: puzzle files, CNF encoding and decoding

pub mod encoder;
pub mod puzzle;
pub mod solution;

pub use encoder::{SudokuClauseBreakdown, SudokuEncoding};
pub use puzzle::{SudokuHint, SudokuPuzzle};
pub use solution::SudokuSolution;
