//! Puzzle SAT Solver
//!
//! This library compiles Sudoku and Numberlink puzzles into CNF formulas,
//! solves them with CaDiCaL and decodes the models back into solutions.

pub mod config;
pub mod error;
pub mod numberlink;
pub mod problem;
pub mod sat;
pub mod sudoku;
pub mod utils;

pub use config::Settings;
pub use error::PuzzleError;
pub use problem::{NumberlinkProblem, Outcome, Puzzle, SudokuProblem};

use anyhow::Result;
use numberlink::NumberlinkSolution;
use sudoku::SudokuSolution;

/// Solve a Sudoku problem file with the given settings
pub fn solve_sudoku_file<P: AsRef<std::path::Path>>(settings: Settings, path: P) -> Result<Outcome<SudokuSolution>> {
    let puzzle = sudoku::SudokuPuzzle::load(path)?;
    SudokuProblem::new(settings, puzzle).solve()
}

/// Solve a Numberlink problem file with the given settings
pub fn solve_numberlink_file<P: AsRef<std::path::Path>>(
    settings: Settings,
    path: P,
) -> Result<Outcome<NumberlinkSolution>> {
    let puzzle = numberlink::NumberlinkPuzzle::load(path)?;
    NumberlinkProblem::new(settings, puzzle)?.solve()
}
