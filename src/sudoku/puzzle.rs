//! Sudoku puzzle definition and problem-file parsing

use crate::error::{PuzzleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Side length of the grid
pub const SIZE: usize = 9;
/// Side length of a block
pub const BLOCK: usize = 3;

/// A pre-filled cell, all fields 0-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuHint {
    pub row: usize,
    pub col: usize,
    pub value: usize,
}

impl SudokuHint {
    pub fn new(row: usize, col: usize, value: usize) -> Self {
        Self { row, col, value }
    }
}

/// A 9x9 Sudoku with its hints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuPuzzle {
    pub rows: usize,
    pub cols: usize,
    pub hints: Vec<SudokuHint>,
}

impl SudokuPuzzle {
    /// Create a puzzle, checking dimensions and hints
    pub fn new(rows: usize, cols: usize, hints: Vec<SudokuHint>) -> Result<Self> {
        if rows != SIZE || cols != SIZE {
            return Err(PuzzleError::malformed(format!(
                "only {}x{} sudoku is supported, got {}x{}",
                SIZE, SIZE, rows, cols
            )));
        }

        let mut seen = [[false; SIZE]; SIZE];
        for hint in &hints {
            if hint.row >= rows || hint.col >= cols {
                return Err(PuzzleError::malformed(format!(
                    "hint ({}, {}) is outside the {}x{} grid",
                    hint.row, hint.col, rows, cols
                )));
            }
            if hint.value >= SIZE {
                return Err(PuzzleError::malformed(format!(
                    "hint value {} at ({}, {}) is out of range",
                    hint.value, hint.row, hint.col
                )));
            }
            if std::mem::replace(&mut seen[hint.row][hint.col], true) {
                return Err(PuzzleError::malformed(format!(
                    "cell ({}, {}) has more than one hint",
                    hint.row, hint.col
                )));
            }
        }

        Ok(Self { rows, cols, hints })
    }

    /// A 9x9 grid without hints
    pub fn empty() -> Self {
        Self {
            rows: SIZE,
            cols: SIZE,
            hints: Vec::new(),
        }
    }

    /// Build a puzzle from 9 rows of digits where 0 marks a blank cell
    pub fn from_digits(grid: &[[u8; SIZE]; SIZE]) -> Result<Self> {
        let mut hints = Vec::new();
        for (row, line) in grid.iter().enumerate() {
            for (col, &digit) in line.iter().enumerate() {
                if digit != 0 {
                    if digit as usize > SIZE {
                        return Err(PuzzleError::malformed(format!(
                            "digit {} at ({}, {}) is out of range",
                            digit, row, col
                        )));
                    }
                    hints.push(SudokuHint::new(row, col, digit as usize - 1));
                }
            }
        }
        Self::new(SIZE, SIZE, hints)
    }

    /// Hinted value of a cell, 0-indexed
    pub fn hint_at(&self, row: usize, col: usize) -> Option<usize> {
        self.hints
            .iter()
            .find(|h| h.row == row && h.col == col)
            .map(|h| h.value)
    }

    /// Parse the `p sudoku <rows> <cols>` format with 1-indexed hint lines
    pub fn parse(content: &str) -> Result<Self> {
        let mut dims: Option<(usize, usize)> = None;
        let mut hints = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('c') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts[0] == "p" {
                if parts.len() != 4 || parts[1] != "sudoku" {
                    return Err(PuzzleError::malformed_at(line_no, "expected 'p sudoku <rows> <cols>'"));
                }
                let rows = parse_number(parts[2], line_no)?;
                let cols = parse_number(parts[3], line_no)?;
                dims = Some((rows, cols));
                continue;
            }

            if dims.is_none() {
                return Err(PuzzleError::malformed_at(line_no, "hint before 'p sudoku' header"));
            }
            if parts.len() != 3 {
                return Err(PuzzleError::malformed_at(
                    line_no,
                    format!("expected '<row> <col> <value>', got {} fields", parts.len()),
                ));
            }
            let row = parse_number(parts[0], line_no)?;
            let col = parse_number(parts[1], line_no)?;
            let value = parse_number(parts[2], line_no)?;
            if row == 0 || col == 0 || value == 0 {
                return Err(PuzzleError::malformed_at(line_no, "hint fields are 1-indexed"));
            }
            hints.push(SudokuHint::new(row - 1, col - 1, value - 1));
        }

        let (rows, cols) = dims.ok_or_else(|| PuzzleError::malformed("missing 'p sudoku' header"))?;
        Self::new(rows, cols, hints)
    }

    /// Load a puzzle from a problem file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Render in the problem-file format
    pub fn to_problem_string(&self) -> String {
        let mut out = format!("p sudoku {} {}\n", self.rows, self.cols);
        for hint in &self.hints {
            out.push_str(&format!("{} {} {}\n", hint.row + 1, hint.col + 1, hint.value + 1));
        }
        out
    }
}

fn parse_number(token: &str, line_no: usize) -> Result<usize> {
    token
        .parse()
        .map_err(|_| PuzzleError::malformed_at(line_no, format!("invalid number '{}'", token)))
}
