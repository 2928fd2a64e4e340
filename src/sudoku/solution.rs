//! Decoding and validation of Sudoku solutions

use super::encoder::SudokuEncoding;
use super::puzzle::{SudokuPuzzle, BLOCK, SIZE};
use crate::sat::Model;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A filled grid, digits 1..=9 (0 if a cell has no true digit variable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuSolution {
    pub grid: [[u8; SIZE]; SIZE],
}

impl SudokuSolution {
    /// Read each cell's digit off a satisfying model
    pub fn decode(encoding: &SudokuEncoding, model: &Model) -> Self {
        let mut grid = [[0u8; SIZE]; SIZE];
        for (i, row) in grid.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                if let Some(k) = (0..SIZE).find(|&k| model.value(encoding.literal(i, j, k))) {
                    *cell = k as u8 + 1;
                }
            }
        }
        Self { grid }
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.grid[row][col]
    }

    /// Rule violations of the grid with respect to a puzzle
    pub fn violations(&self, puzzle: &SudokuPuzzle) -> Vec<String> {
        let mut violations = Vec::new();

        for i in 0..SIZE {
            if !is_permutation((0..SIZE).map(|j| self.grid[i][j])) {
                violations.push(format!("row {} does not hold each digit once", i + 1));
            }
        }
        for j in 0..SIZE {
            if !is_permutation((0..SIZE).map(|i| self.grid[i][j])) {
                violations.push(format!("column {} does not hold each digit once", j + 1));
            }
        }
        for b in 0..SIZE {
            let (top, left) = ((b / BLOCK) * BLOCK, (b % BLOCK) * BLOCK);
            let cells = (0..SIZE).map(|k| self.grid[top + k / BLOCK][left + k % BLOCK]);
            if !is_permutation(cells) {
                violations.push(format!("block {} does not hold each digit once", b + 1));
            }
        }
        for hint in &puzzle.hints {
            let actual = self.grid[hint.row][hint.col];
            if actual as usize != hint.value + 1 {
                violations.push(format!(
                    "cell ({}, {}) holds {} but the hint is {}",
                    hint.row + 1,
                    hint.col + 1,
                    actual,
                    hint.value + 1
                ));
            }
        }

        violations
    }

    pub fn is_valid(&self, puzzle: &SudokuPuzzle) -> bool {
        self.violations(puzzle).is_empty()
    }
}

fn is_permutation(cells: impl Iterator<Item = u8>) -> bool {
    let mut seen = [false; SIZE + 1];
    for digit in cells {
        let digit = digit as usize;
        if digit == 0 || digit > SIZE || std::mem::replace(&mut seen[digit], true) {
            return false;
        }
    }
    true
}

impl fmt::Display for SudokuSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.grid.iter().enumerate() {
            if i > 0 && i % BLOCK == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for (j, &digit) in row.iter().enumerate() {
                if j > 0 && j % BLOCK == 0 {
                    write!(f, "| ")?;
                }
                if digit == 0 {
                    write!(f, ". ")?;
                } else {
                    write!(f, "{} ", digit)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
