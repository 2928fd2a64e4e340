//! CNF encoding of 9x9 Sudoku

use super::puzzle::{SudokuPuzzle, BLOCK, SIZE};
use crate::sat::{Formula, Literal};
use itertools::Itertools;
use log::{debug, info};

/// A Sudoku formula with its `(row, col, digit)` variable table
#[derive(Debug, Clone)]
pub struct SudokuEncoding {
    pub formula: Formula,
    /// `p[i][j][k]` flattened as `(i * SIZE + j) * SIZE + k`
    cells: Vec<Literal>,
    pub breakdown: SudokuClauseBreakdown,
}

/// Number of clauses produced by each constraint family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SudokuClauseBreakdown {
    pub cell_domain: usize,
    pub block: usize,
    pub row: usize,
    pub column: usize,
    pub hints: usize,
}

impl SudokuClauseBreakdown {
    pub fn total(&self) -> usize {
        self.cell_domain + self.block + self.row + self.column + self.hints
    }
}

impl SudokuEncoding {
    /// Build the formula for a puzzle
    pub fn encode(puzzle: &SudokuPuzzle) -> Self {
        let mut encoding = Self {
            formula: Formula::new(),
            cells: Vec::with_capacity(SIZE * SIZE * SIZE),
            breakdown: SudokuClauseBreakdown::default(),
        };

        encoding.generate_cell_domains();
        encoding.generate_uniqueness();
        encoding.generate_hints(puzzle);

        info!(
            "Encoded sudoku: {} variables, {} clauses",
            encoding.formula.variable_count(),
            encoding.formula.clause_count()
        );
        debug!("Sudoku clause breakdown: {:?}", encoding.breakdown);
        encoding
    }

    /// Literal for "cell (row, col) holds digit value", all 0-indexed
    pub fn literal(&self, row: usize, col: usize, value: usize) -> Literal {
        self.cells[(row * SIZE + col) * SIZE + value]
    }

    /// Exactly one digit per cell
    fn generate_cell_domains(&mut self) {
        let before = self.formula.clause_count();

        for i in 0..SIZE {
            for j in 0..SIZE {
                let digits: Vec<Literal> = (0..SIZE)
                    .map(|k| self.formula.new_named_variable(format!("p_{}{}={}", i, j, k)))
                    .collect();

                // at least one
                self.formula.add_clause(digits.iter().copied());
                // at most one
                for (a, b) in digits.iter().tuple_combinations() {
                    self.formula.add_clause([-*a, -*b]);
                }
                self.cells.extend(digits);
            }
        }

        self.breakdown.cell_domain = self.formula.clause_count() - before;
    }

    /// Pairwise "different digit" clauses, each unordered cell pair at most once
    fn generate_uniqueness(&mut self) {
        for i in 0..SIZE {
            for j in 0..SIZE {
                let block_row = i / BLOCK;
                let block_col = j / BLOCK;
                // position of (i, j) inside its block
                let self_k = (i % BLOCK) * BLOCK + j % BLOCK;

                for k in self_k + 1..SIZE {
                    let r = block_row * BLOCK + k / BLOCK;
                    let c = block_col * BLOCK + k % BLOCK;
                    self.forbid_same_digit((i, j), (r, c));
                    self.breakdown.block += SIZE;
                }

                // same column, rows below outside the block
                for row in i + 1..SIZE {
                    if row / BLOCK == block_row {
                        continue;
                    }
                    self.forbid_same_digit((i, j), (row, j));
                    self.breakdown.column += SIZE;
                }

                // same row, columns to the right outside the block
                for col in j + 1..SIZE {
                    if col / BLOCK == block_col {
                        continue;
                    }
                    self.forbid_same_digit((i, j), (i, col));
                    self.breakdown.row += SIZE;
                }
            }
        }
    }

    fn forbid_same_digit(&mut self, (i, j): (usize, usize), (r, c): (usize, usize)) {
        for n in 0..SIZE {
            let a = self.literal(i, j, n);
            let b = self.literal(r, c, n);
            self.formula.add_clause([-a, -b]);
        }
    }

    fn generate_hints(&mut self, puzzle: &SudokuPuzzle) {
        for hint in &puzzle.hints {
            let lit = self.literal(hint.row, hint.col, hint.value);
            self.formula.add_clause([lit]);
        }
        self.breakdown.hints = puzzle.hints.len();
    }
}
