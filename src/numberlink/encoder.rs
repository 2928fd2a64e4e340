//! CNF encoding of Numberlink
//!
//! Paths are drawn on the edges between orthogonally adjacent cells. Every
//! cell has one color variable per line; a drawn edge forces both of its
//! cells to share colors, and degree clauses make endpoints dead ends and
//! blank cells either empty or pass-through.

use super::pattern::{CellPattern, Direction};
use super::puzzle::NumberlinkPuzzle;
use crate::error::{PuzzleError, Result};
use crate::sat::{Formula, Literal};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Optional redundancy-elimination clause families
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingOptions {
    /// Forbid U-turns inside every 2x2 window
    #[serde(default)]
    pub u_shape: bool,
    /// Forbid detours around a blank cell in 3x2 and 2x3 windows
    #[serde(default)]
    pub u_shape_long: bool,
}

/// Number of clauses produced by each constraint family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberlinkClauseBreakdown {
    pub at_most_one_color: usize,
    pub hints: usize,
    pub degree: usize,
    pub propagation: usize,
    pub u_shape: usize,
    pub u_shape_long: usize,
}

impl NumberlinkClauseBreakdown {
    pub fn total(&self) -> usize {
        self.at_most_one_color
            + self.hints
            + self.degree
            + self.propagation
            + self.u_shape
            + self.u_shape_long
    }
}

/// A Numberlink formula with its edge and color variable tables
#[derive(Debug, Clone)]
pub struct NumberlinkEncoding {
    pub formula: Formula,
    pub rows: usize,
    pub cols: usize,
    pub num_lines: usize,
    /// `s[i][j]`: edge between (i, j) and (i + 1, j)
    south: Vec<Vec<Literal>>,
    /// `e[i][j]`: edge between (i, j) and (i, j + 1)
    east: Vec<Vec<Literal>>,
    /// `x[i][j][n]` flattened as `(i * cols + j) * num_lines + n`
    colors: Vec<Literal>,
    pub breakdown: NumberlinkClauseBreakdown,
}

impl NumberlinkEncoding {
    /// Build the formula for a puzzle
    pub fn encode(puzzle: &NumberlinkPuzzle, options: EncodingOptions) -> Result<Self> {
        let mut encoding = Self {
            formula: Formula::new(),
            rows: puzzle.rows,
            cols: puzzle.cols,
            num_lines: puzzle.num_lines,
            south: Vec::new(),
            east: Vec::new(),
            colors: Vec::with_capacity(puzzle.rows * puzzle.cols * puzzle.num_lines),
            breakdown: NumberlinkClauseBreakdown::default(),
        };

        encoding.generate_variables();
        encoding.generate_hints(puzzle);
        encoding.generate_degrees(puzzle)?;
        encoding.generate_propagation();
        if options.u_shape {
            encoding.generate_u_shape();
        }
        if options.u_shape_long {
            encoding.generate_u_shape_long(puzzle);
        }

        info!(
            "Encoded numberlink {}x{} with {} lines: {} variables, {} clauses",
            puzzle.rows,
            puzzle.cols,
            puzzle.num_lines,
            encoding.formula.variable_count(),
            encoding.formula.clause_count()
        );
        debug!("Numberlink clause breakdown: {:?}", encoding.breakdown);
        Ok(encoding)
    }

    /// Edge below (row, col), if the cell is not on the bottom border
    pub fn south(&self, row: usize, col: usize) -> Option<Literal> {
        self.south.get(row)?.get(col).copied()
    }

    /// Edge right of (row, col), if the cell is not on the right border
    pub fn east(&self, row: usize, col: usize) -> Option<Literal> {
        self.east.get(row)?.get(col).copied()
    }

    /// Literal for "cell (row, col) belongs to line"
    pub fn color(&self, row: usize, col: usize, line: usize) -> Literal {
        self.colors[(row * self.cols + col) * self.num_lines + line]
    }

    /// Ids of every edge variable, used to tell drawn layouts apart
    pub fn edge_variables(&self) -> Vec<u32> {
        self.south
            .iter()
            .chain(self.east.iter())
            .flatten()
            .map(|lit| lit.var())
            .collect()
    }

    /// Edge in `direction` from a cell, checked against the edge layout
    fn edge(&self, row: usize, col: usize, pattern: CellPattern, direction: Direction) -> Result<Literal> {
        let edge = match direction {
            Direction::North => row.checked_sub(1).and_then(|r| self.south(r, col)),
            Direction::West => col.checked_sub(1).and_then(|c| self.east(row, c)),
            Direction::South => self.south(row, col),
            Direction::East => self.east(row, col),
        };
        edge.ok_or_else(|| PuzzleError::UnreachablePattern {
            row,
            col,
            pattern: pattern.to_string(),
            direction: direction.name(),
        })
    }

    fn generate_variables(&mut self) {
        let (rows, cols, lines) = (self.rows, self.cols, self.num_lines);
        // two-digit indices need a separator to keep names unambiguous
        let separated = rows.max(cols).max(lines) > 10;

        self.south = (0..rows - 1)
            .map(|i| {
                (0..cols)
                    .map(|j| self.formula.new_named_variable(indexed_name("s", &[i, j], separated)))
                    .collect()
            })
            .collect();
        self.east = (0..rows)
            .map(|i| {
                (0..cols - 1)
                    .map(|j| self.formula.new_named_variable(indexed_name("e", &[i, j], separated)))
                    .collect()
            })
            .collect();

        let before = self.formula.clause_count();
        for i in 0..rows {
            for j in 0..cols {
                let cell: Vec<Literal> = (0..lines)
                    .map(|n| self.formula.new_named_variable(indexed_name("x", &[i, j, n], separated)))
                    .collect();
                // a cell carries at most one line; uncolored is allowed
                for (a, b) in cell.iter().tuple_combinations() {
                    self.formula.add_clause([-*a, -*b]);
                }
                self.colors.extend(cell);
            }
        }
        self.breakdown.at_most_one_color = self.formula.clause_count() - before;
    }

    fn generate_hints(&mut self, puzzle: &NumberlinkPuzzle) {
        for hint in &puzzle.hints {
            let lit = self.color(hint.row, hint.col, hint.line);
            self.formula.add_clause([lit]);
        }
        self.breakdown.hints = puzzle.hints.len();
    }

    /// Degree 0 or 2 on blank cells, exactly 1 on endpoints
    fn generate_degrees(&mut self, puzzle: &NumberlinkPuzzle) -> Result<()> {
        let before = self.formula.clause_count();

        for i in 0..self.rows {
            for j in 0..self.cols {
                let pattern = CellPattern::classify(i, j, self.rows, self.cols);
                let edges = pattern
                    .directions()
                    .map(|d| self.edge(i, j, pattern, d))
                    .collect::<Result<Vec<_>>>()?;

                if puzzle.is_blank(i, j) {
                    self.forbid_degree_above_two(&edges);
                    self.forbid_degree_one(&edges);
                } else {
                    self.formula.add_clause(edges.iter().copied());
                    for (a, b) in edges.iter().tuple_combinations() {
                        self.formula.add_clause([-*a, -*b]);
                    }
                }
            }
        }

        self.breakdown.degree = self.formula.clause_count() - before;
        Ok(())
    }

    fn forbid_degree_above_two(&mut self, edges: &[Literal]) {
        for triple in edges.iter().combinations(3) {
            self.formula.add_clause(triple.into_iter().map(|lit| -*lit));
        }
    }

    fn forbid_degree_one(&mut self, edges: &[Literal]) {
        for idx in 0..edges.len() {
            let clause = edges
                .iter()
                .enumerate()
                .map(|(other, &lit)| if other == idx { -lit } else { lit });
            self.formula.add_clause(clause);
        }
    }

    /// A drawn edge gives both of its cells the same color
    fn generate_propagation(&mut self) {
        let before = self.formula.clause_count();

        for i in 0..self.rows - 1 {
            for j in 0..self.cols {
                let edge = self.south[i][j];
                self.link_colors(edge, (i, j), (i + 1, j));
            }
        }
        for i in 0..self.rows {
            for j in 0..self.cols - 1 {
                let edge = self.east[i][j];
                self.link_colors(edge, (i, j), (i, j + 1));
            }
        }

        self.breakdown.propagation = self.formula.clause_count() - before;
    }

    fn link_colors(&mut self, edge: Literal, (i1, j1): (usize, usize), (i2, j2): (usize, usize)) {
        for n in 0..self.num_lines {
            let x1 = self.color(i1, j1, n);
            let x2 = self.color(i2, j2, n);
            self.formula.add_clause([-edge, -x1, x2]);
            self.formula.add_clause([-edge, x1, -x2]);
        }
    }

    fn generate_u_shape(&mut self) {
        let before = self.formula.clause_count();

        for i in 0..self.rows - 1 {
            for j in 0..self.cols - 1 {
                let (s, e) = (&self.south, &self.east);
                let clauses = [
                    [e[i][j], s[i][j + 1], e[i + 1][j]],
                    [e[i][j], s[i][j], s[i][j + 1]],
                    [e[i][j], s[i][j], e[i + 1][j]],
                    [s[i][j], s[i][j + 1], e[i + 1][j]],
                ];
                for clause in clauses {
                    self.formula.add_clause(clause.map(|lit| -lit));
                }
            }
        }

        self.breakdown.u_shape = self.formula.clause_count() - before;
    }

    fn generate_u_shape_long(&mut self, puzzle: &NumberlinkPuzzle) {
        let before = self.formula.clause_count();
        let mut clauses: Vec<[Literal; 4]> = Vec::new();
        let (s, e) = (&self.south, &self.east);

        // 3 rows by 2 columns
        for i in 0..self.rows.saturating_sub(2) {
            for j in 0..self.cols - 1 {
                if puzzle.is_blank(i + 1, j) {
                    clauses.push([e[i][j], s[i][j + 1], s[i + 1][j + 1], e[i + 2][j]]);
                }
                if puzzle.is_blank(i + 1, j + 1) {
                    clauses.push([e[i][j], s[i][j], s[i + 1][j], e[i + 2][j]]);
                }
            }
        }
        // 2 rows by 3 columns
        for i in 0..self.rows - 1 {
            for j in 0..self.cols.saturating_sub(2) {
                if puzzle.is_blank(i + 1, j + 1) {
                    clauses.push([e[i][j], s[i][j], e[i][j + 1], s[i][j + 2]]);
                }
                if puzzle.is_blank(i, j + 1) {
                    clauses.push([s[i][j], e[i + 1][j], e[i + 1][j + 1], s[i][j + 2]]);
                }
            }
        }

        for clause in clauses {
            self.formula.add_clause(clause.map(|lit| -lit));
        }
        self.breakdown.u_shape_long = self.formula.clause_count() - before;
    }
}

/// `s_01`, `x_120`; `s_0_11` once an index can reach two digits
fn indexed_name(prefix: &str, indices: &[usize], separated: bool) -> String {
    let sep = if separated { "_" } else { "" };
    format!("{}_{}", prefix, indices.iter().join(sep))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numberlink::puzzle::NumberlinkHint;

    fn corners_4x4() -> NumberlinkPuzzle {
        NumberlinkPuzzle::new(
            4,
            4,
            1,
            vec![NumberlinkHint::new(0, 0, 0), NumberlinkHint::new(0, 3, 3)],
        )
        .unwrap()
    }

    #[test]
    fn test_variable_counts_and_order() {
        let encoding = NumberlinkEncoding::encode(&corners_4x4(), EncodingOptions::default()).unwrap();

        // 12 south + 12 east + 16 color
        assert_eq!(encoding.formula.variable_count(), 40);
        assert_eq!(encoding.south(0, 0).unwrap().to_dimacs(), 1);
        assert_eq!(encoding.east(0, 0).unwrap().to_dimacs(), 13);
        assert_eq!(encoding.color(0, 0, 0).to_dimacs(), 25);
        assert!(encoding.south(3, 0).is_none());
        assert!(encoding.east(0, 3).is_none());

        let vars = encoding.formula.variables();
        assert_eq!(vars.name(1), Some("s_00"));
        assert_eq!(vars.name(13), Some("e_00"));
        assert_eq!(vars.name(40), Some("x_330"));
    }

    #[test]
    fn test_base_clause_counts() {
        let encoding = NumberlinkEncoding::encode(&corners_4x4(), EncodingOptions::default()).unwrap();
        let b = &encoding.breakdown;

        assert_eq!(b.at_most_one_color, 0);
        assert_eq!(b.hints, 2);
        // corners 8, borders 32, interior 32
        assert_eq!(b.degree, 72);
        assert_eq!(b.propagation, 48);
        assert_eq!(encoding.formula.clause_count(), 122);
        assert_eq!(b.total(), 122);
    }

    #[test]
    fn test_redundancy_clause_counts() {
        let options = EncodingOptions {
            u_shape: true,
            u_shape_long: false,
        };
        let encoding = NumberlinkEncoding::encode(&corners_4x4(), options).unwrap();
        assert_eq!(encoding.breakdown.u_shape, 36);
        assert_eq!(encoding.formula.clause_count(), 158);

        let options = EncodingOptions {
            u_shape: true,
            u_shape_long: true,
        };
        let encoding = NumberlinkEncoding::encode(&corners_4x4(), options).unwrap();
        assert_eq!(encoding.breakdown.u_shape_long, 24);
        assert_eq!(encoding.formula.clause_count(), 182);
    }

    #[test]
    fn test_u_shape_long_skips_hinted_middle() {
        // (1, 1) is the middle cell of several windows
        let puzzle = NumberlinkPuzzle::new(
            4,
            4,
            1,
            vec![NumberlinkHint::new(0, 1, 1), NumberlinkHint::new(0, 3, 3)],
        )
        .unwrap();
        let options = EncodingOptions {
            u_shape: false,
            u_shape_long: true,
        };
        let encoding = NumberlinkEncoding::encode(&puzzle, options).unwrap();
        assert!(encoding.breakdown.u_shape_long < 24);
    }

    #[test]
    fn test_at_most_one_color_clauses() {
        let puzzle = NumberlinkPuzzle::new(
            2,
            3,
            3,
            vec![
                NumberlinkHint::new(0, 0, 0),
                NumberlinkHint::new(0, 1, 0),
                NumberlinkHint::new(1, 0, 1),
                NumberlinkHint::new(1, 1, 1),
                NumberlinkHint::new(2, 0, 2),
                NumberlinkHint::new(2, 1, 2),
            ],
        )
        .unwrap();
        let encoding = NumberlinkEncoding::encode(&puzzle, EncodingOptions::default()).unwrap();

        // 6 cells, 3 pairs of lines each
        assert_eq!(encoding.breakdown.at_most_one_color, 18);
        assert_eq!(encoding.color(1, 2, 2).to_dimacs() as usize, encoding.formula.variable_count());
    }

    #[test]
    fn test_hinted_corner_degree_clauses() {
        let encoding = NumberlinkEncoding::encode(&corners_4x4(), EncodingOptions::default()).unwrap();
        let s00 = encoding.south(0, 0).unwrap();
        let e00 = encoding.east(0, 0).unwrap();

        // clauses after the two hint units start with cell (0, 0)
        let clauses = encoding.formula.clauses();
        assert_eq!(clauses[2].literals, vec![s00, e00]);
        assert_eq!(clauses[3].literals, vec![-s00, -e00]);
    }

    fn corners_3x3() -> NumberlinkPuzzle {
        NumberlinkPuzzle::new(
            3,
            3,
            1,
            vec![NumberlinkHint::new(0, 0, 0), NumberlinkHint::new(0, 2, 2)],
        )
        .unwrap()
    }

    fn negated(literals: &[Literal]) -> Vec<Literal> {
        literals.iter().map(|&lit| -lit).collect()
    }

    fn literals_from(encoding: &NumberlinkEncoding, start: usize) -> Vec<Vec<Literal>> {
        encoding.formula.clauses()[start..]
            .iter()
            .map(|clause| clause.literals.clone())
            .collect()
    }

    #[test]
    fn test_degree_clause_literals() {
        let encoding = NumberlinkEncoding::encode(&corners_3x3(), EncodingOptions::default()).unwrap();
        let s = |i, j| encoding.south(i, j).unwrap();
        let e = |i, j| encoding.east(i, j).unwrap();
        let clauses = literals_from(&encoding, 0);

        // (0, 1): blank top border, edges west, south, east
        let (w, so, ea) = (e(0, 0), s(0, 1), e(0, 1));
        assert_eq!(
            clauses[4..8],
            [
                vec![-w, -so, -ea],
                vec![-w, so, ea],
                vec![w, -so, ea],
                vec![w, so, -ea],
            ]
        );

        // (0, 2): blank corner reduces to "both or neither"
        assert_eq!(clauses[8..10], [vec![-e(0, 1), s(0, 2)], vec![e(0, 1), -s(0, 2)]]);

        // (1, 1): blank interior, edges north, west, south, east
        let (n, w, so, ea) = (s(0, 1), e(1, 0), s(1, 1), e(1, 1));
        assert_eq!(
            clauses[14..22],
            [
                vec![-n, -w, -so],
                vec![-n, -w, -ea],
                vec![-n, -so, -ea],
                vec![-w, -so, -ea],
                vec![-n, w, so, ea],
                vec![n, -w, so, ea],
                vec![n, w, -so, ea],
                vec![n, w, so, -ea],
            ]
        );
        assert_eq!(encoding.breakdown.degree, 32);
    }

    #[test]
    fn test_redundancy_clause_literals() {
        let options = EncodingOptions {
            u_shape: true,
            u_shape_long: true,
        };
        let encoding = NumberlinkEncoding::encode(&corners_3x3(), options).unwrap();
        let s = |i, j| encoding.south(i, j).unwrap();
        let e = |i, j| encoding.east(i, j).unwrap();

        let b = &encoding.breakdown;
        assert_eq!(b.u_shape, 16);
        assert_eq!(b.u_shape_long, 8);
        let start = encoding.formula.clause_count() - b.u_shape - b.u_shape_long;
        let clauses = literals_from(&encoding, start);

        // 2x2 window at the origin, then the one at (1, 1)
        for (k, (i, j)) in [(0, 0), (1, 1)].into_iter().enumerate() {
            let window = if k == 0 { &clauses[0..4] } else { &clauses[12..16] };
            assert_eq!(
                window,
                [
                    negated(&[e(i, j), s(i, j + 1), e(i + 1, j)]),
                    negated(&[e(i, j), s(i, j), s(i, j + 1)]),
                    negated(&[e(i, j), s(i, j), e(i + 1, j)]),
                    negated(&[s(i, j), s(i, j + 1), e(i + 1, j)]),
                ]
            );
        }

        // 3x2 windows at columns 0 and 1, then 2x3 windows at rows 0 and 1
        assert_eq!(
            clauses[16..],
            [
                negated(&[e(0, 0), s(0, 1), s(1, 1), e(2, 0)]),
                negated(&[e(0, 0), s(0, 0), s(1, 0), e(2, 0)]),
                negated(&[e(0, 1), s(0, 2), s(1, 2), e(2, 1)]),
                negated(&[e(0, 1), s(0, 1), s(1, 1), e(2, 1)]),
                negated(&[e(0, 0), s(0, 0), e(0, 1), s(0, 2)]),
                negated(&[s(0, 0), e(1, 0), e(1, 1), s(0, 2)]),
                negated(&[e(1, 0), s(1, 0), e(1, 1), s(1, 2)]),
                negated(&[s(1, 0), e(2, 0), e(2, 1), s(1, 2)]),
            ]
        );
    }

    #[test]
    fn test_u_shape_long_hinted_middle_literals() {
        // (1, 1) is an endpoint, so every window centered on it is skipped
        let puzzle = NumberlinkPuzzle::new(
            3,
            3,
            1,
            vec![NumberlinkHint::new(0, 0, 0), NumberlinkHint::new(0, 1, 1)],
        )
        .unwrap();
        let options = EncodingOptions {
            u_shape: false,
            u_shape_long: true,
        };
        let encoding = NumberlinkEncoding::encode(&puzzle, options).unwrap();
        let s = |i, j| encoding.south(i, j).unwrap();
        let e = |i, j| encoding.east(i, j).unwrap();

        assert_eq!(encoding.breakdown.u_shape_long, 4);
        let start = encoding.formula.clause_count() - 4;
        let clauses = literals_from(&encoding, start);
        assert_eq!(
            clauses,
            [
                negated(&[e(0, 0), s(0, 1), s(1, 1), e(2, 0)]),
                negated(&[e(0, 1), s(0, 1), s(1, 1), e(2, 1)]),
                negated(&[s(0, 0), e(1, 0), e(1, 1), s(0, 2)]),
                negated(&[e(1, 0), s(1, 0), e(1, 1), s(1, 2)]),
            ]
        );

        let guarded = negated(&[e(0, 0), s(0, 0), s(1, 0), e(2, 0)]);
        assert!(!encoding.formula.clauses().iter().any(|c| c.literals == guarded));
    }

    #[test]
    fn test_names_on_wide_grids_are_separated() {
        let puzzle = NumberlinkPuzzle::new(
            2,
            11,
            1,
            vec![NumberlinkHint::new(0, 0, 0), NumberlinkHint::new(0, 1, 10)],
        )
        .unwrap();
        let encoding = NumberlinkEncoding::encode(&puzzle, EncodingOptions::default()).unwrap();
        let vars = encoding.formula.variables();
        let name = |lit: Literal| vars.name(lit.var()).map(str::to_owned);

        assert_eq!(name(encoding.south(0, 10).unwrap()).as_deref(), Some("s_0_10"));
        assert_eq!(name(encoding.east(1, 9).unwrap()).as_deref(), Some("e_1_9"));
        assert_eq!(name(encoding.color(1, 10, 0)).as_deref(), Some("x_1_10_0"));
        assert_eq!(name(encoding.south(0, 1).unwrap()).as_deref(), Some("s_0_1"));
    }

    #[test]
    fn test_edge_variables_cover_layout() {
        let encoding = NumberlinkEncoding::encode(&corners_4x4(), EncodingOptions::default()).unwrap();
        let edges = encoding.edge_variables();
        assert_eq!(edges.len(), 24);
        assert_eq!(edges, (1..=24).collect::<Vec<u32>>());
    }
}
