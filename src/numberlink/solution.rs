//! Decoded Numberlink layouts, path tracing and validation

use super::encoder::NumberlinkEncoding;
use super::puzzle::NumberlinkPuzzle;
use crate::sat::Model;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type Cell = (usize, usize);

/// Drawn edges and cell colors read off a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberlinkSolution {
    pub rows: usize,
    pub cols: usize,
    /// `south[i][j]` for i < rows - 1
    pub south: Vec<Vec<bool>>,
    /// `east[i][j]` for j < cols - 1
    pub east: Vec<Vec<bool>>,
    /// Line occupying each cell, `None` when no color variable is true
    pub colors: Vec<Vec<Option<usize>>>,
}

impl NumberlinkSolution {
    pub fn decode(encoding: &NumberlinkEncoding, model: &Model) -> Self {
        let (rows, cols) = (encoding.rows, encoding.cols);

        let south = (0..rows - 1)
            .map(|i| {
                (0..cols)
                    .map(|j| encoding.south(i, j).is_some_and(|lit| model.value(lit)))
                    .collect()
            })
            .collect();
        let east = (0..rows)
            .map(|i| {
                (0..cols - 1)
                    .map(|j| encoding.east(i, j).is_some_and(|lit| model.value(lit)))
                    .collect()
            })
            .collect();
        let colors = (0..rows)
            .map(|i| {
                (0..cols)
                    .map(|j| (0..encoding.num_lines).find(|&n| model.value(encoding.color(i, j, n))))
                    .collect()
            })
            .collect();

        Self {
            rows,
            cols,
            south,
            east,
            colors,
        }
    }

    pub fn has_south(&self, row: usize, col: usize) -> bool {
        self.south.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
    }

    pub fn has_east(&self, row: usize, col: usize) -> bool {
        self.east.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
    }

    /// Cells joined to (row, col) by a drawn edge, north, west, south, east
    pub fn neighbors(&self, row: usize, col: usize) -> Vec<Cell> {
        let mut out = Vec::with_capacity(4);
        if row > 0 && self.has_south(row - 1, col) {
            out.push((row - 1, col));
        }
        if col > 0 && self.has_east(row, col - 1) {
            out.push((row, col - 1));
        }
        if self.has_south(row, col) {
            out.push((row + 1, col));
        }
        if self.has_east(row, col) {
            out.push((row, col + 1));
        }
        out
    }

    pub fn degree(&self, row: usize, col: usize) -> usize {
        self.neighbors(row, col).len()
    }

    /// Follow drawn edges from `start` until a cell whose degree is not 2
    pub fn trace_from(&self, start: Cell) -> Vec<Cell> {
        let mut path = vec![start];
        let mut previous: Option<Cell> = None;
        let mut current = start;

        while path.len() <= self.rows * self.cols {
            let next = self
                .neighbors(current.0, current.1)
                .into_iter()
                .find(|&cell| Some(cell) != previous);
            let Some(next) = next else { break };
            path.push(next);
            if next == start || self.degree(next.0, next.1) != 2 {
                break;
            }
            previous = Some(current);
            current = next;
        }
        path
    }

    /// Path of every line, traced from its first endpoint
    pub fn trace_paths(&self, puzzle: &NumberlinkPuzzle) -> Vec<Vec<Cell>> {
        (0..puzzle.num_lines)
            .filter_map(|line| puzzle.endpoints(line))
            .map(|(start, _)| self.trace_from((start.row, start.col)))
            .collect()
    }

    /// Degree and connectivity violations against a puzzle
    pub fn violations(&self, puzzle: &NumberlinkPuzzle) -> Vec<String> {
        let mut violations = Vec::new();

        for i in 0..self.rows {
            for j in 0..self.cols {
                let degree = self.degree(i, j);
                if puzzle.is_blank(i, j) {
                    if degree != 0 && degree != 2 {
                        violations.push(format!("blank cell ({}, {}) has degree {}", i, j, degree));
                    }
                } else if degree != 1 {
                    violations.push(format!("endpoint ({}, {}) has degree {}", i, j, degree));
                }
            }
        }

        for line in 0..puzzle.num_lines {
            let Some((start, end)) = puzzle.endpoints(line) else {
                continue;
            };
            let path = self.trace_from((start.row, start.col));
            if path.len() < 2 || path.last() != Some(&(end.row, end.col)) {
                violations.push(format!(
                    "line {} starting at ({}, {}) does not reach ({}, {})",
                    line + 1,
                    start.row,
                    start.col,
                    end.row,
                    end.col
                ));
            }
        }

        violations
    }

    pub fn is_valid(&self, puzzle: &NumberlinkPuzzle) -> bool {
        self.violations(puzzle).is_empty()
    }

    /// Drawn cycles that no line's path passes through
    pub fn stray_loops(&self, puzzle: &NumberlinkPuzzle) -> Vec<Vec<Cell>> {
        let mut visited: HashSet<Cell> = self.trace_paths(puzzle).into_iter().flatten().collect();
        let mut loops = Vec::new();

        for i in 0..self.rows {
            for j in 0..self.cols {
                if visited.contains(&(i, j)) || self.degree(i, j) != 2 {
                    continue;
                }
                let mut cycle = self.trace_from((i, j));
                if cycle.last() == Some(&(i, j)) {
                    cycle.pop();
                    visited.extend(cycle.iter().copied());
                    loops.push(cycle);
                } else {
                    visited.insert((i, j));
                }
            }
        }
        loops
    }

    /// Number of drawn edges
    pub fn edge_count(&self) -> usize {
        self.south
            .iter()
            .chain(self.east.iter())
            .flatten()
            .filter(|&&drawn| drawn)
            .count()
    }
}
