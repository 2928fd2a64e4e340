//! Numberlink puzzle definition and problem-file parsing

use crate::error::{PuzzleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One endpoint of a numbered line, all fields 0-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberlinkHint {
    pub line: usize,
    pub row: usize,
    pub col: usize,
}

impl NumberlinkHint {
    pub fn new(line: usize, row: usize, col: usize) -> Self {
        Self { line, row, col }
    }
}

/// A rectangular Numberlink grid with two endpoints per line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberlinkPuzzle {
    pub rows: usize,
    pub cols: usize,
    pub num_lines: usize,
    pub hints: Vec<NumberlinkHint>,
    /// `true` for every cell that carries no hint
    blank: Vec<Vec<bool>>,
}

impl NumberlinkPuzzle {
    /// Create a puzzle, checking dimensions and endpoint hints
    pub fn new(rows: usize, cols: usize, num_lines: usize, hints: Vec<NumberlinkHint>) -> Result<Self> {
        if rows < 2 || cols < 2 {
            return Err(PuzzleError::malformed(format!(
                "grid must be at least 2x2, got {}x{}",
                rows, cols
            )));
        }
        if hints.len() != 2 * num_lines {
            return Err(PuzzleError::malformed(format!(
                "{} lines need {} endpoints, got {}",
                num_lines,
                2 * num_lines,
                hints.len()
            )));
        }

        let mut per_line = vec![0usize; num_lines];
        let mut blank = vec![vec![true; cols]; rows];
        for hint in &hints {
            if hint.line >= num_lines {
                return Err(PuzzleError::malformed(format!(
                    "line id {} exceeds the line count {}",
                    hint.line + 1,
                    num_lines
                )));
            }
            if hint.row >= rows || hint.col >= cols {
                return Err(PuzzleError::malformed(format!(
                    "endpoint ({}, {}) of line {} is outside the {}x{} grid",
                    hint.row,
                    hint.col,
                    hint.line + 1,
                    rows,
                    cols
                )));
            }
            per_line[hint.line] += 1;
            blank[hint.row][hint.col] = false;
        }
        if let Some(line) = per_line.iter().position(|&count| count != 2) {
            return Err(PuzzleError::malformed(format!(
                "line {} has {} endpoints, expected 2",
                line + 1,
                per_line[line]
            )));
        }

        Ok(Self {
            rows,
            cols,
            num_lines,
            hints,
            blank,
        })
    }

    /// Whether a cell carries no endpoint
    pub fn is_blank(&self, row: usize, col: usize) -> bool {
        self.blank[row][col]
    }

    /// Both endpoints of a line in file order
    pub fn endpoints(&self, line: usize) -> Option<(NumberlinkHint, NumberlinkHint)> {
        let mut found = self.hints.iter().filter(|h| h.line == line).copied();
        Some((found.next()?, found.next()?))
    }

    /// Hints covering a cell (more than one only when endpoints share a cell)
    pub fn hints_at(&self, row: usize, col: usize) -> impl Iterator<Item = &NumberlinkHint> {
        self.hints.iter().filter(move |h| h.row == row && h.col == col)
    }

    /// Parse the `SIZE` / `LINE_NUM` / `LINE#` format, 1-indexed in the file
    pub fn parse(content: &str) -> Result<Self> {
        let mut size: Option<(usize, usize)> = None;
        let mut num_lines: Option<usize> = None;
        let mut hints = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("SIZE") {
                let (cols, rows) = rest
                    .trim()
                    .split_once(['X', 'x'])
                    .ok_or_else(|| PuzzleError::malformed_at(line_no, "expected 'SIZE <cols>X<rows>'"))?;
                size = Some((parse_number(rows, line_no)?, parse_number(cols, line_no)?));
            } else if let Some(rest) = line.strip_prefix("LINE_NUM") {
                num_lines = Some(parse_number(rest, line_no)?);
            } else if let Some(rest) = line.strip_prefix("LINE#") {
                let (id, coords) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| PuzzleError::malformed_at(line_no, "expected 'LINE#<id> (c,r)-(c,r)'"))?;
                let id = parse_one_based(id, line_no)?;
                let (first, second) = coords
                    .trim()
                    .split_once(")-(")
                    .ok_or_else(|| PuzzleError::malformed_at(line_no, "expected two endpoints '(c,r)-(c,r)'"))?;
                for point in [first, second] {
                    let (row, col) = parse_point(point, line_no)?;
                    hints.push(NumberlinkHint::new(id, row, col));
                }
            } else {
                return Err(PuzzleError::malformed_at(
                    line_no,
                    format!("unrecognized line '{}'", line),
                ));
            }
        }

        let (rows, cols) = size.ok_or_else(|| PuzzleError::malformed("missing 'SIZE' line"))?;
        let num_lines = num_lines.ok_or_else(|| PuzzleError::malformed("missing 'LINE_NUM' line"))?;
        Self::new(rows, cols, num_lines, hints)
    }

    /// Load a puzzle from a problem file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Render in the problem-file format
    pub fn to_problem_string(&self) -> String {
        let mut out = format!("SIZE {}X{}\nLINE_NUM {}\n", self.cols, self.rows, self.num_lines);
        for line in 0..self.num_lines {
            if let Some((a, b)) = self.endpoints(line) {
                out.push_str(&format!(
                    "LINE#{} ({},{})-({},{})\n",
                    line + 1,
                    a.col + 1,
                    a.row + 1,
                    b.col + 1,
                    b.row + 1
                ));
            }
        }
        out
    }
}

fn parse_number(token: &str, line_no: usize) -> Result<usize> {
    let token = token.trim();
    token
        .parse()
        .map_err(|_| PuzzleError::malformed_at(line_no, format!("invalid number '{}'", token)))
}

fn parse_one_based(token: &str, line_no: usize) -> Result<usize> {
    parse_number(token, line_no)?
        .checked_sub(1)
        .ok_or_else(|| PuzzleError::malformed_at(line_no, "ids and coordinates are 1-indexed"))
}

/// `(c,r`, `c,r)` or `(c,r)` to a 0-indexed `(row, col)`
fn parse_point(token: &str, line_no: usize) -> Result<(usize, usize)> {
    let inner = token.trim().trim_start_matches('(').trim_end_matches(')');
    let (col, row) = inner
        .split_once(',')
        .ok_or_else(|| PuzzleError::malformed_at(line_no, format!("invalid point '{}'", token)))?;
    Ok((parse_one_based(row, line_no)?, parse_one_based(col, line_no)?))
}
