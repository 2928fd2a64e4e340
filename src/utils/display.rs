//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::numberlink::{NumberlinkPuzzle, NumberlinkSolution};
use crate::problem::BatchEntry;
use crate::sudoku::puzzle::{BLOCK, SIZE};
use crate::sudoku::{SudokuPuzzle, SudokuSolution};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Format solutions for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Hint grid with `.` for blank cells
    pub fn format_sudoku_puzzle(puzzle: &SudokuPuzzle) -> String {
        let mut grid = [[0u8; SIZE]; SIZE];
        for (i, row) in grid.iter_mut().enumerate() {
            for (j, digit) in row.iter_mut().enumerate() {
                *digit = puzzle.hint_at(i, j).map_or(0, |value| value as u8 + 1);
            }
        }
        SudokuSolution { grid }.to_string()
    }

    pub fn format_sudoku(solution: &SudokuSolution) -> String {
        solution.to_string()
    }

    /// Sudoku as nine digit strings, the compact form used in saved files
    pub fn format_sudoku_compact(solution: &SudokuSolution) -> String {
        let mut output = String::with_capacity(SIZE * (SIZE + 1));
        for row in &solution.grid {
            for &digit in row {
                output.push(char::from(b'0' + digit));
            }
            output.push('\n');
        }
        output
    }

    /// Box-drawing rendering of a Numberlink grid, with drawn paths if given
    pub fn format_numberlink(puzzle: &NumberlinkPuzzle, answer: Option<&NumberlinkSolution>) -> String {
        let (rows, cols) = (puzzle.rows, puzzle.cols);
        let south = |i: usize, j: usize| answer.is_some_and(|a| a.has_south(i, j));
        let east = |i: usize, j: usize| answer.is_some_and(|a| a.has_east(i, j));

        let mut output = format!("┌{}───┐\n", "───┬".repeat(cols - 1));
        for i in 0..rows {
            output.push('│');
            for j in 0..cols {
                let n = i > 0 && south(i - 1, j);
                let s = south(i, j);
                let e = east(i, j);
                let w = j > 0 && east(i, j - 1);

                let cell = if let Some(hint) = puzzle.hints_at(i, j).next() {
                    format!("{:^3}", hint.line + 1)
                } else {
                    match (n, w, s, e) {
                        (true, _, true, _) => " ┃ ",
                        (_, true, _, true) => "━━━",
                        (true, _, _, true) => " ┗━",
                        (true, true, _, _) => "━┛ ",
                        (_, _, true, true) => " ┏━",
                        (_, true, true, _) => "━┓ ",
                        _ => "   ",
                    }
                    .to_string()
                };
                output.push_str(&cell);
                output.push(if e { '┿' } else { '│' });
            }
            output.push('\n');

            if i + 1 == rows {
                continue;
            }
            output.push('├');
            for j in 0..cols {
                output.push_str(if south(i, j) { "─╂─" } else { "───" });
                output.push(if j + 1 == cols { '┤' } else { '┼' });
            }
            output.push('\n');
        }
        output.push_str(&format!("└{}───┘\n", "───┴".repeat(cols - 1)));
        output
    }

    /// One line per traced path, 1-indexed coordinates
    pub fn format_paths(puzzle: &NumberlinkPuzzle, solution: &NumberlinkSolution) -> String {
        let mut output = String::new();
        for (line, path) in solution.trace_paths(puzzle).iter().enumerate() {
            let cells: Vec<String> = path
                .iter()
                .map(|(r, c)| format!("({},{})", r + 1, c + 1))
                .collect();
            output.push_str(&format!(
                "Line {} ({} steps): {}\n",
                line + 1,
                path.len().saturating_sub(1),
                cells.join(" -> ")
            ));
        }
        output
    }

    pub fn format_core(core: &[String]) -> String {
        let mut output = format!("Unsatisfiable core ({} clauses):\n", core.len());
        for clause in core {
            output.push_str(&format!("  {}\n", clause));
        }
        output
    }

    /// Format batch results as a summary table
    pub fn format_batch_summary(entries: &[BatchEntry]) -> String {
        let mut output = String::new();

        output.push_str("Batch Summary:\n");
        output.push_str("File                 | Kind       | Result | Vars   | Clauses | Time(ms)\n");
        output.push_str("---------------------|------------|--------|--------|---------|---------\n");

        for entry in entries {
            let name = entry
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match &entry.result {
                Ok(verdict) => {
                    let result = match (verdict.satisfiable, verdict.valid) {
                        (true, true) => "SAT",
                        (true, false) => "SAT*",
                        (false, _) => "UNSAT",
                    };
                    output.push_str(&format!(
                        "{:20} | {:10} | {:6} | {:6} | {:7} | {:8}\n",
                        name,
                        verdict.kind,
                        result,
                        verdict.variable_count,
                        verdict.clause_count,
                        verdict.solve_time.as_millis()
                    ));
                }
                Err(error) => {
                    output.push_str(&format!("{:20} | error: {}\n", name, error));
                }
            }
        }

        output
    }

    /// Save solutions to files based on output format
    pub fn save_solutions<S, P, F>(
        solutions: &[S],
        output_dir: P,
        format: OutputFormat,
        render: F,
    ) -> Result<()>
    where
        S: Serialize,
        P: AsRef<Path>,
        F: Fn(&S) -> String,
    {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        for (i, solution) in solutions.iter().enumerate() {
            let (filename, content) = match format {
                OutputFormat::Text => (format!("solution_{:03}.txt", i + 1), render(solution)),
                OutputFormat::Json => (
                    format!("solution_{:03}.json", i + 1),
                    serde_json::to_string_pretty(solution)?,
                ),
            };
            let filepath = output_dir.join(filename);
            std::fs::write(&filepath, content)
                .with_context(|| format!("Failed to write solution: {}", filepath.display()))?;
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
