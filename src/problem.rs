//! Puzzle problems: encode, solve, decode and validate

use crate::config::{OutputConfig, Settings};
use crate::numberlink::{NumberlinkEncoding, NumberlinkPuzzle, NumberlinkSolution};
use crate::sat::{
    load_meaning_map, parse_solver_output, Formula, Model, SatSolver, SolveReport, SolverVerdict,
};
use crate::sudoku::puzzle::SIZE;
use crate::sudoku::{SudokuEncoding, SudokuPuzzle, SudokuSolution};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// File extensions picked up by batch mode
pub const PUZZLE_EXTENSIONS: [&str; 3] = ["txt", "sudoku", "nl"];

/// A puzzle of either supported kind
#[derive(Debug, Clone)]
pub enum Puzzle {
    Sudoku(SudokuPuzzle),
    Numberlink(NumberlinkPuzzle),
}

impl Puzzle {
    /// Parse a problem file, telling the kinds apart by their header line
    pub fn parse(content: &str) -> Result<Self> {
        let header = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('c'));

        match header {
            Some(line) if line.starts_with("p sudoku") => Ok(Puzzle::Sudoku(SudokuPuzzle::parse(content)?)),
            Some(line) if line.starts_with("SIZE") || line.starts_with("LINE_NUM") => {
                Ok(Puzzle::Numberlink(NumberlinkPuzzle::parse(content)?))
            }
            Some(line) => anyhow::bail!("Unrecognized puzzle header: {}", line),
            None => anyhow::bail!("Puzzle file is empty"),
        }
    }

    /// Load a problem file of either kind
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse puzzle file: {}", path.as_ref().display()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Puzzle::Sudoku(_) => "sudoku",
            Puzzle::Numberlink(_) => "numberlink",
        }
    }
}

/// Result of solving one puzzle
#[derive(Debug, Clone)]
pub struct Outcome<S> {
    /// Decoded solutions, empty when the formula is unsatisfiable
    pub solutions: Vec<S>,
    /// Statistics of the first solve call
    pub report: SolveReport,
    /// Unsatisfiable core rendered with variable names
    pub core: Vec<String>,
    /// Rule violations found in the decoded solutions
    pub violations: Vec<String>,
}

impl<S> Outcome<S> {
    pub fn is_satisfiable(&self) -> bool {
        self.report.is_satisfiable()
    }

    pub fn solve_time(&self) -> Duration {
        self.report.solve_time
    }
}

/// Write the formula and its meaning map where the output settings ask
fn export_formula(formula: &Formula, output: &OutputConfig) -> Result<()> {
    if let Some(path) = &output.dimacs_file {
        formula
            .save_dimacs(path)
            .with_context(|| format!("Failed to write DIMACS file: {}", path.display()))?;
        info!("Wrote DIMACS to {}", path.display());
    }
    if let Some(path) = &output.meaning_file {
        formula
            .save_meaning_map(path)
            .with_context(|| format!("Failed to write meaning file: {}", path.display()))?;
        info!("Wrote variable meanings to {}", path.display());
    }
    Ok(())
}

/// Solve once, then enumerate further models up to the configured maximum
fn run_solver(formula: &Formula, settings: &Settings, projection: &[u32]) -> Result<(SolveReport, Vec<Model>, Vec<String>)> {
    let mut solver = SatSolver::from_formula(formula, settings.solver.options())
        .context("Failed to load formula into solver")?;
    let report = solver.solve().context("SAT solving failed")?;
    info!(
        "Solver verdict: {} in {:.3}s",
        if report.is_satisfiable() { "SAT" } else { "UNSAT" },
        report.solve_time.as_secs_f64()
    );

    let mut models = Vec::new();
    let mut core = Vec::new();
    match report.model() {
        Some(model) => {
            models.push(model.clone());
            if settings.solver.max_solutions > 1 {
                solver.block_model(model, projection);
                models.extend(solver.solve_multiple(settings.solver.max_solutions - 1, projection)?);
                debug!("Enumerated {} models", models.len());
            }
        }
        None => {
            if let Some(indices) = report.core() {
                core = indices
                    .iter()
                    .filter_map(|&index| formula.describe_clause(index))
                    .collect();
                debug!("Unsatisfiable core holds {} clauses", core.len());
            }
        }
    }

    Ok((report, models, core))
}

/// A Sudoku puzzle with its encoding and settings
pub struct SudokuProblem {
    settings: Settings,
    puzzle: SudokuPuzzle,
    encoding: SudokuEncoding,
}

impl SudokuProblem {
    pub fn new(settings: Settings, puzzle: SudokuPuzzle) -> Self {
        let encoding = SudokuEncoding::encode(&puzzle);
        Self {
            settings,
            puzzle,
            encoding,
        }
    }

    pub fn puzzle(&self) -> &SudokuPuzzle {
        &self.puzzle
    }

    pub fn encoding(&self) -> &SudokuEncoding {
        &self.encoding
    }

    pub fn solve(&self) -> Result<Outcome<SudokuSolution>> {
        let formula = &self.encoding.formula;
        export_formula(formula, &self.settings.output)?;

        let projection: Vec<u32> = (1..=(SIZE * SIZE * SIZE) as u32).collect();
        let (report, models, core) = run_solver(formula, &self.settings, &projection)?;

        let solutions: Vec<SudokuSolution> = models
            .iter()
            .map(|model| SudokuSolution::decode(&self.encoding, model))
            .collect();
        let violations: Vec<String> = solutions
            .iter()
            .flat_map(|solution| solution.violations(&self.puzzle))
            .collect();
        for violation in &violations {
            warn!("Sudoku solution violates a rule: {}", violation);
        }

        Ok(Outcome {
            solutions,
            report,
            core,
            violations,
        })
    }
}

/// A Numberlink puzzle with its encoding and settings
pub struct NumberlinkProblem {
    settings: Settings,
    puzzle: NumberlinkPuzzle,
    encoding: NumberlinkEncoding,
}

impl NumberlinkProblem {
    pub fn new(settings: Settings, puzzle: NumberlinkPuzzle) -> Result<Self> {
        let encoding = NumberlinkEncoding::encode(&puzzle, settings.encoding.options())
            .context("Failed to encode numberlink puzzle")?;
        Ok(Self {
            settings,
            puzzle,
            encoding,
        })
    }

    pub fn puzzle(&self) -> &NumberlinkPuzzle {
        &self.puzzle
    }

    pub fn encoding(&self) -> &NumberlinkEncoding {
        &self.encoding
    }

    pub fn solve(&self) -> Result<Outcome<NumberlinkSolution>> {
        let formula = &self.encoding.formula;
        export_formula(formula, &self.settings.output)?;

        let projection = self.encoding.edge_variables();
        let (report, models, core) = run_solver(formula, &self.settings, &projection)?;

        let solutions: Vec<NumberlinkSolution> = models
            .iter()
            .map(|model| NumberlinkSolution::decode(&self.encoding, model))
            .collect();

        let mut violations = Vec::new();
        for solution in &solutions {
            violations.extend(solution.violations(&self.puzzle));
            let loops = solution.stray_loops(&self.puzzle).len();
            if loops > 0 {
                info!("Solution contains {} stray loop(s) away from every line", loops);
            }
        }
        for violation in &violations {
            warn!("Numberlink solution violates a rule: {}", violation);
        }

        Ok(Outcome {
            solutions,
            report,
            core,
            violations,
        })
    }
}

/// Verdict of an offline decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedResult {
    pub satisfiable: bool,
    /// Names of the true variables in ascending ID order
    pub true_names: Vec<String>,
}

impl DecodedResult {
    /// Rebuild a Sudoku grid from `p_{i}{j}={k}` names, if every cell is named
    pub fn sudoku_grid(&self) -> Option<SudokuSolution> {
        let mut grid = [[0u8; SIZE]; SIZE];
        for name in &self.true_names {
            let Some((cell, digit)) = name.strip_prefix("p_").and_then(|rest| rest.split_once('=')) else {
                continue;
            };
            let coords: Vec<usize> = cell
                .chars()
                .map(|c| c.to_digit(10).map(|d| d as usize))
                .collect::<Option<_>>()?;
            let digit: usize = digit.parse().ok()?;
            match coords[..] {
                [row, col] if row < SIZE && col < SIZE && digit < SIZE => {
                    grid[row][col] = digit as u8 + 1;
                }
                _ => return None,
            }
        }
        grid.iter().flatten().all(|&d| d != 0).then_some(SudokuSolution { grid })
    }
}

/// Decode a solver result file against a saved meaning map
pub fn decode_offline<P: AsRef<Path>, Q: AsRef<Path>>(meaning_path: P, result_path: Q) -> Result<DecodedResult> {
    let names = load_meaning_map(&meaning_path)
        .with_context(|| format!("Failed to load meaning file: {}", meaning_path.as_ref().display()))?;
    let text = std::fs::read_to_string(&result_path)
        .with_context(|| format!("Failed to read result file: {}", result_path.as_ref().display()))?;
    let verdict = parse_solver_output(&text)
        .with_context(|| format!("Failed to parse result file: {}", result_path.as_ref().display()))?;

    Ok(match verdict {
        SolverVerdict::Satisfiable(model) => DecodedResult {
            satisfiable: true,
            true_names: model.describe(&names).into_iter().map(String::from).collect(),
        },
        SolverVerdict::Unsatisfiable => DecodedResult {
            satisfiable: false,
            true_names: Vec::new(),
        },
    })
}

/// One row of a batch run
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: std::result::Result<BatchVerdict, String>,
}

#[derive(Debug, Clone)]
pub struct BatchVerdict {
    pub kind: &'static str,
    pub satisfiable: bool,
    /// No violations in the decoded solution
    pub valid: bool,
    pub variable_count: usize,
    pub clause_count: usize,
    pub solve_time: Duration,
}

/// Puzzle files directly inside `dir`, sorted by path
pub fn collect_puzzle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PUZZLE_EXTENSIONS.contains(&ext));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn solve_file(path: &Path, settings: &Settings) -> Result<BatchVerdict> {
    let puzzle = Puzzle::load(path)?;
    let kind = puzzle.kind();
    let (report, valid) = match puzzle {
        Puzzle::Sudoku(puzzle) => {
            let outcome = SudokuProblem::new(settings.clone(), puzzle).solve()?;
            (outcome.report, outcome.violations.is_empty())
        }
        Puzzle::Numberlink(puzzle) => {
            let outcome = NumberlinkProblem::new(settings.clone(), puzzle)?.solve()?;
            (outcome.report, outcome.violations.is_empty())
        }
    };

    Ok(BatchVerdict {
        kind,
        satisfiable: report.is_satisfiable(),
        valid,
        variable_count: report.variable_count,
        clause_count: report.clause_count,
        solve_time: report.solve_time,
    })
}

/// Solve every puzzle file in a directory in parallel
pub fn solve_batch<P: AsRef<Path>>(dir: P, settings: &Settings) -> Result<Vec<BatchEntry>> {
    let files = collect_puzzle_files(&dir)?;
    info!("Solving {} puzzle files from {}", files.len(), dir.as_ref().display());

    // per-file exports would overwrite each other
    let mut settings = settings.clone();
    settings.output.dimacs_file = None;
    settings.output.meaning_file = None;
    settings.solver.max_solutions = 1;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = settings.batch.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().context("Failed to build worker pool")?;

    let start = Instant::now();
    let entries: Vec<BatchEntry> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let result = solve_file(path, &settings).map_err(|e| {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    format!("{:#}", e)
                });
                BatchEntry {
                    path: path.clone(),
                    result,
                }
            })
            .collect()
    });
    info!("Batch finished in {:.3}s", start.elapsed().as_secs_f64());

    Ok(entries)
}

/// A classic 30-hint Sudoku
pub const EXAMPLE_SUDOKU: &str = "c classic puzzle with a unique solution
p sudoku 9 9
1 1 5
1 2 3
1 5 7
2 1 6
2 4 1
2 5 9
2 6 5
3 2 9
3 3 8
3 8 6
4 1 8
4 5 6
4 9 3
5 1 4
5 4 8
5 6 3
5 9 1
6 1 7
6 5 2
6 9 6
7 2 6
7 7 2
7 8 8
8 4 4
8 5 1
8 6 9
8 9 5
9 5 8
9 8 7
9 9 9
";

/// A 5x5 Numberlink with three lines
pub const EXAMPLE_NUMBERLINK: &str = "# coordinates are (column,row)
SIZE 5X5
LINE_NUM 3
LINE#1 (1,1)-(5,1)
LINE#2 (1,2)-(1,5)
LINE#3 (2,3)-(5,5)
";

/// Write the example puzzles into a directory
pub fn create_example_puzzles<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    std::fs::write(dir.join("classic.sudoku"), EXAMPLE_SUDOKU).context("Failed to write classic.sudoku")?;
    std::fs::write(dir.join("empty.sudoku"), "p sudoku 9 9\n").context("Failed to write empty.sudoku")?;
    std::fs::write(dir.join("three_lines.nl"), EXAMPLE_NUMBERLINK)
        .context("Failed to write three_lines.nl")?;

    Ok(())
}
