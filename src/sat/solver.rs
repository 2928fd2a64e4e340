//! SAT solver integration using CaDiCaL

use super::formula::Formula;
use super::model::Model;
use anyhow::Result;
use cadical::Solver;
use std::time::{Duration, Instant};

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    options: SolverOptions,
    /// One activation literal per tracked clause, in insertion order
    selectors: Vec<i32>,
}

/// Configuration options for the SAT solver
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    /// Guard each clause with an activation literal so UNSAT answers carry a core
    pub track_core: bool,
}

/// Outcome of a single solve call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfiable(Model),
    /// `core` holds clause indices when core tracking is enabled
    Unsatisfiable { core: Option<Vec<usize>> },
}

/// Result of SAT solving
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub solve_time: Duration,
    pub variable_count: usize,
    pub clause_count: usize,
}

impl SolveReport {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self.outcome, SolveOutcome::Satisfiable(_))
    }

    pub fn model(&self) -> Option<&Model> {
        match &self.outcome {
            SolveOutcome::Satisfiable(model) => Some(model),
            SolveOutcome::Unsatisfiable { .. } => None,
        }
    }

    pub fn core(&self) -> Option<&[usize]> {
        match &self.outcome {
            SolveOutcome::Unsatisfiable { core } => core.as_deref(),
            SolveOutcome::Satisfiable(_) => None,
        }
    }
}

impl SatSolver {
    /// Create a solver for clauses over `variable_count` variables
    pub fn new(variable_count: usize, options: SolverOptions) -> Self {
        Self {
            solver: Solver::new(),
            variable_count,
            clause_count: 0,
            options,
            selectors: Vec::new(),
        }
    }

    /// Create a solver loaded with every clause of a formula
    pub fn from_formula(formula: &Formula, options: SolverOptions) -> Result<Self> {
        let mut solver = Self::new(formula.variable_count(), options);
        solver.add_clauses(&formula.to_solver_input())?;
        Ok(solver)
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &[Vec<i32>]) -> Result<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    /// Add a single clause to the solver
    pub fn add_clause(&mut self, clause: &[i32]) -> Result<()> {
        if let Some(&lit) = clause
            .iter()
            .find(|l| **l == 0 || l.unsigned_abs() as usize > self.variable_count)
        {
            anyhow::bail!(
                "Literal {} is outside the variable range 1..={}",
                lit,
                self.variable_count
            );
        }

        if self.options.track_core {
            let selector = (self.variable_count + 1 + self.selectors.len()) as i32;
            self.selectors.push(selector);
            self.solver
                .add_clause(clause.iter().copied().chain(std::iter::once(-selector)));
        } else {
            self.solver.add_clause(clause.iter().copied());
        }

        self.clause_count += 1;
        Ok(())
    }

    /// Solve the SAT problem
    pub fn solve(&mut self) -> Result<SolveReport> {
        let start_time = Instant::now();

        let result = if self.options.track_core {
            self.solver.solve_with(self.selectors.iter().copied())
        } else {
            self.solver.solve()
        };
        let solve_time = start_time.elapsed();

        let outcome = match result {
            Some(true) => SolveOutcome::Satisfiable(self.extract_model()),
            Some(false) => SolveOutcome::Unsatisfiable {
                core: self.options.track_core.then(|| self.extract_core()),
            },
            None => anyhow::bail!("Solver stopped without a verdict"),
        };

        Ok(SolveReport {
            outcome,
            solve_time,
            variable_count: self.variable_count,
            clause_count: self.clause_count,
        })
    }

    /// Enumerate up to `max_solutions` models that differ on `projection`.
    ///
    /// An empty projection blocks on every variable.
    pub fn solve_multiple(&mut self, max_solutions: usize, projection: &[u32]) -> Result<Vec<Model>> {
        let mut models = Vec::new();

        for _ in 0..max_solutions {
            let report = self.solve()?;
            match report.outcome {
                SolveOutcome::Satisfiable(model) => {
                    self.block_model(&model, projection);
                    models.push(model);
                }
                SolveOutcome::Unsatisfiable { .. } => break,
            }
        }

        Ok(models)
    }

    /// Extract variable assignment from the solver
    fn extract_model(&self) -> Model {
        let known = self.solver.max_variable().max(0) as usize;
        let values = (1..=self.variable_count as i32)
            .map(|var| {
                let value = (var as usize) <= known && self.solver.value(var) == Some(true);
                if value {
                    var
                } else {
                    -var
                }
            })
            .collect();
        Model::new(values)
    }

    fn extract_core(&self) -> Vec<usize> {
        self.selectors
            .iter()
            .enumerate()
            .filter(|(_, selector)| self.solver.failed(**selector))
            .map(|(index, _)| index)
            .collect()
    }

    /// Add a blocking clause to prevent finding the same solution again
    pub fn block_model(&mut self, model: &Model, projection: &[u32]) {
        let blocking: Vec<i32> = if projection.is_empty() {
            model.values().iter().map(|&v| -v).collect()
        } else {
            projection
                .iter()
                .filter_map(|&var| {
                    (var as usize)
                        .checked_sub(1)
                        .and_then(|i| model.values().get(i))
                })
                .map(|&v| -v)
                .collect()
        };
        // Blocking clauses are never part of a reported core
        self.solver.add_clause(blocking);
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl std::fmt::Display for SolveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        match &self.outcome {
            SolveOutcome::Satisfiable(model) => {
                writeln!(f, "  Result: SAT ({} true variables)", model.true_variables().count())?
            }
            SolveOutcome::Unsatisfiable { core: Some(core) } => {
                writeln!(f, "  Result: UNSAT (core of {} clauses)", core.len())?
            }
            SolveOutcome::Unsatisfiable { core: None } => writeln!(f, "  Result: UNSAT")?,
        }
        Ok(())
    }
}
