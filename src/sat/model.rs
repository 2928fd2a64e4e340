//! Models returned by the solver and offline decoding of solver output

use super::variables::Literal;
use crate::error::{PuzzleError, Result};
use std::collections::BTreeMap;

/// A total truth assignment.
///
/// Index `i - 1` holds a signed integer whose sign gives the value of variable `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    values: Vec<i32>,
}

impl Model {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values }
    }

    /// Build a model from the list of true variables over `variable_count` variables
    pub fn from_true_variables(variable_count: usize, true_vars: &[u32]) -> Self {
        let mut values: Vec<i32> = (1..=variable_count as i32).map(|v| -v).collect();
        for &var in true_vars {
            let slot = (var as usize).checked_sub(1).and_then(|i| values.get_mut(i));
            if let Some(slot) = slot {
                *slot = var as i32;
            }
        }
        Self { values }
    }

    /// Truth value of a literal. Variables outside the model read as false.
    pub fn value(&self, literal: Literal) -> bool {
        let assigned = self
            .values
            .get(literal.var() as usize - 1)
            .is_some_and(|&v| v > 0);
        assigned == literal.is_positive()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Variables assigned true, in ascending order
    pub fn true_variables(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().filter(|&&v| v > 0).map(|&v| v as u32)
    }

    /// Names of the true variables that appear in the meaning map
    pub fn describe<'a>(&self, names: &'a BTreeMap<u32, String>) -> Vec<&'a str> {
        self.true_variables()
            .filter_map(|var| names.get(&var).map(String::as_str))
            .collect()
    }
}

/// Verdict read from a solver result file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverVerdict {
    Satisfiable(Model),
    Unsatisfiable,
}

/// Parse SAT-competition style solver output (`s ...` and `v ...` lines).
///
/// The model is sized by the largest variable mentioned on the value lines.
pub fn parse_solver_output(text: &str) -> Result<SolverVerdict> {
    let mut status: Option<bool> = None;
    let mut literals = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("s ") {
            status = match rest.trim() {
                "SATISFIABLE" => Some(true),
                "UNSATISFIABLE" => Some(false),
                other => {
                    return Err(PuzzleError::malformed_at(
                        idx + 1,
                        format!("unknown solver status '{}'", other),
                    ))
                }
            };
        } else if let Some(rest) = line.strip_prefix("v ") {
            for token in rest.split_whitespace() {
                let value: i32 = token.parse().map_err(|_| {
                    PuzzleError::malformed_at(idx + 1, format!("invalid value '{}'", token))
                })?;
                if value != 0 {
                    literals.push(value);
                }
            }
        }
    }

    match status {
        Some(true) => {
            let variable_count = literals.iter().map(|l| l.unsigned_abs()).max().unwrap_or(0) as usize;
            let true_vars: Vec<u32> = literals
                .iter()
                .filter(|&&l| l > 0)
                .map(|&l| l as u32)
                .collect();
            Ok(SolverVerdict::Satisfiable(Model::from_true_variables(
                variable_count,
                &true_vars,
            )))
        }
        Some(false) => Ok(SolverVerdict::Unsatisfiable),
        None => Err(PuzzleError::malformed("solver output has no status line")),
    }
}
