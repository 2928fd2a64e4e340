//! CNF formula builder and DIMACS serialization

use super::variables::{Literal, VariableManager, VariableStatistics};
use crate::error::{PuzzleError, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<Literal>,
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Signed integer form of the literals
    pub fn to_dimacs(&self) -> Vec<i32> {
        self.literals.iter().map(|l| l.to_dimacs()).collect()
    }
}

/// Variable namespace plus an ordered clause list
#[derive(Debug, Clone, Default)]
pub struct Formula {
    variables: VariableManager,
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an unnamed variable and return its positive literal
    pub fn new_variable(&mut self) -> Literal {
        self.variables.new_variable(None)
    }

    /// Allocate a variable carrying a diagnostic name
    pub fn new_named_variable(&mut self, name: impl Into<String>) -> Literal {
        self.variables.new_variable(Some(name.into()))
    }

    /// Append a clause. Literal bounds are the caller's responsibility.
    pub fn add_clause<I>(&mut self, literals: I)
    where
        I: IntoIterator<Item = Literal>,
    {
        self.clauses.push(Clause::new(literals.into_iter().collect()));
    }

    pub fn variable_count(&self) -> usize {
        self.variables.variable_count()
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn variables(&self) -> &VariableManager {
        &self.variables
    }

    /// Ordered map from variable ID to its name
    pub fn meaning_map(&self) -> &BTreeMap<u32, String> {
        self.variables.meaning_map()
    }

    /// Render the formula as DIMACS CNF text
    pub fn to_dimacs(&self) -> String {
        let mut out = String::with_capacity(16 + self.clauses.len() * 12);
        // Writing into a String cannot fail
        let _ = writeln!(out, "p cnf {} {}", self.variable_count(), self.clause_count());
        for clause in &self.clauses {
            for literal in &clause.literals {
                let _ = write!(out, "{} ", literal);
            }
            out.push_str("0\n");
        }
        out
    }

    /// Clause list as signed integers for direct solver hand-off
    pub fn to_solver_input(&self) -> Vec<Vec<i32>> {
        self.clauses.iter().map(Clause::to_dimacs).collect()
    }

    /// Write the DIMACS text to a file
    pub fn save_dimacs<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_with_parents(path.as_ref(), self.to_dimacs())
    }

    /// Write the ID to name table as JSON with string keys
    pub fn save_meaning_map<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self.meaning_map())?;
        write_with_parents(path.as_ref(), json)
    }

    /// Clause rendered with variable names, `-` marking negation
    pub fn describe_clause(&self, index: usize) -> Option<String> {
        let clause = self.clauses.get(index)?;
        let parts: Vec<String> = clause
            .literals
            .iter()
            .map(|lit| {
                let name = self
                    .variables
                    .name(lit.var())
                    .map(str::to_string)
                    .unwrap_or_else(|| lit.var().to_string());
                if lit.is_positive() {
                    name
                } else {
                    format!("-{}", name)
                }
            })
            .collect();
        Some(format!("[{}]", parts.join(", ")))
    }

    pub fn statistics(&self) -> FormulaStatistics {
        let longest_clause = self.clauses.iter().map(Clause::len).max().unwrap_or(0);
        FormulaStatistics {
            variables: self.variables.statistics(),
            clause_count: self.clauses.len(),
            literal_count: self.clauses.iter().map(Clause::len).sum(),
            longest_clause,
        }
    }
}

fn write_with_parents(path: &Path, content: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Load an ID to name table written by [`Formula::save_meaning_map`]
pub fn load_meaning_map<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// A CNF read back from DIMACS text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimacsCnf {
    pub variable_count: usize,
    pub clauses: Vec<Vec<i32>>,
}

/// Parse DIMACS CNF text.
///
/// Comment lines start with `c`. Clauses may span lines and end at `0`.
pub fn parse_dimacs(text: &str) -> Result<DimacsCnf> {
    let mut header: Option<(usize, usize)> = None;
    let mut clauses = Vec::new();
    let mut current = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.starts_with('%') {
            break;
        }
        if line.starts_with('p') {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 4 || parts[1] != "cnf" {
                return Err(PuzzleError::malformed_at(line_no, "expected 'p cnf <vars> <clauses>'"));
            }
            let vars = parse_count(parts[2], line_no)?;
            let count = parse_count(parts[3], line_no)?;
            header = Some((vars, count));
            continue;
        }
        if header.is_none() {
            return Err(PuzzleError::malformed_at(line_no, "clause before problem line"));
        }
        for token in line.split_whitespace() {
            let value: i32 = token.parse().map_err(|_| {
                PuzzleError::malformed_at(line_no, format!("invalid literal '{}'", token))
            })?;
            if value == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                current.push(value);
            }
        }
    }

    let (variable_count, clause_count) =
        header.ok_or_else(|| PuzzleError::malformed("missing problem line"))?;
    if !current.is_empty() {
        return Err(PuzzleError::malformed("last clause is not terminated by 0"));
    }
    if clauses.len() != clause_count {
        return Err(PuzzleError::malformed(format!(
            "header declares {} clauses, found {}",
            clause_count,
            clauses.len()
        )));
    }
    if let Some(lit) = clauses.iter().flatten().find(|l| l.unsigned_abs() as usize > variable_count) {
        return Err(PuzzleError::malformed(format!(
            "literal {} exceeds declared variable count {}",
            lit, variable_count
        )));
    }

    Ok(DimacsCnf {
        variable_count,
        clauses,
    })
}

fn parse_count(token: &str, line_no: usize) -> Result<usize> {
    token
        .parse()
        .map_err(|_| PuzzleError::malformed_at(line_no, format!("invalid count '{}'", token)))
}

/// Statistics about a built formula
#[derive(Debug, Clone)]
pub struct FormulaStatistics {
    pub variables: VariableStatistics,
    pub clause_count: usize,
    pub literal_count: usize,
    pub longest_clause: usize,
}

impl std::fmt::Display for FormulaStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.variables)?;
        writeln!(f, "Clause Statistics:")?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        writeln!(f, "  Literals: {}", self.literal_count)?;
        writeln!(f, "  Longest clause: {}", self.longest_clause)?;
        Ok(())
    }
}
