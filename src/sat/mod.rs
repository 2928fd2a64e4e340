//! Formula building, solving and model handling

pub mod formula;
pub mod model;
pub mod solver;
pub mod variables;

pub use formula::{load_meaning_map, parse_dimacs, Clause, DimacsCnf, Formula, FormulaStatistics};
pub use model::{parse_solver_output, Model, SolverVerdict};
pub use solver::{SatSolver, SolveOutcome, SolveReport, SolverOptions};
pub use variables::{Literal, VariableManager};
