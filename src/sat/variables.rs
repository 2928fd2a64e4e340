//! Variable management for SAT encoding

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Neg, Not};

/// A signed reference to a Boolean variable.
///
/// The magnitude is the 1-based variable index, the sign is the polarity.
/// Negating a literal never allocates a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    /// Wrap a raw DIMACS literal. Zero is reserved as the clause terminator.
    pub fn from_dimacs(value: i32) -> Option<Self> {
        (value != 0).then_some(Self(value))
    }

    /// The literal with the same variable and the opposite sign
    #[inline]
    pub fn negate(self) -> Self {
        Self(-self.0)
    }

    /// 1-based variable index
    #[inline]
    pub fn var(self) -> u32 {
        self.0.unsigned_abs()
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Signed integer form used by DIMACS and the solver
    #[inline]
    pub fn to_dimacs(self) -> i32 {
        self.0
    }
}

impl Neg for Literal {
    type Output = Literal;

    fn neg(self) -> Literal {
        self.negate()
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        self.negate()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates variables and keeps their diagnostic names.
///
/// Every manager owns its counter, so independent encodings never share ids.
#[derive(Debug, Clone)]
pub struct VariableManager {
    /// Next available variable ID
    next_id: i32,
    /// Side table from variable ID to its name
    names: BTreeMap<u32, String>,
}

impl VariableManager {
    /// Create a new variable manager
    pub fn new() -> Self {
        Self {
            next_id: 1, // SAT variables start from 1
            names: BTreeMap::new(),
        }
    }

    /// Allocate the next variable, optionally naming it
    pub fn new_variable(&mut self, name: Option<String>) -> Literal {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(name) = name {
            self.names.insert(id as u32, name);
        }
        Literal(id)
    }

    /// Get the total number of variables created
    pub fn variable_count(&self) -> usize {
        (self.next_id - 1) as usize
    }

    /// Name attached to a variable, if any
    pub fn name(&self, var: u32) -> Option<&str> {
        self.names.get(&var).map(String::as_str)
    }

    /// Ordered map from variable ID to name
    pub fn meaning_map(&self) -> &BTreeMap<u32, String> {
        &self.names
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        VariableStatistics {
            total_variables: self.variable_count(),
            named_variables: self.names.len(),
        }
    }
}

impl Default for VariableManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub named_variables: usize,
}

impl fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Named variables: {}", self.named_variables)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_creation() {
        let mut vm = VariableManager::new();

        let var1 = vm.new_variable(Some("a".to_string()));
        let var2 = vm.new_variable(None);

        assert_eq!(var1.to_dimacs(), 1);
        assert_eq!(var2.to_dimacs(), 2);
        assert_eq!(vm.variable_count(), 2);
    }

    #[test]
    fn test_negation_does_not_allocate() {
        let mut vm = VariableManager::new();
        let lit = vm.new_variable(None);

        let neg = -lit;
        assert_eq!(neg.var(), lit.var());
        assert!(!neg.is_positive());
        assert_eq!(-neg, lit);
        assert_eq!(!lit, neg);
        assert_eq!(lit.negate().negate(), lit);
        assert_eq!(vm.variable_count(), 1);
    }

    #[test]
    fn test_names_side_table() {
        let mut vm = VariableManager::new();
        vm.new_variable(Some("s_00".to_string()));
        vm.new_variable(None);
        let e = vm.new_variable(Some("e_00".to_string()));

        assert_eq!(vm.name(1), Some("s_00"));
        assert_eq!(vm.name(2), None);
        assert_eq!(vm.name(e.var()), Some("e_00"));

        let stats = vm.statistics();
        assert_eq!(stats.total_variables, 3);
        assert_eq!(stats.named_variables, 2);
    }

    #[test]
    fn test_managers_are_independent() {
        let mut first = VariableManager::new();
        let mut second = VariableManager::new();

        first.new_variable(None);
        first.new_variable(None);

        assert_eq!(second.new_variable(None).to_dimacs(), 1);
    }

    #[test]
    fn test_from_dimacs_rejects_zero() {
        assert!(Literal::from_dimacs(0).is_none());
        assert_eq!(Literal::from_dimacs(-4).map(Literal::var), Some(4));
    }
}
