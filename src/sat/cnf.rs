#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Formulas in conjunctive normal form.
//!
//! A `CnfFormula` is an ordered list of clauses plus the number of
//! propositions it ranges over. The proposition count only ever grows:
//! adding a clause that mentions proposition `p` raises it to at least
//! `p + 1`, and `with_props` can declare trailing propositions that no
//! clause mentions (as a DIMACS header may).

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CnfFormula {
    clauses: Vec<Clause>,
    num_props: usize,
}

impl CnfFormula {
    /// An empty formula over no propositions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty formula that already ranges over `num_props` propositions.
    #[must_use]
    pub const fn with_props(num_props: usize) -> Self {
        Self {
            clauses: Vec::new(),
            num_props,
        }
    }

    /// Builds a formula from signed DIMACS clauses.
    ///
    /// # Arguments
    ///
    /// * `clauses`: each inner vector is one clause; `3` is proposition 2,
    ///   `-3` its negation.
    #[must_use]
    pub fn from_dimacs(clauses: &[Vec<i32>]) -> Self {
        clauses
            .iter()
            .map(|c| Clause::from_dimacs(c))
            .collect()
    }

    /// Appends a clause and widens the proposition count to cover it.
    pub fn add_clause(&mut self, clause: Clause) {
        if let Some(max) = clause.max_prop() {
            self.num_props = self.num_props.max(max + 1);
        }
        self.clauses.push(clause);
    }

    /// Appends the single-literal clause `(prop)` or `(!prop)`.
    pub fn add_unit_clause(&mut self, prop: Variable, negated: bool) {
        self.add_clause(Clause::new([Literal::new(prop, negated)]));
    }

    /// Declares at least `num_props` propositions.
    pub fn ensure_props(&mut self, num_props: usize) {
        self.num_props = self.num_props.max(num_props);
    }

    #[must_use]
    pub const fn num_props(&self) -> usize {
        self.num_props
    }

    #[must_use]
    pub const fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Total number of literal occurrences over all clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// `Some(true)` if every clause is true, `Some(false)` if any clause is
    /// false, `None` otherwise.
    #[must_use]
    pub fn eval(&self, assignment: &Assignment) -> Option<bool> {
        let mut undecided = false;

        for clause in &self.clauses {
            match clause.eval(assignment) {
                Some(false) => return Some(false),
                None => undecided = true,
                Some(true) => {}
            }
        }

        if undecided { None } else { Some(true) }
    }

    /// Checks that `assignment` satisfies every clause.
    ///
    /// Unlike `eval`, an assignment that does not cover the formula's
    /// propositions is rejected rather than treated as a contract violation.
    #[must_use]
    pub fn verify(&self, assignment: &Assignment) -> bool {
        assignment.len() >= self.num_props && self.eval(assignment) == Some(true)
    }
}

impl Index<usize> for CnfFormula {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl FromIterator<Clause> for CnfFormula {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        let mut formula = Self::new();
        for clause in iter {
            formula.add_clause(clause);
        }
        formula
    }
}

impl Extend<Clause> for CnfFormula {
    fn extend<T: IntoIterator<Item = Clause>>(&mut self, iter: T) {
        for clause in iter {
            self.add_clause(clause);
        }
    }
}

impl fmt::Display for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for clause in &self.clauses {
            writeln!(f, "  {clause}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_props_grows() {
        let mut formula = CnfFormula::new();
        assert_eq!(formula.num_props(), 0);

        formula.add_clause(Clause::from_dimacs(&[1, -3]));
        assert_eq!(formula.num_props(), 3);

        formula.add_unit_clause(1, true);
        assert_eq!(formula.num_props(), 3);
        assert_eq!(formula.num_clauses(), 2);
        assert_eq!(formula.num_literals(), 3);
        assert_eq!(formula[1][0], Literal::negative(1));

        let declared = CnfFormula::with_props(10);
        assert_eq!(declared.num_props(), 10);
        assert!(declared.is_empty());
    }

    #[test]
    fn test_eval() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![-1]]);

        assert_eq!(formula.eval(&Assignment::from_values(&[false, true])), Some(true));
        assert_eq!(formula.eval(&Assignment::from_values(&[true, true])), Some(false));

        let mut partial = Assignment::new(2);
        partial.set(0, false);
        assert_eq!(formula.eval(&partial), None);
    }

    #[test]
    fn test_empty_formula_is_true() {
        let formula = CnfFormula::new();
        assert_eq!(formula.eval(&Assignment::new(0)), Some(true));
        assert!(formula.verify(&Assignment::new(0)));
    }

    #[test]
    fn test_verify() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![-1, 3]]);
        assert!(formula.verify(&Assignment::from_values(&[true, false, true])));
        assert!(!formula.verify(&Assignment::from_values(&[true, false, false])));
        assert!(!formula.verify(&Assignment::from_values(&[true, false])));
    }

    #[test]
    fn test_display() {
        let formula = CnfFormula::from_dimacs(&[vec![1, -2], vec![3]]);
        assert_eq!(formula.to_string(), "{\n  ( p0 v !p1 )\n  ( p2 )\n}");
    }
}
