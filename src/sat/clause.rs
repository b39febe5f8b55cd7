#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Disjunctive clauses.
//!
//! A `Clause` keeps its literals in insertion order. Duplicate literals and
//! complementary pairs are kept as given; the status queries below are
//! written so that the solver tolerates both.

use crate::sat::assignment::Assignment;
use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;

/// Inline literal storage; most clauses fit without a heap allocation.
pub type LiteralStorage = SmallVec<[Literal; 8]>;

/// How a clause stands under a partial assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseStatus {
    /// Some literal is true.
    Satisfied,
    /// Every literal is false.
    Falsified,
    /// No literal is true and exactly one distinct literal is unassigned.
    Unit(Literal),
    /// No literal is true and at least two distinct literals are unassigned.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    literals: LiteralStorage,
}

impl Clause {
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    /// Builds a clause from signed DIMACS literals (variable `v` is proposition `v - 1`).
    #[must_use]
    pub fn from_dimacs(literals: &[i32]) -> Self {
        Self::new(literals.iter().map(|&l| Literal::from_dimacs(l)))
    }

    pub fn add_literal(&mut self, literal: Literal) {
        self.literals.push(literal);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Structural unit test: the clause holds a single literal.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .any(|&l| self.literals.contains(&l.negate()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// The largest proposition index used, if any.
    #[must_use]
    pub fn max_prop(&self) -> Option<Variable> {
        self.literals.iter().map(|l| l.prop()).max()
    }

    /// `Some(true)` if any literal is true, `Some(false)` if all are false,
    /// `None` otherwise.
    #[must_use]
    pub fn eval(&self, assignment: &Assignment) -> Option<bool> {
        let mut found_unassigned = false;

        for literal in &self.literals {
            match literal.eval(assignment) {
                Some(true) => return Some(true),
                None => found_unassigned = true,
                Some(false) => {}
            }
        }

        if found_unassigned { None } else { Some(false) }
    }

    #[must_use]
    pub fn status(&self, assignment: &Assignment) -> ClauseStatus {
        let mut candidate: Option<Literal> = None;
        let mut unresolved = false;

        for &literal in &self.literals {
            match literal.eval(assignment) {
                Some(true) => return ClauseStatus::Satisfied,
                Some(false) => {}
                None => match candidate {
                    None => candidate = Some(literal),
                    Some(c) if c != literal => unresolved = true,
                    Some(_) => {}
                },
            }
        }

        match candidate {
            None => ClauseStatus::Falsified,
            Some(_) if unresolved => ClauseStatus::Unresolved,
            Some(lit) => ClauseStatus::Unit(lit),
        }
    }

    /// The distinct unassigned propositions of the clause, in clause order.
    #[must_use]
    pub fn unassigned_props(&self, assignment: &Assignment) -> Vec<Variable> {
        self.literals
            .iter()
            .filter(|l| assignment.var_value(l.prop()).is_none())
            .map(|l| l.prop())
            .unique()
            .collect()
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self::new(literals)
    }
}

impl From<&[i32]> for Clause {
    fn from(literals: &[i32]) -> Self {
        Self::from_dimacs(literals)
    }
}

impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        Self::from_dimacs(&literals)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "( {} )", self.literals.iter().join(" v "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::VarState;

    fn assignment(values: &[VarState]) -> Assignment {
        let mut a = Assignment::new(values.len());
        for (i, &v) in values.iter().enumerate() {
            a[i] = v;
        }
        a
    }

    const T: VarState = VarState::Assigned(true);
    const F: VarState = VarState::Assigned(false);
    const U: VarState = VarState::Unassigned;

    #[test]
    fn test_new() {
        let clause = Clause::from_dimacs(&[1, 2, 3]);
        assert_eq!(clause.len(), 3);
        assert_eq!(clause[0], Literal::positive(0));
        assert_eq!(clause[2], Literal::positive(2));
        assert_eq!(clause.max_prop(), Some(2));
    }

    #[test]
    fn test_eval() {
        let mut c = Clause::default();
        c.add_literal(Literal::positive(0));
        c.add_literal(Literal::negative(0));
        c.add_literal(Literal::positive(1));

        assert_eq!(c.eval(&assignment(&[T, F])), Some(true));
        assert_eq!(c.eval(&assignment(&[F, T])), Some(true));
        assert_eq!(c.eval(&assignment(&[U, U])), None);
        assert_eq!(c.eval(&assignment(&[U, F])), None);

        let d = Clause::from_dimacs(&[1, -2]);
        assert_eq!(d.eval(&assignment(&[F, T])), Some(false));
    }

    #[test]
    fn test_status() {
        let c = Clause::from_dimacs(&[1, -2, 3]);

        assert_eq!(c.status(&assignment(&[F, T, U])), ClauseStatus::Unit(Literal::positive(2)));
        assert_eq!(c.status(&assignment(&[F, T, F])), ClauseStatus::Falsified);
        assert_eq!(c.status(&assignment(&[U, T, U])), ClauseStatus::Unresolved);
        assert_eq!(c.status(&assignment(&[U, F, U])), ClauseStatus::Satisfied);
    }

    #[test]
    fn test_status_with_duplicates_and_tautologies() {
        let duplicated = Clause::from_dimacs(&[1, 1, -2]);
        assert_eq!(
            duplicated.status(&assignment(&[U, T])),
            ClauseStatus::Unit(Literal::positive(0))
        );

        let tautology = Clause::from_dimacs(&[1, -1]);
        assert!(tautology.is_tautology());
        assert!(!duplicated.is_tautology());
        assert_eq!(tautology.status(&assignment(&[U])), ClauseStatus::Unresolved);
        assert_eq!(tautology.status(&assignment(&[F])), ClauseStatus::Satisfied);
    }

    #[test]
    fn test_empty_clause_is_falsified() {
        let empty = Clause::default();
        assert!(empty.is_empty());
        assert_eq!(empty.eval(&Assignment::new(0)), Some(false));
        assert_eq!(empty.status(&Assignment::new(0)), ClauseStatus::Falsified);
    }

    #[test]
    fn test_unassigned_props() {
        let c = Clause::from_dimacs(&[1, -1, 2, 3]);
        assert_eq!(c.unassigned_props(&assignment(&[U, U, F])), vec![0, 1]);
        assert!(c.unassigned_props(&assignment(&[T, F, F])).is_empty());
    }

    #[test]
    fn test_display() {
        let c = Clause::new([Literal::negative(0), Literal::positive(0), Literal::positive(1)]);
        assert_eq!(c.to_string(), "( !p0 v p0 v p1 )");
        assert!(!c.is_unit());
        assert!(Clause::from_dimacs(&[4]).is_unit());
    }
}
