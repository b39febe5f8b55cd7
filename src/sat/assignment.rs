#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Truth assignments over the propositions of a formula.

use crate::sat::literal::{Literal, Variable};
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use std::fmt;

/// The value of a single proposition during search.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::Assigned(true))
    }

    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::Assigned(false))
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

impl fmt::Display for VarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(true) => write!(f, "True"),
            Self::Assigned(false) => write!(f, "False"),
            Self::Unassigned => write!(f, "Unassigned"),
        }
    }
}

/// A mapping from proposition to value; partial during search, total on success.
///
/// Each proposition has exactly one slot, so a proposition can never be
/// assigned twice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Assignment(Vec<VarState>);

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<Variable> for Assignment {
    fn index_mut(&mut self, index: Variable) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Assignment {
    /// An assignment over `n` propositions, all unassigned.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self(vec![VarState::Unassigned; n])
    }

    /// Builds a total assignment from one boolean per proposition.
    #[must_use]
    pub fn from_values(values: &[bool]) -> Self {
        Self(values.iter().map(|&b| VarState::Assigned(b)).collect())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set(&mut self, var: Variable, b: bool) {
        self.0[var] = VarState::Assigned(b);
    }

    pub fn unassign(&mut self, var: Variable) {
        self.0[var] = VarState::Unassigned;
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal) {
        self.set(lit.prop(), lit.polarity());
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        self.0.get(var).and_then(|s| s.value())
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self.0[var].is_assigned()
    }

    #[must_use]
    pub fn all_assigned(&self) -> bool {
        self.0.iter().all(|s| s.is_assigned())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VarState> {
        self.0.iter()
    }

    /// Propositions without a value, in increasing order.
    pub fn unassigned(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_unassigned().then_some(i))
    }

    #[must_use]
    pub fn num_assigned(&self) -> usize {
        self.0.iter().filter(|s| s.is_assigned()).count()
    }

    /// The model as signed DIMACS literals; unassigned propositions are skipped.
    #[must_use]
    pub fn to_dimacs_model(&self) -> Vec<i32> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.value().map(|b| Literal::new(i, !b).to_dimacs()))
            .collect()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_state() {
        assert!(VarState::Assigned(true).is_true());
        assert!(VarState::Assigned(false).is_false());
        assert!(VarState::Unassigned.is_unassigned());
        assert_eq!(VarState::Assigned(false).value(), Some(false));
        assert_eq!(VarState::Unassigned.value(), None);
    }

    #[test]
    fn test_assign_and_unassign() {
        let mut a = Assignment::new(3);
        a.assign(Literal::negative(1));
        a.set(2, true);

        assert_eq!(a.var_value(1), Some(false));
        assert_eq!(a.var_value(2), Some(true));
        assert_eq!(a.unassigned().collect_vec(), vec![0]);
        assert_eq!(a.num_assigned(), 2);
        assert!(!a.all_assigned());

        a.unassign(2);
        assert_eq!(a.var_value(2), None);
        assert_eq!(a.unassigned().collect_vec(), vec![0, 2]);
    }

    #[test]
    fn test_display() {
        let mut a = Assignment::new(3);
        a.set(0, true);
        a.set(1, false);
        assert_eq!(a.to_string(), "[True, False, Unassigned]");
        assert_eq!(Assignment::default().to_string(), "[]");
    }

    #[test]
    fn test_dimacs_model() {
        let a = Assignment::from_values(&[true, false, true]);
        assert_eq!(a.to_dimacs_model(), vec![1, -2, 3]);
    }
}
