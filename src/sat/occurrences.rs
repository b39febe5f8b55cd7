#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literal occurrence lists.
//!
//! For every literal, the indices of the clauses that contain it. Unit
//! propagation walks the list of the negation of a freshly assigned literal;
//! the simplification counters walk the list of the literal itself.

use crate::sat::clause::Clause;
use crate::sat::cnf::CnfFormula;
use crate::sat::literal::Literal;
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

pub type ClauseList = SmallVec<[usize; 6]>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Occurrences(Vec<ClauseList>);

impl Occurrences {
    /// Indexes every clause of `formula`.
    ///
    /// A clause that repeats a literal is listed once for it.
    #[must_use]
    pub fn new(formula: &CnfFormula) -> Self {
        let mut occurrences = Self(vec![ClauseList::new(); formula.num_props() * 2]);

        for (idx, clause) in formula.iter().enumerate() {
            occurrences.add_clause(clause, idx);
        }

        occurrences
    }

    /// Registers `clause`, stored at `idx`, under each of its literals.
    pub fn add_clause(&mut self, clause: &Clause, idx: usize) {
        for &lit in clause.iter() {
            let code = lit.index();
            if code >= self.0.len() {
                self.0.resize(code + 1, ClauseList::new());
            }
            let list = &mut self.0[code];
            if list.last() != Some(&idx) {
                list.push(idx);
            }
        }
    }

    /// Clauses containing `lit`; empty for literals never seen.
    #[must_use]
    pub fn of(&self, lit: Literal) -> &[usize] {
        self.0.get(lit.index()).map_or(&[], |list| list.as_slice())
    }

    /// How many clauses mention `lit`.
    #[must_use]
    pub fn count(&self, lit: Literal) -> usize {
        self.of(lit).len()
    }
}

impl Index<Literal> for Occurrences {
    type Output = ClauseList;

    fn index(&self, index: Literal) -> &Self::Output {
        &self.0[index.index()]
    }
}

impl IndexMut<Literal> for Occurrences {
    fn index_mut(&mut self, index: Literal) -> &mut Self::Output {
        &mut self.0[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![-1, 2], vec![2, 2]]);
        let occ = Occurrences::new(&formula);

        assert_eq!(occ.of(Literal::positive(0)), &[0]);
        assert_eq!(occ.of(Literal::negative(0)), &[1]);
        assert_eq!(occ.of(Literal::positive(1)), &[0, 1, 2]);
        assert!(occ.of(Literal::negative(1)).is_empty());
        assert_eq!(occ[Literal::positive(1)].len(), 3);
    }

    #[test]
    fn test_add_clause_grows() {
        let formula = CnfFormula::from_dimacs(&[vec![1]]);
        let mut occ = Occurrences::new(&formula);

        occ.add_clause(&Clause::from_dimacs(&[-5, 1]), 1);
        assert_eq!(occ.of(Literal::negative(4)), &[1]);
        assert_eq!(occ.count(Literal::positive(0)), 2);
        assert!(occ.of(Literal::positive(9)).is_empty());
    }
}
