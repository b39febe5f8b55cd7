#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Polarity selection for decisions.
//!
//! Once a proposition has been chosen for branching, an
//! `AssignmentHeuristic` decides which value to try first. Under the
//! chronological backjump policy the other value is tried when the first
//! one fails; under conflict-driven backjumping it is implied by a learned
//! clause instead.

use crate::sat::cnf::CnfFormula;
use crate::sat::formula_state::FormulaState;
use crate::sat::literal::{Literal, Variable};
use crate::sat::occurrences::Occurrences;
use fastrand::Rng;

pub trait AssignmentHeuristic {
    /// The value to give `prop` first.
    fn choose_assignment(
        &mut self,
        prop: Variable,
        state: &FormulaState,
        formula: &CnfFormula,
        occurrences: &Occurrences,
    ) -> bool;
}

impl<H: AssignmentHeuristic + ?Sized> AssignmentHeuristic for Box<H> {
    fn choose_assignment(
        &mut self,
        prop: Variable,
        state: &FormulaState,
        formula: &CnfFormula,
        occurrences: &Occurrences,
    ) -> bool {
        (**self).choose_assignment(prop, state, formula, occurrences)
    }
}

/// Always tries `false` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FalseFirst;

impl AssignmentHeuristic for FalseFirst {
    fn choose_assignment(&mut self, _: Variable, _: &FormulaState, _: &CnfFormula, _: &Occurrences) -> bool {
        false
    }
}

/// Always tries `true` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrueFirst;

impl AssignmentHeuristic for TrueFirst {
    fn choose_assignment(&mut self, _: Variable, _: &FormulaState, _: &CnfFormula, _: &Occurrences) -> bool {
        true
    }
}

/// A coin flip per decision.
#[derive(Debug, Clone)]
pub struct RandomAssignment(Rng);

impl Default for RandomAssignment {
    fn default() -> Self {
        Self(Rng::new())
    }
}

impl RandomAssignment {
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self(Rng::with_seed(seed))
    }
}

impl AssignmentHeuristic for RandomAssignment {
    fn choose_assignment(&mut self, _: Variable, _: &FormulaState, _: &CnfFormula, _: &Occurrences) -> bool {
        self.0.bool()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vote {
    #[default]
    Majority,
    Minority,
}

/// Picks the polarity by counting the open clauses each literal of the
/// proposition occurs in. Ties go to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteAssignment {
    vote: Vote,
}

impl VoteAssignment {
    /// Follows the polarity occurring in more open clauses.
    #[must_use]
    pub const fn majority() -> Self {
        Self { vote: Vote::Majority }
    }

    /// Follows the polarity occurring in fewer open clauses.
    #[must_use]
    pub const fn minority() -> Self {
        Self { vote: Vote::Minority }
    }

    #[must_use]
    pub const fn vote(self) -> Vote {
        self.vote
    }
}

/// Open clauses containing `lit`.
fn open_count(lit: Literal, state: &FormulaState, occurrences: &Occurrences) -> usize {
    occurrences
        .of(lit)
        .iter()
        .filter(|&&clause| state.is_open(clause))
        .count()
}

impl AssignmentHeuristic for VoteAssignment {
    fn choose_assignment(
        &mut self,
        prop: Variable,
        state: &FormulaState,
        _: &CnfFormula,
        occurrences: &Occurrences,
    ) -> bool {
        let positive = open_count(Literal::positive(prop), state, occurrences);
        let negative = open_count(Literal::negative(prop), state, occurrences);

        match self.vote {
            Vote::Majority => positive > negative,
            Vote::Minority => positive < negative,
        }
    }
}

/// The naive default: `false` first.
#[must_use]
pub const fn default_assign() -> FalseFirst {
    FalseFirst
}
