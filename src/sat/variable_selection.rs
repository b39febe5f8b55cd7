#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Branching proposition selection.
//!
//! A `PropositionHeuristic` picks the next unassigned proposition for the
//! splitting rule. The stock heuristics are built from
//! `PropositionComparator`s: a comparator ranks two candidates, and the
//! heuristic takes the maximum over all unassigned propositions. Comparators
//! that can tie hold a `next` comparator that decides between equals, so a
//! chain like two-clause, then VSIDS, then random can be assembled by value.

use crate::sat::clause::Clause;
use crate::sat::cnf::CnfFormula;
use crate::sat::formula_state::FormulaState;
use crate::sat::literal::Variable;
use fastrand::Rng;
use std::cmp::Ordering;

/// Chooses the proposition to branch on.
pub trait PropositionHeuristic {
    /// Returns an unassigned proposition, or `None` once the assignment is total.
    fn choose_proposition(&mut self, state: &FormulaState, formula: &CnfFormula) -> Option<Variable>;

    /// Called with every clause learned from a conflict, its LBD and the
    /// running LBD average (already including this clause).
    fn on_learned_clause(&mut self, _clause: &Clause, _lbd: usize, _lbd_ema: f64) {}
}

impl<H: PropositionHeuristic + ?Sized> PropositionHeuristic for Box<H> {
    fn choose_proposition(&mut self, state: &FormulaState, formula: &CnfFormula) -> Option<Variable> {
        (**self).choose_proposition(state, formula)
    }

    fn on_learned_clause(&mut self, clause: &Clause, lbd: usize, lbd_ema: f64) {
        (**self).on_learned_clause(clause, lbd, lbd_ema);
    }
}

/// Ranks candidate propositions; `Ordering::Greater` means `a` is preferred.
pub trait PropositionComparator {
    /// Refreshes whatever the comparator derives from the current state.
    /// Called once before each selection.
    fn prepare(&mut self, _state: &FormulaState, _formula: &CnfFormula) {}

    fn compare(&self, a: Variable, b: Variable) -> Ordering;

    fn observe_learned_clause(&mut self, _clause: &Clause, _lbd: usize, _lbd_ema: f64) {}

    /// The preferred unassigned proposition.
    fn select(&mut self, state: &FormulaState, formula: &CnfFormula) -> Option<Variable> {
        self.prepare(state, formula);
        state
            .assignment()
            .unassigned()
            .max_by(|&a, &b| self.compare(a, b))
    }
}

/// Lowest proposition id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FalseComparator;

impl PropositionComparator for FalseComparator {
    fn compare(&self, a: Variable, b: Variable) -> Ordering {
        b.cmp(&a)
    }
}

impl PropositionHeuristic for FalseComparator {
    fn choose_proposition(&mut self, state: &FormulaState, formula: &CnfFormula) -> Option<Variable> {
        self.select(state, formula)
    }
}

/// Uniformly random choice among the unassigned propositions.
///
/// A fresh random key is drawn for every proposition before each selection,
/// so the maximum is uniform. Seed it for reproducible runs.
#[derive(Debug, Clone)]
pub struct RandomComparator {
    rng: Rng,
    keys: Vec<u64>,
}

impl Default for RandomComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomComparator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Rng::new(),
            keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
            keys: Vec::new(),
        }
    }
}

impl PropositionComparator for RandomComparator {
    fn prepare(&mut self, _state: &FormulaState, formula: &CnfFormula) {
        let rng = &mut self.rng;
        self.keys.clear();
        self.keys
            .extend((0..formula.num_props()).map(|_| rng.u64(..)));
    }

    fn compare(&self, a: Variable, b: Variable) -> Ordering {
        self.keys[a].cmp(&self.keys[b]).then_with(|| b.cmp(&a))
    }
}

impl PropositionHeuristic for RandomComparator {
    fn choose_proposition(&mut self, state: &FormulaState, formula: &CnfFormula) -> Option<Variable> {
        self.select(state, formula)
    }
}

/// Prefers the proposition occurring in the most open binary clauses.
///
/// A clause counts as binary when no literal in it is true and exactly two
/// distinct propositions in it are unassigned.
#[derive(Debug, Clone, Default)]
pub struct TwoClauseComparator<N = FalseComparator> {
    counts: Vec<usize>,
    next: N,
}

impl<N: PropositionComparator> TwoClauseComparator<N> {
    #[must_use]
    pub const fn new(next: N) -> Self {
        Self {
            counts: Vec::new(),
            next,
        }
    }

    /// Binary-clause count of `prop` as of the last selection.
    #[must_use]
    pub fn count(&self, prop: Variable) -> usize {
        self.counts.get(prop).copied().unwrap_or(0)
    }
}

impl<N: PropositionComparator> PropositionComparator for TwoClauseComparator<N> {
    fn prepare(&mut self, state: &FormulaState, formula: &CnfFormula) {
        self.counts.clear();
        self.counts.resize(formula.num_props(), 0);

        for idx in state.open_clauses() {
            let props = formula[idx].unassigned_props(state.assignment());
            if let &[a, b] = props.as_slice() {
                self.counts[a] += 1;
                self.counts[b] += 1;
            }
        }

        self.next.prepare(state, formula);
    }

    fn compare(&self, a: Variable, b: Variable) -> Ordering {
        match self.count(a).cmp(&self.count(b)) {
            Ordering::Equal => self.next.compare(a, b),
            ordering => ordering,
        }
    }

    fn observe_learned_clause(&mut self, clause: &Clause, lbd: usize, lbd_ema: f64) {
        self.next.observe_learned_clause(clause, lbd, lbd_ema);
    }
}

impl<N: PropositionComparator> PropositionHeuristic for TwoClauseComparator<N> {
    fn choose_proposition(&mut self, state: &FormulaState, formula: &CnfFormula) -> Option<Variable> {
        self.select(state, formula)
    }

    fn on_learned_clause(&mut self, clause: &Clause, lbd: usize, lbd_ema: f64) {
        self.observe_learned_clause(clause, lbd, lbd_ema);
    }
}

/// The naive default: lowest proposition id first.
#[must_use]
pub const fn default_prop() -> FalseComparator {
    FalseComparator
}
