#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Mutable search state for one solving session.
//!
//! `FormulaState` bundles everything that changes while the solver walks
//! the search tree: the partial assignment, which clauses are still open,
//! why and at which level each proposition was assigned, the order of
//! assignment, and the stack of decision levels. All of it is updated
//! together through `assign` and `backtrack_to`; there is no other way to
//! mutate it from outside this module.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::CnfFormula;
use crate::sat::literal::{Literal, Variable};
use crate::sat::occurrences::Occurrences;
use bit_vec::BitVec;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaState {
    assignment: Assignment,
    /// One bit per clause, set while the clause is satisfied.
    simplification: BitVec,
    /// Number of distinct true literals in each clause.
    true_literals: Vec<u32>,
    parents: Vec<Option<usize>>,
    levels: Vec<Option<usize>>,
    /// One entry per decision level above 0; `true` while the level still has
    /// its opposite branch untried.
    level_open: Vec<bool>,
    /// The decision literal of each level above 0.
    decisions: Vec<Literal>,
    trail: Vec<Variable>,
    decision_level: usize,
}

impl FormulaState {
    /// A fresh state for `formula`: nothing assigned, every clause open.
    #[must_use]
    pub fn new(formula: &CnfFormula) -> Self {
        let num_props = formula.num_props();
        let num_clauses = formula.num_clauses();

        Self {
            assignment: Assignment::new(num_props),
            simplification: BitVec::from_elem(num_clauses, false),
            true_literals: vec![0; num_clauses],
            parents: vec![None; num_props],
            levels: vec![None; num_props],
            level_open: Vec::new(),
            decisions: Vec::new(),
            trail: Vec::with_capacity(num_props),
            decision_level: 0,
        }
    }

    #[must_use]
    pub const fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    #[must_use]
    pub fn value(&self, prop: Variable) -> Option<bool> {
        self.assignment.var_value(prop)
    }

    #[must_use]
    pub fn is_assigned(&self, prop: Variable) -> bool {
        self.levels[prop].is_some()
    }

    /// The clause that forced `prop`, or `None` for decisions, pure literals
    /// and unassigned propositions.
    #[must_use]
    pub fn parent(&self, prop: Variable) -> Option<usize> {
        self.parents[prop]
    }

    #[must_use]
    pub fn level(&self, prop: Variable) -> Option<usize> {
        self.levels[prop]
    }

    #[must_use]
    pub const fn decision_level(&self) -> usize {
        self.decision_level
    }

    /// The proposition branched on most recently, if any level is open.
    #[must_use]
    pub fn decision_prop(&self) -> Option<Variable> {
        self.decisions.last().map(|lit| lit.prop())
    }

    /// The decision literal that opened `level` (1-based).
    #[must_use]
    pub fn decision_at(&self, level: usize) -> Option<Literal> {
        level.checked_sub(1).and_then(|i| self.decisions.get(i).copied())
    }

    #[must_use]
    pub fn level_open(&self) -> &[bool] {
        &self.level_open
    }

    /// The highest level whose alternative branch is still untried.
    #[must_use]
    pub fn nearest_open_level(&self) -> Option<usize> {
        self.level_open.iter().rposition(|&open| open).map(|i| i + 1)
    }

    /// Propositions in the order they were assigned.
    #[must_use]
    pub fn trail(&self) -> &[Variable] {
        &self.trail
    }

    #[must_use]
    pub const fn num_assigned(&self) -> usize {
        self.trail.len()
    }

    #[must_use]
    pub const fn all_assigned(&self) -> bool {
        self.trail.len() == self.assignment.len()
    }

    #[must_use]
    pub fn is_open(&self, clause: usize) -> bool {
        !self.simplification[clause]
    }

    /// Indices of the clauses not yet satisfied.
    pub fn open_clauses(&self) -> impl Iterator<Item = usize> + '_ {
        self.simplification
            .iter()
            .enumerate()
            .filter_map(|(i, satisfied)| (!satisfied).then_some(i))
    }

    #[must_use]
    pub fn num_open(&self) -> usize {
        self.simplification.iter().filter(|satisfied| !satisfied).count()
    }

    /// Makes `lit` true at the current decision level.
    ///
    /// # Arguments
    ///
    /// * `lit`: the literal to make true.
    /// * `parent`: the clause that forced it, `None` for a free choice.
    /// * `occurrences`: the occurrence lists of the formula being searched.
    ///
    /// # Panics
    ///
    /// If the proposition already has a value.
    pub fn assign(&mut self, lit: Literal, parent: Option<usize>, occurrences: &Occurrences) {
        let prop = lit.prop();
        assert!(
            self.levels[prop].is_none(),
            "proposition p{prop} is already assigned"
        );

        self.assignment.assign(lit);
        self.parents[prop] = parent;
        self.levels[prop] = Some(self.decision_level);
        self.trail.push(prop);

        for &clause in occurrences.of(lit) {
            self.true_literals[clause] += 1;
            if self.true_literals[clause] == 1 {
                self.simplification.set(clause, true);
            }
        }
    }

    fn unassign(&mut self, prop: Variable, occurrences: &Occurrences) {
        let Some(value) = self.assignment.var_value(prop) else {
            return;
        };
        let lit = Literal::new(prop, !value);

        for &clause in occurrences.of(lit) {
            self.true_literals[clause] -= 1;
            if self.true_literals[clause] == 0 {
                self.simplification.set(clause, false);
            }
        }

        self.assignment.unassign(prop);
        self.parents[prop] = None;
        self.levels[prop] = None;
    }

    /// Opens a new decision level and assigns `lit` as its decision.
    pub fn decide(&mut self, lit: Literal, occurrences: &Occurrences) {
        self.decision_level += 1;
        self.level_open.push(true);
        self.decisions.push(lit);
        self.assign(lit, None, occurrences);
    }

    /// Undoes every assignment made above `level` and makes `level` current.
    ///
    /// # Panics
    ///
    /// If `level` is above the current decision level.
    pub fn backtrack_to(&mut self, level: usize, occurrences: &Occurrences) {
        assert!(
            level <= self.decision_level,
            "cannot backtrack from level {} up to level {level}",
            self.decision_level
        );

        while let Some(&prop) = self.trail.last() {
            if self.levels[prop].is_some_and(|l| l <= level) {
                break;
            }
            self.unassign(prop, occurrences);
            self.trail.pop();
        }

        self.level_open.truncate(level);
        self.decisions.truncate(level);
        self.decision_level = level;
    }

    /// Replaces the decision of `level` by its negation and closes the level.
    ///
    /// Everything assigned at `level` or above is undone first. Returns the
    /// new decision literal, or `None` if `level` was never opened.
    pub fn flip_decision(&mut self, level: usize, occurrences: &Occurrences) -> Option<Literal> {
        let lit = self.decision_at(level)?.negate();

        self.backtrack_to(level - 1, occurrences);
        self.decision_level = level;
        self.level_open.push(false);
        self.decisions.push(lit);
        self.assign(lit, None, occurrences);

        Some(lit)
    }

    /// Starts tracking a clause appended to the formula after this state was
    /// created, counting the literals it already has true.
    pub fn track_clause(&mut self, clause: &Clause) {
        let true_literals = clause
            .iter()
            .filter(|lit| lit.eval(&self.assignment) == Some(true))
            .unique()
            .count();
        let true_literals = u32::try_from(true_literals).unwrap_or(u32::MAX);

        self.true_literals.push(true_literals);
        self.simplification.push(true_literals > 0);
    }
}

impl fmt::Display for FormulaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "assignment: {}", self.assignment)?;
        writeln!(
            f,
            "levels: [{}]",
            self.levels
                .iter()
                .map(|l| l.map_or_else(|| "-".to_string(), |l| l.to_string()))
                .join(", ")
        )?;
        writeln!(
            f,
            "parents: [{}]",
            self.parents
                .iter()
                .map(|p| p.map_or_else(|| "-".to_string(), |p| p.to_string()))
                .join(", ")
        )?;
        writeln!(
            f,
            "open clauses: [{}]",
            self.open_clauses().join(", ")
        )?;
        writeln!(f, "level open: {:?}", self.level_open)?;
        write!(
            f,
            "decision level: {}, decision prop: {}",
            self.decision_level,
            self.decision_prop()
                .map_or_else(|| "none".to_string(), |p| format!("p{p}"))
        )
    }
}
