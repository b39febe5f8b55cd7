#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conflict analysis by resolution.
//!
//! Starting from a falsified clause, the literals assigned at the conflict
//! level are resolved away one by one against the clauses that forced them,
//! walking the trail backwards, until a single literal of the conflict level
//! remains: the first unique implication point. The result is a learned
//! clause that is false under the current assignment, becomes unit after
//! backjumping to the second-highest level it mentions, and then forces the
//! negation of the UIP.

use crate::sat::clause::Clause;
use crate::sat::cnf::CnfFormula;
use crate::sat::formula_state::FormulaState;
use crate::sat::literal::{Literal, Variable};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedClause {
    /// The resolvent; the asserting literal comes first.
    pub clause: Clause,
    /// The literal that becomes true after the backjump.
    pub asserting: Literal,
    /// The highest level among the other literals, 0 if there are none.
    pub backjump_level: usize,
    /// Number of distinct decision levels in the clause.
    pub lbd: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The conflict does not depend on any decision.
    Ground,
    Learned(LearnedClause),
}

/// The literal of `prop` that is false under the current assignment.
fn false_literal(state: &FormulaState, prop: Variable) -> Literal {
    Literal::new(prop, state.value(prop).unwrap_or(false))
}

/// Adds the literals of `clause` to the resolvent, except those already seen
/// and those fixed at level 0.
///
/// Returns how many new literals of the conflict level were met.
fn resolve(
    clause: &Clause,
    state: &FormulaState,
    seen: &mut [bool],
    learned: &mut Vec<Literal>,
) -> usize {
    let dl = state.decision_level();
    let mut at_conflict_level = 0;

    for lit in clause.iter() {
        let prop = lit.prop();
        if seen[prop] {
            continue;
        }
        seen[prop] = true;

        match state.level(prop) {
            Some(0) | None => {}
            Some(level) if level >= dl => at_conflict_level += 1,
            Some(_) => learned.push(false_literal(state, prop)),
        }
    }

    at_conflict_level
}

/// Analyses the conflict on clause `cref`, which must be falsified.
#[must_use]
pub fn analyse_conflict(formula: &CnfFormula, state: &FormulaState, cref: usize) -> Conflict {
    let dl = state.decision_level();
    if dl == 0 {
        return Conflict::Ground;
    }

    let trail = state.trail();
    let mut seen = vec![false; formula.num_props()];
    let mut learned = Vec::new();
    let mut open = resolve(&formula[cref], state, &mut seen, &mut learned);
    let mut i = trail.len();

    let uip = loop {
        let Some(k) = (0..i)
            .rev()
            .find(|&k| seen[trail[k]] && state.level(trail[k]) == Some(dl))
        else {
            return Conflict::Ground;
        };
        i = k;
        let prop = trail[k];

        open -= 1;
        if open == 0 {
            break prop;
        }

        let Some(reason) = state.parent(prop) else {
            break prop;
        };
        open += resolve(&formula[reason], state, &mut seen, &mut learned);
    };

    let asserting = false_literal(state, uip);
    let backjump_level = learned
        .iter()
        .filter_map(|lit| state.level(lit.prop()))
        .max()
        .unwrap_or(0);
    let lbd = learned
        .iter()
        .filter_map(|lit| state.level(lit.prop()))
        .chain(std::iter::once(dl))
        .collect::<FxHashSet<_>>()
        .len();

    learned.insert(0, asserting);

    Conflict::Learned(LearnedClause {
        clause: Clause::new(learned),
        asserting,
        backjump_level,
        lbd,
    })
}
