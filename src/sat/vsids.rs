#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Variable State Independent Decaying Sum.
//!
//! Every proposition carries an activity score. Scores start at the number
//! of occurrences of the proposition in the input formula, each proposition
//! of a freshly learned clause is bumped by one, and every `decay_interval`
//! learned clauses all scores are multiplied by a decay factor. The
//! unassigned proposition with the highest score is branched on; ties go to
//! `next`.
//!
//! By default the factor follows the quality of the learned clause: a clause
//! whose LBD is above the running average decays the scores hard
//! (`FAST_DECAY`), any other clause gently (`SLOW_DECAY`).
//!
//! The scores belong to one comparator value and therefore to one solver
//! run; nothing is shared between runs.

use crate::sat::clause::Clause;
use crate::sat::cnf::CnfFormula;
use crate::sat::formula_state::FormulaState;
use crate::sat::literal::Variable;
use crate::sat::variable_selection::{FalseComparator, PropositionComparator, PropositionHeuristic};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

pub const FAST_DECAY: f64 = 0.75;
pub const SLOW_DECAY: f64 = 0.99;
pub const DEFAULT_DECAY_INTERVAL: usize = 1;

/// How the decay factor is picked for a learned clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecaySchedule {
    Fixed(f64),
    /// `fast` for a clause with an LBD above the running average, `slow` otherwise.
    LbdAdaptive { fast: f64, slow: f64 },
}

impl Default for DecaySchedule {
    fn default() -> Self {
        Self::LbdAdaptive {
            fast: FAST_DECAY,
            slow: SLOW_DECAY,
        }
    }
}

impl DecaySchedule {
    #[must_use]
    pub fn factor(self, lbd: usize, lbd_ema: f64) -> f64 {
        match self {
            Self::Fixed(decay) => decay,
            Self::LbdAdaptive { fast, slow } => {
                #[allow(clippy::cast_precision_loss)]
                let lbd = lbd as f64;
                if lbd > lbd_ema { fast } else { slow }
            }
        }
    }
}

fn check_decay(decay: f64) {
    assert!(decay > 0.0 && decay <= 1.0, "VSIDS decay must lie in (0, 1], got {decay}");
}

#[derive(Debug, Clone, PartialEq)]
pub struct VsidsComparator<N = FalseComparator> {
    activity: Vec<f64>,
    schedule: DecaySchedule,
    decay_interval: usize,
    since_decay: usize,
    seeded: bool,
    next: N,
}

impl<N: Default> Default for VsidsComparator<N> {
    fn default() -> Self {
        Self::new(N::default())
    }
}

impl<N> Index<Variable> for VsidsComparator<N> {
    type Output = f64;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.activity[index]
    }
}

impl<N> IndexMut<Variable> for VsidsComparator<N> {
    fn index_mut(&mut self, index: Variable) -> &mut Self::Output {
        &mut self.activity[index]
    }
}

impl<N> VsidsComparator<N> {
    #[must_use]
    pub const fn new(next: N) -> Self {
        Self {
            activity: Vec::new(),
            schedule: DecaySchedule::LbdAdaptive {
                fast: FAST_DECAY,
                slow: SLOW_DECAY,
            },
            decay_interval: DEFAULT_DECAY_INTERVAL,
            since_decay: 0,
            seeded: false,
            next,
        }
    }

    /// Decays by the same factor after every interval, whatever the LBD.
    ///
    /// # Panics
    ///
    /// If `decay` is not in `(0, 1]`.
    #[must_use]
    pub fn with_decay(mut self, decay: f64) -> Self {
        check_decay(decay);
        self.schedule = DecaySchedule::Fixed(decay);
        self
    }

    /// Picks `fast` after a clause with an above-average LBD, `slow` otherwise.
    ///
    /// # Panics
    ///
    /// If either factor is not in `(0, 1]`.
    #[must_use]
    pub fn with_adaptive_decay(mut self, fast: f64, slow: f64) -> Self {
        check_decay(fast);
        check_decay(slow);
        self.schedule = DecaySchedule::LbdAdaptive { fast, slow };
        self
    }

    /// Decays once every `interval` learned clauses (at least 1).
    #[must_use]
    pub fn with_decay_interval(mut self, interval: usize) -> Self {
        self.decay_interval = interval.max(1);
        self
    }

    #[must_use]
    pub const fn schedule(&self) -> DecaySchedule {
        self.schedule
    }

    /// Adds the occurrence counts in `formula` to the scores. Bumps made
    /// before seeding are kept.
    pub fn seed(&mut self, formula: &CnfFormula) {
        if self.activity.len() < formula.num_props() {
            self.activity.resize(formula.num_props(), 0.0);
        }
        for lit in formula.iter().flat_map(Clause::iter) {
            self.activity[lit.prop()] += 1.0;
        }
        self.seeded = true;
    }

    #[must_use]
    pub fn activity(&self, prop: Variable) -> f64 {
        self.activity.get(prop).copied().unwrap_or(0.0)
    }

    pub fn bump(&mut self, prop: Variable) {
        if prop >= self.activity.len() {
            self.activity.resize(prop + 1, 0.0);
        }
        self.activity[prop] += 1.0;
    }

    pub fn bumps<T: IntoIterator<Item = Variable>>(&mut self, props: T) {
        for prop in props {
            self.bump(prop);
        }
    }

    pub fn decay(&mut self, factor: f64) {
        for v in &mut self.activity {
            *v *= factor;
        }
    }
}

impl<N: PropositionComparator> PropositionComparator for VsidsComparator<N> {
    fn prepare(&mut self, state: &FormulaState, formula: &CnfFormula) {
        if !self.seeded {
            self.seed(formula);
        }
        self.next.prepare(state, formula);
    }

    fn compare(&self, a: Variable, b: Variable) -> Ordering {
        match OrderedFloat(self.activity(a)).cmp(&OrderedFloat(self.activity(b))) {
            Ordering::Equal => self.next.compare(a, b),
            ordering => ordering,
        }
    }

    fn observe_learned_clause(&mut self, clause: &Clause, lbd: usize, lbd_ema: f64) {
        self.bumps(clause.iter().map(|lit| lit.prop()));

        self.since_decay += 1;
        if self.since_decay >= self.decay_interval {
            self.decay(self.schedule.factor(lbd, lbd_ema));
            self.since_decay = 0;
        }

        self.next.observe_learned_clause(clause, lbd, lbd_ema);
    }
}

impl<N: PropositionComparator> PropositionHeuristic for VsidsComparator<N> {
    fn choose_proposition(&mut self, state: &FormulaState, formula: &CnfFormula) -> Option<Variable> {
        self.select(state, formula)
    }

    fn on_learned_clause(&mut self, clause: &Clause, lbd: usize, lbd_ema: f64) {
        self.observe_learned_clause(clause, lbd, lbd_ema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::variable_selection::{RandomComparator, TwoClauseComparator};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_seeded_from_occurrences() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![-2, 3], vec![2, -3]]);
        let state = FormulaState::new(&formula);
        let mut vsids = VsidsComparator::<FalseComparator>::default();

        assert_eq!(vsids.choose_proposition(&state, &formula), Some(1));
        assert!(close(vsids.activity(0), 1.0));
        assert!(close(vsids[1], 3.0));
        assert!(close(vsids.activity(2), 2.0));
    }

    #[test]
    fn test_learned_clause_bumps_then_decays() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2, 3]]);
        let state = FormulaState::new(&formula);
        let mut vsids = VsidsComparator::new(FalseComparator).with_decay(0.5);
        vsids.choose_proposition(&state, &formula);

        vsids.on_learned_clause(&Clause::from_dimacs(&[-3]), 1, 1.0);
        assert!(close(vsids.activity(2), 1.0));
        assert!(close(vsids.activity(0), 0.5));
        assert_eq!(vsids.choose_proposition(&state, &formula), Some(2));
    }

    #[test]
    fn test_bump_before_first_selection_survives_seeding() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![2, 3]]);
        let state = FormulaState::new(&formula);
        let mut vsids = VsidsComparator::new(FalseComparator);
        vsids.bumps([0, 0]);

        assert_eq!(vsids.choose_proposition(&state, &formula), Some(0));
        assert!(close(vsids.activity(0), 3.0));
        assert!(close(vsids.activity(1), 2.0));

        // Seeding happens once; later selections leave the scores alone.
        vsids.choose_proposition(&state, &formula);
        assert!(close(vsids.activity(0), 3.0));
    }

    #[test]
    fn test_high_lbd_clause_decays_harder() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2, 3]]);
        let state = FormulaState::new(&formula);
        let clause = Clause::from_dimacs(&[-3]);

        let mut poor = VsidsComparator::new(FalseComparator);
        poor.choose_proposition(&state, &formula);
        poor.on_learned_clause(&clause, 5, 2.0);

        let mut good = VsidsComparator::new(FalseComparator);
        good.choose_proposition(&state, &formula);
        good.on_learned_clause(&clause, 2, 2.0);

        assert!(close(poor.activity(0), FAST_DECAY));
        assert!(close(good.activity(0), SLOW_DECAY));
        assert!(close(poor.activity(2), 2.0 * FAST_DECAY));
        assert!(poor.activity(0) < good.activity(0));
    }

    #[test]
    fn test_fixed_decay_ignores_lbd() {
        let schedule = VsidsComparator::new(FalseComparator).with_decay(0.8).schedule();
        assert!(close(schedule.factor(9, 1.0), 0.8));
        assert!(close(schedule.factor(1, 9.0), 0.8));

        let adaptive = VsidsComparator::new(FalseComparator)
            .with_adaptive_decay(0.5, 0.9)
            .schedule();
        assert!(close(adaptive.factor(4, 3.5), 0.5));
        assert!(close(adaptive.factor(3, 3.0), 0.9));
        assert_eq!(DecaySchedule::default(), VsidsComparator::new(FalseComparator).schedule());
    }

    #[test]
    fn test_decay_interval() {
        let mut vsids = VsidsComparator::new(FalseComparator)
            .with_decay(0.5)
            .with_decay_interval(2);
        vsids.bump(0);

        vsids.observe_learned_clause(&Clause::from_dimacs(&[2]), 1, 1.0);
        assert!(close(vsids.activity(0), 1.0));

        vsids.observe_learned_clause(&Clause::from_dimacs(&[2]), 1, 1.0);
        assert!(close(vsids.activity(0), 0.5));
        assert!(close(vsids.activity(1), 1.0));
    }

    #[test]
    fn test_ties_fall_through() {
        let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![3, 4]]);
        let state = FormulaState::new(&formula);
        let mut vsids = VsidsComparator::new(FalseComparator);
        assert_eq!(vsids.choose_proposition(&state, &formula), Some(0));

        let mut chained = TwoClauseComparator::new(VsidsComparator::new(RandomComparator::with_seed(3)));
        assert!(chained.choose_proposition(&state, &formula).is_some());
    }

    #[test]
    #[should_panic(expected = "VSIDS decay must lie in (0, 1]")]
    fn test_invalid_decay() {
        let _ = VsidsComparator::new(FalseComparator).with_decay(0.0);
    }
}
