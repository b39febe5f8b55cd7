#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The iterative DPLL search.
//!
//! `DpllState` owns a copy of the formula (which grows as clauses are
//! learned), the search state, the occurrence lists and the two branching
//! strategies. One call to `step` performs one round of the main loop:
//!
//! 1.  **Propagation:** unit clauses are satisfied until none remain, then
//!     pure literals are assigned, and both are repeated to a fixed point.
//! 2.  **Conflict:** if a clause became false, either a clause is learned by
//!     resolution and the search backjumps to the level where that clause
//!     asserts a literal (`BackjumpPolicy::ConflictDriven`), or the most
//!     recent decision with an untried branch is flipped
//!     (`BackjumpPolicy::Chronological`). A conflict at level 0, or with
//!     nothing left to flip, proves the formula unsatisfiable.
//! 3.  **Success:** if every proposition has a value, the formula is
//!     satisfied.
//! 4.  **Splitting:** otherwise the heuristics pick a proposition and a
//!     polarity, and a new decision level is opened.
//!
//! `run` repeats `step` until a verdict is reached or the cutoff expires.

use crate::sat::clause::{Clause, ClauseStatus};
use crate::sat::cnf::CnfFormula;
use crate::sat::config::{BackjumpPolicy, DpllConfig};
use crate::sat::conflict_analysis::{Conflict, LearnedClause, analyse_conflict};
use crate::sat::formula_state::FormulaState;
use crate::sat::literal::Literal;
use crate::sat::occurrences::Occurrences;
use crate::sat::phase_selection::{AssignmentHeuristic, FalseFirst, default_assign};
use crate::sat::solver::{DpllOutcome, DpllResult, SolveStats};
use crate::sat::variable_selection::{FalseComparator, PropositionHeuristic, default_prop};
use log::{debug, info, trace};
use std::fmt;
use std::time::{Duration, Instant};

/// Search session over one formula.
#[derive(Debug, Clone)]
pub struct DpllState<P = FalseComparator, A = FalseFirst> {
    formula: CnfFormula,
    state: FormulaState,
    occurrences: Occurrences,
    prop_heuristic: P,
    assign_heuristic: A,
    config: DpllConfig,
    /// Number of trail entries whose consequences have been propagated.
    propagated: usize,
    num_input_clauses: usize,
    preprocessed: bool,
    verdict: Option<DpllResult>,
    stats: SolveStats,
}

impl<P: PropositionHeuristic, A: AssignmentHeuristic> DpllState<P, A> {
    /// Sets up a search over `formula`.
    ///
    /// # Arguments
    ///
    /// * `formula`: the formula to decide; it is owned by the session and
    ///   grows as clauses are learned.
    /// * `prop_heuristic`: picks the proposition of each decision.
    /// * `assign_heuristic`: picks the value tried first.
    /// * `config`: cutoff and backjump policy.
    #[must_use]
    pub fn new(formula: CnfFormula, prop_heuristic: P, assign_heuristic: A, config: DpllConfig) -> Self {
        let occurrences = Occurrences::new(&formula);
        let state = FormulaState::new(&formula);
        let num_input_clauses = formula.num_clauses();

        Self {
            formula,
            state,
            occurrences,
            prop_heuristic,
            assign_heuristic,
            config,
            propagated: 0,
            num_input_clauses,
            preprocessed: false,
            verdict: None,
            stats: SolveStats::default(),
        }
    }

    #[must_use]
    pub const fn formula(&self) -> &CnfFormula {
        &self.formula
    }

    #[must_use]
    pub const fn state(&self) -> &FormulaState {
        &self.state
    }

    #[must_use]
    pub const fn stats(&self) -> &SolveStats {
        &self.stats
    }

    #[must_use]
    pub const fn config(&self) -> &DpllConfig {
        &self.config
    }

    /// Clauses added by conflict analysis, oldest first.
    #[must_use]
    pub fn learned_clauses(&self) -> &[Clause] {
        &self.formula.clauses()[self.num_input_clauses..]
    }

    /// The verdict, once one has been reached.
    #[must_use]
    pub const fn verdict(&self) -> Option<DpllResult> {
        self.verdict
    }

    /// Simplifies the formula at level 0 before any decision.
    ///
    /// Fails closed: returns `Some(Unsatisfiable)` if the formula holds an
    /// empty clause or if propagation alone falsifies a clause.
    pub fn do_preprocessing(&mut self) -> Option<DpllResult> {
        self.preprocessed = true;

        if self.formula.iter().any(Clause::is_empty) {
            debug!("formula contains an empty clause");
            return Some(DpllResult::Unsatisfiable);
        }

        for idx in 0..self.formula.num_clauses() {
            if !self.state.is_open(idx) {
                continue;
            }
            match self.formula[idx].status(self.state.assignment()) {
                ClauseStatus::Unit(lit) => {
                    trace!("unit clause {idx} forces {lit}");
                    self.state.assign(lit, Some(idx), &self.occurrences);
                    self.stats.propagations += 1;
                }
                ClauseStatus::Falsified => return Some(DpllResult::Unsatisfiable),
                ClauseStatus::Satisfied | ClauseStatus::Unresolved => {}
            }
        }

        if self.propagate().is_some() {
            return Some(DpllResult::Unsatisfiable);
        }

        debug!(
            "preprocessing fixed {} of {} propositions",
            self.state.num_assigned(),
            self.formula.num_props()
        );
        None
    }

    /// Satisfies unit clauses until none remain.
    ///
    /// Every newly assigned proposition is examined once: each open clause
    /// containing the literal it made false is either now unit, in which case
    /// its last literal is assigned with the clause as parent, or falsified.
    ///
    /// # Returns
    ///
    /// The index of a falsified clause, or `None` once nothing is left to
    /// propagate.
    pub fn do_unit_preference(&mut self) -> Option<usize> {
        while self.propagated < self.state.trail().len() {
            let prop = self.state.trail()[self.propagated];
            self.propagated += 1;

            let Some(value) = self.state.value(prop) else {
                continue;
            };
            let falsified = Literal::new(prop, value);

            for &idx in self.occurrences.of(falsified) {
                if !self.state.is_open(idx) {
                    continue;
                }
                match self.formula[idx].status(self.state.assignment()) {
                    ClauseStatus::Unit(lit) => {
                        trace!("clause {idx} forces {lit} at level {}", self.state.decision_level());
                        self.state.assign(lit, Some(idx), &self.occurrences);
                        self.stats.propagations += 1;
                    }
                    ClauseStatus::Falsified => {
                        trace!("clause {idx} is falsified");
                        return Some(idx);
                    }
                    ClauseStatus::Satisfied | ClauseStatus::Unresolved => {}
                }
            }
        }

        None
    }

    /// Assigns every proposition that occurs with a single polarity across
    /// the open clauses, repeating until no such proposition is left.
    ///
    /// Propositions that occur in no open clause are left to the splitting
    /// rule. Returns how many propositions were assigned.
    pub fn do_pure_literal_deletion(&mut self) -> usize {
        let mut assigned = 0;

        loop {
            let mut changed = false;

            for prop in 0..self.formula.num_props() {
                if self.state.is_assigned(prop) {
                    continue;
                }
                let positive = self.occurs_open(Literal::positive(prop));
                let negative = self.occurs_open(Literal::negative(prop));

                let lit = match (positive, negative) {
                    (true, false) => Literal::positive(prop),
                    (false, true) => Literal::negative(prop),
                    _ => continue,
                };

                trace!("pure literal {lit}");
                self.state.assign(lit, None, &self.occurrences);
                self.stats.pure_literals += 1;
                assigned += 1;
                changed = true;
            }

            if !changed {
                return assigned;
            }
        }
    }

    fn occurs_open(&self, lit: Literal) -> bool {
        self.occurrences
            .of(lit)
            .iter()
            .any(|&idx| self.state.is_open(idx))
    }

    /// Alternates unit propagation and pure-literal deletion until neither
    /// changes anything. Returns the falsified clause on a conflict.
    pub fn propagate(&mut self) -> Option<usize> {
        loop {
            if let Some(conflict) = self.do_unit_preference() {
                return Some(conflict);
            }
            if !self.config.pure_literals_at(self.state.decision_level())
                || self.do_pure_literal_deletion() == 0
            {
                return None;
            }
        }
    }

    /// Opens a new decision level on a proposition picked by the heuristics.
    ///
    /// Returns `false` if every proposition already has a value.
    ///
    /// # Panics
    ///
    /// If the proposition heuristic returns a proposition that is already
    /// assigned.
    pub fn do_splitting_rule(&mut self) -> bool {
        let choice = self
            .prop_heuristic
            .choose_proposition(&self.state, &self.formula)
            .or_else(|| self.state.assignment().unassigned().next());
        let Some(prop) = choice else {
            return false;
        };

        let value = self.assign_heuristic.choose_assignment(
            prop,
            &self.state,
            &self.formula,
            &self.occurrences,
        );
        let lit = Literal::new(prop, !value);

        self.state.decide(lit, &self.occurrences);
        self.stats.decisions += 1;
        self.stats.max_decision_level = self.stats.max_decision_level.max(self.state.decision_level());
        trace!("decision {lit} at level {}", self.state.decision_level());
        true
    }

    /// Learns a clause from the falsified clause `cref` by resolution.
    ///
    /// Returns `None` when the conflict depends on no decision, which makes
    /// the formula unsatisfiable.
    pub fn do_all_resolutions(&mut self, cref: usize) -> Option<LearnedClause> {
        match analyse_conflict(&self.formula, &self.state, cref) {
            Conflict::Ground => None,
            Conflict::Learned(learned) => {
                self.stats.learned_clauses += 1;
                self.stats.record_lbd(learned.lbd);
                self.prop_heuristic
                    .on_learned_clause(&learned.clause, learned.lbd, self.stats.lbd_ema);
                debug!(
                    "learned {} (lbd {}, backjump to {})",
                    learned.clause, learned.lbd, learned.backjump_level
                );
                Some(learned)
            }
        }
    }

    /// Undoes assignments after a conflict.
    ///
    /// With a learned clause, jumps back to its asserting level, appends the
    /// clause to the formula and assigns its asserting literal with the
    /// clause as parent. Without one, flips the decision of the nearest level
    /// still marked open and closes that level.
    ///
    /// Returns `false` if there is nowhere left to go back to.
    pub fn do_backjump(&mut self, learned: Option<LearnedClause>) -> bool {
        let from = self.state.decision_level();

        if let Some(learned) = learned {
            self.state.backtrack_to(learned.backjump_level, &self.occurrences);
            self.propagated = self.propagated.min(self.state.trail().len());

            let idx = self.formula.num_clauses();
            self.occurrences.add_clause(&learned.clause, idx);
            self.state.track_clause(&learned.clause);
            self.formula.add_clause(learned.clause);
            self.state.assign(learned.asserting, Some(idx), &self.occurrences);
        } else {
            let Some(level) = self.state.nearest_open_level() else {
                return false;
            };
            if self.state.flip_decision(level, &self.occurrences).is_none() {
                return false;
            }
            self.propagated = self.propagated.min(self.state.trail().len() - 1);
        }

        self.stats.backjumps += 1;
        debug!("backjump from level {from} to level {}", self.state.decision_level());
        true
    }

    /// Runs one round of the main loop. Returns the verdict once reached.
    pub fn step(&mut self) -> Option<DpllResult> {
        if let Some(verdict) = self.verdict {
            return Some(verdict);
        }
        self.stats.iterations += 1;

        if !self.preprocessed
            && let Some(result) = self.do_preprocessing()
        {
            return Some(self.conclude(result));
        }

        if let Some(cref) = self.propagate() {
            self.stats.conflicts += 1;
            if self.state.decision_level() == 0 {
                return Some(self.conclude(DpllResult::Unsatisfiable));
            }

            let recovered = match self.config.backjump {
                BackjumpPolicy::ConflictDriven => self
                    .do_all_resolutions(cref)
                    .is_some_and(|learned| self.do_backjump(Some(learned))),
                BackjumpPolicy::Chronological => self.do_backjump(None),
            };

            return if recovered {
                None
            } else {
                Some(self.conclude(DpllResult::Unsatisfiable))
            };
        }

        if self.state.all_assigned() {
            debug_assert_eq!(self.formula.eval(self.state.assignment()), Some(true));
            return Some(self.conclude(DpllResult::Satisfiable));
        }

        self.do_splitting_rule();
        None
    }

    const fn conclude(&mut self, result: DpllResult) -> DpllResult {
        self.verdict = Some(result);
        result
    }

    /// Steps until a verdict or until the cutoff has elapsed, in which case
    /// the result is `Unknown`.
    pub fn run(&mut self) -> DpllResult {
        let start = Instant::now();

        let result = loop {
            if start.elapsed() >= self.config.cutoff {
                info!(
                    "cutoff of {:.3}s reached after {} iterations",
                    self.config.cutoff.as_secs_f64(),
                    self.stats.iterations
                );
                break DpllResult::Unknown;
            }
            if let Some(result) = self.step() {
                break result;
            }
        };

        self.stats.elapsed = start.elapsed();
        info!("{result} ({})", self.stats);
        result
    }

    /// Packages the verdict, the model if there is one, and the statistics.
    #[must_use]
    pub fn into_outcome(self, result: DpllResult) -> DpllOutcome {
        let assignment = result.is_sat().then(|| self.state.assignment().clone());
        DpllOutcome {
            result,
            assignment,
            stats: self.stats,
        }
    }
}

impl<P, A> fmt::Display for DpllState<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} propositions, {} clauses ({} learned), {} backjump",
            self.formula.num_props(),
            self.formula.num_clauses(),
            self.formula.num_clauses() - self.num_input_clauses,
            self.config.backjump
        )?;
        writeln!(f, "{}", self.state)?;
        write!(f, "{}", self.stats)
    }
}

/// Decides `formula` with the default heuristics.
#[must_use]
pub fn dpll(formula: &CnfFormula, cutoff: Duration) -> DpllOutcome {
    dpll_with_heuristics(formula, default_prop(), default_assign(), cutoff)
}

/// Decides `formula` with the given heuristics and default configuration.
#[must_use]
pub fn dpll_with_heuristics<P, A>(
    formula: &CnfFormula,
    prop_heuristic: P,
    assign_heuristic: A,
    cutoff: Duration,
) -> DpllOutcome
where
    P: PropositionHeuristic,
    A: AssignmentHeuristic,
{
    dpll_with_config(
        formula,
        prop_heuristic,
        assign_heuristic,
        &DpllConfig::default().with_cutoff(cutoff),
    )
}

/// Decides `formula` with full control over heuristics and configuration.
#[must_use]
pub fn dpll_with_config<P, A>(
    formula: &CnfFormula,
    prop_heuristic: P,
    assign_heuristic: A,
    config: &DpllConfig,
) -> DpllOutcome
where
    P: PropositionHeuristic,
    A: AssignmentHeuristic,
{
    let mut solver = DpllState::new(formula.clone(), prop_heuristic, assign_heuristic, *config);
    let result = solver.run();
    solver.into_outcome(result)
}
