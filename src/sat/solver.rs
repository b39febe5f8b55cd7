#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Results and statistics of a solver run.

use crate::sat::assignment::Assignment;
use std::fmt;
use std::time::Duration;

/// Smoothing factor of the learned-clause LBD moving average.
pub const LBD_EMA_DECAY: f64 = 0.95;

/// The verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DpllResult {
    Satisfiable,
    Unsatisfiable,
    /// The cutoff expired before a verdict was reached.
    Unknown,
}

impl DpllResult {
    #[must_use]
    pub const fn is_sat(self) -> bool {
        matches!(self, Self::Satisfiable)
    }

    #[must_use]
    pub const fn is_unsat(self) -> bool {
        matches!(self, Self::Unsatisfiable)
    }

    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for DpllResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "Satisfiable"),
            Self::Unsatisfiable => write!(f, "Unsatisfiable"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolveStats {
    /// Rounds of the main loop.
    pub iterations: usize,
    pub decisions: usize,
    pub propagations: usize,
    pub pure_literals: usize,
    pub conflicts: usize,
    pub backjumps: usize,
    pub learned_clauses: usize,
    pub max_decision_level: usize,
    /// Exponential moving average of the LBD of learned clauses.
    pub lbd_ema: f64,
    pub elapsed: Duration,
}

impl SolveStats {
    /// Folds the LBD of a new learned clause into the moving average.
    pub fn record_lbd(&mut self, lbd: usize) {
        #[allow(clippy::cast_precision_loss)]
        let lbd = lbd as f64;
        self.lbd_ema = if self.learned_clauses <= 1 {
            lbd
        } else {
            LBD_EMA_DECAY.mul_add(self.lbd_ema, (1.0 - LBD_EMA_DECAY) * lbd)
        };
    }
}

impl fmt::Display for SolveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iterations: {}, decisions: {}, propagations: {}, pure literals: {}, conflicts: {}, \
             backjumps: {}, learned clauses: {}, max level: {}, lbd ema: {:.2}, elapsed: {:.3}s",
            self.iterations,
            self.decisions,
            self.propagations,
            self.pure_literals,
            self.conflicts,
            self.backjumps,
            self.learned_clauses,
            self.max_decision_level,
            self.lbd_ema,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Everything a run reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct DpllOutcome {
    pub result: DpllResult,
    /// The total satisfying assignment; present exactly when `result` is
    /// `Satisfiable`.
    pub assignment: Option<Assignment>,
    pub stats: SolveStats,
}

impl DpllOutcome {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        self.result.is_sat()
    }

    /// The model as signed DIMACS literals, if there is one.
    #[must_use]
    pub fn model(&self) -> Option<Vec<i32>> {
        self.assignment.as_ref().map(Assignment::to_dimacs_model)
    }
}

impl fmt::Display for DpllOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.result)?;
        if let Some(assignment) = &self.assignment {
            write!(f, " {assignment}")?;
        }
        Ok(())
    }
}
