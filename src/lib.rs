//! An iterative DPLL SAT solver.
//!
//! Formulas in conjunctive normal form are decided by unit propagation,
//! pure-literal deletion and branching. Conflicts either drive resolution
//! with non-chronological backjumping or plain chronological backtracking,
//! and the branching heuristics are pluggable.
//!
//! ```
//! use dpll_sat::sat::cnf::CnfFormula;
//! use dpll_sat::sat::dpll::dpll;
//! use std::time::Duration;
//!
//! let formula = CnfFormula::from_dimacs(&[vec![1, 2], vec![-1], vec![-2, 3]]);
//! let outcome = dpll(&formula, Duration::from_secs(10));
//! assert!(outcome.is_sat());
//! ```

/// The `sat` module holds the formula representation, the search state and
/// the solver itself.
pub mod sat;
