#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod config;
pub mod conflict_analysis;
pub mod dimacs;
pub mod dpll;
pub mod formula_state;
pub mod literal;
pub mod occurrences;
pub mod phase_selection;
pub mod solver;
pub mod variable_selection;
pub mod vsids;
