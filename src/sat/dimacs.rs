#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Reading and writing the DIMACS CNF format.
//!
//! The format consists of:
//! - Comment lines starting with `c`.
//! - A problem line `p cnf <num_variables> <num_clauses>`.
//! - Clauses as whitespace-separated signed integers, each terminated by
//!   `0`. A clause may span several lines, and several clauses may share one.
//! - An optional `%` line marking the end of the data (as in the SATLIB
//!   benchmark files).
//!
//! DIMACS numbers variables from 1; variable `v` becomes proposition `v - 1`.

use crate::sat::clause::Clause;
use crate::sat::cnf::CnfFormula;
use crate::sat::literal::Literal;
use itertools::Itertools;
use log::warn;
use std::fmt::Write as _;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read DIMACS input: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid literal '{token}'")]
    InvalidLiteral { line: usize, token: String },

    #[error("line {line}: malformed problem line, expected 'p cnf <variables> <clauses>'")]
    InvalidHeader { line: usize },

    #[error("line {line}: variable {variable} exceeds the declared {declared} variables")]
    VariableOutOfRange {
        line: usize,
        variable: u32,
        declared: usize,
    },

    #[error("line {line}: {variables} variables exceed the supported maximum of {max}", max = MAX_VARIABLES)]
    TooManyVariables { line: usize, variables: usize },
}

/// The largest variable count (and variable number) the parser accepts.
pub const MAX_VARIABLES: usize = 1 << 24;

struct Header {
    variables: usize,
    clauses: usize,
}

fn parse_header(line: &str, line_no: usize) -> Result<Header, DimacsError> {
    let fields = line.split_whitespace().collect_vec();
    let invalid = || DimacsError::InvalidHeader { line: line_no };

    match fields.as_slice() {
        ["p", "cnf", variables, clauses] => Ok(Header {
            variables: variables.parse().map_err(|_| invalid())?,
            clauses: clauses.parse().map_err(|_| invalid())?,
        }),
        _ => Err(invalid()),
    }
}

/// Parses DIMACS data from `reader`.
///
/// # Errors
///
/// - `DimacsError::Io` if reading fails.
/// - `DimacsError::InvalidHeader` for a malformed `p` line.
/// - `DimacsError::InvalidLiteral` for a token that is not an integer.
/// - `DimacsError::VariableOutOfRange` for a variable above the count
///   declared in the header.
/// - `DimacsError::TooManyVariables` for a header or, without a header, a
///   variable beyond `MAX_VARIABLES`.
///
/// A clause count that disagrees with the header is only logged.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<CnfFormula, DimacsError> {
    let mut header: Option<Header> = None;
    let mut formula = CnfFormula::new();
    let mut current: Vec<Literal> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim_start();

        match trimmed.chars().next() {
            None | Some('c') => continue,
            Some('%') => break,
            Some('p') => {
                let parsed = parse_header(trimmed, line_no)?;
                if parsed.variables > MAX_VARIABLES {
                    return Err(DimacsError::TooManyVariables {
                        line: line_no,
                        variables: parsed.variables,
                    });
                }
                formula.ensure_props(parsed.variables);
                header = Some(parsed);
                continue;
            }
            Some(_) => {}
        }

        for token in trimmed.split_whitespace() {
            let value: i32 = token.parse().map_err(|_| DimacsError::InvalidLiteral {
                line: line_no,
                token: token.to_string(),
            })?;

            if value == 0 {
                formula.add_clause(Clause::new(std::mem::take(&mut current)));
                continue;
            }

            let variable = value.unsigned_abs();
            match &header {
                Some(h) if variable as usize > h.variables => {
                    return Err(DimacsError::VariableOutOfRange {
                        line: line_no,
                        variable,
                        declared: h.variables,
                    });
                }
                None if variable as usize > MAX_VARIABLES => {
                    return Err(DimacsError::TooManyVariables {
                        line: line_no,
                        variables: variable as usize,
                    });
                }
                _ => {}
            }
            current.push(Literal::from_dimacs(value));
        }
    }

    if !current.is_empty() {
        warn!("last clause is missing its terminating 0");
        formula.add_clause(Clause::new(current));
    }

    if let Some(h) = header
        && h.clauses != formula.num_clauses()
    {
        warn!(
            "header declares {} clauses but {} were read",
            h.clauses,
            formula.num_clauses()
        );
    }

    Ok(formula)
}

/// Parses the DIMACS file at `path`.
///
/// # Errors
///
/// See `parse_dimacs`; failing to open the file is reported as `DimacsError::Io`.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<CnfFormula, DimacsError> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

/// Parses DIMACS data held in a string.
///
/// # Errors
///
/// See `parse_dimacs`.
pub fn parse_str(input: &str) -> Result<CnfFormula, DimacsError> {
    parse_dimacs(io::Cursor::new(input))
}

/// Renders `formula` in DIMACS form.
#[must_use]
pub fn write_dimacs(formula: &CnfFormula) -> String {
    let mut out = format!("p cnf {} {}\n", formula.num_props(), formula.num_clauses());
    for clause in formula.iter() {
        for lit in clause.iter() {
            let _ = write!(out, "{} ", lit.to_dimacs());
        }
        out.push_str("0\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimacs() {
        let input = "c a comment\np cnf 3 2\n1 -2 0\n2 3 0\n";
        let formula = parse_str(input).unwrap();

        assert_eq!(formula.num_props(), 3);
        assert_eq!(formula.num_clauses(), 2);
        assert_eq!(formula[0], Clause::from_dimacs(&[1, -2]));
        assert_eq!(formula[1], Clause::from_dimacs(&[2, 3]));
    }

    #[test]
    fn test_clauses_spanning_lines() {
        let input = "p cnf 4 3\n1 2\n -3 0 4 0\n-1\n0\n";
        let formula = parse_str(input).unwrap();

        assert_eq!(formula.num_clauses(), 3);
        assert_eq!(formula[0], Clause::from_dimacs(&[1, 2, -3]));
        assert_eq!(formula[1], Clause::from_dimacs(&[4]));
        assert_eq!(formula[2], Clause::from_dimacs(&[-1]));
    }

    #[test]
    fn test_end_marker_and_declared_variables() {
        let input = "p cnf 5 1\n1 -2 0\n%\n0\n";
        let formula = parse_str(input).unwrap();

        assert_eq!(formula.num_clauses(), 1);
        assert_eq!(formula.num_props(), 5);
    }

    #[test]
    fn test_empty_clause() {
        let formula = parse_str("p cnf 1 2\n1 0\n0\n").unwrap();
        assert_eq!(formula.num_clauses(), 2);
        assert!(formula[1].is_empty());
    }

    #[test]
    fn test_missing_terminator() {
        let formula = parse_str("1 2").unwrap();
        assert_eq!(formula[0], Clause::from_dimacs(&[1, 2]));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_str("p cnf 2 1\n1 x 0\n"),
            Err(DimacsError::InvalidLiteral { line: 2, ref token }) if token == "x"
        ));
        assert!(matches!(
            parse_str("p cnf two 1\n"),
            Err(DimacsError::InvalidHeader { line: 1 })
        ));
        assert!(matches!(
            parse_str("p dnf 2 1\n"),
            Err(DimacsError::InvalidHeader { line: 1 })
        ));
        assert!(matches!(
            parse_str("p cnf 2 1\n1 3 0\n"),
            Err(DimacsError::VariableOutOfRange { line: 2, variable: 3, declared: 2 })
        ));
        assert!(matches!(
            parse_file("/definitely/not/here.cnf"),
            Err(DimacsError::Io(_))
        ));
    }

    #[test]
    fn test_implausible_variable_counts() {
        let err = parse_str("p cnf 4000000000 1\n1 0\n").unwrap_err();
        assert!(matches!(
            err,
            DimacsError::TooManyVariables { line: 1, variables: 4_000_000_000 }
        ));
        assert_eq!(
            err.to_string(),
            "line 1: 4000000000 variables exceed the supported maximum of 16777216"
        );

        assert!(matches!(
            parse_str("c no header\n-2147483648 0\n"),
            Err(DimacsError::TooManyVariables { line: 2, variables: 2_147_483_648 })
        ));

        let at_limit = format!("p cnf {MAX_VARIABLES} 1\n-{MAX_VARIABLES} 0\n");
        assert_eq!(parse_str(&at_limit).unwrap().num_props(), MAX_VARIABLES);
    }

    #[test]
    fn test_write_dimacs() {
        let formula = CnfFormula::from_dimacs(&[vec![1, -2], vec![3]]);
        let text = write_dimacs(&formula);
        assert_eq!(text, "p cnf 3 2\n1 -2 0\n3 0\n");
        assert_eq!(parse_str(&text).unwrap(), formula);
    }
}
