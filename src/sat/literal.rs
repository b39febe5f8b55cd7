#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Propositional literals.
//!
//! A `Literal` names a proposition (a dense, 0-based index) together with a
//! polarity. Literals are plain `Copy` values; all search state lives
//! elsewhere, in `FormulaState`.

use crate::sat::assignment::Assignment;
use core::ops::{Neg, Not};
use std::fmt;

/// Index of a proposition. Propositions are numbered densely from 0.
pub type Variable = usize;

/// A proposition reference with a polarity.
///
/// Ordering is by proposition first, and for the same proposition the
/// positive literal sorts before the negated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal {
    prop: Variable,
    negated: bool,
}

impl Literal {
    /// Creates a literal over `prop`. `negated = true` gives `¬prop`.
    #[must_use]
    pub const fn new(prop: Variable, negated: bool) -> Self {
        Self { prop, negated }
    }

    /// The positive literal of `prop`.
    #[must_use]
    pub const fn positive(prop: Variable) -> Self {
        Self::new(prop, false)
    }

    /// The negative literal of `prop`.
    #[must_use]
    pub const fn negative(prop: Variable) -> Self {
        Self::new(prop, true)
    }

    #[must_use]
    pub const fn prop(self) -> Variable {
        self.prop
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        self.negated
    }

    /// The value the proposition must take for this literal to be true.
    #[must_use]
    pub const fn polarity(self) -> bool {
        !self.negated
    }

    /// The complementary literal.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            prop: self.prop,
            negated: !self.negated,
        }
    }

    /// Dense code used to index per-literal tables: `2 * prop + negated`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.prop * 2 + self.negated as usize
    }

    /// Converts a DIMACS literal (`3`, `-3`, ...) into a literal.
    ///
    /// DIMACS numbers variables from 1, so variable `v` becomes proposition `v - 1`.
    ///
    /// # Panics
    ///
    /// If `value` is 0, which DIMACS reserves as the clause terminator.
    #[must_use]
    pub const fn from_dimacs(value: i32) -> Self {
        assert!(value != 0, "0 is not a DIMACS literal");
        let prop = value.unsigned_abs() as usize - 1;
        Self::new(prop, value.is_negative())
    }

    /// Converts the literal back to its signed DIMACS form.
    ///
    /// # Panics
    ///
    /// If the proposition index does not fit a DIMACS (`i32`) variable.
    #[must_use]
    pub fn to_dimacs(self) -> i32 {
        let var = i32::try_from(self.prop + 1).expect("proposition index overflows a DIMACS variable");
        if self.negated { -var } else { var }
    }

    /// Evaluates the literal under a (partial) assignment.
    ///
    /// Returns `None` while the proposition is unassigned.
    ///
    /// # Panics
    ///
    /// If the assignment does not cover the literal's proposition. This is a
    /// malformed-formula condition, not a search outcome.
    #[must_use]
    pub fn eval(self, assignment: &Assignment) -> Option<bool> {
        assert!(
            self.prop < assignment.len(),
            "literal {self} refers to proposition {} but the assignment covers only {}",
            self.prop,
            assignment.len()
        );
        assignment.var_value(self.prop).map(|value| value != self.negated)
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "p{}", self.prop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::VarState;

    #[test]
    fn test_literal_neg() {
        assert_eq!(Literal::new(1, false).negate(), Literal::new(1, true));
        assert_eq!(-Literal::new(1, true), Literal::new(1, false));
        assert_eq!(!Literal::positive(4), Literal::negative(4));
    }

    #[test]
    fn test_dimacs_conversion() {
        assert_eq!(Literal::from_dimacs(1), Literal::positive(0));
        assert_eq!(Literal::from_dimacs(-3), Literal::negative(2));
        assert_eq!(Literal::negative(2).to_dimacs(), -3);
        assert_eq!(Literal::positive(0).to_dimacs(), 1);
    }

    #[test]
    #[should_panic(expected = "0 is not a DIMACS literal")]
    fn test_dimacs_zero_is_rejected() {
        let _ = Literal::from_dimacs(0);
    }

    #[test]
    fn test_eval() {
        let mut a = Assignment::new(2);
        a[0] = VarState::Assigned(true);
        a[1] = VarState::Assigned(false);

        assert_eq!(Literal::positive(0).eval(&a), Some(true));
        assert_eq!(Literal::negative(1).eval(&a), Some(true));
        assert_eq!(Literal::negative(0).eval(&a), Some(false));
        assert_eq!(Literal::positive(1).eval(&a), Some(false));

        let unassigned = Assignment::new(2);
        assert_eq!(Literal::positive(0).eval(&unassigned), None);
        assert_eq!(Literal::negative(1).eval(&unassigned), None);
    }

    #[test]
    #[should_panic(expected = "refers to proposition 10")]
    fn test_eval_out_of_range() {
        let a = Assignment::new(1);
        let _ = Literal::positive(10).eval(&a);
    }

    #[test]
    fn test_display_and_ordering() {
        assert_eq!(Literal::negative(0).to_string(), "!p0");
        assert_eq!(Literal::positive(12).to_string(), "p12");
        assert!(Literal::positive(0) < Literal::negative(0));
        assert!(Literal::negative(0) < Literal::positive(1));
        assert_eq!(Literal::positive(3).index(), 6);
        assert_eq!(Literal::negative(3).index(), 7);
    }
}
