use std::fmt::Debug;
use std::fmt::Display;

use super::BinaryValue;

/// Which bound of a binary variable a [`Predicate`] tightens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundSide {
    /// The predicate `[x >= 1]`.
    Lower,
    /// The predicate `[x <= 0]`.
    Upper,
}

/// A bound predicate over a binary variable; either `[x >= 1]` or `[x <= 0]`.
///
/// These are the only atomic statements which are produced by the propagator, both when
/// tightening domains and when explaining why it did so.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Predicate<Var> {
    variable: Var,
    side: BoundSide,
}

impl<Var: Copy> Predicate<Var> {
    pub fn new(variable: Var, side: BoundSide) -> Self {
        Predicate { variable, side }
    }

    pub fn lower_bound(variable: Var) -> Self {
        Predicate::new(variable, BoundSide::Lower)
    }

    pub fn upper_bound(variable: Var) -> Self {
        Predicate::new(variable, BoundSide::Upper)
    }

    /// The predicate which states that `variable` takes `value`.
    pub fn fixing(variable: Var, value: BinaryValue) -> Self {
        match value {
            BinaryValue::Zero => Predicate::upper_bound(variable),
            BinaryValue::One => Predicate::lower_bound(variable),
        }
    }

    pub fn variable(&self) -> Var {
        self.variable
    }

    pub fn side(&self) -> BoundSide {
        self.side
    }

    /// The value which the variable is forced to take when the predicate holds.
    pub fn value(&self) -> BinaryValue {
        match self.side {
            BoundSide::Lower => BinaryValue::One,
            BoundSide::Upper => BinaryValue::Zero,
        }
    }
}

impl<Var: Display> Display for Predicate<Var> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.side {
            BoundSide::Lower => write!(f, "[{} >= 1]", self.variable),
            BoundSide::Upper => write!(f, "[{} <= 0]", self.variable),
        }
    }
}

impl<Var: Debug> Debug for Predicate<Var> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.side {
            BoundSide::Lower => write!(f, "[{:?} >= 1]", self.variable),
            BoundSide::Upper => write!(f, "[{:?} <= 0]", self.variable),
        }
    }
}

/// Creates a [`Predicate`] over a binary variable.
///
/// Only the bounds which can be tightened on a binary variable are accepted, i.e. `[x >= 1]` and
/// `[x <= 0]`.
///
/// # Example
/// ```rust
/// # use symretope_core::predicate;
/// # use symretope_core::predicates::Predicate;
/// # use symretope_core::BinaryAssignments;
/// let mut assignments = BinaryAssignments::default();
/// let x = assignments.new_binary();
///
/// assert_eq!(Predicate::lower_bound(x), predicate![x >= 1]);
/// assert_eq!(Predicate::upper_bound(x), predicate![x <= 0]);
/// ```
#[macro_export]
macro_rules! predicate {
    ($($var:ident).+$([$index:expr])? >= 1) => {
        $crate::predicates::Predicate::lower_bound($($var).+$([$index])?)
    };
    ($($var:ident).+$([$index:expr])? <= 0) => {
        $crate::predicates::Predicate::upper_bound($($var).+$([$index])?)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DomainId;

    #[test]
    fn macro_produces_bound_predicates() {
        let x = DomainId::new(0);

        assert_eq!(BoundSide::Lower, predicate![x >= 1].side());
        assert_eq!(BoundSide::Upper, predicate![x <= 0].side());
        assert_eq!(x, predicate![x <= 0].variable());
    }

    #[test]
    fn macro_accepts_indexed_variables() {
        let xs = [DomainId::new(0), DomainId::new(1)];

        assert_eq!(Predicate::lower_bound(xs[1]), predicate![xs[1] >= 1]);
    }

    #[test]
    fn fixing_predicates_force_the_value() {
        let x = DomainId::new(4);

        assert_eq!(
            BinaryValue::One,
            Predicate::fixing(x, BinaryValue::One).value()
        );
        assert_eq!(
            BinaryValue::Zero,
            Predicate::fixing(x, BinaryValue::Zero).value()
        );
    }

    #[test]
    fn predicates_are_displayed_as_bounds() {
        let x = DomainId::new(2);

        assert_eq!("[x2 >= 1]", predicate![x >= 1].to_string());
        assert_eq!("[x2 <= 0]", predicate![x <= 0].to_string());
    }
}
