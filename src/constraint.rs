//! Constraints define the (in)equalities that must hold in the solution.
use core::fmt::{Debug, Display, Formatter};

use crate::expression::Linear;

/// How the left hand side of a constraint compares to its right hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// lesser than or equal
    Le,
    /// greater than or equal
    Ge,
    /// equal
    Eq,
}

impl Operator {
    /// Whether `lhs operator rhs` holds, with an absolute tolerance
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Operator::Le => lhs <= rhs + tolerance,
            Operator::Ge => lhs + tolerance >= rhs,
            Operator::Eq => (lhs - rhs).abs() <= tolerance,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Eq => "=",
        })
    }
}

/// A constraint represents a single (in)equality that must hold in the solution:
/// `lhs operator rhs`, where `rhs` is a constant.
#[derive(Clone, PartialEq)]
pub struct Constraint<V> {
    pub(crate) lhs: Linear<V>,
    pub(crate) operator: Operator,
    pub(crate) rhs: f64,
}

impl<V> Constraint<V> {
    /// Create a new constraint `lhs operator rhs`
    pub fn new<N: Into<f64>>(lhs: Linear<V>, operator: Operator, rhs: N) -> Constraint<V> {
        Constraint {
            lhs,
            operator,
            rhs: rhs.into(),
        }
    }

    /// The left hand side
    pub fn lhs(&self) -> &Linear<V> {
        &self.lhs
    }

    /// The comparison operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The right hand side
    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

impl<V: Display> Display for Constraint<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.operator, self.rhs)
    }
}

impl<V: Debug> Debug for Constraint<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {} {}", self.lhs, self.operator, self.rhs)
    }
}

/// equals
pub fn eq<V, N: Into<f64>>(lhs: Linear<V>, rhs: N) -> Constraint<V> {
    Constraint::new(lhs, Operator::Eq, rhs)
}

/// less than or equal
pub fn leq<V, N: Into<f64>>(lhs: Linear<V>, rhs: N) -> Constraint<V> {
    Constraint::new(lhs, Operator::Le, rhs)
}

/// greater than or equal
pub fn geq<V, N: Into<f64>>(lhs: Linear<V>, rhs: N) -> Constraint<V> {
    Constraint::new(lhs, Operator::Ge, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let c = Linear::new().with(3, "x").with(-1, "y").leq(2);
        assert_eq!(c.to_string(), "3*x - y <= 2");
        let c = geq(Linear::new().with(1, "x"), 0);
        assert_eq!(c.to_string(), "x >= 0");
    }

    #[test]
    fn operator_tolerance() {
        assert!(Operator::Le.holds(1. + 1e-9, 1., 1e-6));
        assert!(!Operator::Ge.holds(0.5, 1., 1e-6));
        assert!(Operator::Eq.holds(2., 2. - 1e-9, 1e-6));
    }
}
