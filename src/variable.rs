//! A variable is any application value used as a token in a [Problem](crate::Problem).
//! The goal of the engine is to find values for all variables of a problem.
//!
//! Each variable has a [VariableDefinition] that sets its domain and bounds.
use std::collections::Bound;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::ops::RangeBounds;

/// Anything that can identify a variable: strings, integers, your own enums...
///
/// Two tokens that compare equal designate the same variable.
pub trait Token: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Token for T {}

/// The domain of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VarType {
    /// Takes the value 0 or 1
    Bool,
    /// Takes integral values
    Int,
    /// Takes any floating point value
    #[default]
    Real,
}

impl VarType {
    /// Whether solved values of this type are read back as integers
    pub fn is_integral(self) -> bool {
        matches!(self, VarType::Bool | VarType::Int)
    }
}

impl Display for VarType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            VarType::Bool => "bool",
            VarType::Int => "int",
            VarType::Real => "real",
        })
    }
}

/// Defines the properties of a variable: its domain and its lower and upper bounds.
///
/// A missing bound is not the same thing as an infinite one:
/// the engine picks its own extreme value for it when the problem is solved.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct VariableDefinition {
    pub(crate) kind: VarType,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
}

impl VariableDefinition {
    /// Creates a continuous variable without bounds
    pub fn new() -> Self {
        VariableDefinition::default()
    }

    /// Set the lower and/or higher bounds of the variable
    ///
    /// ## Examples
    /// ```
    /// # use ilp_bridge::variable;
    /// assert_eq!(
    ///     variable().bounds(1..2),
    ///     variable().min(1).max(2)
    /// );
    ///
    /// assert_eq!(
    ///     variable().bounds(1..),
    ///     variable().min(1)
    /// );
    ///
    /// # assert_eq!(variable().bounds::<f64, _>(..), variable());
    /// ```
    pub fn bounds<N: Into<f64> + Copy, B: RangeBounds<N>>(mut self, bounds: B) -> Self {
        self.min = match bounds.start_bound() {
            Bound::Included(&x) | Bound::Excluded(&x) => Some(x.into()),
            Bound::Unbounded => None,
        };
        self.max = match bounds.end_bound() {
            Bound::Included(&x) | Bound::Excluded(&x) => Some(x.into()),
            Bound::Unbounded => None,
        };
        self
    }

    /// Set the lower bound of the variable
    pub fn min<N: Into<f64>>(mut self, min: N) -> Self {
        self.min = Some(min.into());
        self
    }

    /// Set the higher bound of the variable
    pub fn max<N: Into<f64>>(mut self, max: N) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Set both the lower and higher bounds of the variable
    pub fn clamp<N1: Into<f64>, N2: Into<f64>>(self, min: N1, max: N2) -> Self {
        self.min(min).max(max)
    }

    /// Restrict the variable to integral values
    pub fn integer(mut self) -> Self {
        self.kind = VarType::Int;
        self
    }

    /// Restrict the variable to the values 0 and 1.
    /// Bounds are ignored for binary variables.
    pub fn binary(mut self) -> Self {
        self.kind = VarType::Bool;
        self
    }

    /// Change the domain of the variable
    pub fn kind(mut self, kind: VarType) -> Self {
        self.kind = kind;
        self
    }

    /// The domain of the variable
    pub fn var_type(&self) -> VarType {
        self.kind
    }

    /// The lower bound, if one was set
    pub fn lower_bound(&self) -> Option<f64> {
        self.min
    }

    /// The upper bound, if one was set
    pub fn upper_bound(&self) -> Option<f64> {
        self.max
    }
}

impl From<VarType> for VariableDefinition {
    fn from(kind: VarType) -> Self {
        VariableDefinition {
            kind,
            ..Default::default()
        }
    }
}

/// Returns a continuous variable definition without bounds
pub fn variable() -> VariableDefinition {
    VariableDefinition::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_from_ranges() {
        assert_eq!(variable().bounds(..=2), variable().max(2));
        assert_eq!(variable().bounds(-1.5..=3.), variable().clamp(-1.5, 3));
    }

    #[test]
    fn missing_bounds_stay_missing() {
        let def = variable().integer();
        assert_eq!(def.var_type(), VarType::Int);
        assert_eq!(def.lower_bound(), None);
        assert_eq!(def.upper_bound(), None);
    }

    #[test]
    fn integral_types() {
        assert!(VarType::Bool.is_integral());
        assert!(VarType::Int.is_integral());
        assert!(!VarType::Real.is_integral());
    }
}
