//! The values found by an engine for the variables of a problem.
use std::fmt::{Display, Formatter};

use fnv::FnvBuildHasher;
use indexmap::IndexMap;

use crate::expression::Linear;
use crate::variable::Token;

/// The value of a single variable.
/// Boolean and integer variables are read back as [Value::Int].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// An integral value
    Int(i64),
    /// A floating point value
    Float(f64),
}

impl Value {
    /// The value as a float
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
        }
    }

    /// The value as an integer, truncating floating point values
    pub fn as_i64(self) -> i64 {
        match self {
            Value::Int(v) => v,
            Value::Float(v) => v as i64,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Value> for f64 {
    fn from(v: Value) -> Self {
        v.as_f64()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A problem solution: one value per variable,
/// and the objective function when the problem had one.
///
/// ```
/// use ilp_bridge::{Linear, Solution, Value};
/// let mut solution = Solution::with_objective(Linear::new().with(2, "x").with(-3, "y"));
/// solution.put_value("x", Value::Int(4));
/// solution.put_value("y", 1.5);
/// assert_eq!(solution.objective_value(), Some(3.5));
/// assert_eq!(solution.int(&"x"), Some(4));
/// ```
#[derive(Clone, Debug)]
pub struct Solution<V> {
    values: IndexMap<V, Value, FnvBuildHasher>,
    objective: Option<Linear<V>>,
}

impl<V: Token> Default for Solution<V> {
    fn default() -> Self {
        Solution {
            values: IndexMap::default(),
            objective: None,
        }
    }
}

impl<V: Token> PartialEq for Solution<V> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.objective == other.objective
    }
}

impl<V: Token> Solution<V> {
    /// A solution for a problem without objective
    pub fn new() -> Self {
        Solution::default()
    }

    /// A solution for a problem with the given objective
    pub fn with_objective(objective: Linear<V>) -> Self {
        Solution {
            values: IndexMap::default(),
            objective: Some(objective),
        }
    }

    /// Set the value of a variable
    pub fn put_value<N: Into<Value>>(&mut self, variable: V, value: N) {
        self.values.insert(variable, value.into());
    }

    /// Get the value of a variable
    pub fn get(&self, variable: &V) -> Option<Value> {
        self.values.get(variable).copied()
    }

    /// Get the value of a variable as a float
    pub fn value(&self, variable: &V) -> Option<f64> {
        self.get(variable).map(Value::as_f64)
    }

    /// Get the value of a variable as an integer
    pub fn int(&self, variable: &V) -> Option<i64> {
        self.get(variable).map(Value::as_i64)
    }

    /// Get the value of a variable as a boolean: anything but zero is true
    pub fn boolean(&self, variable: &V) -> Option<bool> {
        self.value(variable).map(|v| v != 0.)
    }

    /// Whether the solution holds a value for this variable
    pub fn contains(&self, variable: &V) -> bool {
        self.values.contains_key(variable)
    }

    /// The objective function of the solved problem
    pub fn objective(&self) -> Option<&Linear<V>> {
        self.objective.as_ref()
    }

    /// The value of the objective function at this solution.
    /// `None` when there is no objective or when one of its variables has no value.
    pub fn objective_value(&self) -> Option<f64> {
        self.eval(self.objective.as_ref()?)
    }

    /// Evaluate any expression at this solution
    pub fn eval(&self, expression: &Linear<V>) -> Option<f64> {
        expression.evaluate(|variable| self.value(variable))
    }

    /// Iterates over the variables and their values, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&V, Value)> {
        self.values.iter().map(|(k, &v)| (k, v))
    }

    /// The number of variables with a value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no variable has a value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Token + Display> Display for Solution<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(value) = self.objective_value() {
            write!(f, "Objective: {} ", value)?;
        }
        write!(f, "{{")?;
        for (i, (variable, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", variable, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_insertion_order() {
        let mut solution = Solution::with_objective(Linear::new().with(1, "b").with(1, "a"));
        solution.put_value("b", Value::Int(1));
        solution.put_value("a", 0.5);
        assert_eq!(solution.to_string(), "Objective: 1.5 {b=1, a=0.5}");
    }

    #[test]
    fn objective_value_needs_every_variable() {
        let mut solution = Solution::with_objective(Linear::new().with(1, "x").with(1, "y"));
        solution.put_value("x", 1.);
        assert_eq!(solution.objective_value(), None);
        assert_eq!(Solution::<&str>::new().objective_value(), None);
    }

    #[test]
    fn boolean_values() {
        let mut solution = Solution::new();
        solution.put_value(0, Value::Int(1));
        solution.put_value(1, Value::Int(0));
        assert_eq!(solution.boolean(&0), Some(true));
        assert_eq!(solution.boolean(&1), Some(false));
        assert_eq!(solution.boolean(&2), None);
    }
}
