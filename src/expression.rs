//! Linear expressions: ordered sums of `coefficient * variable` terms.
use std::fmt::{Debug, Display, Formatter};
use std::iter::FromIterator;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::constraint::{self, Constraint};

/// A single `coefficient * variable` product
#[derive(Clone, PartialEq, Debug)]
pub struct Term<V> {
    /// The factor applied to the variable
    pub coefficient: f64,
    /// The variable token
    pub variable: V,
}

impl<V> Term<V> {
    /// Create a new term
    pub fn new<N: Into<f64>>(coefficient: N, variable: V) -> Self {
        Term {
            coefficient: coefficient.into(),
            variable,
        }
    }
}

/// A linear expression such as `2x - 3y + z`.
///
/// Terms are kept in insertion order, and the same variable may appear more than once.
/// The expression is still a sum: its value does not depend on the order of the terms.
///
/// ```
/// use ilp_bridge::Linear;
/// let expr = Linear::new().with(2, "x").with(-3, "y");
/// assert_eq!(expr.to_string(), "2*x - 3*y");
/// let value = expr.evaluate(|&v| Some(if v == "x" { 4. } else { 1. }));
/// assert_eq!(value, Some(5.));
/// ```
#[derive(Clone, PartialEq)]
pub struct Linear<V> {
    pub(crate) terms: Vec<Term<V>>,
}

impl<V> Default for Linear<V> {
    fn default() -> Self {
        Linear { terms: Vec::new() }
    }
}

impl<V> Linear<V> {
    /// An empty expression, with the value 0
    pub fn new() -> Self {
        Linear::default()
    }

    /// An empty expression with memory allocated for `capacity` terms
    pub fn with_capacity(capacity: usize) -> Self {
        Linear {
            terms: Vec::with_capacity(capacity),
        }
    }

    /// Append `coefficient * variable` to the expression
    pub fn add_term<N: Into<f64>>(&mut self, coefficient: N, variable: V) {
        self.terms.push(Term::new(coefficient, variable));
    }

    /// Builder version of [Linear::add_term]
    pub fn with<N: Into<f64>>(mut self, coefficient: N, variable: V) -> Self {
        self.add_term(coefficient, variable);
        self
    }

    /// The terms, in insertion order
    pub fn terms(&self) -> &[Term<V>] {
        &self.terms
    }

    /// Iterates over the terms
    pub fn iter(&self) -> std::slice::Iter<'_, Term<V>> {
        self.terms.iter()
    }

    /// Iterates over the variables referenced by the expression
    pub fn variables(&self) -> impl Iterator<Item = &V> {
        self.terms.iter().map(|term| &term.variable)
    }

    /// The number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true for the empty expression
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute the value of the expression, given a value for each variable.
    /// Returns `None` as soon as a variable has no value.
    pub fn evaluate<F>(&self, mut value_of: F) -> Option<f64>
    where
        F: FnMut(&V) -> Option<f64>,
    {
        self.terms.iter().try_fold(0., |sum, term| {
            value_of(&term.variable).map(|value| sum + term.coefficient * value)
        })
    }

    /// Creates a constraint indicating that this expression
    /// is lesser than or equal to `rhs`
    pub fn leq<N: Into<f64>>(self, rhs: N) -> Constraint<V> {
        constraint::leq(self, rhs)
    }

    /// Creates a constraint indicating that this expression
    /// is greater than or equal to `rhs`
    pub fn geq<N: Into<f64>>(self, rhs: N) -> Constraint<V> {
        constraint::geq(self, rhs)
    }

    /// Creates a constraint indicating that this expression is equal to `rhs`
    pub fn eq<N: Into<f64>>(self, rhs: N) -> Constraint<V> {
        constraint::eq(self, rhs)
    }
}

impl<V, N: Into<f64>> FromIterator<(N, V)> for Linear<V> {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut linear = Linear::new();
        linear.extend(iter);
        linear
    }
}

impl<V, N: Into<f64>> Extend<(N, V)> for Linear<V> {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        self.terms.extend(
            iter.into_iter()
                .map(|(coefficient, variable)| Term::new(coefficient, variable)),
        );
    }
}

impl<V> From<Vec<Term<V>>> for Linear<V> {
    fn from(terms: Vec<Term<V>>) -> Self {
        Linear { terms }
    }
}

impl<V> IntoIterator for Linear<V> {
    type Item = Term<V>;
    type IntoIter = std::vec::IntoIter<Term<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Linear<V> {
    type Item = &'a Term<V>;
    type IntoIter = std::slice::Iter<'a, Term<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

impl<V> AddAssign for Linear<V> {
    #[inline]
    fn add_assign(&mut self, rhs: Linear<V>) {
        self.terms.extend(rhs.terms);
    }
}

impl<V> SubAssign for Linear<V> {
    #[inline]
    fn sub_assign(&mut self, rhs: Linear<V>) {
        *self += -rhs;
    }
}

impl<V> Add for Linear<V> {
    type Output = Linear<V>;

    fn add(mut self, rhs: Linear<V>) -> Self::Output {
        self += rhs;
        self
    }
}

impl<V> Sub for Linear<V> {
    type Output = Linear<V>;

    fn sub(mut self, rhs: Linear<V>) -> Self::Output {
        self -= rhs;
        self
    }
}

impl<V, N: Into<f64>> MulAssign<N> for Linear<V> {
    #[inline]
    fn mul_assign(&mut self, rhs: N) {
        let factor = rhs.into();
        for term in &mut self.terms {
            term.coefficient *= factor;
        }
    }
}

impl<V, N: Into<f64>> Mul<N> for Linear<V> {
    type Output = Linear<V>;

    fn mul(mut self, rhs: N) -> Self::Output {
        self *= rhs;
        self
    }
}

impl<V> Neg for Linear<V> {
    type Output = Linear<V>;

    #[inline]
    fn neg(mut self) -> Self::Output {
        self *= -1;
        self
    }
}

impl<V: Display> Display for Linear<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for Term {
            coefficient,
            variable,
        } in &self.terms
        {
            let magnitude = if first {
                if *coefficient < 0. {
                    write!(f, "-")?;
                }
                coefficient.abs()
            } else {
                write!(f, " {} ", if *coefficient < 0. { '-' } else { '+' })?;
                coefficient.abs()
            };
            if (magnitude - 1.).abs() > f64::EPSILON {
                write!(f, "{}*", magnitude)?;
            }
            write!(f, "{}", variable)?;
            first = false;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}

impl<V: Debug> Debug for Linear<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.terms.iter().map(|t| (t.coefficient, &t.variable)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let expr: Linear<&str> = vec![(2, "x"), (-3, "y"), (1, "z"), (-1, "w")]
            .into_iter()
            .collect();
        assert_eq!(expr.to_string(), "2*x - 3*y + z - w");
        assert_eq!(Linear::<&str>::new().to_string(), "0");
        assert_eq!(Linear::new().with(-0.5, 'a').to_string(), "-0.5*a");
    }

    #[test]
    fn evaluation_is_order_independent() {
        let forward: Linear<usize> = (0..100).map(|i| (i as f64 / 7., i)).collect();
        let backward: Linear<usize> = (0..100).rev().map(|i| (i as f64 / 7., i)).collect();
        let value = |&v: &usize| Some(v as f64);
        let (a, b) = (forward.evaluate(value), backward.evaluate(value));
        assert!((a.unwrap() - b.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn evaluation_with_missing_variable() {
        let expr = Linear::new().with(1, "x").with(1, "y");
        assert_eq!(expr.evaluate(|&v| (v == "x").then_some(1.)), None);
    }

    #[test]
    fn arithmetic() {
        let a = Linear::new().with(1, "x");
        let b = Linear::new().with(2, "y");
        let expr = (a - b) * 3;
        assert_eq!(
            expr.terms(),
            &[Term::new(3, "x"), Term::new(-6, "y")][..]
        );
    }

    #[test]
    fn terms_added_in_place_and_by_builder() {
        let mut expr = Linear::new().with(2, "x");
        expr.add_term(-1, "y");
        expr += Linear::new().with(0.5, "z");
        assert_eq!(
            expr.terms(),
            &[Term::new(2, "x"), Term::new(-1, "y"), Term::new(0.5, "z")][..]
        );
        assert_eq!(expr.to_string(), "2*x - y + 0.5*z");
    }
}
