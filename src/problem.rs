//! The generic description of an optimization problem:
//! typed variables, linear constraints and an optional linear objective.
use std::fmt::{Display, Formatter};

use fnv::FnvBuildHasher;
use indexmap::IndexMap;

use crate::constraint::{Constraint, Operator};
use crate::expression::Linear;
use crate::variable::{Token, VarType, VariableDefinition};

/// Whether to search for the variable values that give the highest
/// or the lowest value of the objective function.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Default)]
pub enum ObjectiveDirection {
    /// Search for the highest value
    Maximisation,
    /// Search for the lowest value
    #[default]
    Minimisation,
}

/// An optimization problem over variables identified by tokens of type `V`.
///
/// Variables keep the order in which they were first seen.
/// A variable used in a constraint or in the objective without having been declared
/// is registered as a [VarType::Real] without bounds.
///
/// ```
/// use ilp_bridge::{Linear, Operator, Problem, VarType};
/// let mut problem = Problem::new();
/// problem.set_var_type("x", VarType::Int);
/// problem.set_var_upper_bound("x", 10);
/// problem.add(Linear::new().with(1, "x").with(2, "y"), Operator::Le, 8);
/// problem.maximise(Linear::new().with(1, "x").with(1, "y"));
/// assert_eq!(problem.variables_count(), 2);
/// assert_eq!(problem.var_type(&"y"), Some(VarType::Real));
/// ```
#[derive(Clone, Debug)]
pub struct Problem<V> {
    variables: IndexMap<V, VariableDefinition, FnvBuildHasher>,
    constraints: Vec<Constraint<V>>,
    objective: Option<Linear<V>>,
    direction: ObjectiveDirection,
}

impl<V: Token> Default for Problem<V> {
    fn default() -> Self {
        Problem {
            variables: IndexMap::default(),
            constraints: Vec::new(),
            objective: None,
            direction: ObjectiveDirection::default(),
        }
    }
}

impl<V: Token> Problem<V> {
    /// An empty problem
    pub fn new() -> Self {
        Problem::default()
    }

    /// Declare a variable, replacing any previous definition
    pub fn add_variable<D: Into<VariableDefinition>>(&mut self, variable: V, definition: D) {
        self.variables.insert(variable, definition.into());
    }

    /// Declare several variables with the same definition
    pub fn add_variables<I>(&mut self, variables: I, definition: VariableDefinition)
    where
        I: IntoIterator<Item = V>,
    {
        for variable in variables {
            self.variables.insert(variable, definition.clone());
        }
    }

    fn definition_mut(&mut self, variable: V) -> &mut VariableDefinition {
        self.variables.entry(variable).or_default()
    }

    /// Set the domain of a variable, declaring it if needed
    pub fn set_var_type(&mut self, variable: V, kind: VarType) {
        self.definition_mut(variable).kind = kind;
    }

    /// Set the lower bound of a variable, declaring it if needed
    pub fn set_var_lower_bound<N: Into<f64>>(&mut self, variable: V, bound: N) {
        self.definition_mut(variable).min = Some(bound.into());
    }

    /// Set the upper bound of a variable, declaring it if needed
    pub fn set_var_upper_bound<N: Into<f64>>(&mut self, variable: V, bound: N) {
        self.definition_mut(variable).max = Some(bound.into());
    }

    fn register(&mut self, linear: &Linear<V>) {
        for variable in linear.variables() {
            if !self.variables.contains_key(variable) {
                self.variables
                    .insert(variable.clone(), VariableDefinition::default());
            }
        }
    }

    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint<V>) {
        self.register(&constraint.lhs);
        self.constraints.push(constraint);
    }

    /// Add the constraint `lhs operator rhs`
    pub fn add<N: Into<f64>>(&mut self, lhs: Linear<V>, operator: Operator, rhs: N) {
        self.add_constraint(Constraint::new(lhs, operator, rhs));
    }

    /// Add all the given constraints
    pub fn add_all<I: IntoIterator<Item = Constraint<V>>>(&mut self, constraints: I) {
        for constraint in constraints {
            self.add_constraint(constraint);
        }
    }

    /// Set the objective function and whether to minimise or maximise it
    pub fn set_objective(&mut self, objective: Linear<V>, direction: ObjectiveDirection) {
        self.register(&objective);
        self.objective = Some(objective);
        self.direction = direction;
    }

    /// Search for the lowest value of `objective`
    pub fn minimise(&mut self, objective: Linear<V>) {
        self.set_objective(objective, ObjectiveDirection::Minimisation)
    }

    /// Search for the highest value of `objective`
    pub fn maximise(&mut self, objective: Linear<V>) {
        self.set_objective(objective, ObjectiveDirection::Maximisation)
    }

    /// Turn the problem back into a pure feasibility problem
    pub fn clear_objective(&mut self) {
        self.objective = None;
    }

    /// Iterates over the couples of variables with their definition, in declaration order
    pub fn variables(&self) -> impl Iterator<Item = (&V, &VariableDefinition)> {
        self.variables.iter()
    }

    /// The definition of a variable
    pub fn definition(&self, variable: &V) -> Option<&VariableDefinition> {
        self.variables.get(variable)
    }

    /// The domain of a variable
    pub fn var_type(&self, variable: &V) -> Option<VarType> {
        self.definition(variable).map(VariableDefinition::var_type)
    }

    /// The lower bound of a variable, if it has one
    pub fn var_lower_bound(&self, variable: &V) -> Option<f64> {
        self.definition(variable)?.min
    }

    /// The upper bound of a variable, if it has one
    pub fn var_upper_bound(&self, variable: &V) -> Option<f64> {
        self.definition(variable)?.max
    }

    /// The constraints, in insertion order
    pub fn constraints(&self) -> &[Constraint<V>] {
        &self.constraints
    }

    /// The objective function, if any
    pub fn objective(&self) -> Option<&Linear<V>> {
        self.objective.as_ref()
    }

    /// The direction of the objective
    pub fn direction(&self) -> ObjectiveDirection {
        self.direction
    }

    /// The number of variables
    pub fn variables_count(&self) -> usize {
        self.variables.len()
    }

    /// The number of constraints
    pub fn constraints_count(&self) -> usize {
        self.constraints.len()
    }
}

impl<V: Token + Display> Display for Problem<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(objective) = &self.objective {
            let direction = match self.direction {
                ObjectiveDirection::Maximisation => "max",
                ObjectiveDirection::Minimisation => "min",
            };
            writeln!(f, "{}: {}", direction, objective)?;
        }
        for constraint in &self.constraints {
            writeln!(f, "{}", constraint)?;
        }
        for (variable, definition) in &self.variables {
            write!(f, "{} {}", definition.kind, variable)?;
            match (definition.min, definition.max) {
                (Some(min), Some(max)) => write!(f, " in [{}, {}]", min, max)?,
                (Some(min), None) => write!(f, " >= {}", min)?,
                (None, Some(max)) => write!(f, " <= {}", max)?,
                (None, None) => {}
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable;

    #[test]
    fn undeclared_variables_are_registered_as_real() {
        let mut problem = Problem::new();
        problem.add_variable("b", VarType::Bool);
        problem.add(Linear::new().with(1, "a").with(1, "b"), Operator::Ge, 1);
        let order: Vec<_> = problem.variables().map(|(v, _)| *v).collect();
        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(problem.var_type(&"a"), Some(VarType::Real));
        assert_eq!(problem.var_type(&"b"), Some(VarType::Bool));
    }

    #[test]
    fn bounds_setters_keep_type() {
        let mut problem = Problem::new();
        problem.add_variable(1, variable().integer());
        problem.set_var_lower_bound(1, -4);
        problem.set_var_upper_bound(1, 9);
        assert_eq!(problem.var_type(&1), Some(VarType::Int));
        assert_eq!(problem.var_lower_bound(&1), Some(-4.));
        assert_eq!(problem.var_upper_bound(&1), Some(9.));
        assert_eq!(problem.var_upper_bound(&2), None);
    }

    #[test]
    fn display() {
        let mut problem = Problem::new();
        problem.add_variable("x", variable().integer().clamp(0, 4));
        problem.add(Linear::new().with(2, "x"), Operator::Le, 5);
        problem.minimise(Linear::new().with(-1, "x"));
        assert_eq!(
            problem.to_string(),
            "min: -x\n2*x <= 5\nint x in [0, 4]\n"
        );
    }
}
