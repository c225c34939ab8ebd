//! Solving a [Problem] with an [Engine].
//!
//! The [EngineAdapter] opens one engine session per call to [EngineAdapter::solve],
//! declares the variables, translates every linear expression into the engine's
//! expression tree, lets the registered [Hook]s add engine-specific modelling,
//! runs the search and reads the values back into a [Solution].
//!
//! ```
//! # #[cfg(feature = "microlp")] {
//! use ilp_bridge::{variable, DefaultEngine, EngineAdapter, Linear, Problem};
//!
//! let mut problem = Problem::new();
//! problem.add_variable("a", variable().integer().bounds(0..=10));
//! problem.add_variable("b", variable().bounds(0..=4));
//! problem.add_constraint(Linear::from_iter([(1, "a"), (2, "b")]).leq(12));
//! problem.maximise(Linear::from_iter([(3, "a"), (1, "b")]));
//!
//! let adapter: EngineAdapter<DefaultEngine, &str> = EngineAdapter::new();
//! let solution = adapter.solve(&problem).unwrap().expect("the problem is feasible");
//! assert_eq!(solution.int(&"a"), Some(10));
//! assert!((solution.value(&"b").unwrap() - 1.).abs() < 1e-9);
//! # }
//! ```
use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;
use std::sync::Arc;

use fnv::{FnvBuildHasher, FnvHashMap};
use indexmap::IndexMap;
use thiserror::Error;

use crate::constraint::Operator;
use crate::expression::Linear;
use crate::parameters::{ParamValue, Parameters};
use crate::problem::{ObjectiveDirection, Problem};
use crate::solution::Solution;
use crate::solvers::{Engine, EngineError};
use crate::variable::{Token, VarType, VariableDefinition};

/// Represents an error that occurred while solving a problem
#[derive(Debug, Error, PartialEq, Clone)]
pub enum SolveError {
    /// The engine failed
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// An expression references a variable that has no engine handle
    #[error("variable {0} was not declared to the engine")]
    UndeclaredVariable(String),
    /// A hook refused the model
    #[error("hook failed: {0}")]
    Hook(String),
}

/// The association between the variables of a problem and their engine handles.
///
/// Built for one call to [EngineAdapter::solve] and dropped at its end.
#[derive(Clone)]
pub struct VarMap<V, H> {
    handles: IndexMap<V, H, FnvBuildHasher>,
    variables: FnvHashMap<H, V>,
}

impl<V, H> Default for VarMap<V, H> {
    fn default() -> Self {
        VarMap {
            handles: IndexMap::default(),
            variables: FnvHashMap::default(),
        }
    }
}

impl<V: Token, H: Copy + Eq + Hash> VarMap<V, H> {
    /// An empty map with room for `capacity` variables
    pub fn with_capacity(capacity: usize) -> Self {
        VarMap {
            handles: IndexMap::with_capacity_and_hasher(capacity, FnvBuildHasher::default()),
            variables: FnvHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub(crate) fn insert(&mut self, variable: V, handle: H) {
        if let Some(previous) = self.handles.insert(variable.clone(), handle) {
            self.variables.remove(&previous);
        }
        self.variables.insert(handle, variable);
    }

    /// The engine handle of a variable
    pub fn handle(&self, variable: &V) -> Option<H> {
        self.handles.get(variable).copied()
    }

    /// The variable behind an engine handle
    pub fn variable(&self, handle: &H) -> Option<&V> {
        self.variables.get(handle)
    }

    /// Iterates over the variables and their handles, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&V, H)> {
        self.handles.iter().map(|(v, &h)| (v, h))
    }

    /// The number of declared variables
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true when no variable was declared
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<V: Debug, H: Debug> Debug for VarMap<V, H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.handles.iter()).finish()
    }
}

/// Build the engine expression of `constant(0) + sum(constant(coefficient) * variable)`
pub fn translate<E: Engine, V: Token>(
    engine: &mut E,
    expression: &Linear<V>,
    variables: &VarMap<V, E::Expr>,
) -> Result<E::Expr, SolveError> {
    let mut sum = engine.constant(0.)?;
    for term in expression {
        let handle = variables
            .handle(&term.variable)
            .ok_or_else(|| SolveError::UndeclaredVariable(format!("{:?}", term.variable)))?;
        let coefficient = engine.constant(term.coefficient)?;
        let product = engine.prod(coefficient, handle)?;
        sum = engine.sum(sum, product)?;
    }
    Ok(sum)
}

/// Engine-specific modelling, applied to every session after the problem is translated
/// and before the model is closed.
///
/// Any `Fn(&mut E, &VarMap<V, E::Expr>) -> Result<(), SolveError>` closure is a hook.
pub trait Hook<E: Engine, V>: Send + Sync {
    /// Modify the model
    fn call(&self, engine: &mut E, variables: &VarMap<V, E::Expr>) -> Result<(), SolveError>;
}

impl<E, V, F> Hook<E, V> for F
where
    E: Engine,
    F: Fn(&mut E, &VarMap<V, E::Expr>) -> Result<(), SolveError> + Send + Sync,
{
    fn call(&self, engine: &mut E, variables: &VarMap<V, E::Expr>) -> Result<(), SolveError> {
        self(engine, variables)
    }
}

/// Identifies a registered hook, to remove it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

/// A solver that can be used independently of the engine behind it
pub trait Solver<V> {
    /// The name of the engine, for logs
    fn name(&self) -> &'static str;

    /// Solve a problem. `Ok(None)` means that no solution exists or none was found in time.
    fn solve(&self, problem: &Problem<V>) -> Result<Option<Solution<V>>, SolveError>;
}

/// Solves problems with the engine `E`, for variables of type `V`.
pub struct EngineAdapter<E: Engine, V> {
    parameters: Parameters,
    hooks: Vec<(HookId, Arc<dyn Hook<E, V>>)>,
    next_hook: u64,
}

impl<E: Engine, V> Default for EngineAdapter<E, V> {
    fn default() -> Self {
        EngineAdapter {
            parameters: Parameters::new(),
            hooks: Vec::new(),
            next_hook: 0,
        }
    }
}

impl<E: Engine, V> Clone for EngineAdapter<E, V> {
    fn clone(&self) -> Self {
        EngineAdapter {
            parameters: self.parameters.clone(),
            hooks: self.hooks.clone(),
            next_hook: self.next_hook,
        }
    }
}

impl<E: Engine, V> Debug for EngineAdapter<E, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineAdapter")
            .field("engine", &E::name())
            .field("parameters", &self.parameters)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl<E: Engine, V: Token> EngineAdapter<E, V> {
    /// An adapter with no parameter and no hook
    pub fn new() -> Self {
        EngineAdapter::default()
    }

    /// Set an option. See [crate::parameters] for the options the adapter reads.
    pub fn set_parameter<K: Into<String>, P: Into<ParamValue>>(&mut self, key: K, value: P) {
        self.parameters.set(key, value);
    }

    /// Builder version of [EngineAdapter::set_parameter]
    pub fn with_parameter<K: Into<String>, P: Into<ParamValue>>(mut self, key: K, value: P) -> Self {
        self.set_parameter(key, value);
        self
    }

    /// The options of this adapter
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Mutable access to the options of this adapter
    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    /// Register a hook. Hooks run in registration order.
    pub fn add_hook<H: Hook<E, V> + 'static>(&mut self, hook: H) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;
        self.hooks.push((id, Arc::new(hook)));
        id
    }

    /// Builder version of [EngineAdapter::add_hook]
    pub fn with_hook<H: Hook<E, V> + 'static>(mut self, hook: H) -> Self {
        self.add_hook(hook);
        self
    }

    /// Unregister a hook. Returns false if it was not registered.
    pub fn remove_hook(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|&(hook_id, _)| hook_id != id);
        self.hooks.len() != before
    }

    /// The number of registered hooks
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Solve a problem in a new engine session.
    ///
    /// Returns `Ok(None)` when the engine reports that the problem is infeasible
    /// or inconsistent, or when no solution was found within the time limit.
    /// The session is released before returning, whatever the outcome.
    pub fn solve(&self, problem: &Problem<V>) -> Result<Option<Solution<V>>, SolveError> {
        let mut engine = E::open()?;
        self.configure(&mut engine);
        log::debug!(
            "{}: translating {} variables and {} constraints",
            E::name(),
            problem.variables_count(),
            problem.constraints_count()
        );
        let variables = declare_variables(&mut engine, problem)?;
        for constraint in problem.constraints() {
            let lhs = translate(&mut engine, constraint.lhs(), &variables)?;
            let comparison = match constraint.operator() {
                Operator::Le => engine.leq(lhs, constraint.rhs())?,
                Operator::Ge => engine.geq(lhs, constraint.rhs())?,
                Operator::Eq => engine.eq(lhs, constraint.rhs())?,
            };
            engine.add_constraint(comparison)?;
        }
        if let Some(objective) = problem.objective() {
            let objective = translate(&mut engine, objective, &variables)?;
            match problem.direction() {
                ObjectiveDirection::Minimisation => engine.minimize(objective)?,
                ObjectiveDirection::Maximisation => engine.maximize(objective)?,
            }
        }
        for (_, hook) in &self.hooks {
            hook.call(&mut engine, &variables)?;
        }
        engine.close()?;
        engine.solve()?;

        let status = engine.status();
        log::info!("{}: search ended with status {:?}", E::name(), status);
        if !status.has_solution() {
            return Ok(None);
        }
        read_solution(&engine, problem, &variables).map(Some)
    }

    fn configure(&self, engine: &mut E) {
        if let Some(seconds) = self.parameters.timeout() {
            engine.set_time_limit(seconds);
        }
        if let Some(level) = self.parameters.verbosity() {
            engine.set_verbosity(level);
        }
    }
}

fn declare_variables<E: Engine, V: Token>(
    engine: &mut E,
    problem: &Problem<V>,
) -> Result<VarMap<V, E::Expr>, SolveError> {
    let mut variables = VarMap::with_capacity(problem.variables_count());
    for (variable, definition) in problem.variables() {
        let handle = declare(engine, definition)?;
        variables.insert(variable.clone(), handle);
    }
    Ok(variables)
}

fn declare<E: Engine>(engine: &mut E, definition: &VariableDefinition) -> Result<E::Expr, EngineError> {
    match definition.var_type() {
        VarType::Bool => engine.bool_var(),
        VarType::Int => engine.int_var(
            definition
                .lower_bound()
                .map_or(E::MIN_INT + 1, |bound| bound as i64),
            definition
                .upper_bound()
                .map_or(E::MAX_INT - 1, |bound| bound as i64),
        ),
        VarType::Real => engine.float_var(
            definition.lower_bound().unwrap_or(E::MIN_FLOAT),
            definition.upper_bound().unwrap_or(E::MAX_FLOAT),
        ),
    }
}

fn read_solution<E: Engine, V: Token>(
    engine: &E,
    problem: &Problem<V>,
    variables: &VarMap<V, E::Expr>,
) -> Result<Solution<V>, SolveError> {
    let mut solution = match problem.objective() {
        Some(objective) => Solution::with_objective(objective.clone()),
        None => Solution::new(),
    };
    for (variable, definition) in problem.variables() {
        let handle = variables
            .handle(variable)
            .ok_or_else(|| SolveError::UndeclaredVariable(format!("{:?}", variable)))?;
        if definition.var_type().is_integral() {
            solution.put_value(variable.clone(), engine.int_value(handle)?);
        } else {
            solution.put_value(variable.clone(), engine.float_value(handle)?);
        }
    }
    Ok(solution)
}

impl<E: Engine, V: Token> Solver<V> for EngineAdapter<E, V> {
    fn name(&self) -> &'static str {
        E::name()
    }

    fn solve(&self, problem: &Problem<V>) -> Result<Option<Solution<V>>, SolveError> {
        EngineAdapter::solve(self, problem)
    }
}

impl<V, S: Solver<V> + ?Sized> Solver<V> for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, problem: &Problem<V>) -> Result<Option<Solution<V>>, SolveError> {
        (**self).solve(problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::EngineStatus;

    #[test]
    fn var_map_is_bidirectional() {
        let mut map = VarMap::default();
        map.insert("x", 3_usize);
        map.insert("y", 7);
        assert_eq!(map.handle(&"x"), Some(3));
        assert_eq!(map.variable(&7), Some(&"y"));
        assert_eq!(map.handle(&"z"), None);
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&"x", 3), (&"y", 7)]);
    }

    #[test]
    fn var_map_replaces_handles() {
        let mut map = VarMap::default();
        map.insert("x", 1_u8);
        map.insert("x", 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.variable(&1), None);
        assert_eq!(map.variable(&2), Some(&"x"));
    }

    #[test]
    fn hooks_are_removed_by_id() {
        struct Never;
        impl Engine for Never {
            type Expr = ();
            const MIN_INT: i64 = 0;
            const MAX_INT: i64 = 0;
            fn name() -> &'static str {
                "never"
            }
            fn open() -> Result<Self, EngineError> {
                Err(EngineError::Unavailable("never".into()))
            }
            fn set_time_limit(&mut self, _: u32) {}
            fn set_verbosity(&mut self, _: i32) {}
            fn bool_var(&mut self) -> Result<(), EngineError> {
                Ok(())
            }
            fn int_var(&mut self, _: i64, _: i64) -> Result<(), EngineError> {
                Ok(())
            }
            fn float_var(&mut self, _: f64, _: f64) -> Result<(), EngineError> {
                Ok(())
            }
            fn constant(&mut self, _: f64) -> Result<(), EngineError> {
                Ok(())
            }
            fn sum(&mut self, _: (), _: ()) -> Result<(), EngineError> {
                Ok(())
            }
            fn prod(&mut self, _: (), _: ()) -> Result<(), EngineError> {
                Ok(())
            }
            fn leq(&mut self, _: (), _: f64) -> Result<(), EngineError> {
                Ok(())
            }
            fn geq(&mut self, _: (), _: f64) -> Result<(), EngineError> {
                Ok(())
            }
            fn eq(&mut self, _: (), _: f64) -> Result<(), EngineError> {
                Ok(())
            }
            fn add_constraint(&mut self, _: ()) -> Result<(), EngineError> {
                Ok(())
            }
            fn minimize(&mut self, _: ()) -> Result<(), EngineError> {
                Ok(())
            }
            fn maximize(&mut self, _: ()) -> Result<(), EngineError> {
                Ok(())
            }
            fn close(&mut self) -> Result<(), EngineError> {
                Ok(())
            }
            fn solve(&mut self) -> Result<(), EngineError> {
                Ok(())
            }
            fn status(&self) -> EngineStatus {
                EngineStatus::Infeasible
            }
            fn int_value(&self, _: ()) -> Result<i64, EngineError> {
                Err(EngineError::NotSolved)
            }
            fn float_value(&self, _: ()) -> Result<f64, EngineError> {
                Err(EngineError::NotSolved)
            }
        }

        fn noop(_: &mut Never, _: &VarMap<u32, ()>) -> Result<(), SolveError> {
            Ok(())
        }

        let mut adapter = EngineAdapter::<Never, u32>::new();
        let first = adapter.add_hook(noop);
        let second = adapter.add_hook(noop);
        assert_ne!(first, second);
        assert_eq!(adapter.hook_count(), 2);
        assert!(adapter.remove_hook(first));
        assert!(!adapter.remove_hook(first));
        assert_eq!(adapter.hook_count(), 1);
        assert_eq!(
            adapter.solve(&Problem::new()),
            Err(SolveError::Engine(EngineError::Unavailable("never".into())))
        );
    }
}
