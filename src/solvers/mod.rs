//! The boundary between the adapter and the optimization engines.
//!
//! An [Engine] is one session of an expression-tree optimization engine:
//! variables and constants are expressions, expressions combine into sums, products
//! and comparisons, and comparisons become constraints of the model.
//! The engines bundled with this crate live in the submodules of this module.

#[macro_use]
mod macros;

pub mod arena;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;
#[cfg(feature = "highs")]
pub mod highs;
#[cfg(feature = "microlp")]
pub mod microlp;

use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

/// The outcome of a search, as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    /// The model was proven to have no solution before or during the search
    Inconsistent,
    /// No solution satisfying every constraint was found
    Infeasible,
    /// A solution satisfying every constraint was found, but not proven optimal
    Feasible,
    /// A solution was found and proven optimal
    Optimal,
}

impl EngineStatus {
    /// Whether the engine holds values that satisfy every constraint
    pub fn has_solution(self) -> bool {
        matches!(self, EngineStatus::Feasible | EngineStatus::Optimal)
    }
}

/// Represents an error that occurred inside an engine
#[derive(Debug, Error, PartialEq, Clone)]
pub enum EngineError {
    /// The session could not be opened: missing license, native library initialisation...
    #[error("the engine is unavailable: {0}")]
    Unavailable(String),
    /// The model was modified after it was closed
    #[error("the model is closed and cannot be modified")]
    Closed,
    /// The search was started on a model that is still open
    #[error("the model must be closed before solving")]
    NotClosed,
    /// Values were requested before any solution was found
    #[error("no solution is available")]
    NotSolved,
    /// The handle does not belong to this session
    #[error("unknown expression handle")]
    UnknownExpression,
    /// Only comparisons can be added as constraints
    #[error("only comparison expressions can be used as constraints")]
    NotAComparison,
    /// The model multiplies two expressions that both depend on variables
    #[error("the engine only supports linear expressions")]
    Nonlinear,
    /// A variable bound cannot be represented by the engine
    #[error("bound {0} cannot be represented by the engine")]
    BoundOutOfRange(f64),
    /// The objective can be made infinitely good
    #[error("the problem is unbounded")]
    Unbounded,
    /// Another error occurred
    #[error("engine error: {0}")]
    Internal(String),
}

/// One session of an optimization engine.
///
/// A session is opened with [Engine::open], filled with variables, constraints and an
/// objective, closed with [Engine::close], and searched with [Engine::solve].
/// Dropping the session releases every resource it holds.
///
/// Variables must have finite bounds. The associated constants give the extreme
/// values the engine can represent; the adapter uses them when a variable has no bound.
pub trait Engine: Sized {
    /// A handle on an expression of the model: a variable, a constant, a sum...
    type Expr: Copy + Eq + Hash + Debug;

    /// The smallest integer the engine can represent
    const MIN_INT: i64;
    /// The largest integer the engine can represent
    const MAX_INT: i64;
    /// The most negative finite float the engine accepts as a bound
    const MIN_FLOAT: f64 = f64::MIN;
    /// The largest finite float the engine accepts as a bound
    const MAX_FLOAT: f64 = f64::MAX;

    /// The engine name, for logs
    fn name() -> &'static str;

    /// Open a new session
    fn open() -> Result<Self, EngineError>;

    /// Limit the wall-clock duration of the search. 0 means no limit.
    fn set_time_limit(&mut self, seconds: u32);

    /// Set how much the engine writes about its progress. 0 means nothing.
    fn set_verbosity(&mut self, level: i32);

    /// Declare a variable taking the values 0 and 1
    fn bool_var(&mut self) -> Result<Self::Expr, EngineError>;

    /// Declare an integer variable in `[lower, upper]`
    fn int_var(&mut self, lower: i64, upper: i64) -> Result<Self::Expr, EngineError>;

    /// Declare a continuous variable in `[lower, upper]`
    fn float_var(&mut self, lower: f64, upper: f64) -> Result<Self::Expr, EngineError>;

    /// A constant expression
    fn constant(&mut self, value: f64) -> Result<Self::Expr, EngineError>;

    /// `a + b`
    fn sum(&mut self, a: Self::Expr, b: Self::Expr) -> Result<Self::Expr, EngineError>;

    /// `a * b`
    fn prod(&mut self, a: Self::Expr, b: Self::Expr) -> Result<Self::Expr, EngineError>;

    /// `lhs <= rhs`
    fn leq(&mut self, lhs: Self::Expr, rhs: f64) -> Result<Self::Expr, EngineError>;

    /// `lhs >= rhs`
    fn geq(&mut self, lhs: Self::Expr, rhs: f64) -> Result<Self::Expr, EngineError>;

    /// `lhs == rhs`
    fn eq(&mut self, lhs: Self::Expr, rhs: f64) -> Result<Self::Expr, EngineError>;

    /// Require a comparison to hold in every solution
    fn add_constraint(&mut self, constraint: Self::Expr) -> Result<(), EngineError>;

    /// Search for the lowest value of `objective`
    fn minimize(&mut self, objective: Self::Expr) -> Result<(), EngineError>;

    /// Search for the highest value of `objective`
    fn maximize(&mut self, objective: Self::Expr) -> Result<(), EngineError>;

    /// Seal the model. No expression can be added afterwards.
    fn close(&mut self) -> Result<(), EngineError>;

    /// Run the search. Blocks until it ends or the time limit is reached.
    fn solve(&mut self) -> Result<(), EngineError>;

    /// The outcome of the last search
    fn status(&self) -> EngineStatus;

    /// The value of an expression in the solution, as an integer
    fn int_value(&self, expr: Self::Expr) -> Result<i64, EngineError>;

    /// The value of an expression in the solution, as a float
    fn float_value(&self, expr: Self::Expr) -> Result<f64, EngineError>;
}
