//! Solve integer linear programs with any expression-tree optimization engine.
//!
//! A [Problem] declares variables, linear constraints and an optional objective.
//! An [EngineAdapter] translates it into an [Engine] session, runs the search,
//! and reads the result back into a [Solution].
//!
//! ```rust
//! # #[cfg(feature = "microlp")] {
//! use ilp_bridge::{variable, DefaultEngine, EngineAdapter, Linear, Problem, VarType};
//! use ilp_bridge::parameters::TIMEOUT;
//!
//! let mut problem = Problem::new();
//! problem.add_variable("open", VarType::Bool);
//! problem.add_variable("crates", variable().integer().bounds(0..=40));
//! // at most 10 crates, unless the second warehouse is open
//! problem.add_constraint(Linear::from_iter([(1, "crates"), (-30, "open")]).leq(10));
//! problem.maximise(Linear::from_iter([(2, "crates"), (-50, "open")]));
//!
//! let adapter = EngineAdapter::<DefaultEngine, &str>::new().with_parameter(TIMEOUT, 10);
//! let solution = adapter.solve(&problem)?.expect("feasible");
//! assert_eq!(solution.int(&"crates"), Some(40));
//! assert_eq!(solution.boolean(&"open"), Some(true));
//! # }
//! # use ilp_bridge::SolveError;
//! # Ok::<_, SolveError>(())
//! ```

pub use adapter::{translate, EngineAdapter, Hook, HookId, SolveError, Solver, VarMap};
pub use constraint::{Constraint, Operator};
pub use expression::{Linear, Term};
pub use parameters::{ParamValue, Parameters};
pub use problem::{ObjectiveDirection, Problem};
pub use solution::{Solution, Value};
pub use solvers::{Engine, EngineError, EngineStatus};
pub use variable::{variable, Token, VarType, VariableDefinition};

#[cfg(feature = "coin_cbc")]
pub use solvers::coin_cbc::CoinCbcEngine;
#[cfg(feature = "highs")]
pub use solvers::highs::HighsEngine;
#[cfg(feature = "microlp")]
pub use solvers::microlp::MicroLpEngine;

/// When the "microlp" cargo feature is present, microlp is used as the default engine
#[cfg(feature = "microlp")]
pub type DefaultEngine = MicroLpEngine;

/// When the "highs" cargo feature is present, highs is used as the default engine
#[cfg(all(not(feature = "microlp"), feature = "highs"))]
pub type DefaultEngine = HighsEngine;

/// When the "coin_cbc" cargo feature is present, it is used as the default engine
#[cfg(all(not(feature = "microlp"), not(feature = "highs"), feature = "coin_cbc"))]
pub type DefaultEngine = CoinCbcEngine;

#[cfg(not(any(feature = "microlp", feature = "highs", feature = "coin_cbc")))]
compile_error!(
    "No engine available. \
You need to activate at least one of the engine cargo features: microlp, highs, coin_cbc"
);

/// An adapter over the default engine, with no parameter and no hook
#[cfg(any(feature = "microlp", feature = "highs", feature = "coin_cbc"))]
pub fn default_adapter<V: Token>() -> EngineAdapter<DefaultEngine, V> {
    EngineAdapter::new()
}

mod adapter;
pub mod constraint;
mod expression;
pub mod parameters;
mod problem;
mod solution;
pub mod solvers;
mod variable;
