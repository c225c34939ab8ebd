//! An engine that uses [microlp](https://docs.rs/microlp), a pure rust solver.
//! This engine is activated using the default `microlp` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::constraint::Operator;
use crate::problem::ObjectiveDirection;
use crate::solvers::arena::{ArenaEngine, Backend, LinearModel, Outcome, Settings};
use crate::solvers::{EngineError, EngineStatus};
use crate::variable::VarType;

/// The [microlp](https://docs.rs/microlp) engine
pub type MicroLpEngine = ArenaEngine<MicroLp>;

/// Solves linear programs with microlp.
///
/// Without a time limit the search runs on the calling thread.
/// microlp has no time limit of its own, so a timed search runs on a worker thread
/// and the session stops waiting for it when the limit is reached.
/// A search that did not finish in time is reported as [EngineStatus::Infeasible].
/// It cannot be interrupted and keeps running in the background: at most
/// [MicroLp::max_timed_searches] timed searches run at once, and further timed
/// solves fail with [EngineError::Unavailable] until one of them ends.
#[derive(Debug, Default, Clone, Copy)]
pub struct MicroLp;

/// Timed searches currently running, including the ones nobody waits for anymore
static TIMED_SEARCHES: Workers = Workers::new();

/// A counter of running worker threads
#[derive(Debug)]
struct Workers {
    running: AtomicUsize,
}

impl Workers {
    const fn new() -> Self {
        Workers {
            running: AtomicUsize::new(0),
        }
    }

    fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    /// Count one more worker, unless `limit` workers are already running
    fn reserve(&self, limit: usize) -> Option<Slot<'_>> {
        self.running
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |running| {
                (running < limit).then_some(running + 1)
            })
            .ok()
            .map(|_| Slot(self))
    }
}

/// A running worker, counted until it is dropped
#[derive(Debug)]
struct Slot<'a>(&'a Workers);

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.0.running.fetch_sub(1, Ordering::AcqRel);
    }
}

type SearchResult = Result<Vec<f64>, microlp::Error>;

fn search(problem: &microlp::Problem, variables: &[microlp::Variable]) -> SearchResult {
    problem
        .solve()
        .map(|solution| variables.iter().map(|&v| solution[v]).collect())
}

fn integer_bound(bound: f64) -> Result<i32, EngineError> {
    if bound >= f64::from(i32::MIN) && bound <= f64::from(i32::MAX) {
        Ok(bound as i32)
    } else {
        Err(EngineError::BoundOutOfRange(bound))
    }
}

impl MicroLp {
    fn build(
        model: &LinearModel,
    ) -> Result<(microlp::Problem, Vec<microlp::Variable>), EngineError> {
        let mut problem = microlp::Problem::new(match model.direction() {
            ObjectiveDirection::Maximisation => microlp::OptimizationDirection::Maximize,
            ObjectiveDirection::Minimisation => microlp::OptimizationDirection::Minimize,
        });
        let variables = model
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| -> Result<microlp::Variable, EngineError> {
                let coefficient = model.objective_coefficient(index);
                Ok(match column.kind {
                    VarType::Bool => problem.add_binary_var(coefficient),
                    VarType::Int => problem.add_integer_var(
                        coefficient,
                        (integer_bound(column.lower)?, integer_bound(column.upper)?),
                    ),
                    VarType::Real => problem.add_var(coefficient, (column.lower(), column.upper())),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        for row in &model.rows {
            let op = match row.operator {
                Operator::Le => microlp::ComparisonOp::Le,
                Operator::Ge => microlp::ComparisonOp::Ge,
                Operator::Eq => microlp::ComparisonOp::Eq,
            };
            let mut linear_expr = microlp::LinearExpr::empty();
            for &(column, coefficient) in &row.coefficients {
                linear_expr.add(variables[column], coefficient);
            }
            problem.add_constraint(linear_expr, op, row.rhs);
        }
        Ok((problem, variables))
    }

    /// How many timed searches may run at once
    pub fn max_timed_searches() -> usize {
        thread::available_parallelism()
            .map_or(4, |n| n.get())
            .max(4)
    }

    fn search_with_limit(
        problem: microlp::Problem,
        variables: Vec<microlp::Variable>,
        seconds: u32,
    ) -> Result<Option<SearchResult>, EngineError> {
        let limit = Self::max_timed_searches();
        let slot = TIMED_SEARCHES.reserve(limit).ok_or_else(|| {
            EngineError::Unavailable(format!(
                "{} timed microlp searches are still running",
                limit
            ))
        })?;
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("microlp".into())
            .spawn(move || {
                let _slot = slot;
                // The session may have stopped waiting
                let _ = sender.send(search(&problem, &variables));
            })
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        match receiver.recv_timeout(Duration::from_secs(seconds.into())) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "{}: no solution found within {} seconds, {} searches left running",
                    Self::NAME,
                    seconds,
                    TIMED_SEARCHES.running()
                );
                Ok(None)
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(EngineError::Internal("the microlp search panicked".into()))
            }
        }
    }
}

impl Backend for MicroLp {
    const NAME: &'static str = "Microlp";

    fn solve(&mut self, model: &LinearModel, settings: &Settings) -> Result<Outcome, EngineError> {
        let (problem, variables) = Self::build(model)?;
        if settings.verbosity > 1 {
            let integral = model.columns.iter().filter(|c| c.kind.is_integral()).count();
            log::debug!("{}: {} integral variables", Self::NAME, integral);
        }
        let result = match settings.time_limit {
            Some(seconds) => match Self::search_with_limit(problem, variables, seconds)? {
                Some(result) => result,
                None => return Ok(Outcome::infeasible()),
            },
            None => search(&problem, &variables),
        };

        match result {
            Ok(values) => Ok(Outcome {
                status: EngineStatus::Optimal,
                values,
            }),
            Err(microlp::Error::Infeasible) => Ok(Outcome::infeasible()),
            Err(microlp::Error::Unbounded) => Err(EngineError::Unbounded),
            Err(microlp::Error::InternalError(s)) => Err(EngineError::Internal(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MicroLp, MicroLpEngine, Workers};
    use crate::solvers::Engine;

    engine_tests!(MicroLpEngine);

    #[test]
    fn timed_searches_are_counted_until_they_end() {
        let workers = Workers::new();
        let first = workers.reserve(2).unwrap();
        let second = workers.reserve(2).unwrap();
        assert_eq!(workers.running(), 2);
        assert!(workers.reserve(2).is_none());
        drop(first);
        assert_eq!(workers.running(), 1);
        let third = workers.reserve(2);
        assert!(third.is_some());
        drop((second, third));
        assert_eq!(workers.running(), 0);
        assert!(MicroLp::max_timed_searches() >= 4);
    }

    #[test]
    fn can_solve_easy() {
        let mut engine = MicroLpEngine::open().unwrap();
        let x = engine.float_var(0., 2.).unwrap();
        let y = engine.float_var(1., 3.).unwrap();
        let two = engine.constant(2.).unwrap();
        let two_x = engine.prod(two, x).unwrap();
        let lhs = engine.sum(two_x, y).unwrap();
        let c = engine.leq(lhs, 4.).unwrap();
        engine.add_constraint(c).unwrap();
        let objective = engine.sum(x, y).unwrap();
        engine.maximize(objective).unwrap();
        engine.close().unwrap();
        engine.solve().unwrap();
        assert_eq!(
            (engine.float_value(x).unwrap(), engine.float_value(y).unwrap()),
            (0.5, 3.)
        );
    }
}
