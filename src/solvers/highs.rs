//! An engine that uses [highs](https://docs.rs/highs), a parallel C++ solver.

use std::collections::HashMap;

use highs::HighsModelStatus;

use crate::constraint::Operator;
use crate::problem::ObjectiveDirection;
use crate::solvers::arena::{ArenaEngine, Backend, LinearModel, Outcome, Settings};
use crate::solvers::{EngineError, EngineStatus};

/// The [highs](https://docs.rs/highs) engine
pub type HighsEngine = ArenaEngine<Highs>;

/// A HiGHS option value.
#[derive(Debug, Clone)]
pub enum HighsOptionValue {
    /// String option
    String(String),
    /// Boolean option
    Bool(bool),
    /// Integer option
    Int(i32),
    /// Floating point number option
    Float(f64),
}

impl From<bool> for HighsOptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
impl From<i32> for HighsOptionValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}
impl From<f64> for HighsOptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
impl From<String> for HighsOptionValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
impl From<&str> for HighsOptionValue {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

/// Solves linear programs with HiGHS.
///
/// Options that have no counterpart in the generic configuration can be set
/// from a hook, through [ArenaEngine::backend_mut].
#[derive(Debug, Default, Clone)]
pub struct Highs {
    options: HashMap<String, HighsOptionValue>,
}

impl Highs {
    /// Sets the HiGHS option. See https://ergo-code.github.io/HiGHS/dev/options/definitions/
    pub fn set_option<K: Into<String>, V: Into<HighsOptionValue>>(&mut self, key: K, value: V) {
        self.options.insert(key.into(), value.into());
    }

    /// Sets number of threads used by HiGHS
    pub fn set_threads(&mut self, threads: u32) {
        self.set_option("threads", threads as i32)
    }

    fn build(model: &LinearModel) -> highs::RowProblem {
        let mut problem = highs::RowProblem::default();
        let columns: Vec<highs::Col> = model
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                problem.add_column_with_integrality(
                    model.objective_coefficient(index),
                    column.lower()..column.upper(),
                    column.kind.is_integral(),
                )
            })
            .collect();
        for row in &model.rows {
            let factors = row
                .coefficients
                .iter()
                .map(|&(column, factor)| (columns[column], factor));
            match row.operator {
                Operator::Le => {
                    problem.add_row(..=row.rhs, factors);
                }
                Operator::Ge => {
                    problem.add_row(row.rhs.., factors);
                }
                Operator::Eq => {
                    problem.add_row(row.rhs..=row.rhs, factors);
                }
            }
        }
        problem
    }
}

impl Backend for Highs {
    const NAME: &'static str = "Highs";

    fn solve(&mut self, model: &LinearModel, settings: &Settings) -> Result<Outcome, EngineError> {
        let sense = match model.direction() {
            ObjectiveDirection::Maximisation => highs::Sense::Maximise,
            ObjectiveDirection::Minimisation => highs::Sense::Minimise,
        };
        let mut highs_model = Self::build(model).optimise(sense);
        let verbose = settings.verbosity > 0;
        highs_model.set_option(&b"output_flag"[..], verbose);
        highs_model.set_option(&b"log_to_console"[..], verbose);
        if settings.verbosity > 1 {
            highs_model.set_option(&b"log_dev_level"[..], 2);
        }
        if let Some(seconds) = settings.time_limit {
            highs_model.set_option(&b"time_limit"[..], f64::from(seconds));
        }
        for (k, v) in &self.options {
            match v {
                HighsOptionValue::String(v) => highs_model.set_option(k.as_str(), v.as_str()),
                HighsOptionValue::Float(v) => highs_model.set_option(k.as_str(), *v),
                HighsOptionValue::Bool(v) => highs_model.set_option(k.as_str(), *v),
                HighsOptionValue::Int(v) => highs_model.set_option(k.as_str(), *v),
            }
        }

        let solved = highs_model.solve();
        let status = match solved.status() {
            HighsModelStatus::NotSet => return Err(EngineError::Internal("NotSet".into())),
            HighsModelStatus::LoadError => return Err(EngineError::Internal("LoadError".into())),
            HighsModelStatus::PresolveError => {
                return Err(EngineError::Internal("PresolveError".into()))
            }
            HighsModelStatus::SolveError => return Err(EngineError::Internal("SolveError".into())),
            HighsModelStatus::PostsolveError => {
                return Err(EngineError::Internal("PostsolveError".into()))
            }
            HighsModelStatus::Unbounded => return Err(EngineError::Unbounded),
            HighsModelStatus::ModelError => EngineStatus::Inconsistent,
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                EngineStatus::Infeasible
            }
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => EngineStatus::Optimal,
            // time or iteration limits: the session checks the incumbent
            _ => EngineStatus::Feasible,
        };
        if !status.has_solution() {
            return Ok(Outcome {
                status,
                values: Vec::new(),
            });
        }
        let values = if model.columns.is_empty() {
            Vec::new()
        } else {
            solved.get_solution().columns().to_vec()
        };
        Ok(Outcome { status, values })
    }
}
