//! An engine that uses a [Cbc](https://www.coin-or.org/Cbc/) [native library binding](https://docs.rs/coin_cbc).
//! This engine is activated using the `coin_cbc` feature.

use coin_cbc::{raw::Status, Col, Model, Sense};

use crate::constraint::Operator;
use crate::problem::ObjectiveDirection;
use crate::solvers::arena::{ArenaEngine, Backend, LinearModel, Outcome, Settings};
use crate::solvers::{EngineError, EngineStatus};

/// The Cbc [COIN-OR](https://www.coin-or.org/) engine
pub type CoinCbcEngine = ArenaEngine<CoinCbc>;

/// Solves linear programs with Cbc.
///
/// Parameters that have no counterpart in the generic configuration can be set
/// from a hook, through [ArenaEngine::backend_mut].
#[derive(Debug, Default, Clone)]
pub struct CoinCbc {
    parameters: Vec<(String, String)>,
}

impl CoinCbc {
    /// Set an option in cbc. For the list of available options, start the cbc binary and type '?'
    pub fn set_parameter(&mut self, key: &str, value: &str) {
        self.parameters.push((key.into(), value.into()));
    }

    fn build(model: &LinearModel) -> Model {
        let mut cbc = Model::default();
        let columns: Vec<Col> = model
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let col = cbc.add_col();
                // Columns are created with a default min of 0
                cbc.set_col_lower(col, column.lower());
                if column.upper() < f64::INFINITY {
                    cbc.set_col_upper(col, column.upper());
                }
                if column.kind.is_integral() {
                    cbc.set_integer(col);
                }
                cbc.set_obj_coeff(col, model.objective_coefficient(index));
                col
            })
            .collect();
        for constraint in &model.rows {
            let row = cbc.add_row();
            match constraint.operator {
                Operator::Le => cbc.set_row_upper(row, constraint.rhs),
                Operator::Ge => cbc.set_row_lower(row, constraint.rhs),
                Operator::Eq => cbc.set_row_equal(row, constraint.rhs),
            }
            for &(column, coefficient) in &constraint.coefficients {
                cbc.set_weight(row, columns[column], coefficient);
            }
        }
        cbc.set_obj_sense(match model.direction() {
            ObjectiveDirection::Maximisation => Sense::Maximize,
            ObjectiveDirection::Minimisation => Sense::Minimize,
        });
        cbc
    }
}

impl Backend for CoinCbc {
    const NAME: &'static str = "Coin Cbc";

    fn solve(&mut self, model: &LinearModel, settings: &Settings) -> Result<Outcome, EngineError> {
        let mut cbc = Self::build(model);
        cbc.set_parameter("log", &settings.verbosity.max(0).to_string());
        if let Some(seconds) = settings.time_limit {
            cbc.set_parameter("sec", &seconds.to_string());
        }
        for (key, value) in &self.parameters {
            cbc.set_parameter(key, value);
        }

        let solution = cbc.solve();
        let raw = solution.raw();
        let status = match raw.status() {
            Status::Stopped => {
                if raw.is_seconds_limit_reached() {
                    // The session checks that Cbc found a solution before the limit
                    EngineStatus::Feasible
                } else {
                    return Err(EngineError::Internal("Stopped".into()));
                }
            }
            Status::Abandoned => return Err(EngineError::Internal("Abandoned".into())),
            Status::UserEvent => return Err(EngineError::Internal("UserEvent".into())),
            // The optimization finished, or presolve handled it
            Status::Finished | Status::Unlaunched => {
                if raw.is_continuous_unbounded() {
                    return Err(EngineError::Unbounded);
                } else if raw.is_proven_infeasible() {
                    EngineStatus::Infeasible
                } else {
                    EngineStatus::Optimal
                }
            }
        };
        if !status.has_solution() {
            return Ok(Outcome::infeasible());
        }
        Ok(Outcome {
            status,
            values: raw.col_solution().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CoinCbcEngine;
    use crate::solvers::Engine;

    engine_tests!(CoinCbcEngine);

    #[test]
    fn parameters_reach_the_backend() {
        let mut engine = CoinCbcEngine::open().unwrap();
        engine.backend_mut().set_parameter("threads", "1");
        let x = engine.float_var(0., 0.5).unwrap();
        engine.maximize(x).unwrap();
        engine.close().unwrap();
        engine.solve().unwrap();
        assert_eq!(engine.float_value(x), Ok(0.5));
    }
}
