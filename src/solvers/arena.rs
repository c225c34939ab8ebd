//! An expression-tree model shared by the bundled engines.
//!
//! Every expression is a node in an append-only arena, addressed by an [ExprId].
//! Children are always created before their parents, so the arena is topologically sorted.
//! When the model is closed, the constraints and the objective are linearized into a
//! [LinearModel] that a [Backend] turns into a call to the wrapped solver library.
use fnv::FnvHashMap as HashMap;

use crate::constraint::Operator;
use crate::problem::ObjectiveDirection;
use crate::solvers::{Engine, EngineError, EngineStatus};
use crate::variable::VarType;

/// A handle on a node of an [ExpressionArena]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    /// The position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the expression tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// A constant value
    Constant(f64),
    /// The variable in the given column
    Variable(usize),
    /// The sum of two expressions
    Sum(ExprId, ExprId),
    /// The product of two expressions
    Product(ExprId, ExprId),
    /// `lhs operator rhs`
    Comparison {
        /// compared expression
        lhs: ExprId,
        /// comparison
        operator: Operator,
        /// constant right hand side
        rhs: f64,
    },
}

/// A declared variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// The domain of the variable
    pub kind: VarType,
    /// The lower bound, as declared
    pub lower: f64,
    /// The upper bound, as declared
    pub upper: f64,
}

impl Column {
    /// The lower bound, with the most negative float turned into `-inf`
    pub fn lower(&self) -> f64 {
        if self.lower <= f64::MIN {
            f64::NEG_INFINITY
        } else {
            self.lower
        }
    }

    /// The upper bound, with the largest float turned into `+inf`
    pub fn upper(&self) -> f64 {
        if self.upper >= f64::MAX {
            f64::INFINITY
        } else {
            self.upper
        }
    }
}

/// `constant + sum(coefficient * column)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Affine {
    /// Coefficient per column
    pub coefficients: HashMap<usize, f64>,
    /// Constant term
    pub constant: f64,
}

impl Affine {
    /// The value of the expression given a value per column
    pub fn eval(&self, values: &[f64]) -> Result<f64, EngineError> {
        self.coefficients
            .iter()
            .try_fold(self.constant, |sum, (&column, &coefficient)| {
                let value = values.get(column).ok_or(EngineError::NotSolved)?;
                Ok(sum + coefficient * value)
            })
    }
}

/// A linearized constraint: `sum(coefficient * column) operator rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// (column, coefficient) pairs, sorted by column
    pub coefficients: Vec<(usize, f64)>,
    /// comparison
    pub operator: Operator,
    /// constant right hand side, with the constant of the expression moved over
    pub rhs: f64,
}

/// The linear program built from a closed arena
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearModel {
    /// The declared variables
    pub columns: Vec<Column>,
    /// The constraints
    pub rows: Vec<Row>,
    /// The objective, if any
    pub objective: Option<(ObjectiveDirection, Affine)>,
}

impl LinearModel {
    /// The objective coefficient of a column, 0 when there is no objective
    pub fn objective_coefficient(&self, column: usize) -> f64 {
        self.objective
            .as_ref()
            .and_then(|(_, affine)| affine.coefficients.get(&column).copied())
            .unwrap_or(0.)
    }

    /// The direction of the objective, minimisation when there is no objective
    pub fn direction(&self) -> ObjectiveDirection {
        self.objective
            .as_ref()
            .map(|&(direction, _)| direction)
            .unwrap_or(ObjectiveDirection::Minimisation)
    }

    /// Whether `values` gives every column a value inside its bounds, integral for
    /// integer columns, and satisfies every row.
    ///
    /// `tolerance` is relative to the magnitude of the bound or right hand side.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let slack = |bound: f64| tolerance * (1. + bound.abs());
        values.len() == self.columns.len()
            && self.columns.iter().zip(values).all(|(column, &value)| {
                let (lower, upper) = (column.lower(), column.upper());
                value.is_finite()
                    && Operator::Ge.holds(value, lower, slack(lower))
                    && Operator::Le.holds(value, upper, slack(upper))
                    && (column.kind == VarType::Real
                        || Operator::Eq.holds(value, value.round(), tolerance))
            })
            && self.rows.iter().all(|row| {
                let lhs: f64 = row
                    .coefficients
                    .iter()
                    .map(|&(column, coefficient)| coefficient * values[column])
                    .sum();
                row.operator.holds(lhs, row.rhs, slack(row.rhs))
            })
    }
}

/// The expression tree of one model
#[derive(Debug, Clone, Default)]
pub struct ExpressionArena {
    nodes: Vec<Node>,
    /// The value of each node when it does not depend on any variable
    constant_values: Vec<Option<f64>>,
    columns: Vec<Column>,
    constraints: Vec<ExprId>,
    objective: Option<(ObjectiveDirection, ExprId)>,
    /// Set when a variable was declared with an empty domain
    inconsistent: bool,
    closed: bool,
}

impl ExpressionArena {
    /// An empty model
    pub fn new() -> Self {
        ExpressionArena::default()
    }

    /// The node behind a handle
    pub fn node(&self, id: ExprId) -> Result<&Node, EngineError> {
        self.nodes.get(id.0).ok_or(EngineError::UnknownExpression)
    }

    fn constant_value(&self, id: ExprId) -> Result<Option<f64>, EngineError> {
        self.constant_values
            .get(id.0)
            .copied()
            .ok_or(EngineError::UnknownExpression)
    }

    /// Append a node, checking that its children exist
    pub fn push(&mut self, node: Node) -> Result<ExprId, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        let constant_value = match node {
            Node::Constant(value) => Some(value),
            Node::Variable(_) => None,
            Node::Sum(a, b) => match (self.constant_value(a)?, self.constant_value(b)?) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            },
            Node::Product(a, b) => match (self.constant_value(a)?, self.constant_value(b)?) {
                (Some(a), Some(b)) => Some(a * b),
                _ => None,
            },
            Node::Comparison { lhs, .. } => {
                self.node(lhs)?;
                None
            }
        };
        let id = ExprId(self.nodes.len());
        self.nodes.push(node);
        self.constant_values.push(constant_value);
        Ok(id)
    }

    /// Declare a variable
    pub fn add_column(&mut self, column: Column) -> Result<ExprId, EngineError> {
        if column.lower.is_nan() {
            return Err(EngineError::BoundOutOfRange(column.lower));
        }
        if column.upper.is_nan() {
            return Err(EngineError::BoundOutOfRange(column.upper));
        }
        if self.closed {
            return Err(EngineError::Closed);
        }
        if column.lower > column.upper {
            log::debug!(
                "variable {} has an empty domain [{}, {}]",
                self.columns.len(),
                column.lower,
                column.upper
            );
            self.inconsistent = true;
        }
        let id = self.push(Node::Variable(self.columns.len()))?;
        self.columns.push(column);
        Ok(id)
    }

    /// Register a comparison as a constraint
    pub fn add_constraint(&mut self, constraint: ExprId) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        match self.node(constraint)? {
            Node::Comparison { .. } => {
                self.constraints.push(constraint);
                Ok(())
            }
            _ => Err(EngineError::NotAComparison),
        }
    }

    /// Set the objective, replacing the previous one
    pub fn set_objective(
        &mut self,
        direction: ObjectiveDirection,
        objective: ExprId,
    ) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        self.node(objective)?;
        self.objective = Some((direction, objective));
        Ok(())
    }

    /// Whether a variable was declared with an empty domain
    pub fn is_inconsistent(&self) -> bool {
        self.inconsistent
    }

    /// Whether the model was closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The declared variables
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when nothing was declared yet
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rewrite an expression as `constant + sum(coefficient * column)`.
    ///
    /// The tree is walked with an explicit stack, so long sums do not overflow the call stack.
    pub fn linearize(&self, root: ExprId) -> Result<Affine, EngineError> {
        let mut affine = Affine::default();
        let mut stack = vec![(root, 1.)];
        while let Some((id, factor)) = stack.pop() {
            match *self.node(id)? {
                Node::Constant(value) => affine.constant += factor * value,
                Node::Variable(column) => {
                    *affine.coefficients.entry(column).or_default() += factor
                }
                Node::Sum(a, b) => {
                    stack.push((b, factor));
                    stack.push((a, factor));
                }
                Node::Product(a, b) => {
                    match (self.constant_value(a)?, self.constant_value(b)?) {
                        (Some(a), Some(b)) => affine.constant += factor * a * b,
                        (Some(a), None) => stack.push((b, factor * a)),
                        (None, Some(b)) => stack.push((a, factor * b)),
                        (None, None) => return Err(EngineError::Nonlinear),
                    }
                }
                Node::Comparison { .. } => return Err(EngineError::Nonlinear),
            }
        }
        Ok(affine)
    }

    fn row(&self, constraint: ExprId) -> Result<Row, EngineError> {
        match *self.node(constraint)? {
            Node::Comparison { lhs, operator, rhs } => {
                let affine = self.linearize(lhs)?;
                let mut coefficients: Vec<(usize, f64)> = affine
                    .coefficients
                    .into_iter()
                    .filter(|&(_, coefficient)| coefficient != 0.)
                    .collect();
                coefficients.sort_unstable_by_key(|&(column, _)| column);
                Ok(Row {
                    coefficients,
                    operator,
                    rhs: rhs - affine.constant,
                })
            }
            _ => Err(EngineError::NotAComparison),
        }
    }

    /// Seal the arena and build the linear program it describes
    pub fn close(&mut self) -> Result<LinearModel, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        let rows = self
            .constraints
            .iter()
            .map(|&constraint| self.row(constraint))
            .collect::<Result<Vec<_>, _>>()?;
        let objective = match self.objective {
            Some((direction, objective)) => Some((direction, self.linearize(objective)?)),
            None => None,
        };
        self.closed = true;
        Ok(LinearModel {
            columns: self.columns.clone(),
            rows,
            objective,
        })
    }
}

/// Tolerance used to accept the values of a search that did not prove optimality
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Search settings, collected before the search starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Wall-clock limit in seconds
    pub time_limit: Option<u32>,
    /// 0 is quiet
    pub verbosity: i32,
}

/// What a backend found
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The classification of the result
    pub status: EngineStatus,
    /// One value per column, empty when nothing was found
    pub values: Vec<f64>,
}

impl Outcome {
    /// Nothing satisfying the constraints was found
    pub fn infeasible() -> Self {
        Outcome {
            status: EngineStatus::Infeasible,
            values: Vec::new(),
        }
    }
}

/// A solver library able to solve the linear program built by an [ExpressionArena]
pub trait Backend: Default {
    /// The library name, for logs
    const NAME: &'static str;

    /// Solve the linear program
    fn solve(&mut self, model: &LinearModel, settings: &Settings) -> Result<Outcome, EngineError>;
}

/// An [Engine] recording an expression tree and solving it with a [Backend].
///
/// Integer variables are limited to the `i32` range.
/// Float bounds equal to `f64::MIN` or `f64::MAX` are passed to the backend as infinite.
#[derive(Debug, Default)]
pub struct ArenaEngine<B> {
    arena: ExpressionArena,
    backend: B,
    settings: Settings,
    model: Option<LinearModel>,
    outcome: Option<Outcome>,
}

impl<B: Backend> ArenaEngine<B> {
    /// The expression tree of the model
    pub fn arena(&self) -> &ExpressionArena {
        &self.arena
    }

    /// The wrapped solver library, to set options it supports
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the wrapped solver library, to set options it supports
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The settings the search will use
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The linear program, once the model is closed
    pub fn linear_model(&self) -> Option<&LinearModel> {
        self.model.as_ref()
    }

    fn compare(&mut self, lhs: ExprId, operator: Operator, rhs: f64) -> Result<ExprId, EngineError> {
        self.arena.push(Node::Comparison { lhs, operator, rhs })
    }
}

impl<B: Backend> Engine for ArenaEngine<B> {
    type Expr = ExprId;

    const MIN_INT: i64 = i32::MIN as i64;
    const MAX_INT: i64 = i32::MAX as i64;

    fn name() -> &'static str {
        B::NAME
    }

    fn open() -> Result<Self, EngineError> {
        log::trace!("opening a {} session", B::NAME);
        Ok(ArenaEngine::default())
    }

    fn set_time_limit(&mut self, seconds: u32) {
        self.settings.time_limit = Some(seconds).filter(|&s| s > 0);
    }

    fn set_verbosity(&mut self, level: i32) {
        self.settings.verbosity = level;
    }

    fn bool_var(&mut self) -> Result<ExprId, EngineError> {
        self.arena.add_column(Column {
            kind: VarType::Bool,
            lower: 0.,
            upper: 1.,
        })
    }

    fn int_var(&mut self, lower: i64, upper: i64) -> Result<ExprId, EngineError> {
        for bound in [lower, upper] {
            if !(Self::MIN_INT..=Self::MAX_INT).contains(&bound) {
                return Err(EngineError::BoundOutOfRange(bound as f64));
            }
        }
        self.arena.add_column(Column {
            kind: VarType::Int,
            lower: lower as f64,
            upper: upper as f64,
        })
    }

    fn float_var(&mut self, lower: f64, upper: f64) -> Result<ExprId, EngineError> {
        self.arena.add_column(Column {
            kind: VarType::Real,
            lower,
            upper,
        })
    }

    fn constant(&mut self, value: f64) -> Result<ExprId, EngineError> {
        self.arena.push(Node::Constant(value))
    }

    fn sum(&mut self, a: ExprId, b: ExprId) -> Result<ExprId, EngineError> {
        self.arena.push(Node::Sum(a, b))
    }

    fn prod(&mut self, a: ExprId, b: ExprId) -> Result<ExprId, EngineError> {
        self.arena.push(Node::Product(a, b))
    }

    fn leq(&mut self, lhs: ExprId, rhs: f64) -> Result<ExprId, EngineError> {
        self.compare(lhs, Operator::Le, rhs)
    }

    fn geq(&mut self, lhs: ExprId, rhs: f64) -> Result<ExprId, EngineError> {
        self.compare(lhs, Operator::Ge, rhs)
    }

    fn eq(&mut self, lhs: ExprId, rhs: f64) -> Result<ExprId, EngineError> {
        self.compare(lhs, Operator::Eq, rhs)
    }

    fn add_constraint(&mut self, constraint: ExprId) -> Result<(), EngineError> {
        self.arena.add_constraint(constraint)
    }

    fn minimize(&mut self, objective: ExprId) -> Result<(), EngineError> {
        self.arena
            .set_objective(ObjectiveDirection::Minimisation, objective)
    }

    fn maximize(&mut self, objective: ExprId) -> Result<(), EngineError> {
        self.arena
            .set_objective(ObjectiveDirection::Maximisation, objective)
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.model = Some(self.arena.close()?);
        Ok(())
    }

    fn solve(&mut self) -> Result<(), EngineError> {
        let model = self.model.as_ref().ok_or(EngineError::NotClosed)?;
        if self.arena.is_inconsistent() {
            self.outcome = Some(Outcome {
                status: EngineStatus::Inconsistent,
                values: Vec::new(),
            });
            return Ok(());
        }
        if self.settings.verbosity > 0 {
            log::info!(
                "{}: solving {} variables and {} constraints",
                B::NAME,
                model.columns.len(),
                model.rows.len()
            );
        }
        let mut outcome = self.backend.solve(model, &self.settings)?;
        // A search stopped early may report a status without a usable incumbent
        if outcome.status == EngineStatus::Feasible
            && !model.is_satisfied_by(&outcome.values, FEASIBILITY_TOLERANCE)
        {
            log::debug!(
                "{}: the stopped search left no assignment satisfying the model",
                B::NAME
            );
            outcome = Outcome::infeasible();
        }
        if self.settings.verbosity > 0 {
            log::info!("{}: search ended with status {:?}", B::NAME, outcome.status);
        }
        self.outcome = Some(outcome);
        Ok(())
    }

    fn status(&self) -> EngineStatus {
        self.outcome
            .as_ref()
            .map_or(EngineStatus::Infeasible, |outcome| outcome.status)
    }

    fn int_value(&self, expr: ExprId) -> Result<i64, EngineError> {
        Ok(self.float_value(expr)?.round() as i64)
    }

    fn float_value(&self, expr: ExprId) -> Result<f64, EngineError> {
        match &self.outcome {
            Some(outcome) if !outcome.values.is_empty() || self.arena.columns().is_empty() => {
                self.arena.linearize(expr)?.eval(&outcome.values)
            }
            _ => Err(EngineError::NotSolved),
        }
    }
}

impl<B> Drop for ArenaEngine<B> {
    fn drop(&mut self) {
        log::trace!(
            "releasing an engine session with {} variables",
            self.arena.columns.len()
        );
    }
}
