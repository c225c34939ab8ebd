//! A scripted engine that records every call it receives.
#![allow(dead_code)]

use std::cell::RefCell;

use ilp_bridge::{Engine, EngineError, EngineStatus};

/// A call received by [ScriptedEngine]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open,
    TimeLimit(u32),
    Verbosity(i32),
    BoolVar,
    IntVar(i64, i64),
    FloatVar(f64, f64),
    Constant(f64),
    Sum,
    Prod,
    Compare(&'static str, f64),
    AddConstraint,
    Minimize,
    Maximize,
    Close,
    Solve,
    Release,
}

/// What the next sessions answer
#[derive(Debug, Clone)]
pub struct Script {
    pub status: EngineStatus,
    pub fail_open: bool,
    pub solve_error: Option<EngineError>,
    /// Value of each variable, by declaration order. Missing values are 0.
    pub values: Vec<f64>,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            status: EngineStatus::Optimal,
            fail_open: false,
            solve_error: None,
            values: Vec::new(),
        }
    }
}

thread_local! {
    static SCRIPT: RefCell<Script> = RefCell::new(Script::default());
    static JOURNAL: RefCell<Vec<Call>> = const { RefCell::new(Vec::new()) };
}

/// Set what the next sessions of this thread answer, and clear the journal
pub fn script(script: Script) {
    SCRIPT.with(|s| *s.borrow_mut() = script);
    JOURNAL.with(|j| j.borrow_mut().clear());
}

/// The calls received since the last [script]
pub fn journal() -> Vec<Call> {
    JOURNAL.with(|j| j.borrow().clone())
}

fn record(call: Call) {
    JOURNAL.with(|j| j.borrow_mut().push(call));
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Constant(f64),
    Variable(usize),
    Sum(usize, usize),
    Prod(usize, usize),
    Comparison,
}

/// An engine that solves nothing: it answers what the script says
#[derive(Debug)]
pub struct ScriptedEngine {
    nodes: Vec<Node>,
    variables: usize,
    closed: bool,
    solved: bool,
}

impl ScriptedEngine {
    fn push(&mut self, node: Node) -> Result<usize, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    fn variable(&mut self) -> Result<usize, EngineError> {
        let column = self.variables;
        self.variables += 1;
        self.push(Node::Variable(column))
    }

    fn eval(&self, expr: usize) -> Result<f64, EngineError> {
        let values = SCRIPT.with(|s| s.borrow().values.clone());
        match *self.nodes.get(expr).ok_or(EngineError::UnknownExpression)? {
            Node::Constant(c) => Ok(c),
            Node::Variable(column) => Ok(values.get(column).copied().unwrap_or(0.)),
            Node::Sum(a, b) => Ok(self.eval(a)? + self.eval(b)?),
            Node::Prod(a, b) => Ok(self.eval(a)? * self.eval(b)?),
            Node::Comparison => Err(EngineError::Nonlinear),
        }
    }
}

impl Engine for ScriptedEngine {
    type Expr = usize;

    const MIN_INT: i64 = i64::MIN;
    const MAX_INT: i64 = i64::MAX;
    const MIN_FLOAT: f64 = -1e30;
    const MAX_FLOAT: f64 = 1e30;

    fn name() -> &'static str {
        "scripted"
    }

    fn open() -> Result<Self, EngineError> {
        if SCRIPT.with(|s| s.borrow().fail_open) {
            return Err(EngineError::Unavailable("no license".into()));
        }
        record(Call::Open);
        Ok(ScriptedEngine {
            nodes: Vec::new(),
            variables: 0,
            closed: false,
            solved: false,
        })
    }

    fn set_time_limit(&mut self, seconds: u32) {
        record(Call::TimeLimit(seconds));
    }

    fn set_verbosity(&mut self, level: i32) {
        record(Call::Verbosity(level));
    }

    fn bool_var(&mut self) -> Result<usize, EngineError> {
        record(Call::BoolVar);
        self.variable()
    }

    fn int_var(&mut self, lower: i64, upper: i64) -> Result<usize, EngineError> {
        record(Call::IntVar(lower, upper));
        self.variable()
    }

    fn float_var(&mut self, lower: f64, upper: f64) -> Result<usize, EngineError> {
        record(Call::FloatVar(lower, upper));
        self.variable()
    }

    fn constant(&mut self, value: f64) -> Result<usize, EngineError> {
        record(Call::Constant(value));
        self.push(Node::Constant(value))
    }

    fn sum(&mut self, a: usize, b: usize) -> Result<usize, EngineError> {
        record(Call::Sum);
        self.push(Node::Sum(a, b))
    }

    fn prod(&mut self, a: usize, b: usize) -> Result<usize, EngineError> {
        record(Call::Prod);
        self.push(Node::Prod(a, b))
    }

    fn leq(&mut self, _: usize, rhs: f64) -> Result<usize, EngineError> {
        record(Call::Compare("<=", rhs));
        self.push(Node::Comparison)
    }

    fn geq(&mut self, _: usize, rhs: f64) -> Result<usize, EngineError> {
        record(Call::Compare(">=", rhs));
        self.push(Node::Comparison)
    }

    fn eq(&mut self, _: usize, rhs: f64) -> Result<usize, EngineError> {
        record(Call::Compare("=", rhs));
        self.push(Node::Comparison)
    }

    fn add_constraint(&mut self, constraint: usize) -> Result<(), EngineError> {
        record(Call::AddConstraint);
        match self.nodes.get(constraint) {
            Some(Node::Comparison) => Ok(()),
            _ => Err(EngineError::NotAComparison),
        }
    }

    fn minimize(&mut self, _: usize) -> Result<(), EngineError> {
        record(Call::Minimize);
        Ok(())
    }

    fn maximize(&mut self, _: usize) -> Result<(), EngineError> {
        record(Call::Maximize);
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        record(Call::Close);
        self.closed = true;
        Ok(())
    }

    fn solve(&mut self) -> Result<(), EngineError> {
        record(Call::Solve);
        if let Some(error) = SCRIPT.with(|s| s.borrow().solve_error.clone()) {
            return Err(error);
        }
        self.solved = true;
        Ok(())
    }

    fn status(&self) -> EngineStatus {
        SCRIPT.with(|s| s.borrow().status)
    }

    fn int_value(&self, expr: usize) -> Result<i64, EngineError> {
        Ok(self.float_value(expr)?.round() as i64)
    }

    fn float_value(&self, expr: usize) -> Result<f64, EngineError> {
        if !self.solved {
            return Err(EngineError::NotSolved);
        }
        self.eval(expr)
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        record(Call::Release);
    }
}
