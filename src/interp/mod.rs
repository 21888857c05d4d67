//! The VibeScript engine: scanner, parser, and tree-walking evaluator.
//!
//! The engine drives both `--local` runs and the bundled HTTP service. It
//! honors the replay contract from the service side: execution is
//! deterministic for a given `(source, inputs)` pair, input statements read
//! from the supplied map, and the first unanswered input suspends the run.

mod ast;
mod env;
mod eval;
mod parse;
mod scan;

use std::fmt;

use thiserror::Error;

use crate::protocol::{ExecutionRequest, ExecutionResponse, InputMap, RunError};
use crate::run::ExecutionBackend;

/// How a program run ended, short of an engine error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Ran to completion; carries the joined print output (possibly empty).
    Finished(String),
    /// Suspended at `vibe_check` for a variable missing from the inputs.
    NeedsInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{message} at line {line}, column {column}")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },
    #[error("{0}")]
    Runtime(String),
}

/// A VibeScript runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
    Null,
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Language-facing type name, used in runtime error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "lit",
            Value::Str(_) => "tea",
            Value::Bool(_) => "mood",
            Value::List(_) => "stan",
            Value::Null => "ghost",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("this_slaps"),
            Value::Bool(false) => f.write_str("im_dead"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Null => f.write_str("ghost"),
        }
    }
}

/// Scan, parse, and evaluate a program against the supplied inputs.
pub fn run(source: &str, inputs: &InputMap) -> Result<Outcome, EngineError> {
    let tokens = scan::Scanner::new(source).tokenize()?;
    let program = parse::Parser::new(tokens).parse()?;
    eval::Evaluator::new(inputs).run(&program)
}

/// Run one execution request and shape the result the way the HTTP service
/// reports it: blank source and silent completions get their stock messages,
/// engine errors get their `Syntax Error:` / `Runtime Error:` prefixes.
pub fn execute_request(req: &ExecutionRequest) -> ExecutionResponse {
    if req.source.trim().is_empty() {
        return ExecutionResponse::Output("No code to execute!".into());
    }
    match run(&req.source, &req.inputs) {
        Ok(Outcome::Finished(output)) => {
            let trimmed = output.trim();
            if trimmed.is_empty() {
                ExecutionResponse::Output("Code executed successfully (no output)".into())
            } else {
                ExecutionResponse::Output(trimmed.to_string())
            }
        }
        Ok(Outcome::NeedsInput(variable)) => ExecutionResponse::InputRequested(variable),
        Err(e @ EngineError::Syntax { .. }) => {
            ExecutionResponse::Error(format!("Syntax Error: {}", e))
        }
        Err(e @ EngineError::Runtime(_)) => {
            ExecutionResponse::Error(format!("Runtime Error: {}", e))
        }
    }
}

/// In-process stand-in for the remote service, with the same observable
/// contract. Backs `--local` runs.
pub struct LocalEngine;

impl ExecutionBackend for LocalEngine {
    async fn execute(&self, req: &ExecutionRequest) -> Result<ExecutionResponse, RunError> {
        Ok(execute_request(req))
    }
}
