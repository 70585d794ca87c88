//! Sandboxed execution of configuration-authored expressions.
//!
//! Every predicate, handler, response mapping and init body runs through
//! [`ExpressionEvaluator`]. Callers never propagate an [`ExpressionError`]:
//! they log it through [`evaluate_or_log`] and fall back to a neutral default.

mod rhai_engine;

pub use rhai_engine::RhaiEvaluator;

use crate::core::FieldId;
use serde_json::Value as Json;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("compile error: {0}")]
    Compile(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Outcome of one run: the returned value plus the final value of every
/// parameter, so callers can pick up mutations such as `field.value = ...`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub value: Json,
    pub bindings: Vec<(String, Json)>,
}

impl Evaluation {
    pub fn binding(&self, name: &str) -> Option<&Json> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding == name)
            .map(|(_, value)| value)
    }
}

pub trait ExpressionEvaluator {
    /// Compiles `body` with exactly `params` in scope and runs it against
    /// `args`. Each call compiles afresh.
    fn evaluate(
        &self,
        params: &[&str],
        body: &str,
        args: Vec<Json>,
    ) -> Result<Evaluation, ExpressionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    Visibility,
    Validation,
    EventHandler,
    ResponseMapping,
    CustomInit,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visibility => "conditional visibility",
            Self::Validation => "custom validation",
            Self::EventHandler => "event handler",
            Self::ResponseMapping => "response mapping",
            Self::CustomInit => "custom init",
        })
    }
}

/// Runs an expression and logs any failure against the owning field.
pub fn evaluate_or_log(
    evaluator: &dyn ExpressionEvaluator,
    kind: ExpressionKind,
    field: &FieldId,
    params: &[&str],
    body: &str,
    args: Vec<Json>,
) -> Option<Evaluation> {
    match evaluator.evaluate(params, body, args) {
        Ok(evaluation) => Some(evaluation),
        Err(err) => {
            tracing::error!(field = %field, kind = %kind, error = %err, "expression failed");
            None
        }
    }
}
