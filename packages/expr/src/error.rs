//! Error types
//!
//! Syntax errors come from the parser driver, evaluation errors from applying
//! operators, accessors and calls to runtime values.

use thiserror::Error;

pub use crate::parse_util::SyntaxError;

/// Runtime failure while evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Cannot read properties of {base} (reading '{property}')")]
    PropertyOfNullish { property: String, base: &'static str },

    #[error("{name} is not a function")]
    NotCallable { name: String },

    #[error("{receiver}.{name} is not a function")]
    UnknownMethod { name: String, receiver: &'static str },

    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },

    #[error("JSON error: {0}")]
    Json(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ExprError {
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            ExprError::Syntax(err) => Some(err),
            ExprError::Eval(_) => None,
        }
    }

    pub fn as_eval(&self) -> Option<&EvalError> {
        match self {
            ExprError::Eval(err) => Some(err),
            ExprError::Syntax(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExprError>;
