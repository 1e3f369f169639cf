//! Evaluation
//!
//! Runtime value model, evaluation context and the AST evaluator.

pub mod builtins;
pub mod context;
pub mod evaluator;
pub mod value;

pub use context::{EvalContext, EvalContextBuilder, Meta};
pub use evaluator::{get_property, invoke_method, Evaluator};
pub use value::{number_to_string, NativeFunction, Object, Value};
