#![deny(clippy::all)]

/**
 * Natural Expression Engine
 *
 * Brace-delimited template expressions: a memoized ordered-choice parser, a
 * JavaScript-flavoured evaluator and static dependency key extraction for
 * reactive bindings.
 */

// Core modules
pub mod chars;
pub mod config;
pub mod error;
pub mod parse_util;

// Parsing and evaluation
pub mod eval;
pub mod expression_parser;

// Reactivity
pub mod binding;

// Re-exports
pub use binding::{extract_keys, KeyMap};
pub use config::{Dialect, GrammarFeatures, ParseOptions};
pub use error::{EvalError, ExprError, Result, SyntaxError};
pub use eval::{EvalContext, Meta, Value};
pub use expression_parser::{Parser, Template};

/// Parse `template` with the default options and evaluate it against `ctx`.
///
/// A template that is exactly one expression region returns that expression's
/// value; any other template returns its segments concatenated as a string.
pub fn parse(template: &str, ctx: &EvalContext) -> Result<Value> {
    parse_with_options(template, ctx, &ParseOptions::default())
}

pub fn parse_with_options(template: &str, ctx: &EvalContext, options: &ParseOptions) -> Result<Value> {
    let template = Parser::new(options.clone()).parse(template)?;
    let value = eval::Evaluator::new(ctx).evaluate_template(&template)?;
    Ok(value)
}
