#![deny(clippy::all)]

use napi::{Error, Result, Status};
use napi_derive::napi;
use natural_expr::binding::KeyCache;
use natural_expr::eval::builtins;
use natural_expr::{parse_with_options, Dialect, EvalContext, ExprError, ParseOptions, Value};

fn to_napi_error(err: ExprError) -> Error {
  match err {
    ExprError::Syntax(syntax) => Error::new(
      Status::InvalidArg,
      format!("{} at {}", syntax.contextual_message(), syntax.location),
    ),
    ExprError::Eval(eval) => Error::from_reason(eval.to_string()),
  }
}

/// Data object from JS; an empty string means `{}`
fn context_from_json(context_json: &str) -> Result<EvalContext> {
  let data = if context_json.trim().is_empty() {
    serde_json::Value::Object(Default::default())
  } else {
    serde_json::from_str(context_json)
      .map_err(|e| Error::new(Status::InvalidArg, format!("invalid context JSON: {}", e)))?
  };
  Ok(EvalContext::builder()
    .data(Value::from(data))
    .math(builtins::math())
    .json(builtins::json())
    .build())
}

#[napi]
pub struct ExprEngine {
  options: ParseOptions,
  keys: KeyCache,
}

#[napi]
impl ExprEngine {
  #[napi(constructor)]
  pub fn new(dialect: Option<String>) -> Result<Self> {
    let mut options = ParseOptions::default();
    if let Some(dialect) = dialect {
      let dialect: Dialect = dialect
        .parse()
        .map_err(|e: String| Error::new(Status::InvalidArg, e))?;
      options = options.with_dialect(dialect);
    }
    Ok(ExprEngine {
      options,
      keys: KeyCache::new(),
    })
  }

  /// Raw value of the template as JSON text
  #[napi]
  pub fn evaluate(&self, template: String, context_json: String) -> Result<String> {
    let ctx = context_from_json(&context_json)?;
    let value = parse_with_options(&template, &ctx, &self.options).map_err(to_napi_error)?;
    let json = value.to_json().unwrap_or(serde_json::Value::Null);
    serde_json::to_string(&json).map_err(|e| Error::from_reason(e.to_string()))
  }

  /// Template rendered the way it is written into the page
  #[napi]
  pub fn render(&self, template: String, context_json: String) -> Result<String> {
    let ctx = context_from_json(&context_json)?;
    let value = parse_with_options(&template, &ctx, &self.options).map_err(to_napi_error)?;
    Ok(value.to_display_string())
  }

  #[napi]
  pub fn extract_keys(&self, template: String) -> Result<String> {
    let keys = self.keys.get(&template);
    serde_json::to_string(keys.as_ref()).map_err(|e| Error::from_reason(e.to_string()))
  }
}
