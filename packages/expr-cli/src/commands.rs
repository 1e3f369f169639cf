//! Subcommand implementations
//!
//! Each command returns the text to print; the binary decides where it goes.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use natural_expr::expression_parser::{serialize, Segment};
use natural_expr::{extract_keys, parse_with_options, ExprError, ParseOptions, Parser};
use tracing::debug;

use crate::config::CliConfig;

/// Where `eval` reads the data object from
#[derive(Debug, Clone)]
pub enum DataSource<'a> {
    Inline(&'a str),
    File(&'a Path),
    Empty,
}

impl DataSource<'_> {
    pub fn load(&self) -> anyhow::Result<serde_json::Value> {
        match self {
            DataSource::Inline(text) => {
                serde_json::from_str(text).context("--data is not valid JSON")
            }
            DataSource::File(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("failed to read context {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("context {} is not valid JSON", path.display()))
            }
            DataSource::Empty => Ok(serde_json::Value::Object(Default::default())),
        }
    }
}

/// Render syntax errors with their source excerpt
fn describe(err: ExprError) -> anyhow::Error {
    match err {
        ExprError::Syntax(syntax) => anyhow!(
            "{} at {}",
            syntax.contextual_message(),
            syntax.location
        ),
        ExprError::Eval(eval) => anyhow!(eval),
    }
}

/// `nexpr eval`: the display string, or the raw value as JSON
pub fn eval(
    template: &str,
    data: &DataSource<'_>,
    config: &CliConfig,
    options: &ParseOptions,
    as_json: bool,
) -> anyhow::Result<String> {
    let ctx = config.context(data.load()?);
    let value = parse_with_options(template, &ctx, options).map_err(describe)?;
    debug!(kind = value.type_name(), "evaluated template");

    if as_json {
        let json = value.to_json().unwrap_or(serde_json::Value::Null);
        Ok(serde_json::to_string_pretty(&json)?)
    } else {
        Ok(value.to_display_string())
    }
}

/// `nexpr keys`: the key map as JSON
pub fn keys(template: &str) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&extract_keys(template))?)
}

/// `nexpr ast`: one line per segment, or the full tree as JSON
pub fn ast(template: &str, options: &ParseOptions, as_json: bool) -> anyhow::Result<String> {
    let parsed = Parser::new(options.clone())
        .parse(template)
        .map_err(|err| describe(err.into()))?;

    if as_json {
        return Ok(serde_json::to_string_pretty(&parsed)?);
    }

    let lines: Vec<String> = parsed
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => format!("literal {:?}", text),
            Segment::Expression(expr) => format!("expr    {}", serialize(expr)),
        })
        .collect();
    Ok(lines.join("\n"))
}
