use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use natural_expr::eval::builtins;
use natural_expr::{EvalContext, ParseOptions, Value};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "nexpr.json";

/// Contents of `nexpr.json`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    /// `dialect`, `memoize` and `sourceName`
    #[serde(flatten)]
    pub options: ParseOptions,
    /// Bound to `window`; also the namespace for global calls
    pub globals: serde_json::Map<String, serde_json::Value>,
    /// Bound to `N`
    pub namespace: serde_json::Map<String, serde_json::Value>,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// `nexpr.json` in `dir`, if present
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }

    /// Evaluation context over `data` with the configured bindings plus `Math` and `JSON`
    pub fn context(&self, data: serde_json::Value) -> EvalContext {
        let mut builder = EvalContext::builder()
            .data(Value::from(data))
            .math(builtins::math())
            .json(builtins::json());
        if !self.globals.is_empty() {
            builder = builder.window(Value::from(serde_json::Value::Object(self.globals.clone())));
        }
        if !self.namespace.is_empty() {
            builder = builder.root(Value::from(serde_json::Value::Object(self.namespace.clone())));
        }
        builder.build()
    }
}
