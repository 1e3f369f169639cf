//! Dependency key extraction
//!
//! A regex scan over the template text that approximates which top-level data
//! fields each expression region reads. It never consults the grammar and never
//! fails: unusual input yields a partial or empty map.
//!
//! Per region, numbers, quoted strings and parentheses are blanked out, then
//! every identifier at the start of the region or after whitespace is counted.
//! Property names reached through `.` are not keys (`user.name` counts `user`).
//! Regions are found by a non-nesting scan, so an object literal's closing
//! brace ends the region early.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use tracing::trace;

use crate::expression_parser::Keyword;

/// Field name to occurrence count, in first-seen order
pub type KeyMap = IndexMap<String, usize>;

static ESCAPED_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[{}]").unwrap());

static REGION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\s*([^}]+)\s*\}").unwrap());

static CONSTANTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s*\b[0-9]+\b\s*|'[^']*'|"[^"]*"|[()]"#).unwrap());

static KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s+)([A-Za-z_$\x{3131}-\x{D7A3}][0-9A-Za-z_$\x{3131}-\x{D7A3}]*)").unwrap()
});

/// Extract the data keys referenced by every expression region of `template`.
/// Counts accumulate across regions; a template without regions yields an
/// empty map.
pub fn extract_keys(template: &str) -> KeyMap {
    let mut keys = KeyMap::new();
    let unescaped = ESCAPED_BRACE.replace_all(template, "  ");

    for region in REGION.captures_iter(&unescaped) {
        let Some(body) = region.get(1) else {
            continue;
        };
        let cleared = CONSTANTS.replace_all(body.as_str(), " ");
        for key in KEY.captures_iter(cleared.trim()) {
            let Some(name) = key.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if Keyword::from_name(name).is_some() {
                continue;
            }
            *keys.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    trace!(template, keys = keys.len(), "extracted binding keys");
    keys
}

/// Memoizes [`extract_keys`] by template text
#[derive(Debug, Default)]
pub struct KeyCache {
    entries: RwLock<HashMap<String, Arc<KeyMap>>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, template: &str) -> Arc<KeyMap> {
        if let Some(keys) = self.entries.read().get(template) {
            return Arc::clone(keys);
        }

        let keys = Arc::new(extract_keys(template));
        self.entries
            .write()
            .entry(template.to_string())
            .or_insert_with(|| Arc::clone(&keys))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
