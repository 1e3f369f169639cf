//! Binding descriptors
//!
//! A descriptor ties one data key to one place in the rendered output that
//! must be rewritten when that key changes. A template that reads several keys
//! is registered once per key; a template that reads none is never bound.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::keys::KeyCache;

/// Opaque locator for the element the host writes into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(pub String);

impl From<&str> for Target {
    fn from(locator: &str) -> Self {
        Target(locator.to_string())
    }
}

impl From<String> for Target {
    fn from(locator: String) -> Self {
        Target(locator)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the evaluated value is written to the target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WriteKind {
    /// Element value or property; receives the raw value
    Value,
    /// Named attribute; receives the display string
    Attribute { name: String },
    /// The `index`-th text node child; receives the display string
    Text { index: usize },
}

impl WriteKind {
    pub fn wants_raw_value(&self) -> bool {
        matches!(self, WriteKind::Value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    pub key: String,
    pub expr: String,
    pub target: Target,
    pub kind: WriteKind,
}

#[derive(Debug, Default)]
pub struct BindingMap {
    by_key: IndexMap<String, Vec<BindingDescriptor>>,
    cache: KeyCache,
}

impl BindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `expr` written to `target`. Returns how many descriptors were
    /// created, one per distinct key the expression reads.
    pub fn register(&mut self, target: impl Into<Target>, kind: WriteKind, expr: &str) -> usize {
        let keys = self.cache.get(expr);
        if keys.is_empty() {
            return 0;
        }

        let target = target.into();
        for key in keys.keys() {
            self.by_key
                .entry(key.clone())
                .or_default()
                .push(BindingDescriptor {
                    key: key.clone(),
                    expr: expr.to_string(),
                    target: target.clone(),
                    kind: kind.clone(),
                });
        }
        keys.len()
    }

    /// Descriptors to re-evaluate after `changed` keys were updated. A binding
    /// registered under several changed keys is returned once.
    pub fn affected_by<I, S>(&self, changed: I) -> Vec<&BindingDescriptor>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut affected = Vec::new();
        for key in changed {
            let Some(descriptors) = self.by_key.get(key.as_ref()) else {
                continue;
            };
            for descriptor in descriptors {
                if seen.insert((&descriptor.target, &descriptor.kind, &descriptor.expr)) {
                    affected.push(descriptor);
                }
            }
        }
        affected
    }

    pub fn descriptors_for(&self, key: &str) -> &[BindingDescriptor] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.by_key.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.by_key.values().flatten()
    }

    /// Number of descriptors across all keys
    pub fn len(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
