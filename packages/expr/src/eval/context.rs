//! Evaluation context
//!
//! The data object bare identifiers resolve against, plus the reserved
//! bindings supplied by the host. Unpopulated bindings are `undefined`, so an
//! expression that reaches into one fails at evaluation time rather than at
//! parse time.

use super::builtins;
use super::value::{Object, Value};
use crate::expression_parser::Keyword;

/// The `_` metadata slot
#[derive(Debug, Clone, Default)]
pub struct Meta {
    pub index: Value,
    pub comp: Value,
    pub cont: Value,
    pub data: Value,
}

impl Meta {
    pub fn into_value(self) -> Value {
        let mut map = Object::with_capacity(4);
        map.insert("index".to_string(), self.index);
        map.insert("comp".to_string(), self.comp);
        map.insert("cont".to_string(), self.cont);
        map.insert("data".to_string(), self.data);
        Value::object(map)
    }
}

#[derive(Debug, Clone)]
pub struct EvalContext {
    data: Value,
    root: Value,
    query: Value,
    window: Value,
    math: Value,
    json: Value,
    meta: Value,
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext {
            data: Value::object(Object::new()),
            root: Value::Undefined,
            query: Value::Undefined,
            window: Value::Undefined,
            math: Value::Undefined,
            json: Value::Undefined,
            meta: Value::Undefined,
        }
    }
}

impl EvalContext {
    /// Context over `data` with no reserved bindings populated
    pub fn new(data: impl Into<Value>) -> Self {
        EvalContext {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Context over `data` with the `Math` and `JSON` utility objects
    pub fn with_standard_globals(data: impl Into<Value>) -> Self {
        Self::builder()
            .data(data)
            .math(builtins::math())
            .json(builtins::json())
            .build()
    }

    pub fn builder() -> EvalContextBuilder {
        EvalContextBuilder::default()
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn window(&self) -> &Value {
        &self.window
    }

    /// Value bound to a reserved keyword
    pub fn keyword(&self, keyword: Keyword) -> Value {
        match keyword {
            Keyword::True => Value::Bool(true),
            Keyword::False => Value::Bool(false),
            Keyword::Root => self.root.clone(),
            Keyword::Query => self.query.clone(),
            Keyword::Window => self.window.clone(),
            Keyword::Math => self.math.clone(),
            Keyword::Json => self.json.clone(),
            Keyword::Context => self.data.clone(),
            Keyword::Meta => self.meta.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EvalContextBuilder {
    context: EvalContext,
}

impl EvalContextBuilder {
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.context.data = data.into();
        self
    }

    /// `N`
    pub fn root(mut self, root: impl Into<Value>) -> Self {
        self.context.root = root.into();
        self
    }

    /// `$`
    pub fn query(mut self, query: impl Into<Value>) -> Self {
        self.context.query = query.into();
        self
    }

    pub fn window(mut self, window: impl Into<Value>) -> Self {
        self.context.window = window.into();
        self
    }

    pub fn math(mut self, math: impl Into<Value>) -> Self {
        self.context.math = math.into();
        self
    }

    pub fn json(mut self, json: impl Into<Value>) -> Self {
        self.context.json = json.into();
        self
    }

    /// `_`
    pub fn meta(mut self, meta: Meta) -> Self {
        self.context.meta = meta.into_value();
        self
    }

    pub fn build(self) -> EvalContext {
        self.context
    }
}
