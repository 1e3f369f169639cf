//! Packrat memo table
//!
//! One table per parse call, keyed by `(position, rule)`. Each entry keeps the
//! rule's result, where it stopped, and the expectations it recorded so that a
//! cache hit reports exactly the same diagnostics as a fresh run.

use std::collections::HashMap;

use smallvec::SmallVec;

use super::ast::{Accessor, Expr, Keyword, Operator, Segment, Suffix};
use crate::parse_util::Expected;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    Segment,
    LiteralRun,
    ExpressionRegion,
    Expression,
    Term,
    PropertySuffix,
    MethodCall,
    GlobalCall,
    Primary,
    Arguments,
    SubExpression,
    Identifier,
    Keyword,
    Whitespace,
    Operator,
    Number,
    StringLiteral,
    Variable,
    ArrayLiteral,
    ObjectLiteral,
}

/// Furthest position at which something was expected, and what
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectationFrame {
    pub pos: usize,
    pub variants: SmallVec<[Expected; 8]>,
}

impl ExpectationFrame {
    pub fn new(pos: usize) -> Self {
        ExpectationFrame {
            pos,
            variants: SmallVec::new(),
        }
    }

    pub fn expect(&mut self, pos: usize, expected: Expected) {
        if self.variants.is_empty() || pos > self.pos {
            self.pos = pos;
            self.variants.clear();
            self.variants.push(expected);
        } else if pos == self.pos {
            self.variants.push(expected);
        }
    }

    pub fn merge(&mut self, other: &ExpectationFrame) {
        if other.variants.is_empty() {
            return;
        }
        if self.variants.is_empty() || other.pos > self.pos {
            self.pos = other.pos;
            self.variants = other.variants.clone();
        } else if other.pos == self.pos {
            self.variants.extend(other.variants.iter().copied());
        }
    }
}

/// Type-erased rule result
#[derive(Debug, Clone)]
pub enum RuleOutput {
    Segment(Segment),
    Text(String),
    Expr(Expr),
    Suffix(Suffix),
    Accessor(Accessor),
    Args(Vec<Expr>),
    Operator(Operator),
    Keyword(Keyword),
    Unit,
}

pub trait Memoized: Clone + Sized {
    fn into_output(self) -> RuleOutput;
    fn from_output(output: &RuleOutput) -> Option<Self>;
}

macro_rules! memoized {
    ($ty:ty, $variant:ident) => {
        impl Memoized for $ty {
            fn into_output(self) -> RuleOutput {
                RuleOutput::$variant(self)
            }

            fn from_output(output: &RuleOutput) -> Option<Self> {
                match output {
                    RuleOutput::$variant(value) => Some(value.clone()),
                    _ => None,
                }
            }
        }
    };
}

memoized!(Segment, Segment);
memoized!(String, Text);
memoized!(Expr, Expr);
memoized!(Suffix, Suffix);
memoized!(Accessor, Accessor);
memoized!(Vec<Expr>, Args);
memoized!(Operator, Operator);
memoized!(Keyword, Keyword);

impl Memoized for () {
    fn into_output(self) -> RuleOutput {
        RuleOutput::Unit
    }

    fn from_output(output: &RuleOutput) -> Option<Self> {
        matches!(output, RuleOutput::Unit).then_some(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoEntry {
    /// `None` records a failed match
    pub result: Option<RuleOutput>,
    pub next_pos: usize,
    pub expectations: ExpectationFrame,
}

#[derive(Debug, Default)]
pub struct MemoTable {
    entries: HashMap<(usize, RuleId), MemoEntry>,
    hits: usize,
    misses: usize,
}

impl MemoTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&mut self, pos: usize, rule: RuleId) -> Option<&MemoEntry> {
        match self.entries.get(&(pos, rule)) {
            Some(entry) => {
                self.hits += 1;
                Some(entry)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, pos: usize, rule: RuleId, entry: MemoEntry) {
        self.entries.insert((pos, rule), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
