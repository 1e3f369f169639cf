//! Parser configuration
//!
//! Grammar dialects and per-call parse options.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Optional grammar productions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GrammarFeatures: u8 {
        /// `\{` and `\}` produce literal braces; a lone `\` is literal text
        const ESCAPED_BRACES = 1 << 0;
        /// `{{` and `}}` produce literal braces
        const DOUBLED_BRACES = 1 << 1;
        /// `[a, b]` array literals
        const ARRAY_LITERALS = 1 << 2;
        /// `{key: value}` object literals
        const OBJECT_LITERALS = 1 << 3;
        /// `$` may start or continue an identifier
        const DOLLAR_IDENTIFIERS = 1 << 4;
        /// U+3131..=U+D7A3 may start or continue an identifier
        const HANGUL_IDENTIFIERS = 1 << 5;
    }
}

impl GrammarFeatures {
    pub fn classic() -> Self {
        GrammarFeatures::DOUBLED_BRACES | GrammarFeatures::HANGUL_IDENTIFIERS
    }

    pub fn extended() -> Self {
        GrammarFeatures::ESCAPED_BRACES
            | GrammarFeatures::ARRAY_LITERALS
            | GrammarFeatures::OBJECT_LITERALS
            | GrammarFeatures::DOLLAR_IDENTIFIERS
            | GrammarFeatures::HANGUL_IDENTIFIERS
    }
}

/// Grammar dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// First-generation grammar: doubled braces escape, no array/object literals
    Classic,
    #[default]
    Extended,
}

impl Dialect {
    pub fn features(self) -> GrammarFeatures {
        match self {
            Dialect::Classic => GrammarFeatures::classic(),
            Dialect::Extended => GrammarFeatures::extended(),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(Dialect::Classic),
            "extended" => Ok(Dialect::Extended),
            other => Err(format!("unknown dialect '{}'", other)),
        }
    }
}

/// Options for a single parse invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    pub dialect: Dialect,
    /// Reported in syntax error locations
    pub source_name: Option<String>,
    /// Packrat memoization; results are identical either way
    pub memoize: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            dialect: Dialect::Extended,
            source_name: None,
            memoize: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn features(&self) -> GrammarFeatures {
        self.dialect.features()
    }
}
