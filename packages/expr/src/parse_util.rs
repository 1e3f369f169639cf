//! Parse Utilities
//!
//! Source positions, expectation descriptors and the structured syntax error
//! raised by the template parser.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::chars;

/// A resolved point in the template source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    /// Byte offset into the template
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub source: Option<String>,
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}",
            self.source.as_deref().unwrap_or("<template>"),
            self.start.line,
            self.start.column
        )
    }
}

/// Maps byte offsets to line/column pairs
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    input: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in input.char_indices() {
            if ch == chars::NEWLINE {
                line_starts.push(offset + 1);
            }
        }
        LineIndex { input, line_starts }
    }

    pub fn position(&self, offset: usize) -> SourcePosition {
        let offset = offset.min(self.input.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.input[line_start..offset].chars().count() + 1;
        SourcePosition {
            offset,
            line: line + 1,
            column,
        }
    }

    pub fn location(&self, start: usize, end: usize, source: Option<&str>) -> SourceLocation {
        SourceLocation {
            source: source.map(str::to_string),
            start: self.position(start),
            end: self.position(end),
        }
    }

    /// Source text around `offset`, up to `max_chars` or `max_lines` on each side
    pub fn context(&self, offset: usize, max_chars: usize, max_lines: usize) -> (String, String) {
        let offset = offset.min(self.input.len());
        let (before, after) = self.input.split_at(offset);

        let mut lines = 0;
        let before: String = before
            .chars()
            .rev()
            .take(max_chars)
            .take_while(|&ch| {
                if ch == chars::NEWLINE {
                    lines += 1;
                }
                lines < max_lines
            })
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        let mut lines = 0;
        let after: String = after
            .chars()
            .take(max_chars)
            .take_while(|&ch| {
                if ch == chars::NEWLINE {
                    lines += 1;
                }
                lines < max_lines
            })
            .collect();

        (before, after)
    }
}

/// What the parser was looking for at the failure position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum Expected {
    Literal(&'static str),
    /// A character class, already rendered as `[...]`
    Class(&'static str),
    Any,
    End,
    Other(&'static str),
}

impl Expected {
    pub fn describe(&self) -> String {
        match self {
            Expected::Literal(text) => format!("\"{}\"", literal_escape(text)),
            Expected::Class(parts) => (*parts).to_string(),
            Expected::Any => "any character".to_string(),
            Expected::End => "end of input".to_string(),
            Expected::Other(description) => (*description).to_string(),
        }
    }
}

fn literal_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => {
                out.push_str(&format!("\\x{:02X}", c as u32))
            }
            c => out.push(c),
        }
    }
    out
}

/// Structured syntax error carrying the furthest failure position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message} ({location})")]
pub struct SyntaxError {
    pub message: String,
    pub expected: Vec<Expected>,
    pub found: Option<char>,
    pub location: SourceLocation,
    #[serde(skip)]
    context: (String, String),
}

impl SyntaxError {
    pub fn new(
        expected: Vec<Expected>,
        found: Option<char>,
        location: SourceLocation,
        context: (String, String),
    ) -> Self {
        SyntaxError {
            message: Self::build_message(&expected, found),
            expected,
            found,
            location,
            context,
        }
    }

    /// `Expected A, B, or C but "x" found.`
    pub fn build_message(expected: &[Expected], found: Option<char>) -> String {
        let mut descriptions: Vec<String> = expected.iter().map(Expected::describe).collect();
        descriptions.sort();
        descriptions.dedup();

        let expected_text = match descriptions.len() {
            0 => "nothing".to_string(),
            1 => descriptions[0].clone(),
            2 => format!("{} or {}", descriptions[0], descriptions[1]),
            n => format!(
                "{}, or {}",
                descriptions[..n - 1].join(", "),
                descriptions[n - 1]
            ),
        };

        let found_text = match found {
            Some(ch) => format!("\"{}\"", literal_escape(ch.encode_utf8(&mut [0; 4]))),
            None => "end of input".to_string(),
        };

        format!("Expected {} but {} found.", expected_text, found_text)
    }

    pub fn offset(&self) -> usize {
        self.location.start.offset
    }

    pub fn contextual_message(&self) -> String {
        let (before, after) = &self.context;
        format!("{} (\"{}[ERROR ->]{}\")", self.message, before, after)
    }
}
