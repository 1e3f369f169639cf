/**
 * Template Parser
 *
 * Ordered-choice, memoized recursive-descent parser over brace-delimited
 * templates. Every rule either matches and advances the position or returns
 * `None` and restores it; only the driver turns an overall failure into a
 * `SyntaxError` at the furthest position reached.
 */
use tracing::{debug, trace};

use super::ast::*;
use super::memo::{ExpectationFrame, MemoEntry, MemoTable, Memoized, RuleId};
use crate::chars;
use crate::config::{GrammarFeatures, ParseOptions};
use crate::parse_util::{Expected, LineIndex, SyntaxError};

const WHITESPACE_CLASS: Expected = Expected::Class("[\\t\\n ]");
const DIGIT_CLASS: Expected = Expected::Class("[0-9]");
const TEXT_CLASS: Expected = Expected::Class("[^{}]");
const DOUBLE_QUOTED_CLASS: Expected = Expected::Class("[^\"]");
const SINGLE_QUOTED_CLASS: Expected = Expected::Class("[^']");

/// Parser for brace-delimited templates
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Parser { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a whole template. Each call owns a fresh memo table.
    pub fn parse(&self, input: &str) -> Result<Template, SyntaxError> {
        let mut state = ParseState::new(input, &self.options);
        let result = state.parse_program();
        state.finish(result)
    }
}

struct ParseState<'a> {
    input: &'a str,
    pos: usize,
    features: GrammarFeatures,
    source_name: Option<&'a str>,
    memo: Option<MemoTable>,
    frames: Vec<ExpectationFrame>,
}

impl<'a> ParseState<'a> {
    fn new(input: &'a str, options: &'a ParseOptions) -> Self {
        ParseState {
            input,
            pos: 0,
            features: options.features(),
            source_name: options.source_name.as_deref(),
            memo: options.memoize.then(MemoTable::new),
            frames: vec![ExpectationFrame::new(0)],
        }
    }

    fn finish(mut self, template: Template) -> Result<Template, SyntaxError> {
        if let Some(memo) = &self.memo {
            trace!(
                entries = memo.len(),
                hits = memo.hits(),
                misses = memo.misses(),
                "memo statistics"
            );
        }

        if self.pos == self.input.len() {
            debug!(segments = template.segments.len(), "parsed template");
            return Ok(template);
        }

        self.expect(Expected::End);
        let error = self.build_error();
        debug!(offset = error.offset(), message = %error.message, "template syntax error");
        Err(error)
    }

    fn build_error(&self) -> SyntaxError {
        let (fail_pos, expected) = match self.frames.first() {
            Some(frame) => (frame.pos, frame.variants.to_vec()),
            None => (self.pos, Vec::new()),
        };
        let found = self.input[fail_pos..].chars().next();
        let end = fail_pos + found.map_or(0, char::len_utf8);
        let index = LineIndex::new(self.input);
        SyntaxError::new(
            expected,
            found,
            index.location(fail_pos, end, self.source_name),
            index.context(fail_pos, 100, 3),
        )
    }

    // ---- Primitive matching ----

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn expect(&mut self, expected: Expected) {
        let pos = self.pos;
        if let Some(frame) = self.frames.last_mut() {
            frame.expect(pos, expected);
        }
    }

    fn merge_frame(&mut self, frame: &ExpectationFrame) {
        if let Some(top) = self.frames.last_mut() {
            top.merge(frame);
        }
    }

    fn match_literal(&mut self, literal: &'static str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            self.expect(Expected::Literal(literal));
            false
        }
    }

    fn match_class(&mut self, expected: Expected, test: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(ch) if test(ch) => {
                self.pos += ch.len_utf8();
                Some(ch)
            }
            _ => {
                self.expect(expected);
                None
            }
        }
    }

    fn span_from(&self, start: usize) -> ParseSpan {
        ParseSpan::new(start, self.pos)
    }

    /// Run `body` as a memoized rule at the current position
    fn apply_rule<T: Memoized>(&mut self, rule: RuleId, body: fn(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.pos;

        let cached = self
            .memo
            .as_mut()
            .and_then(|memo| memo.lookup(start, rule))
            .map(|entry| {
                (
                    entry.result.as_ref().and_then(T::from_output),
                    entry.next_pos,
                    entry.expectations.clone(),
                )
            });
        if let Some((result, next_pos, frame)) = cached {
            self.pos = next_pos;
            self.merge_frame(&frame);
            return result;
        }

        self.frames.push(ExpectationFrame::new(start));
        let result = body(self);
        if result.is_none() {
            self.pos = start;
        }
        let frame = self.frames.pop().unwrap_or_default();

        if let Some(memo) = self.memo.as_mut() {
            memo.insert(
                start,
                rule,
                MemoEntry {
                    result: result.clone().map(T::into_output),
                    next_pos: self.pos,
                    expectations: frame.clone(),
                },
            );
        }
        self.merge_frame(&frame);
        result
    }

    // ---- Rules ----

    /// program := segment*
    fn parse_program(&mut self) -> Template {
        let mut segments = Vec::new();
        while let Some(segment) = self.apply_rule(RuleId::Segment, Self::segment) {
            segments.push(segment);
        }
        Template { segments }
    }

    /// segment := expression-region / literal-run
    fn segment(&mut self) -> Option<Segment> {
        if let Some(expr) = self.apply_rule(RuleId::ExpressionRegion, Self::expression_region) {
            return Some(Segment::Expression(expr));
        }
        self.apply_rule(RuleId::LiteralRun, Self::literal_run)
            .map(Segment::Literal)
    }

    fn literal_run(&mut self) -> Option<String> {
        if self.features.contains(GrammarFeatures::ESCAPED_BRACES) {
            return self.escaped_literal_run();
        }

        let mut text = String::new();
        while let Some(ch) = self.match_class(TEXT_CLASS, |c| !chars::is_brace(c)) {
            text.push(ch);
        }
        if !text.is_empty() {
            return Some(text);
        }

        if self.features.contains(GrammarFeatures::DOUBLED_BRACES) {
            if self.match_literal("{{") {
                return Some(chars::LBRACE.to_string());
            }
            if self.match_literal("}}") {
                return Some(chars::RBRACE.to_string());
            }
        }
        None
    }

    /// ( "\{" / "\}" / [^{}] )+ where a backslash before anything but a brace is literal
    fn escaped_literal_run(&mut self) -> Option<String> {
        let mut text = String::new();
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(chars::BACKSLASH), Some(brace)) if chars::is_brace(brace) => {
                    self.pos += 2;
                    text.push(brace);
                }
                (Some(ch), _) if !chars::is_brace(ch) => {
                    self.pos += ch.len_utf8();
                    text.push(ch);
                }
                _ => {
                    self.expect(TEXT_CLASS);
                    self.expect(Expected::Literal("\\{"));
                    self.expect(Expected::Literal("\\}"));
                    break;
                }
            }
        }
        (!text.is_empty()).then_some(text)
    }

    /// expression-region := "{" _ expression _ "}"
    fn expression_region(&mut self) -> Option<Expr> {
        if !self.match_literal("{") {
            return None;
        }
        self.whitespace();
        let expr = self.apply_rule(RuleId::Expression, Self::expression)?;
        self.whitespace();
        if !self.match_literal("}") {
            return None;
        }
        Some(expr)
    }

    /// expression := term (_ operator _ term (_ ":"? _ term?)?)*
    ///
    /// Folds strictly left to right with no precedence. The `: term` tail is
    /// read after every operator but only kept as the else branch of `?`.
    fn expression(&mut self) -> Option<Expr> {
        let start = self.pos;
        let mut result = self.apply_rule(RuleId::Term, Self::term)?;

        loop {
            let save = self.pos;
            self.whitespace();
            let Some(op) = self.apply_rule(RuleId::Operator, Self::operator) else {
                self.pos = save;
                break;
            };
            self.whitespace();
            let Some(right) = self.apply_rule(RuleId::Term, Self::term) else {
                self.pos = save;
                break;
            };
            let tail = self.else_tail();

            result = match op {
                Operator::Binary(op) => Expr::new(
                    self.span_from(start),
                    ExprKind::Binary {
                        op,
                        left: Box::new(result),
                        right: Box::new(right),
                    },
                ),
                Operator::Conditional => Expr::new(
                    self.span_from(start),
                    ExprKind::Ternary {
                        condition: Box::new(result),
                        then_branch: Box::new(right),
                        else_branch: tail.map(Box::new),
                    },
                ),
            };
        }

        Some(result)
    }

    /// _ ":"? _ term?
    fn else_tail(&mut self) -> Option<Expr> {
        let save = self.pos;
        self.whitespace();
        let colon = self.match_literal(":");
        self.whitespace();
        let term = self.apply_rule(RuleId::Term, Self::term);
        if term.is_none() && !colon {
            self.pos = save;
        }
        term
    }

    /// term := primary suffix* / sub-expression / number
    fn term(&mut self) -> Option<Expr> {
        let start = self.pos;
        if let Some(head) = self.apply_rule(RuleId::Primary, Self::primary) {
            let mut suffixes = Vec::new();
            loop {
                if let Some(call) = self.apply_rule(RuleId::MethodCall, Self::method_call) {
                    suffixes.push(call);
                } else if let Some(accessor) =
                    self.apply_rule(RuleId::PropertySuffix, Self::property_suffix)
                {
                    suffixes.push(Suffix::Get(accessor));
                } else {
                    break;
                }
            }
            if suffixes.is_empty() {
                return Some(head);
            }
            return Some(Expr::new(
                self.span_from(start),
                ExprKind::Chain {
                    head: Box::new(head),
                    suffixes,
                },
            ));
        }

        if let Some(expr) = self.apply_rule(RuleId::SubExpression, Self::sub_expression) {
            return Some(expr);
        }
        self.apply_rule(RuleId::Number, Self::number)
    }

    /// property := "." identifier / "[" _ expression _ "]"
    fn property_suffix(&mut self) -> Option<Accessor> {
        let start = self.pos;
        if self.match_literal(".") {
            if let Some(name) = self.apply_rule(RuleId::Identifier, Self::identifier) {
                return Some(Accessor::Named(name));
            }
            self.pos = start;
        }

        if !self.match_literal("[") {
            return None;
        }
        self.whitespace();
        let key = self.apply_rule(RuleId::Expression, Self::expression)?;
        self.whitespace();
        if !self.match_literal("]") {
            return None;
        }
        Some(Accessor::Computed(Box::new(key)))
    }

    /// method-call := property _ "(" _ arguments* _ ")"
    fn method_call(&mut self) -> Option<Suffix> {
        let accessor = self.apply_rule(RuleId::PropertySuffix, Self::property_suffix)?;
        let args = self.call_arguments()?;
        Some(Suffix::Call { accessor, args })
    }

    /// global-call := identifier _ "(" _ arguments* _ ")"
    fn global_call(&mut self) -> Option<Expr> {
        let start = self.pos;
        let name = self.apply_rule(RuleId::Identifier, Self::identifier)?;
        let args = self.call_arguments()?;
        Some(Expr::new(
            self.span_from(start),
            ExprKind::GlobalCall { name, args },
        ))
    }

    /// _ "(" _ arguments* _ ")"
    fn call_arguments(&mut self) -> Option<Vec<Expr>> {
        self.whitespace();
        if !self.match_literal("(") {
            return None;
        }
        self.whitespace();
        let mut args = Vec::new();
        while let Some(list) = self.apply_rule(RuleId::Arguments, Self::arguments) {
            args.extend(list);
        }
        self.whitespace();
        if !self.match_literal(")") {
            return None;
        }
        Some(args)
    }

    /// arguments := expression (_ "," _ expression)*
    fn arguments(&mut self) -> Option<Vec<Expr>> {
        let first = self.apply_rule(RuleId::Expression, Self::expression)?;
        let mut args = vec![first];
        args.extend(self.comma_separated_tail(|state| {
            state.apply_rule(RuleId::Expression, Self::expression)
        }));
        Some(args)
    }

    /// (_ "," _ item)*
    fn comma_separated_tail<T>(&mut self, mut item: impl FnMut(&mut Self) -> Option<T>) -> Vec<T> {
        let mut items = Vec::new();
        loop {
            let save = self.pos;
            self.whitespace();
            if !self.match_literal(",") {
                self.pos = save;
                break;
            }
            self.whitespace();
            match item(self) {
                Some(value) => items.push(value),
                None => {
                    self.pos = save;
                    break;
                }
            }
        }
        items
    }

    /// primary := string / array / global-call / variable / object
    fn primary(&mut self) -> Option<Expr> {
        if let Some(expr) = self.apply_rule(RuleId::StringLiteral, Self::string_literal) {
            return Some(expr);
        }
        if self.features.contains(GrammarFeatures::ARRAY_LITERALS) {
            if let Some(expr) = self.apply_rule(RuleId::ArrayLiteral, Self::array_literal) {
                return Some(expr);
            }
        }
        if let Some(expr) = self.apply_rule(RuleId::GlobalCall, Self::global_call) {
            return Some(expr);
        }
        if let Some(expr) = self.apply_rule(RuleId::Variable, Self::variable) {
            return Some(expr);
        }
        if self.features.contains(GrammarFeatures::OBJECT_LITERALS) {
            return self.apply_rule(RuleId::ObjectLiteral, Self::object_literal);
        }
        None
    }

    /// sub-expression := "(" _ expression _ ")"
    fn sub_expression(&mut self) -> Option<Expr> {
        let start = self.pos;
        if !self.match_literal("(") {
            return None;
        }
        self.whitespace();
        let inner = self.apply_rule(RuleId::Expression, Self::expression)?;
        self.whitespace();
        if !self.match_literal(")") {
            return None;
        }
        Some(Expr::new(self.span_from(start), ExprKind::Paren(Box::new(inner))))
    }

    fn identifier(&mut self) -> Option<String> {
        let features = self.features;
        let first = self.match_class(identifier_start_class(features), |ch| {
            chars::is_identifier_start(ch, features)
        })?;
        let mut name = String::from(first);
        while let Some(ch) = self.match_class(identifier_part_class(features), |ch| {
            chars::is_identifier_part(ch, features)
        }) {
            name.push(ch);
        }
        Some(name)
    }

    /// Reserved names, matched only when not followed by an identifier character
    fn keyword(&mut self) -> Option<Keyword> {
        for keyword in Keyword::ALL {
            let text = keyword.as_str();
            if !self.rest().starts_with(text) {
                self.expect(Expected::Literal(text));
                continue;
            }
            let boundary = self.rest()[text.len()..]
                .chars()
                .next()
                .map_or(true, |ch| !chars::is_identifier_part(ch, self.features));
            if boundary {
                self.pos += text.len();
                return Some(keyword);
            }
        }
        None
    }

    fn whitespace(&mut self) {
        self.apply_rule(RuleId::Whitespace, |state| {
            while state
                .match_class(WHITESPACE_CLASS, chars::is_whitespace)
                .is_some()
            {}
            Some(())
        });
    }

    fn operator(&mut self) -> Option<Operator> {
        Operator::ALL
            .into_iter()
            .find(|op| self.match_literal(op.as_str()))
    }

    /// number := [0-9]* "."? [0-9]*, with at least one digit
    fn number(&mut self) -> Option<Expr> {
        let start = self.pos;
        let mut integer = String::new();
        while let Some(ch) = self.match_class(DIGIT_CLASS, chars::is_digit) {
            integer.push(ch);
        }
        let has_dot = self.match_literal(".");
        let mut fraction = String::new();
        if has_dot {
            while let Some(ch) = self.match_class(DIGIT_CLASS, chars::is_digit) {
                fraction.push(ch);
            }
        }
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }

        let literal = format!(
            "{}.{}",
            if integer.is_empty() { "0" } else { &integer },
            if fraction.is_empty() { "0" } else { &fraction }
        );
        let value = literal.parse::<f64>().ok()?;
        Some(Expr::new(self.span_from(start), ExprKind::Number(value)))
    }

    /// string := '"' [^"]* '"' / "'" [^']* "'"
    fn string_literal(&mut self) -> Option<Expr> {
        let start = self.pos;
        for (quote, literal, class) in [
            (chars::DQ, "\"", DOUBLE_QUOTED_CLASS),
            (chars::SQ, "'", SINGLE_QUOTED_CLASS),
        ] {
            if !self.match_literal(literal) {
                continue;
            }
            let mut text = String::new();
            while let Some(ch) = self.match_class(class, |c| c != quote) {
                text.push(ch);
            }
            if self.match_literal(literal) {
                return Some(Expr::new(self.span_from(start), ExprKind::String(text)));
            }
            self.pos = start;
        }
        None
    }

    /// variable := keyword / identifier
    fn variable(&mut self) -> Option<Expr> {
        let start = self.pos;
        if let Some(keyword) = self.apply_rule(RuleId::Keyword, Self::keyword) {
            return Some(Expr::new(self.span_from(start), ExprKind::Reserved(keyword)));
        }
        let name = self.apply_rule(RuleId::Identifier, Self::identifier)?;
        Some(Expr::new(self.span_from(start), ExprKind::Identifier(name)))
    }

    /// array := "[" _ (expression (_ "," _ expression)*)? _ "]"
    fn array_literal(&mut self) -> Option<Expr> {
        let start = self.pos;
        if !self.match_literal("[") {
            return None;
        }
        self.whitespace();
        let mut items = Vec::new();
        if let Some(first) = self.apply_rule(RuleId::Expression, Self::expression) {
            items.push(first);
            items.extend(self.comma_separated_tail(|state| {
                state.apply_rule(RuleId::Expression, Self::expression)
            }));
        }
        self.whitespace();
        if !self.match_literal("]") {
            return None;
        }
        Some(Expr::new(self.span_from(start), ExprKind::Array(items)))
    }

    /// object := "{" _ (entry (_ "," _ entry)*)? _ "}"
    fn object_literal(&mut self) -> Option<Expr> {
        let start = self.pos;
        if !self.match_literal("{") {
            return None;
        }
        self.whitespace();
        let mut entries = Vec::new();
        if let Some(first) = self.object_entry() {
            entries.push(first);
            entries.extend(self.comma_separated_tail(Self::object_entry));
        }
        self.whitespace();
        if !self.match_literal("}") {
            return None;
        }
        Some(Expr::new(self.span_from(start), ExprKind::Object(entries)))
    }

    /// entry := identifier _ ":" _ expression
    fn object_entry(&mut self) -> Option<ObjectEntry> {
        let start = self.pos;
        let entry = (|| {
            let key = self.apply_rule(RuleId::Identifier, Self::identifier)?;
            self.whitespace();
            if !self.match_literal(":") {
                return None;
            }
            self.whitespace();
            let value = self.apply_rule(RuleId::Expression, Self::expression)?;
            Some(ObjectEntry { key, value })
        })();
        if entry.is_none() {
            self.pos = start;
        }
        entry
    }
}

fn identifier_start_class(features: GrammarFeatures) -> Expected {
    let dollar = features.contains(GrammarFeatures::DOLLAR_IDENTIFIERS);
    let hangul = features.contains(GrammarFeatures::HANGUL_IDENTIFIERS);
    Expected::Class(match (dollar, hangul) {
        (true, true) => "[$_a-zA-Z\\u3131-\\uD7A3]",
        (false, true) => "[_a-zA-Z\\u3131-\\uD7A3]",
        (true, false) => "[$_a-zA-Z]",
        (false, false) => "[_a-zA-Z]",
    })
}

fn identifier_part_class(features: GrammarFeatures) -> Expected {
    let dollar = features.contains(GrammarFeatures::DOLLAR_IDENTIFIERS);
    let hangul = features.contains(GrammarFeatures::HANGUL_IDENTIFIERS);
    Expected::Class(match (dollar, hangul) {
        (true, true) => "[$0-9_a-zA-Z\\u3131-\\uD7A3]",
        (false, true) => "[0-9_a-zA-Z\\u3131-\\uD7A3]",
        (true, false) => "[$0-9_a-zA-Z]",
        (false, false) => "[0-9_a-zA-Z]",
    })
}
