/**
 * Template Expression AST
 *
 * Node types produced by the template parser and consumed by the evaluator
 */

use serde::Serialize;

/// Byte range of a node in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }
}

/// A parsed template: literal runs and expression regions in source order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    /// The expression when the whole template is exactly one expression region
    pub fn single_expression(&self) -> Option<&Expr> {
        match self.segments.as_slice() {
            [Segment::Expression(expr)] => Some(expr),
            _ => None,
        }
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expr> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Expression(expr) => Some(expr),
            Segment::Literal(_) => None,
        })
    }

    pub fn is_literal(&self) -> bool {
        self.expressions().next().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Segment {
    Literal(String),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub span: ParseSpan,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(span: ParseSpan, kind: ExprKind) -> Self {
        Expr { span, kind }
    }

    pub fn visit<V: ExprVisitor>(&self, visitor: &mut V) -> V::Result {
        match &self.kind {
            ExprKind::String(value) => visitor.visit_string(value),
            ExprKind::Number(value) => visitor.visit_number(*value),
            ExprKind::Reserved(keyword) => visitor.visit_reserved(*keyword),
            ExprKind::Identifier(name) => visitor.visit_identifier(name),
            ExprKind::Array(items) => visitor.visit_array(items),
            ExprKind::Object(entries) => visitor.visit_object(entries),
            ExprKind::GlobalCall { name, args } => visitor.visit_global_call(name, args),
            ExprKind::Chain { head, suffixes } => visitor.visit_chain(head, suffixes),
            ExprKind::Binary { op, left, right } => visitor.visit_binary(*op, left, right),
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => visitor.visit_ternary(condition, then_branch, else_branch.as_deref()),
            ExprKind::Paren(inner) => visitor.visit_paren(inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ExprKind {
    String(String),
    Number(f64),
    Reserved(Keyword),
    /// Bare identifier, resolved against the context data object
    Identifier(String),
    Array(Vec<Expr>),
    Object(Vec<ObjectEntry>),
    /// `name(args)` against the global namespace
    GlobalCall { name: String, args: Vec<Expr> },
    /// A primary followed by `.name`, `[expr]` and call suffixes
    Chain { head: Box<Expr>, suffixes: Vec<Suffix> },
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `condition ? then : else`; the else branch may be missing
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Suffix {
    Get(Accessor),
    Call { accessor: Accessor, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Accessor {
    /// `.name`
    Named(String),
    /// `[expr]`
    Computed(Box<Expr>),
}

/// Identifiers bound by the host rather than looked up in the data object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    True,
    False,
    /// `N`, the root namespace
    Root,
    /// `$`, the DOM query function
    Query,
    Window,
    Math,
    Json,
    Context,
    /// `_`, the metadata slot
    Meta,
}

impl Keyword {
    /// Longest spellings first so prefixes never shadow a longer keyword
    pub const ALL: [Keyword; 9] = [
        Keyword::Context,
        Keyword::Window,
        Keyword::False,
        Keyword::True,
        Keyword::Math,
        Keyword::Json,
        Keyword::Root,
        Keyword::Query,
        Keyword::Meta,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Root => "N",
            Keyword::Query => "$",
            Keyword::Window => "window",
            Keyword::Math => "Math",
            Keyword::Json => "JSON",
            Keyword::Context => "context",
            Keyword::Meta => "_",
        }
    }

    pub fn from_name(name: &str) -> Option<Keyword> {
        Keyword::ALL.iter().copied().find(|kw| kw.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    StrictEqual,
    StrictNotEqual,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    Greater,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
        }
    }
}

/// Infix token recognised by the operator rule, in match order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Binary(BinaryOperator),
    Conditional,
}

impl Operator {
    /// Ordered so that multi-character operators win over their prefixes
    pub const ALL: [Operator; 15] = [
        Operator::Binary(BinaryOperator::StrictEqual),
        Operator::Binary(BinaryOperator::StrictNotEqual),
        Operator::Binary(BinaryOperator::Equal),
        Operator::Binary(BinaryOperator::NotEqual),
        Operator::Binary(BinaryOperator::LessEqual),
        Operator::Binary(BinaryOperator::GreaterEqual),
        Operator::Binary(BinaryOperator::And),
        Operator::Binary(BinaryOperator::Or),
        Operator::Binary(BinaryOperator::Add),
        Operator::Binary(BinaryOperator::Subtract),
        Operator::Binary(BinaryOperator::Multiply),
        Operator::Binary(BinaryOperator::Divide),
        Operator::Binary(BinaryOperator::Less),
        Operator::Binary(BinaryOperator::Greater),
        Operator::Conditional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Binary(op) => op.as_str(),
            Operator::Conditional => "?",
        }
    }
}

/// Visitor pattern for AST traversal
pub trait ExprVisitor {
    type Result;

    fn visit_string(&mut self, value: &str) -> Self::Result;
    fn visit_number(&mut self, value: f64) -> Self::Result;
    fn visit_reserved(&mut self, keyword: Keyword) -> Self::Result;
    fn visit_identifier(&mut self, name: &str) -> Self::Result;
    fn visit_array(&mut self, items: &[Expr]) -> Self::Result;
    fn visit_object(&mut self, entries: &[ObjectEntry]) -> Self::Result;
    fn visit_global_call(&mut self, name: &str, args: &[Expr]) -> Self::Result;
    fn visit_chain(&mut self, head: &Expr, suffixes: &[Suffix]) -> Self::Result;
    fn visit_binary(&mut self, op: BinaryOperator, left: &Expr, right: &Expr) -> Self::Result;
    fn visit_ternary(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: Option<&Expr>,
    ) -> Self::Result;
    fn visit_paren(&mut self, inner: &Expr) -> Self::Result;
}
