/**
 * Template Expression Serializer
 *
 * Serializes the AST back to canonical text. Every fold step is wrapped in
 * parentheses so the left-to-right grouping is visible.
 */
use super::ast::*;
use crate::eval::value::number_to_string;

/// Serialize an expression to string
pub fn serialize(expr: &Expr) -> String {
    expr.visit(&mut SerializeExpressionVisitor)
}

/// Serialize a template, re-escaping literal braces
pub fn serialize_template(template: &Template) -> String {
    template
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.replace('{', "\\{").replace('}', "\\}"),
            Segment::Expression(expr) => format!("{{{}}}", serialize(expr)),
        })
        .collect()
}

struct SerializeExpressionVisitor;

impl SerializeExpressionVisitor {
    fn visit_args(&mut self, args: &[Expr]) -> String {
        args.iter()
            .map(|arg| arg.visit(self))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn visit_accessor(&mut self, accessor: &Accessor) -> String {
        match accessor {
            Accessor::Named(name) => format!(".{}", name),
            Accessor::Computed(key) => format!("[{}]", key.visit(self)),
        }
    }
}

impl ExprVisitor for SerializeExpressionVisitor {
    type Result = String;

    fn visit_string(&mut self, value: &str) -> String {
        if value.contains('"') {
            format!("'{}'", value)
        } else {
            format!("\"{}\"", value)
        }
    }

    fn visit_number(&mut self, value: f64) -> String {
        number_to_string(value)
    }

    fn visit_reserved(&mut self, keyword: Keyword) -> String {
        keyword.as_str().to_string()
    }

    fn visit_identifier(&mut self, name: &str) -> String {
        name.to_string()
    }

    fn visit_array(&mut self, items: &[Expr]) -> String {
        format!("[{}]", self.visit_args(items))
    }

    fn visit_object(&mut self, entries: &[ObjectEntry]) -> String {
        let entries = entries
            .iter()
            .map(|entry| format!("{}: {}", entry.key, entry.value.visit(self)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", entries)
    }

    fn visit_global_call(&mut self, name: &str, args: &[Expr]) -> String {
        format!("{}({})", name, self.visit_args(args))
    }

    fn visit_chain(&mut self, head: &Expr, suffixes: &[Suffix]) -> String {
        let mut out = head.visit(self);
        for suffix in suffixes {
            match suffix {
                Suffix::Get(accessor) => out.push_str(&self.visit_accessor(accessor)),
                Suffix::Call { accessor, args } => {
                    out.push_str(&self.visit_accessor(accessor));
                    out.push_str(&format!("({})", self.visit_args(args)));
                }
            }
        }
        out
    }

    fn visit_binary(&mut self, op: BinaryOperator, left: &Expr, right: &Expr) -> String {
        format!("({} {} {})", left.visit(self), op.as_str(), right.visit(self))
    }

    fn visit_ternary(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: Option<&Expr>,
    ) -> String {
        let condition = condition.visit(self);
        let then_branch = then_branch.visit(self);
        match else_branch {
            Some(else_branch) => format!(
                "({} ? {} : {})",
                condition,
                then_branch,
                else_branch.visit(self)
            ),
            None => format!("({} ? {})", condition, then_branch),
        }
    }

    fn visit_paren(&mut self, inner: &Expr) -> String {
        inner.visit(self)
    }
}
