/**
 * Expression Evaluator
 *
 * Walks the AST against an `EvalContext`. Operands are evaluated in the same
 * order an eager grammar would produce them: a chain's head first, then every
 * computed key and argument left to right, then the accessor fold. Both sides
 * of `&&`/`||` and both ternary branches are always evaluated.
 */
use tracing::trace;

use super::builtins::call_intrinsic;
use super::context::EvalContext;
use super::value::{Object, Value};
use crate::error::EvalError;
use crate::expression_parser::ast::*;

pub struct Evaluator<'a> {
    ctx: &'a EvalContext,
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &'a EvalContext) -> Self {
        Evaluator { ctx }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        expr.visit(self)
    }

    /// A template that is exactly one expression yields its raw value; any
    /// other template yields the concatenation of its segments.
    pub fn evaluate_template(&mut self, template: &Template) -> Result<Value, EvalError> {
        if let Some(expr) = template.single_expression() {
            return self.evaluate(expr);
        }

        let mut out = String::new();
        for segment in &template.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Expression(expr) => {
                    out.push_str(&self.evaluate(expr)?.to_display_string())
                }
            }
        }
        Ok(Value::String(out))
    }

    fn evaluate_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|expr| self.evaluate(expr)).collect()
    }

    fn accessor_key(&mut self, accessor: &Accessor) -> Result<String, EvalError> {
        match accessor {
            Accessor::Named(name) => Ok(name.clone()),
            Accessor::Computed(key) => Ok(self.evaluate(key)?.to_property_key()),
        }
    }
}

/// One resolved step of an accessor chain
enum Step {
    Get(String),
    Call(String, Vec<Value>),
}

/// Read `base[key]`
pub fn get_property(base: &Value, key: &str) -> Result<Value, EvalError> {
    match base {
        Value::Undefined | Value::Null => Err(EvalError::PropertyOfNullish {
            property: key.to_string(),
            base: base.type_name(),
        }),
        Value::String(s) => {
            if key == "length" {
                return Ok(Value::Number(s.encode_utf16().count() as f64));
            }
            Ok(array_index(key)
                .and_then(|index| {
                    let units: Vec<u16> = s.encode_utf16().collect();
                    units
                        .get(index)
                        .map(|unit| Value::String(String::from_utf16_lossy(&[*unit])))
                })
                .unwrap_or(Value::Undefined))
        }
        Value::Array(items) => {
            if key == "length" {
                return Ok(Value::Number(items.len() as f64));
            }
            Ok(array_index(key)
                .and_then(|index| items.get(index).cloned())
                .unwrap_or(Value::Undefined))
        }
        Value::Object(map) => Ok(map.get(key).cloned().unwrap_or(Value::Undefined)),
        Value::Function(func) if key == "name" => Ok(Value::String(func.name().to_string())),
        _ => Ok(Value::Undefined),
    }
}

/// Canonical array index: digits with no leading zero
fn array_index(key: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Call `receiver[name](...args)` with `receiver` as `this`
pub fn invoke_method(receiver: &Value, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match get_property(receiver, name)? {
        Value::Function(func) => func.call(receiver, args),
        Value::Undefined => call_intrinsic(receiver, name, args).unwrap_or_else(|| {
            Err(EvalError::UnknownMethod {
                name: name.to_string(),
                receiver: receiver.type_name(),
            })
        }),
        _ => Err(EvalError::NotCallable {
            name: name.to_string(),
        }),
    }
}

fn apply_binary(op: BinaryOperator, left: Value, right: Value) -> Value {
    use std::cmp::Ordering;

    match op {
        BinaryOperator::StrictEqual => Value::Bool(left.strict_equals(&right)),
        BinaryOperator::StrictNotEqual => Value::Bool(!left.strict_equals(&right)),
        BinaryOperator::Equal => Value::Bool(left.loose_equals(&right)),
        BinaryOperator::NotEqual => Value::Bool(!left.loose_equals(&right)),
        BinaryOperator::Less => Value::Bool(left.compare(&right) == Some(Ordering::Less)),
        BinaryOperator::Greater => Value::Bool(left.compare(&right) == Some(Ordering::Greater)),
        BinaryOperator::LessEqual => Value::Bool(matches!(
            left.compare(&right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOperator::GreaterEqual => Value::Bool(matches!(
            left.compare(&right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOperator::And => {
            if left.truthy() {
                right
            } else {
                left
            }
        }
        BinaryOperator::Or => {
            if left.truthy() {
                left
            } else {
                right
            }
        }
        BinaryOperator::Add => left.add(&right),
        BinaryOperator::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinaryOperator::Multiply => Value::Number(left.to_number() * right.to_number()),
        BinaryOperator::Divide => Value::Number(left.to_number() / right.to_number()),
    }
}

impl<'a> ExprVisitor for Evaluator<'a> {
    type Result = Result<Value, EvalError>;

    fn visit_string(&mut self, value: &str) -> Self::Result {
        Ok(Value::String(value.to_string()))
    }

    fn visit_number(&mut self, value: f64) -> Self::Result {
        Ok(Value::Number(value))
    }

    fn visit_reserved(&mut self, keyword: Keyword) -> Self::Result {
        Ok(self.ctx.keyword(keyword))
    }

    fn visit_identifier(&mut self, name: &str) -> Self::Result {
        get_property(self.ctx.data(), name)
    }

    fn visit_array(&mut self, items: &[Expr]) -> Self::Result {
        Ok(Value::array(self.evaluate_all(items)?))
    }

    fn visit_object(&mut self, entries: &[ObjectEntry]) -> Self::Result {
        let mut map = Object::with_capacity(entries.len());
        for entry in entries {
            let value = self.evaluate(&entry.value)?;
            map.insert(entry.key.clone(), value);
        }
        Ok(Value::object(map))
    }

    fn visit_global_call(&mut self, name: &str, args: &[Expr]) -> Self::Result {
        let args = self.evaluate_all(args)?;
        let window = self.ctx.window();
        let mut callee = if window.is_nullish() {
            Value::Undefined
        } else {
            get_property(window, name)?
        };
        if matches!(callee, Value::Undefined) {
            if let Some(keyword) = Keyword::from_name(name) {
                callee = self.ctx.keyword(keyword);
            }
        }

        trace!(name, args = args.len(), "global call");
        match callee {
            Value::Function(func) => func.call(window, &args),
            _ => Err(EvalError::NotCallable {
                name: name.to_string(),
            }),
        }
    }

    fn visit_chain(&mut self, head: &Expr, suffixes: &[Suffix]) -> Self::Result {
        let mut result = self.evaluate(head)?;

        let mut steps = Vec::with_capacity(suffixes.len());
        for suffix in suffixes {
            steps.push(match suffix {
                Suffix::Get(accessor) => Step::Get(self.accessor_key(accessor)?),
                Suffix::Call { accessor, args } => {
                    let key = self.accessor_key(accessor)?;
                    Step::Call(key, self.evaluate_all(args)?)
                }
            });
        }

        for step in steps {
            result = match step {
                Step::Get(key) => get_property(&result, &key)?,
                Step::Call(key, args) => invoke_method(&result, &key, &args)?,
            };
        }
        Ok(result)
    }

    fn visit_binary(&mut self, op: BinaryOperator, left: &Expr, right: &Expr) -> Self::Result {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        Ok(apply_binary(op, left, right))
    }

    fn visit_ternary(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: Option<&Expr>,
    ) -> Self::Result {
        let condition = self.evaluate(condition)?;
        let then_value = self.evaluate(then_branch)?;
        let else_value = match else_branch {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Undefined,
        };
        Ok(if condition.truthy() {
            then_value
        } else {
            else_value
        })
    }

    fn visit_paren(&mut self, inner: &Expr) -> Self::Result {
        self.evaluate(inner)
    }
}
