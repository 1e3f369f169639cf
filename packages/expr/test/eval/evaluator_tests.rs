/**
 * Evaluator Tests
 *
 * Operator semantics, reserved bindings and the order in which operands and
 * host functions are evaluated
 */

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use natural_expr::eval::{builtins, EvalContext, Meta, Object, Value};
    use natural_expr::parse;
    use serde_json::json;

    fn eval(template: &str, data: serde_json::Value) -> Value {
        let ctx = EvalContext::with_standard_globals(Value::from(data));
        parse(template, &ctx).expect("Should evaluate successfully")
    }

    /// A window with `log(tag)` that records each call and returns its tag,
    /// and a data object `obj` whose methods record themselves
    fn recording_context() -> (EvalContext, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));

        let mut window = Object::new();
        let log = Arc::clone(&calls);
        window.insert(
            "log".to_string(),
            Value::function("log", move |_, args| {
                let tag = args.first().cloned().unwrap_or_default();
                log.lock().unwrap().push(tag.to_js_string());
                Ok(tag)
            }),
        );

        let mut obj = Object::new();
        for name in ["f", "h"] {
            let log = Arc::clone(&calls);
            obj.insert(
                name.to_string(),
                Value::function(name, move |this, _| {
                    log.lock().unwrap().push(name.to_string());
                    Ok(this.clone())
                }),
            );
        }
        let mut data = Object::new();
        data.insert("obj".to_string(), Value::object(obj));

        let ctx = EvalContext::builder()
            .data(Value::object(data))
            .window(Value::object(window))
            .build();
        (ctx, calls)
    }

    #[test]
    fn evaluates_both_sides_of_logical_operators() {
        let (ctx, calls) = recording_context();
        let value = parse("{log('a') || log('b') && log('c')}", &ctx).unwrap();
        assert_eq!(value, Value::from("c"));
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn evaluates_both_ternary_branches() {
        let (ctx, calls) = recording_context();
        let value = parse("{true ? log('then') : log('else')}", &ctx).unwrap();
        assert_eq!(value, Value::from("then"));
        assert_eq!(*calls.lock().unwrap(), vec!["then", "else"]);
    }

    #[test]
    fn evaluates_arguments_before_the_accessor_fold() {
        let (ctx, calls) = recording_context();
        parse("{obj.f(log('1')).h(log('2'))}", &ctx).unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["1", "2", "f", "h"]);
    }

    #[test]
    fn evaluates_segments_in_source_order() {
        let (ctx, calls) = recording_context();
        let value = parse("{log('x')}-{log('y')}", &ctx).unwrap();
        assert_eq!(value, Value::from("x-y"));
        assert_eq!(*calls.lock().unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn applies_loose_and_strict_equality() {
        let data = json!({"a": 1, "s": "1", "list": [1]});
        assert_eq!(eval("{a == s}", data.clone()), Value::Bool(true));
        assert_eq!(eval("{a === s}", data.clone()), Value::Bool(false));
        assert_eq!(eval("{a != s}", data.clone()), Value::Bool(false));
        assert_eq!(eval("{a !== s}", data.clone()), Value::Bool(true));
        assert_eq!(eval("{list == s}", data.clone()), Value::Bool(true));
        assert_eq!(eval("{list === list}", data), Value::Bool(true));
    }

    #[test]
    fn applies_relational_comparison() {
        let data = json!({"a": 2});
        assert_eq!(eval("{'b' > 'a'}", data.clone()), Value::Bool(true));
        assert_eq!(eval("{'10' < '9'}", data.clone()), Value::Bool(true));
        assert_eq!(eval("{a >= '2'}", data.clone()), Value::Bool(true));
        assert_eq!(eval("{missing <= 1}", data), Value::Bool(false));
    }

    #[test]
    fn concatenates_and_coerces_with_plus() {
        let data = json!({});
        assert_eq!(eval("{'n' + 1 + 2}", data.clone()), Value::from("n12"));
        assert_eq!(eval("{1 + 2 + 'n'}", data.clone()), Value::from("3n"));
        assert_eq!(eval("{'6' / 2 - true}", data.clone()), Value::from(2.0));
        assert_eq!(eval("{0.1 + 0.2}", data), Value::from(0.30000000000000004));
    }

    #[test]
    fn renders_numbers_like_javascript_in_text() {
        let data = json!({"big": 1e21, "half": 0.5});
        assert_eq!(eval("{big}!", data.clone()), Value::from("1e+21!"));
        assert_eq!(eval("{half * 2}.", data.clone()), Value::from("1."));
        assert_eq!(eval("{1 / 0} {0 / 0}", data), Value::from("Infinity NaN"));
    }

    #[test]
    fn resolves_reserved_bindings() {
        let mut namespace = Object::new();
        namespace.insert(
            "label".to_string(),
            Value::function("label", |_, args| {
                Ok(Value::from(format!(
                    "[{}]",
                    args.first().map(Value::to_js_string).unwrap_or_default()
                )))
            }),
        );
        let ctx = EvalContext::builder()
            .data(Value::from(json!({"name": "kim"})))
            .root(Value::object(namespace))
            .query(Value::function("$", |_, args| {
                Ok(Value::array(args.to_vec()))
            }))
            .math(builtins::math())
            .json(builtins::json())
            .meta(Meta {
                index: Value::from(2.0),
                data: Value::from(json!({"row": "r"})),
                ..Default::default()
            })
            .build();

        assert_eq!(parse("{N.label(name)}", &ctx).unwrap(), Value::from("[kim]"));
        assert_eq!(parse("{$('#a', '#b').length}", &ctx).unwrap(), Value::from(2.0));
        assert_eq!(parse("{_.index + 1}", &ctx).unwrap(), Value::from(3.0));
        assert_eq!(parse("{_.data.row}", &ctx).unwrap(), Value::from("r"));
        assert_eq!(parse("{context.name}", &ctx).unwrap(), Value::from("kim"));
        assert_eq!(parse("{Math.floor(Math.PI)}", &ctx).unwrap(), Value::from(3.0));
        assert_eq!(
            parse("{JSON.stringify({a: [1, name]})}", &ctx).unwrap(),
            Value::from(r#"{"a":[1,"kim"]}"#)
        );
        assert_eq!(parse("{JSON.parse('[1,2]')[1]}", &ctx).unwrap(), Value::from(2.0));
    }

    #[test]
    fn evaluates_intrinsic_methods() {
        let data = json!({"s": "  Hello  ", "list": ["a", "b", "c"], "n": 3.14159});
        assert_eq!(eval("{s.trim().toLowerCase()}", data.clone()), Value::from("hello"));
        assert_eq!(eval("{s.trim().length}", data.clone()), Value::from(5.0));
        assert_eq!(eval("{list.slice(1).join('')}", data.clone()), Value::from("bc"));
        assert_eq!(eval("{list.indexOf('c')}", data.clone()), Value::from(2.0));
        assert_eq!(eval("{n.toFixed(2)}", data.clone()), Value::from("3.14"));
        assert_eq!(eval("{s.trim().charAt(1)}", data.clone()), Value::from("e"));
        assert_eq!(eval("{s.includes('ell')}", data), Value::Bool(true));
    }

    #[test]
    fn does_not_mutate_context() {
        let ctx = EvalContext::with_standard_globals(Value::from(json!({"list": [3, 1, 2]})));
        let before = ctx.data().clone();
        parse("{list.concat([4]).slice(0).join()}", &ctx).unwrap();
        assert_eq!(ctx.data(), &before);
    }
}
