/**
 * Parser Tests
 *
 * Template structure, escapes, dialects and evaluation through the parse
 * entry point
 */

#[cfg(test)]
mod tests {
    use natural_expr::config::{Dialect, ParseOptions};
    use natural_expr::expression_parser::{ExprKind, Keyword, Parser, Segment, Template};
    use natural_expr::{parse, parse_with_options, EvalContext, Value};
    use serde_json::json;

    fn ctx(data: serde_json::Value) -> EvalContext {
        EvalContext::with_standard_globals(Value::from(data))
    }

    fn eval(template: &str, data: serde_json::Value) -> Value {
        parse(template, &ctx(data)).expect("Should evaluate successfully")
    }

    fn parse_template(input: &str) -> Template {
        Parser::default()
            .parse(input)
            .expect("Should parse successfully")
    }

    #[test]
    fn returns_plain_text_unchanged() {
        for text in ["plain text", "  spaced  ", "한글 텍스트", "a\\b", ""] {
            assert_eq!(eval(text, json!({})), Value::from(text));
        }
    }

    #[test]
    fn parses_escaped_braces() {
        assert_eq!(eval("\\{", json!({})), Value::from("{"));
        assert_eq!(eval("\\}", json!({})), Value::from("}"));
        assert_eq!(eval("\\{a\\}", json!({"a": 1})), Value::from("{a}"));
    }

    #[test]
    fn keeps_backslash_before_non_brace() {
        assert_eq!(eval("C:\\path", json!({})), Value::from("C:\\path"));
    }

    #[test]
    fn folds_strictly_left_to_right() {
        let data = json!({"a": 2, "b": 3});
        assert_eq!(eval("{a + b}", data.clone()), Value::from(5.0));
        assert_eq!(eval("{a + b * 2}", data.clone()), Value::from(10.0));
        assert_eq!(eval("{a - b - 1}", data), Value::from(-2.0));
    }

    #[test]
    fn evaluates_ternary() {
        let template = "{a > 0 ? 'yes' : 'no'}";
        assert_eq!(eval(template, json!({"a": 1})), Value::from("yes"));
        assert_eq!(eval(template, json!({"a": -1})), Value::from("no"));
    }

    #[test]
    fn ignores_else_tail_after_binary_operators() {
        let data = json!({"a": 2, "b": 3, "c": 9});
        assert_eq!(eval("{a + b : c}", data.clone()), Value::from(5.0));
        assert_eq!(eval("{a + b c}", data.clone()), Value::from(5.0));
        assert_eq!(eval("{a * b : c - 1}", data), Value::from(5.0));
    }

    #[test]
    fn reads_else_branch_without_colon() {
        assert_eq!(eval("{a ? 'yes' 'no'}", json!({"a": 0})), Value::from("no"));
        assert_eq!(eval("{a ? 'yes' 'no'}", json!({"a": 1})), Value::from("yes"));
    }

    #[test]
    fn evaluates_property_and_index_access() {
        assert_eq!(
            eval("{user.name}", json!({"user": {"name": "Kim"}})),
            Value::from("Kim")
        );
        assert_eq!(
            eval("{list[1]}", json!({"list": [10, 20, 30]})),
            Value::from(20.0)
        );
        assert_eq!(
            eval("{list[list.length - 1]}", json!({"list": [10, 20, 30]})),
            Value::from(30.0)
        );
    }

    #[test]
    fn evaluates_method_calls() {
        assert_eq!(
            eval("{s.toUpperCase()}", json!({"s": "abc"})),
            Value::from("ABC")
        );
        assert_eq!(
            eval("{s.slice(1).concat('!', n)}", json!({"s": "abc", "n": 1})),
            Value::from("bc!1")
        );
    }

    #[test]
    fn evaluates_reserved_bindings() {
        assert_eq!(eval("{Math.max(a, 7)}", json!({"a": 3})), Value::from(7.0));
        assert_eq!(eval("{context.a}", json!({"a": 3})), Value::from(3.0));
        assert_eq!(eval("{true && a}", json!({"a": "x"})), Value::from("x"));
    }

    #[test]
    fn evaluates_literals() {
        assert_eq!(
            eval("{[1, 'two', a]}", json!({"a": null})),
            Value::from(json!([1, "two", null]))
        );
        assert_eq!(
            eval("{ {x: a, y: [a]} }", json!({"a": 1})),
            Value::from(json!({"x": 1, "y": [1]}))
        );
    }

    #[test]
    fn single_expression_returns_raw_value() {
        assert_eq!(eval("{n}", json!({"n": 4})), Value::from(4.0));
        assert_eq!(eval(" {n}", json!({"n": 4})), Value::from(" 4"));
        assert_eq!(
            eval("{a}-{b}", json!({"a": 1, "b": [1, 2]})),
            Value::from("1-1,2")
        );
    }

    #[test]
    fn reparsing_is_idempotent() {
        let context = ctx(json!({"a": 2, "list": [1, 2]}));
        let template = "{a * 2} items: {list.join(', ')}";
        let first = parse(template, &context).unwrap();
        let second = parse(template, &context).unwrap();
        assert_eq!(first, second);
        assert_eq!(context.data(), &Value::from(json!({"a": 2, "list": [1, 2]})));
    }

    #[test]
    fn builds_segments_in_source_order() {
        let template = parse_template("Hello, {name}!");
        assert_eq!(template.segments.len(), 3);
        assert_eq!(template.segments[0], Segment::Literal("Hello, ".to_string()));
        assert!(matches!(
            &template.segments[1],
            Segment::Expression(expr) if expr.kind == ExprKind::Identifier("name".to_string())
        ));
        assert_eq!(template.segments[2], Segment::Literal("!".to_string()));
    }

    #[test]
    fn records_expression_spans() {
        let template = parse_template("ab{ x }");
        let Some(Segment::Expression(expr)) = template.segments.get(1) else {
            panic!("expected an expression segment");
        };
        assert_eq!((expr.span.start, expr.span.end), (4, 5));
    }

    #[test]
    fn matches_keywords_only_at_word_boundaries() {
        let template = parse_template("{Name}{N}{windows}");
        let kinds: Vec<ExprKind> = template.expressions().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ExprKind::Identifier("Name".to_string()),
                ExprKind::Reserved(Keyword::Root),
                ExprKind::Identifier("windows".to_string()),
            ]
        );
    }

    #[test]
    fn accepts_dollar_identifiers_in_extended_dialect() {
        assert_eq!(eval("{$total}", json!({"$total": 9})), Value::from(9.0));

        let classic = ParseOptions::default().with_dialect(Dialect::Classic);
        assert!(parse_with_options("{$total}", &ctx(json!({})), &classic).is_err());
    }

    #[test]
    fn accepts_hangul_identifiers() {
        assert_eq!(eval("{이름}님", json!({"이름": "김"})), Value::from("김님"));
    }

    #[test]
    fn classic_dialect_uses_doubled_braces() {
        let classic = ParseOptions::default().with_dialect(Dialect::Classic);
        let context = ctx(json!({"a": 1}));
        assert_eq!(
            parse_with_options("{{a}} = {a}", &context, &classic).unwrap(),
            Value::from("{a} = 1")
        );
        assert!(parse_with_options("{[1]}", &context, &classic).is_err());
    }

    #[test]
    fn memoization_is_transparent() {
        let context = ctx(json!({"a": 1, "b": {"c": [1, 2, 3]}}));
        let no_memo = ParseOptions::default().with_memoize(false);
        for template in [
            "{a + b.c[2] * (a + 1)} / {b.c.slice(1).join('')}",
            "{a ? b.c : 'none'}",
            "x\\{{a}\\}y",
        ] {
            assert_eq!(
                parse(template, &context).unwrap(),
                parse_with_options(template, &context, &no_memo).unwrap(),
                "template: {}",
                template
            );
        }
    }

    #[test]
    fn global_calls_resolve_through_window() {
        let mut window = natural_expr::eval::Object::new();
        window.insert(
            "double".to_string(),
            Value::function("double", |_, args| {
                Ok(Value::from(args.first().map_or(f64::NAN, Value::to_number) * 2.0))
            }),
        );
        let context = EvalContext::builder()
            .data(Value::from(json!({"a": 4})))
            .window(Value::object(window))
            .build();
        assert_eq!(parse("{double(a)}", &context).unwrap(), Value::from(8.0));
    }
}
