/**
 * Error Tests
 *
 * Furthest-failure syntax errors and runtime evaluation errors
 */

#[cfg(test)]
mod tests {
    use natural_expr::config::ParseOptions;
    use natural_expr::parse_util::Expected;
    use natural_expr::{parse, parse_with_options, EvalContext, EvalError, ExprError, SyntaxError, Value};
    use serde_json::json;

    fn syntax_error(template: &str) -> SyntaxError {
        match parse(template, &EvalContext::default()) {
            Err(ExprError::Syntax(err)) => err,
            other => panic!("expected a syntax error for {:?}, got {:?}", template, other),
        }
    }

    fn eval_error(template: &str, data: serde_json::Value) -> EvalError {
        match parse(template, &EvalContext::new(Value::from(data))) {
            Err(ExprError::Eval(err)) => err,
            other => panic!("expected an evaluation error for {:?}, got {:?}", template, other),
        }
    }

    #[test]
    fn reports_missing_right_operand_at_closing_brace() {
        let err = syntax_error("{a + }");
        assert!(err.offset() >= 5);
        assert_eq!(err.found, Some('}'));
        assert_eq!(err.location.start.line, 1);
        assert_eq!(err.location.start.column, 6);
        assert!(err.expected.contains(&Expected::Literal("(")));
        assert!(err.expected.contains(&Expected::Class("[0-9]")));
        assert!(err.message.starts_with("Expected "));
        assert!(err.message.ends_with("but \"}\" found."));
    }

    #[test]
    fn reports_end_of_input_for_unclosed_region() {
        let err = syntax_error("{a");
        assert_eq!(err.found, None);
        assert_eq!(err.offset(), 2);
        assert!(err.expected.contains(&Expected::Literal("}")));
        assert!(err.message.ends_with("but end of input found."));
    }

    #[test]
    fn reports_unmatched_closing_brace() {
        let err = syntax_error("text }");
        assert_eq!(err.offset(), 5);
        assert_eq!(err.found, Some('}'));
    }

    #[test]
    fn tracks_lines_and_columns() {
        let err = syntax_error("line one\n{a +\n}");
        assert_eq!(err.location.start.line, 3);
        assert_eq!(err.location.start.column, 1);
    }

    #[test]
    fn includes_source_name_and_context() {
        let options = ParseOptions::default().with_source_name("card.html");
        let err = match parse_with_options("{a + }", &EvalContext::default(), &options) {
            Err(ExprError::Syntax(err)) => err,
            other => panic!("expected a syntax error, got {:?}", other),
        };
        assert!(err.to_string().ends_with("(card.html@1:6)"));
        assert!(err
            .contextual_message()
            .ends_with("(\"{a + [ERROR ->]}\")"));
    }

    #[test]
    fn memoization_does_not_change_diagnostics() {
        let no_memo = ParseOptions::default().with_memoize(false);
        for template in ["{a + }", "{a", "{f(1, }", "x {list[} y", "{ {k: } }"] {
            let memo = parse(template, &EvalContext::default()).unwrap_err();
            let plain = parse_with_options(template, &EvalContext::default(), &no_memo).unwrap_err();
            assert_eq!(memo, plain, "template: {}", template);
        }
    }

    #[test]
    fn syntax_errors_win_over_evaluation_errors() {
        let err = parse("{missing.x} {", &EvalContext::default()).unwrap_err();
        assert!(err.as_syntax().is_some());
    }

    #[test]
    fn reads_property_of_undefined() {
        let err = eval_error("{x.y.z}", json!({"x": {}}));
        assert_eq!(
            err,
            EvalError::PropertyOfNullish {
                property: "z".to_string(),
                base: "undefined",
            }
        );
    }

    #[test]
    fn unpopulated_reserved_binding_fails_at_evaluation() {
        let err = eval_error("{N.util}", json!({}));
        assert_eq!(err.to_string(), "Cannot read properties of undefined (reading 'util')");
    }

    #[test]
    fn calls_non_function() {
        assert_eq!(
            eval_error("{a.b()}", json!({"a": {"b": 1}})),
            EvalError::NotCallable {
                name: "b".to_string()
            }
        );
        assert_eq!(
            eval_error("{missing()}", json!({})),
            EvalError::NotCallable {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn rejects_invalid_arguments() {
        let err = eval_error("{s.repeat(0 - 1)}", json!({"s": "x"}));
        assert!(matches!(err, EvalError::InvalidArgument { .. }));
    }

    #[test]
    fn rejects_oversized_strings_from_data() {
        let data = json!({"s": "ab", "n": 1e300});
        for template in ["{s.repeat(n)}", "{s.padStart(n)}", "{s.padEnd(n, '-')}"] {
            let err = eval_error(template, data.clone());
            assert!(
                err.to_string().ends_with("Invalid string length"),
                "template: {}",
                template
            );
        }
    }
}
