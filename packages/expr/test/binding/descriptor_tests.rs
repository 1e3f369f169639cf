/**
 * Binding Descriptor Tests
 *
 * Registration, change filtering and batch re-evaluation
 */

#[cfg(test)]
mod tests {
    use natural_expr::binding::{
        evaluate_bindings, BindingDescriptor, BindingMap, Target, UpdateValue, WriteKind,
    };
    use natural_expr::config::ParseOptions;
    use natural_expr::{EvalContext, ExprError, Value};
    use serde_json::json;

    fn sample_map() -> BindingMap {
        let mut map = BindingMap::new();
        map.register("#name", WriteKind::Value, "{user.name}");
        map.register(
            "#greeting",
            WriteKind::Text { index: 0 },
            "Hello, {user.name}! You are {age}.",
        );
        map.register(
            "#badge",
            WriteKind::Attribute {
                name: "class".to_string(),
            },
            "{age > 19 ? 'adult' : 'minor'}",
        );
        map.register("#static", WriteKind::Text { index: 1 }, "no bindings here");
        map
    }

    #[test]
    fn registers_one_descriptor_per_key() {
        let map = sample_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["user", "age"]);
        assert_eq!(map.descriptors_for("user").len(), 2);
        assert_eq!(map.descriptors_for("age").len(), 2);
        assert!(map.descriptors_for("missing").is_empty());
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn filters_by_changed_keys() {
        let map = sample_map();
        let targets = |changed: &[&str]| -> Vec<String> {
            map.affected_by(changed.iter().copied())
                .into_iter()
                .map(|d| d.target.to_string())
                .collect()
        };

        assert_eq!(targets(&["user"]), vec!["#name", "#greeting"]);
        assert_eq!(targets(&["age"]), vec!["#greeting", "#badge"]);
        assert_eq!(targets(&["user", "age"]), vec!["#name", "#greeting", "#badge"]);
        assert!(targets(&["other"]).is_empty());
    }

    #[test]
    fn evaluates_affected_bindings() {
        let map = sample_map();
        let ctx = EvalContext::new(Value::from(json!({"user": {"name": "Kim"}, "age": 20})));
        let affected = map.affected_by(["user", "age"]);
        let updates = evaluate_bindings(&affected, &ctx, &ParseOptions::default());

        let results: Vec<(String, UpdateValue)> = updates
            .into_iter()
            .map(|u| (u.target.to_string(), u.result.expect("Should evaluate")))
            .collect();
        assert_eq!(
            results,
            vec![
                ("#name".to_string(), UpdateValue::Raw(Value::from("Kim"))),
                (
                    "#greeting".to_string(),
                    UpdateValue::Display("Hello, Kim! You are 20.".to_string())
                ),
                ("#badge".to_string(), UpdateValue::Display("adult".to_string())),
            ]
        );
    }

    #[test]
    fn reports_errors_per_binding() {
        let descriptors = vec![
            BindingDescriptor {
                key: "a".to_string(),
                expr: "{a.b.c}".to_string(),
                target: Target::from("#broken"),
                kind: WriteKind::Value,
            },
            BindingDescriptor {
                key: "a".to_string(),
                expr: "{a}".to_string(),
                target: Target::from("#ok"),
                kind: WriteKind::Text { index: 0 },
            },
        ];
        let ctx = EvalContext::new(Value::from(json!({"a": null})));
        let updates = evaluate_bindings(&descriptors, &ctx, &ParseOptions::default());

        assert!(matches!(updates[0].result, Err(ExprError::Eval(_))));
        assert_eq!(updates[1].result, Ok(UpdateValue::Display(String::new())));
    }

    #[test]
    fn serializes_descriptors() {
        let descriptor = BindingDescriptor {
            key: "age".to_string(),
            expr: "{age}".to_string(),
            target: Target::from("#age"),
            kind: WriteKind::Attribute {
                name: "title".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({
                "key": "age",
                "expr": "{age}",
                "target": "#age",
                "kind": {"type": "attribute", "name": "title"}
            })
        );
    }
}
