/**
 * Value Tests
 *
 * Coercions, display text and JSON conversion of runtime values
 */

#[cfg(test)]
mod tests {
    use natural_expr::eval::{number_to_string, Object, Value};
    use serde_json::json;

    #[test]
    fn formats_numbers_like_javascript() {
        let cases = [
            (0.0, "0"),
            (-0.0, "0"),
            (42.0, "42"),
            (-3.5, "-3.5"),
            (1e20, "100000000000000000000"),
            (1e21, "1e+21"),
            (2.5e-7, "2.5e-7"),
            (0.000001, "0.000001"),
            (f64::INFINITY, "Infinity"),
        ];
        for (n, expected) in cases {
            assert_eq!(number_to_string(n), expected, "number: {:?}", n);
        }
    }

    #[test]
    fn converts_to_number() {
        assert_eq!(Value::from("  12.5 ").to_number(), 12.5);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert!(Value::Undefined.to_number().is_nan());
        assert!(Value::from("1,000").to_number().is_nan());
        assert_eq!(Value::from(json!([7])).to_number(), 7.0);
        assert!(Value::from(json!({})).to_number().is_nan());
    }

    #[test]
    fn converts_to_string() {
        assert_eq!(Value::from(json!([1, [2, 3], null])).to_js_string(), "1,2,3,");
        assert_eq!(Value::from(json!({"a": 1})).to_js_string(), "[object Object]");
        assert_eq!(Value::Undefined.to_js_string(), "undefined");
        assert_eq!(Value::Undefined.to_display_string(), "");
        assert_eq!(Value::Null.to_display_string(), "");
    }

    #[test]
    fn follows_truthiness_rules() {
        for falsy in [
            Value::Undefined,
            Value::Null,
            Value::Bool(false),
            Value::from(0.0),
            Value::from(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.truthy(), "{:?} should be falsy", falsy);
        }
        for truthy in [
            Value::from("0"),
            Value::from(json!([])),
            Value::from(json!({})),
            Value::from(-1.0),
        ] {
            assert!(truthy.truthy(), "{:?} should be truthy", truthy);
        }
    }

    #[test]
    fn compares_strings_by_utf16_units() {
        // U+FF61 sorts after U+1F600 in UTF-16 but before it by scalar value
        let a = Value::from("\u{FF61}");
        let b = Value::from("\u{1F600}");
        assert_eq!(a.compare(&b), Some(std::cmp::Ordering::Greater));
    }

    #[test]
    fn converts_from_and_to_json() {
        let source = json!({"b": 1, "a": [true, null, "x", 1.5]});
        let value = Value::from(source.clone());
        assert_eq!(value.to_json(), Some(source));

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn drops_unrepresentable_values_from_json() {
        let mut map = Object::new();
        map.insert("f".to_string(), Value::function("f", |_, _| Ok(Value::Undefined)));
        map.insert("u".to_string(), Value::Undefined);
        map.insert(
            "list".to_string(),
            Value::array(vec![Value::Undefined, Value::from(f64::NAN)]),
        );
        assert_eq!(
            Value::object(map).to_json(),
            Some(json!({"list": [null, null]}))
        );
        assert_eq!(Value::Undefined.to_json(), None);
    }

    #[test]
    fn serializes_through_serde() {
        let value = Value::from(json!({"n": 2, "s": "x"}));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"n":2,"s":"x"}"#);
    }
}
