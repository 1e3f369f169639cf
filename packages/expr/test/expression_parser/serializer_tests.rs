/**
 * Serializer Tests
 *
 * Canonical text for parsed templates; every fold step is parenthesized
 */

#[cfg(test)]
mod tests {
    use natural_expr::expression_parser::{serialize, serialize_template, Expr, Parser};

    fn parse(expression: &str) -> Expr {
        Parser::default()
            .parse(expression)
            .expect("Should parse successfully")
            .single_expression()
            .cloned()
            .expect("Should be a single expression")
    }

    fn round_trip(template: &str) -> String {
        let parsed = Parser::default()
            .parse(template)
            .expect("Should parse successfully");
        serialize_template(&parsed)
    }

    #[test]
    fn serializes_binary_operations_left_folded() {
        assert_eq!(serialize(&parse("{ a   +   b *  2 }")), "((a + b) * 2)");
        assert_eq!(serialize(&parse("{a === b}")), "(a === b)");
    }

    #[test]
    fn serializes_explicit_grouping() {
        assert_eq!(serialize(&parse("{a + (b * 2)}")), "(a + (b * 2))");
    }

    #[test]
    fn serializes_conditionals() {
        assert_eq!(
            serialize(&parse("{ cond   ?   1234   :   4321 }")),
            "(cond ? 1234 : 4321)"
        );
        assert_eq!(serialize(&parse("{cond ? 1}")), "(cond ? 1)");
    }

    #[test]
    fn serializes_chains() {
        assert_eq!(serialize(&parse("{ foo.bar }")), "foo.bar");
        assert_eq!(serialize(&parse("{foo[bar].baz}")), "foo[bar].baz");
        assert_eq!(
            serialize(&parse("{foo.bar(1, 'x').baz()}")),
            "foo.bar(1, \"x\").baz()"
        );
    }

    #[test]
    fn serializes_global_calls() {
        assert_eq!(serialize(&parse("{fmt( a ,b )}")), "fmt(a, b)");
    }

    #[test]
    fn serializes_literals() {
        assert_eq!(serialize(&parse("{[ 1, 2.50 ,'a\"b' ]}")), "[1, 2.5, 'a\"b']");
        assert_eq!(
            serialize(&parse("{ {  foo:   bar,   baz:   [] } }")),
            "{foo: bar, baz: []}"
        );
        assert_eq!(serialize(&parse("{.5}")), "0.5");
    }

    #[test]
    fn serializes_reserved_names() {
        assert_eq!(
            serialize(&parse("{Math.max(N.x, _.index, $)}")),
            "Math.max(N.x, _.index, $)"
        );
    }

    #[test]
    fn reescapes_literal_braces() {
        assert_eq!(round_trip("a \\{ {b} \\}"), "a \\{ {b} \\}");
        assert_eq!(round_trip("x {a+b}"), "x {(a + b)}");
    }
}
