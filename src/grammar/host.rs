//! Host rule-expression grammar
//!
//! The base language the placeholders live in: boolean connectives,
//! comparisons, `between`/`in` clauses, arithmetic (which doubles as string
//! concatenation), function calls, array literals, quoted strings, numbers,
//! booleans, and dotted identifier paths.
//!
//! Alternatives are ordered for PEG semantics, so longer operators come before
//! their prefixes (`>=` before `>`) and keyword atoms before bare paths.
//! Whitespace is an explicit `ws` production, which keeps every byte of the
//! source accounted for by some node or inter-node gap.

use super::rules::{group, kw, lit, opt, r, star, Matcher, Rule};

/// Entry production for a complete rule expression
pub const ENTRY_RULE: &str = "statement";

/// Generic value production; grammar extensions are spliced in here
pub const VALUE_RULE: &str = "value";

/// The host grammar as a flat rule list
pub fn host_rules() -> Vec<Rule> {
    vec![
        Rule::choice(ENTRY_RULE, vec![vec![r("or_expr")]]),
        Rule::choice(
            "or_expr",
            vec![vec![
                r("and_expr"),
                star(group(vec![
                    opt(r("ws")),
                    r("or_op"),
                    opt(r("ws")),
                    r("and_expr"),
                ])),
            ]],
        ),
        Rule::choice("or_op", vec![vec![lit("||")], vec![kw("or")]]),
        Rule::choice(
            "and_expr",
            vec![vec![
                r("not_expr"),
                star(group(vec![
                    opt(r("ws")),
                    r("and_op"),
                    opt(r("ws")),
                    r("not_expr"),
                ])),
            ]],
        ),
        Rule::choice("and_op", vec![vec![lit("&&")], vec![kw("and")]]),
        Rule::choice(
            "not_expr",
            vec![
                vec![lit("!"), opt(r("ws")), r("not_expr")],
                vec![kw("not"), opt(r("ws")), r("not_expr")],
                vec![r("comparison")],
            ],
        ),
        Rule::choice(
            "comparison",
            vec![vec![
                r("sum"),
                opt(group(vec![opt(r("ws")), r("comparison_tail")])),
            ]],
        ),
        Rule::choice(
            "comparison_tail",
            vec![
                vec![r("between_clause")],
                vec![r("in_clause")],
                vec![r("comp_op"), opt(r("ws")), r("sum")],
            ],
        ),
        Rule::choice(
            "between_clause",
            vec![vec![
                kw("between"),
                r("ws"),
                r("sum"),
                r("ws"),
                kw("and"),
                r("ws"),
                r("sum"),
            ]],
        ),
        Rule::choice("in_clause", vec![vec![kw("in"), opt(r("ws")), r("array")]]),
        Rule::choice(
            "comp_op",
            vec![
                vec![lit("==")],
                vec![lit("!=")],
                vec![lit(">=")],
                vec![lit("<=")],
                vec![lit(">")],
                vec![lit("<")],
                vec![lit("=")],
            ],
        ),
        Rule::choice(
            "sum",
            vec![vec![
                r("product"),
                star(group(vec![
                    opt(r("ws")),
                    r("add_op"),
                    opt(r("ws")),
                    r("product"),
                ])),
            ]],
        ),
        Rule::choice("add_op", vec![vec![lit("+")], vec![lit("-")]]),
        Rule::choice(
            "product",
            vec![vec![
                r("unary"),
                star(group(vec![
                    opt(r("ws")),
                    r("mul_op"),
                    opt(r("ws")),
                    r("unary"),
                ])),
            ]],
        ),
        Rule::choice(
            "mul_op",
            vec![vec![lit("*")], vec![lit("/")], vec![lit("%")]],
        ),
        Rule::choice(
            "unary",
            vec![
                vec![lit("-"), opt(r("ws")), r("unary")],
                vec![r("primary")],
            ],
        ),
        Rule::choice(
            "primary",
            vec![
                vec![lit("("), opt(r("ws")), r("or_expr"), opt(r("ws")), lit(")")],
                vec![r(VALUE_RULE)],
            ],
        ),
        Rule::choice(
            VALUE_RULE,
            vec![
                vec![r("function_call")],
                vec![r("array")],
                vec![r("string")],
                vec![r("number")],
                vec![r("boolean")],
                vec![r("path")],
            ],
        ),
        Rule::choice(
            "function_call",
            vec![vec![
                r("ident"),
                opt(r("ws")),
                lit("("),
                opt(r("ws")),
                opt(group(vec![r("arg_list"), opt(r("ws"))])),
                lit(")"),
            ]],
        ),
        Rule::choice(
            "arg_list",
            vec![vec![
                r("or_expr"),
                star(group(vec![
                    opt(r("ws")),
                    lit(","),
                    opt(r("ws")),
                    r("or_expr"),
                ])),
            ]],
        ),
        Rule::choice(
            "array",
            vec![vec![
                lit("["),
                opt(r("ws")),
                opt(group(vec![r("arg_list"), opt(r("ws"))])),
                lit("]"),
            ]],
        ),
        // Placeholder-shaped text inside a string atom is consumed by this
        // terminal, so extensions spliced into `value` can never see it.
        Rule::terminal(
            "string",
            Matcher::Pattern(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#.to_string()),
        ),
        Rule::terminal(
            "number",
            Matcher::Pattern(r"\d+(?:\.\d+)?(?:[eE][+-]?\d+)?".to_string()),
        ),
        Rule::choice("boolean", vec![vec![kw("true")], vec![kw("false")]]),
        Rule::choice(
            "path",
            vec![vec![r("ident"), star(group(vec![lit("."), r("ident")]))]],
        ),
        Rule::terminal("ident", Matcher::Pattern("[A-Za-z_][A-Za-z0-9_]*".to_string())),
        Rule::terminal("ws", Matcher::Pattern(r"[ \t\r\n]+".to_string())),
    ]
}
