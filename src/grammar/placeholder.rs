//! Placeholder grammar extension
//!
//! Productions for the `${path(.path)*(|filter(args)?)*}` syntax. These rules
//! reference the host grammar's `ident`, `path`, `ws` and literal atoms, so
//! they only validate once composed into the host rule set.

use super::rules::{group, lit, opt, r, star, Rule};

/// Rule name of a placeholder occurrence; also the alternative spliced into
/// the host's value production
pub const PLACEHOLDER_RULE: &str = "placeholder";

/// Rule name of one filter invocation inside a placeholder
pub const FILTER_CALL_RULE: &str = "filter_call";

/// Rule name of a single filter argument atom
pub const FILTER_ARG_RULE: &str = "filter_arg";

/// Extension rule list merged into the host grammar
pub fn placeholder_rules() -> Vec<Rule> {
    vec![
        Rule::choice(
            PLACEHOLDER_RULE,
            vec![vec![
                lit("${"),
                opt(r("ws")),
                r("path"),
                star(group(vec![
                    opt(r("ws")),
                    lit("|"),
                    opt(r("ws")),
                    r(FILTER_CALL_RULE),
                ])),
                opt(r("ws")),
                lit("}"),
            ]],
        ),
        Rule::choice(
            FILTER_CALL_RULE,
            vec![vec![
                r("ident"),
                opt(group(vec![
                    opt(r("ws")),
                    lit("("),
                    opt(r("ws")),
                    opt(group(vec![r("filter_args"), opt(r("ws"))])),
                    lit(")"),
                ])),
            ]],
        ),
        Rule::choice(
            "filter_args",
            vec![vec![
                r(FILTER_ARG_RULE),
                star(group(vec![
                    opt(r("ws")),
                    lit(","),
                    opt(r("ws")),
                    r(FILTER_ARG_RULE),
                ])),
            ]],
        ),
        Rule::choice(
            FILTER_ARG_RULE,
            vec![
                vec![r("string")],
                vec![r("number")],
                vec![r("boolean")],
                vec![r("path")],
            ],
        ),
    ]
}
