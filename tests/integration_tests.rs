//! Integration tests for the rule-template engine

use pretty_assertions::assert_eq;
use rule_template::{Binding, Bindings, PrepareError, TemplateParser, Value, VariableType};

#[test]
fn test_full_pipeline() {
    let parser = TemplateParser::new();
    let template = parser
        .parse(r#"EventIs(${EVENT}) && ${COUNT} > 10 && severity in [${LEVEL}, "fatal"]"#)
        .expect("Should parse");

    let vars = parser.extract_variables(&template);
    let names: Vec<_> = vars.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["EVENT", "COUNT", "LEVEL"]);

    let bindings = Bindings::from([
        ("EVENT".to_string(), Binding::string("start")),
        ("COUNT".to_string(), Binding::number(42.0)),
        ("LEVEL".to_string(), Binding::string("warn")),
    ]);

    let validation = parser.validate(&template, &bindings);
    assert!(validation.valid, "errors: {:?}", validation.errors);

    let resolved = parser.prepare(&template, &bindings).expect("Should prepare");
    assert_eq!(
        resolved,
        r#"EventIs("start") && 42 > 10 && severity in ["warn", "fatal"]"#
    );

    // The resolved rule parses under the bare host grammar
    parser.check_resolved(&resolved).expect("Should re-parse");
}

#[test]
fn test_round_trip_identity_without_placeholders() {
    let parser = TemplateParser::new();
    let input = r#"duration between 10 and 60 && !Matches(tag, "a.*b") || total / 3 >= 2.5"#;
    let template = parser.parse(input).expect("Should parse");
    let resolved = parser
        .prepare(&template, &Bindings::new())
        .expect("Should prepare");
    assert_eq!(resolved, input);
}

#[test]
fn test_multiplicity_and_positions() {
    let parser = TemplateParser::new();
    let template = parser.parse("${VALUE} > 10 && ${VALUE} < 20").expect("Should parse");

    let vars = parser.extract_variables(&template);
    assert_eq!(vars.len(), 1);
    assert_eq!(vars[0].name, "VALUE");
    assert_eq!(vars[0].positions.len(), 2);
    assert!(vars[0].positions[0].start < vars[0].positions[1].start);
}

#[test]
fn test_strict_vs_advisory_type_asymmetry() {
    let parser = TemplateParser::new();
    let template = parser.parse("${A} > 1").expect("Should parse");
    let bindings = Bindings::from([("A".to_string(), Binding::untyped(5.0))]);

    // validate accepts a binding without a declared type
    assert!(parser.validate(&template, &bindings).valid);

    // prepare rejects the very same binding
    let err = parser
        .prepare(&template, &bindings)
        .expect_err("prepare should be strict");
    assert!(matches!(err, PrepareError::MissingType { name } if name == "A"));
}

#[test]
fn test_grammar_position_independence() {
    let parser = TemplateParser::new();
    let bindings = Bindings::from([("X".to_string(), Binding::number(7.0))]);

    let cases = [
        ("${X} > 10", "7 > 10"),
        ("EventIs(${X})", "EventIs(7)"),
        ("Max(${X}, Min(${X}, 3))", "Max(7, Min(7, 3))"),
        ("x in [${X}, 2, 3]", "x in [7, 2, 3]"),
        ("x between ${X} and 20", "x between 7 and 20"),
        ("x between 1 and ${X}", "x between 1 and 7"),
        ("(${X} + 1) * 2 == 16", "(7 + 1) * 2 == 16"),
    ];

    for (template_text, expected) in cases {
        let template = parser.parse(template_text).expect("Should parse");
        let resolved = parser.prepare(&template, &bindings).expect("Should prepare");
        assert_eq!(resolved, expected, "template: {}", template_text);
        parser.check_resolved(&resolved).expect("Should re-parse");
    }
}

#[test]
fn test_custom_filter_injection() {
    let mut parser = TemplateParser::new();
    parser.filters_mut().register("mask", |v, _| {
        let s = v.coerce_string();
        Ok(Value::String("*".repeat(s.chars().count())))
    });

    let template = parser.parse("secret == ${TOKEN|mask}").expect("Should parse");
    let bindings = Bindings::from([("TOKEN".to_string(), Binding::string("hunter2"))]);
    assert_eq!(
        parser.prepare(&template, &bindings).expect("Should prepare"),
        "secret == *******"
    );
}

#[test]
fn test_string_concat_and_escaping() {
    let parser = TemplateParser::new();
    let template = parser.parse(r#"greeting == "Dr. " + ${NAME}"#).expect("Should parse");
    let bindings = Bindings::from([(
        "NAME".to_string(),
        Binding::string(r#"O\"Brien"#),
    )]);
    assert_eq!(
        parser.prepare(&template, &bindings).expect("Should prepare"),
        r#"greeting == "Dr. " + "O\\\"Brien""#
    );
}

#[test]
fn test_validation_reports_everything_prepare_stops_at_first() {
    let parser = TemplateParser::new();
    let template = parser.parse("${A} > 1 && ${B} > 2 && ${C} > 3").expect("Should parse");
    let bindings = Bindings::from([(
        "B".to_string(),
        Binding {
            value: 1.0.into(),
            declared_type: Some("widget".to_string()),
        },
    )]);

    let validation = parser.validate(&template, &bindings);
    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 3);

    let err = parser.prepare(&template, &bindings).expect_err("should fail");
    assert!(matches!(err, PrepareError::MissingBinding { name } if name == "A"));
}

#[test]
fn test_time_period_binding_in_call() {
    let parser = TemplateParser::new();
    let template = parser
        .parse("WithinWindow(${PERIOD}) && active == true")
        .expect("Should parse");
    let bindings = Bindings::from([(
        "PERIOD".to_string(),
        Binding::typed("90d", VariableType::TimePeriod),
    )]);
    assert_eq!(
        parser.prepare(&template, &bindings).expect("Should prepare"),
        "WithinWindow(90d) && active == true"
    );
}

#[test]
fn test_parse_error_surfaces_position() {
    let parser = TemplateParser::new();
    let err = parser.parse("count > 10 &&").expect_err("should fail");
    // Failure is at the dangling operator, not the start of input
    assert!(err.span().start >= 11, "span was {:?}", err.span());
    let report = err.format("count > 10 &&", "<test>");
    assert!(report.contains("<test>"));
}
