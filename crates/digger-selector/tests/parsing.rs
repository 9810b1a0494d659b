//! Selector parsing tests
//!
//! Grammar coverage and the JSON shape of the AST.

use digger_selector::{
    parse, parse_phase, AttrPredicate, Combinator, Literal, Operator, Phase, Pseudo, Selector,
    SyntaxError,
};

#[test]
fn test_class_shortcut_is_wildcard_tag() {
    let selector = parse(".red").unwrap();
    assert_eq!(selector.legs.len(), 1);
    assert_eq!(selector.legs[0].len(), 1);

    let phase = &selector.legs[0].head;
    assert_eq!(phase.tag, None);
    assert_eq!(phase.classes.iter().collect::<Vec<_>>(), vec!["red"]);
}

#[test]
fn test_tag_with_class() {
    let phase = &parse("city.south").unwrap().legs[0].head;
    assert_eq!(phase.tag.as_deref(), Some("city"));
    assert!(phase.classes.contains("south"));
}

#[test]
fn test_three_phase_leg() {
    let selector = parse("country[name^=U] > city.south area.poor").unwrap();
    let leg = &selector.legs[0];

    let phases: Vec<&Phase> = leg.phases().collect();
    assert_eq!(phases.len(), 3);
    assert_eq!(
        leg.combinators().collect::<Vec<_>>(),
        vec![Combinator::Child, Combinator::Descendant]
    );
    assert_eq!(
        phases[0].attrs,
        vec![AttrPredicate {
            field: "name".into(),
            operator: Operator::Prefix,
            value: Literal::String("U".into()),
        }]
    );
    assert_eq!(phases[1].tag.as_deref(), Some("city"));
    assert_eq!(phases[2].tag.as_deref(), Some("area"));
    assert!(phases[2].classes.contains("poor"));
}

#[test]
fn test_multiple_classes_are_conjunctive_set() {
    let phase = parse_phase("product.onsale.red.onsale").unwrap();
    assert_eq!(phase.classes.len(), 2);
}

#[test]
fn test_numeric_values_stay_numbers() {
    let phase = parse_phase("product[price<100]").unwrap();
    assert_eq!(phase.attrs[0].value, Literal::Number(100.0));
    assert_eq!(phase.attrs[0].value.as_number(), Some(100.0));
}

#[test]
fn test_pipeline_legs() {
    let selector: Selector = "product.onsale/caption.red".parse().unwrap();
    assert_eq!(selector.legs.len(), 2);
    assert!(selector.legs[0].head.classes.contains("onsale"));
    assert!(selector.legs[1].head.classes.contains("red"));
}

#[test]
fn test_modifiers() {
    assert_eq!(parse_phase("city.south:first").unwrap().modifier, Some(Pseudo::First));
    assert_eq!(parse_phase("city.south:last").unwrap().modifier, Some(Pseudo::Last));
    assert_eq!(
        parse_phase("city.south:limit(2)").unwrap().modifier,
        Some(Pseudo::Limit(2))
    );
}

#[test]
fn test_single_phase_rejects_combinators() {
    assert!(matches!(
        parse_phase("a > b"),
        Err(SyntaxError::UnexpectedChar { found: '>', .. })
    ));
}

#[test]
fn test_no_partial_results() {
    // The first leg is fine; the error in the second fails everything.
    let err = parse("product.onsale/caption[color").unwrap_err();
    assert!(matches!(err, SyntaxError::UnterminatedBracket { .. }));
    assert_eq!(err.offset(), Some(22));
}

#[test]
fn test_error_messages() {
    let err = parse("a:hover").unwrap_err();
    assert_eq!(err.to_string(), "unrecognized pseudo-modifier ':hover' at offset 1");

    let err = parse("a[x!=1]").unwrap_err();
    assert_eq!(err.to_string(), "unrecognized operator \"!=\" at offset 3");
}

#[test]
fn test_phase_json_shape() {
    let phase = parse_phase("product.onsale[price<100]").unwrap();
    let json = serde_json::to_value(&phase).unwrap();

    assert_eq!(json["tag"], "product");
    assert_eq!(json["class"], serde_json::json!(["onsale"]));
    assert_eq!(json["attr"][0]["field"], "price");
    assert_eq!(json["attr"][0]["operator"], "<");
    assert_eq!(json["attr"][0]["value"], 100.0);
}

#[test]
fn test_phase_from_json() {
    let json = r#"{
        "tag": "product",
        "class": ["onsale"],
        "attr": [{"field": "price", "operator": "<", "value": 100}]
    }"#;
    let phase: Phase = serde_json::from_str(json).unwrap();
    assert_eq!(phase.tag.as_deref(), Some("product"));
    assert!(phase.classes.contains("onsale"));
    assert_eq!(phase.attrs[0].value, Literal::Number(100.0));
    assert_eq!(phase.modifier, None);
}
