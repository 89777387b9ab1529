use rxschema::{CompileError, Engine, EngineConfig, ErrorKind, ResolutionError, TypeIdentifier};
use serde_json::json;

// ====== Resolution ======

#[test]
fn test_unknown_core_type() {
    let err = Engine::default().compile(&json!("//date")).unwrap_err();
    assert!(err.is_unknown_type());
    match err {
        CompileError::UnknownType { identifier, at } => {
            assert_eq!(identifier, TypeIdentifier::core("date"));
            assert!(at.is_root());
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unknown_prefix_points_at_type_key() {
    let err = Engine::default()
        .compile(&json!({"type": "//arr", "contents": "/nowhere/thing"}))
        .unwrap_err();

    match err {
        CompileError::Resolution { source, at } => {
            assert!(matches!(source, ResolutionError::UnknownPrefix { ref prefix, .. } if prefix == "nowhere"));
            assert_eq!(at.to_string(), "contents.type");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_canonical_names_compile() {
    let schema = Engine::default()
        .compile(&json!({"type": "tag:codesimply.com,2008:rx/core/str"}))
        .unwrap();
    assert_eq!(schema.type_identifier(), &TypeIdentifier::core("str"));
}

// ====== Malformed nodes ======

#[test]
fn test_malformed_nodes() {
    let engine = Engine::default();
    for spec in [json!(1), json!(null), json!(["//str"]), json!({"contents": "//str"}), json!({"type": 7})] {
        let err = engine.compile(&spec).unwrap_err();
        assert!(
            matches!(err, CompileError::MalformedNode { .. }),
            "{} should be malformed, got {}",
            spec,
            err
        );
    }
}

#[test]
fn test_malformed_nested_node_location() {
    let err = Engine::default()
        .compile(&json!({"type": "//seq", "contents": ["//str", 3]}))
        .unwrap_err();

    // The argument schema rejects the bad element before the constructor sees it.
    assert!(err.is_invalid_argument());
    assert_eq!(err.location().to_string(), "contents[1]");
}

// ====== Arguments ======

#[test]
fn test_missing_required_argument() {
    let err = Engine::default().compile(&json!({"type": "//arr"})).unwrap_err();

    match &err {
        CompileError::InvalidArgument { identifier, errors } => {
            assert_eq!(identifier, &TypeIdentifier::core("arr"));
            assert!(errors.first().is(&ErrorKind::Missing));
            assert_eq!(errors.first().path.to_string(), "contents");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unknown_argument() {
    let err = Engine::default()
        .compile(&json!({"type": "//str", "pattern": "^a"}))
        .unwrap_err();

    match err {
        CompileError::InvalidArgument { errors, .. } => {
            assert!(errors.first().is(&ErrorKind::Unexpected));
            assert_eq!(errors.first().path.to_string(), "pattern");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_argument_of_wrong_shape() {
    let err = Engine::default()
        .compile(&json!({"type": "//int", "range": {"min": "zero"}}))
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.location().to_string(), "range.min");
}

#[test]
fn test_nested_argument_errors_are_located() {
    let err = Engine::default()
        .compile(&json!({
            "type": "//rec",
            "required": {
                "items": {"type": "//arr", "contents": "//str", "length": {"min": -1.5}}
            }
        }))
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert_eq!(err.location().to_string(), "required.items.length.min");
}

#[test]
fn test_length_bounds_are_non_negative_integers() {
    let engine = Engine::default();
    for spec in [
        json!({"type": "//str", "length": {"min": -1}}),
        json!({"type": "//arr", "contents": "//any", "length": {"max-ex": -3}}),
        json!({"type": "//str", "length": {"max": 2.5}}),
    ] {
        let err = engine.compile(&spec).unwrap_err();
        assert!(err.is_invalid_argument(), "accepted {}", spec);
        assert_eq!(err.location().to_string().split('.').next(), Some("length"));
    }

    assert!(engine.compile(&json!({"type": "//str", "length": {"min": 0, "max": 4}})).is_ok());
    assert!(engine.compile(&json!({"type": "//int", "range": {"min": -1.5}})).is_ok());
}

#[test]
fn test_conflicting_value_arguments() {
    let err = Engine::default()
        .compile(&json!({"type": "//str", "value": "a", "values": ["a", "b"]}))
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_rest_conflicts_with_permissive() {
    let err = Engine::default()
        .compile(&json!({"type": "//rec", "rest": "//any", "strict": false}))
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_field_declared_twice() {
    let err = Engine::default()
        .compile(&json!({
            "type": "//rec",
            "required": {"a": "//int"},
            "optional": {"a": "//int"}
        }))
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(err.location().to_string(), "optional.a");
}

#[test]
fn test_empty_alternatives() {
    let err = Engine::default()
        .compile(&json!({"type": "//one", "of": []}))
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

// ====== Depth ======

#[test]
fn test_depth_limit() {
    let mut spec = json!("//str");
    for _ in 0..10 {
        spec = json!({"type": "//arr", "contents": spec});
    }

    let shallow = Engine::new(EngineConfig::new().with_max_depth(5)).unwrap();
    let err = shallow.compile(&spec).unwrap_err();
    assert!(matches!(err, CompileError::DepthExceeded { max_depth: 5, .. }));

    assert!(Engine::default().compile(&spec).is_ok());
}

#[test]
fn test_small_depth_limit_still_builds_engine() {
    for max_depth in 0..=3 {
        let engine = Engine::new(EngineConfig::new().with_max_depth(max_depth)).unwrap();
        assert!(engine.compile(&json!({"type": "//int", "range": {"min": 0}})).is_ok());

        let mut spec = json!("//int");
        for _ in 0..=max_depth {
            spec = json!({"type": "//seq", "contents": [spec], "tail": "//any"});
        }
        let err = engine.compile(&spec).unwrap_err();
        assert!(matches!(err, CompileError::DepthExceeded { max_depth: m, .. } if m == max_depth));
    }
}

#[test]
fn test_self_referential_learned_type() {
    let engine = Engine::new(
        EngineConfig::new()
            .with_prefix("example", "tag:example.com,EXAMPLE:rx/")
            .with_type("/example/forever", json!({"type": "//arr", "contents": "/example/forever"})),
    )
    .unwrap();

    let err = engine.compile(&json!("/example/forever")).unwrap_err();
    assert!(matches!(err, CompileError::DepthExceeded { max_depth: 100, .. }));
}

// ====== Learned types ======

#[test]
fn test_learned_types_reference_each_other() {
    let engine = Engine::new(
        EngineConfig::new()
            .with_prefix("shop", "tag:shop.example,2024:")
            .with_type(
                "/shop/order",
                json!({"type": "//rec", "required": {"id": "//int", "lines": {"type": "//arr", "contents": "/shop/line"}}}),
            )
            .with_type("/shop/line", json!({"type": "//rec", "required": {"sku": "//str", "qty": "//int"}})),
    )
    .unwrap();

    let schema = engine.compile(&json!("/shop/order")).unwrap();
    assert_eq!(schema.type_identifier().as_str(), "tag:shop.example,2024:order");

    assert!(schema.is_valid(&json!({"id": 1, "lines": [{"sku": "a", "qty": 2}]})));

    let error = schema
        .assert(&json!({"id": 1, "lines": [{"sku": "a", "qty": "two"}]}))
        .unwrap_err();
    assert_eq!(error.path.to_string(), "lines[0].qty");
}

#[test]
fn test_learned_type_takes_no_arguments() {
    let engine = Engine::new(EngineConfig::new().with_type("tag:example.com,2024:flag", json!("//bool")))
        .unwrap();

    assert!(engine.compile(&json!("tag:example.com,2024:flag")).is_ok());

    let err = engine
        .compile(&json!({"type": "tag:example.com,2024:flag", "value": true}))
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

// ====== Introspection ======

#[test]
fn test_engine_introspection() {
    let engine = Engine::new(EngineConfig::new().with_prefix("example", "tag:example.com,EXAMPLE:rx/"))
        .unwrap();

    let id = engine.resolve("/example/thing").unwrap();
    assert_eq!(id.as_str(), "tag:example.com,EXAMPLE:rx/thing");
    assert!(!engine.knows_type(&id));
    assert!(engine.knows_type(&engine.resolve("//seq").unwrap()));
    assert_eq!(engine.prefixes().get("example"), Some("tag:example.com,EXAMPLE:rx/"));
    assert!(engine.type_identifiers().all(|id| id.is_core()));
}
