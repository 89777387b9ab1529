//! Tests for sharing engines and compiled schemas across threads.

use rxschema::{CheckResult, Engine, EngineConfig, Schema};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn user_schema(engine: &Engine) -> Schema {
    engine
        .compile(&json!({
            "type": "//rec",
            "required": {
                "name": "//str",
                "age": {"type": "//int", "range": {"min": 0}}
            }
        }))
        .unwrap()
}

#[test]
fn test_concurrent_validation() {
    let schema = Arc::new(user_schema(&Engine::default()));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let result = schema.check(&json!({
                    "name": format!("User{}", i),
                    "age": 20 + i
                }));
                assert!(result.is_success());

                let result = schema.check(&json!({"name": i, "age": -1}));
                assert_eq!(result.into_result().unwrap_err().len(), 2);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_compilation() {
    let engine = Arc::new(
        Engine::new(
            EngineConfig::new()
                .with_prefix("example", "tag:example.com,EXAMPLE:rx/")
                .with_type("/example/id", json!({"type": "//int", "range": {"min": 1}})),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let schema = engine
                    .compile(&json!({"type": "//arr", "contents": "/example/id"}))
                    .unwrap();
                assert!(schema.is_valid(&json!([i + 1, i + 2])));
                assert!(!schema.is_valid(&json!([0])));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_check_many_preserves_order() {
    let schema = user_schema(&Engine::default());
    let values: Vec<_> = (0..200)
        .map(|i| {
            if i % 3 == 0 {
                json!({"name": "bad", "age": -i})
            } else {
                json!({"name": format!("u{}", i), "age": i})
            }
        })
        .collect();

    let results = schema.check_many(&values);
    assert_eq!(results.len(), values.len());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.is_failure(), i % 3 == 0 && i != 0, "value {}", i);
    }
}

#[test]
fn test_check_many_matches_sequential() {
    let schema = user_schema(&Engine::default());
    let values = vec![
        json!({"name": "a", "age": 1}),
        json!({"name": "b"}),
        json!([]),
        json!({"name": "c", "age": 3, "extra": true}),
    ];

    let render = |result: CheckResult| match result.into_result() {
        Ok(()) => "ok".to_string(),
        Err(errors) => errors.to_string(),
    };

    let parallel: Vec<_> = schema.check_many(&values).into_iter().map(render).collect();
    let sequential: Vec<_> = values.iter().map(|v| render(schema.check(v))).collect();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel[0], "ok");
}
