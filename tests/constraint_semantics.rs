//! Constraint semantics against the in-memory engine.
//!
//! Each test seeds a small catalogue and checks which documents a builder
//! chain selects.
//!
//! Run with: `cargo test --test constraint_semantics`

use serde_json::json;
use std::sync::Arc;

use search_bridge::{DocId, InMemoryConnection, Scout, ScoutConfig, SearchBuilder, Value};

fn catalogue() -> Scout {
    let conn = InMemoryConnection::new();
    let docs = [
        (1, json!({"name": "trail shoe", "price": 5, "brand": "acme", "tags": ["outdoor"]})),
        (2, json!({"name": "road shoe", "price": 7, "brand": "zenith", "tags": ["sale"]})),
        (3, json!({"name": "court shoe", "price": 10, "brand": "acme", "discontinued_at": "2024-01-01"})),
        (4, json!({"name": "track shoe", "price": 12, "brand": "zenith", "discontinued_at": null})),
        (5, json!({"name": "hiking shoe", "price": 20, "brand": "orbit", "tags": ["outdoor", "sale"]})),
    ];
    for (id, doc) in docs {
        conn.upsert("shoes", id, doc).unwrap();
    }
    let config = ScoutConfig {
        default_limit: Some(100),
        ..ScoutConfig::default()
    };
    Scout::new(Arc::new(conn), config)
}

async fn ids(builder: SearchBuilder<'_>) -> Vec<DocId> {
    let mut ids = builder.keys().await.unwrap();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn diamond_operator_is_exact_match() {
    let scout = catalogue();
    let builder = scout.search_in("shoes", "shoe").where_op("price", "<>", 7).unwrap();
    assert_eq!(ids(builder).await, vec![2]);
}

#[tokio::test]
async fn not_equal_excludes_only_that_value() {
    let scout = catalogue();
    let builder = scout.search_in("shoes", "shoe").where_op("price", "!=", 7).unwrap();
    assert_eq!(ids(builder).await, vec![1, 3, 4, 5]);
}

#[tokio::test]
async fn comparison_aliases_agree() {
    let scout = catalogue();
    for (symbol, word) in [("<", "lt"), (">", "gt"), ("<=", "lte"), (">=", "gte"), ("=", "equals")] {
        let a = ids(scout.search_in("shoes", "").where_op("price", symbol, 10).unwrap()).await;
        let b = ids(scout.search_in("shoes", "").where_op("price", word, 10).unwrap()).await;
        assert_eq!(a, b, "{} vs {}", symbol, word);
    }
    let lte = ids(scout.search_in("shoes", "").where_op("price", "<=", 10).unwrap()).await;
    assert_eq!(lte, vec![1, 2, 3]);
}

#[tokio::test]
async fn empty_in_matches_nothing_and_empty_not_in_matches_everything() {
    let scout = catalogue();
    let none = ids(scout.search_in("shoes", "").where_in("brand", Vec::<&str>::new())).await;
    assert!(none.is_empty());

    let all = ids(scout.search_in("shoes", "").where_not_in("brand", Vec::<&str>::new())).await;
    assert_eq!(all, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn membership_matches_array_attributes() {
    let scout = catalogue();
    let sale = ids(scout.search_in("shoes", "").where_in("tags", vec!["sale"])).await;
    assert_eq!(sale, vec![2, 5]);

    let not_acme = ids(scout.search_in("shoes", "").where_not_in("brand", vec!["acme", "orbit"])).await;
    assert_eq!(not_acme, vec![2, 4]);
}

#[tokio::test]
async fn null_checks_treat_missing_as_null() {
    let scout = catalogue();
    let null = ids(scout.search_in("shoes", "").where_null("discontinued_at")).await;
    assert_eq!(null, vec![1, 2, 4, 5]);

    let not_null = ids(scout.search_in("shoes", "").where_not_null("discontinued_at")).await;
    assert_eq!(not_null, vec![3]);

    let two_arg = ids(
        scout
            .search_in("shoes", "")
            .constrain("discontinued_at", None, Value::Null)
            .unwrap(),
    )
    .await;
    assert_eq!(two_arg, null);
}

#[tokio::test]
async fn between_forms_select_the_same_documents() {
    let scout = catalogue();
    let pair = ids(
        scout
            .search_in("shoes", "")
            .where_between("price", vec![5, 10], Value::Null)
            .unwrap(),
    )
    .await;
    let scalars = ids(scout.search_in("shoes", "").where_between("price", 5, 10).unwrap()).await;
    assert_eq!(pair, vec![1, 2, 3]);
    assert_eq!(pair, scalars);

    let lower_only = ids(
        scout
            .search_in("shoes", "")
            .where_between("price", vec![7], Value::Null)
            .unwrap(),
    )
    .await;
    assert_eq!(lower_only, vec![2, 3, 4, 5]);

    let exclusive = ids(
        scout
            .search_in("shoes", "")
            .where_between_ops("price", 5, 10, "gt", "lt")
            .unwrap(),
    )
    .await;
    assert_eq!(exclusive, vec![2]);
}

#[tokio::test]
async fn constraint_order_does_not_change_the_result_set() {
    let scout = catalogue();
    let a = ids(
        scout
            .search_in("shoes", "shoe")
            .where_eq("brand", "zenith")
            .where_op("price", ">", 8)
            .unwrap(),
    )
    .await;
    let b = ids(
        scout
            .search_in("shoes", "shoe")
            .where_op("price", ">", 8)
            .unwrap()
            .where_eq("brand", "zenith"),
    )
    .await;
    assert_eq!(a, vec![4]);
    assert_eq!(a, b);
}

#[tokio::test]
async fn free_text_narrows_before_filters() {
    let scout = catalogue();
    let outdoor = ids(scout.search_in("shoes", "hiking").where_in("tags", vec!["outdoor"])).await;
    assert_eq!(outdoor, vec![5]);
}

#[tokio::test]
async fn null_with_operator_is_rejected() {
    let scout = catalogue();
    for token in ["=", ">", "in", "between"] {
        let err = scout
            .search_in("shoes", "")
            .where_op("discontinued_at", token, Value::Null)
            .err()
            .unwrap();
        assert!(err.is_invalid_constraint(), "{}", token);
    }
}

#[tokio::test]
async fn unknown_index_is_a_backend_error() {
    let scout = catalogue();
    let err = scout.search_in("boots", "").raw().await.unwrap_err();
    assert!(matches!(err, search_bridge::SearchError::Backend(_)));
}
