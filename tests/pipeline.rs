//! End-to-end pipeline tests against a scripted engine.
//!
//! The scripted engine answers every query with a canned result set and
//! records what the pipeline asked for, so these tests pin down the contract
//! between the adapter and the engine without any ranking logic involved.
//! One scenario is repeated against the in-memory engine to check that the
//! limit is enforced where the hits are produced.
//!
//! Run with: `cargo test --test pipeline`

use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use search_bridge::search::Filter;
use search_bridge::{
    DocId, EngineHit, EngineQuery, EngineResultSet, InMemoryConnection, IndexHandle, PageRequest,
    QueryHandle, Scout, ScoutConfig, SearchConnection, SearchError, Searchable, SortDirection,
    StaticPaginationContext,
};

// =============================================================================
// Scripted engine
// =============================================================================

#[derive(Debug, Clone, Default)]
struct Call {
    index: String,
    text: String,
    filters: Vec<Filter>,
    not_filters: Vec<Filter>,
    sorts: Vec<(String, SortDirection)>,
    limit: Option<usize>,
    offset: Option<usize>,
    executions: usize,
}

#[derive(Clone)]
struct ScriptedEngine {
    response: Arc<Mutex<Result<EngineResultSet, String>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedEngine {
    fn answering(hits: &[(DocId, f32)], total: u64) -> Self {
        let hits = hits.iter().map(|&(id, score)| EngineHit::new(id, score)).collect();
        Self {
            response: Arc::new(Mutex::new(Ok(EngineResultSet { hits, total }))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: Arc::new(Mutex::new(Err(message.to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn last_call(&self) -> Call {
        self.calls.lock().last().cloned().unwrap_or_default()
    }
}

impl SearchConnection for ScriptedEngine {
    fn index(&self, name: &str) -> Box<dyn IndexHandle> {
        Box::new(ScriptedIndex {
            name: name.to_string(),
            engine: self.clone(),
        })
    }
}

struct ScriptedIndex {
    name: String,
    engine: ScriptedEngine,
}

impl IndexHandle for ScriptedIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, text: &str) -> Box<dyn EngineQuery> {
        Box::new(ScriptedQuery {
            engine: self.engine.clone(),
            call: Call {
                index: self.name.clone(),
                text: text.to_string(),
                ..Default::default()
            },
        })
    }
}

struct ScriptedQuery {
    engine: ScriptedEngine,
    call: Call,
}

impl QueryHandle for ScriptedQuery {
    fn filter(&mut self, filter: Filter) {
        self.call.filters.push(filter);
    }

    fn not_filter(&mut self, filter: Filter) {
        self.call.not_filters.push(filter);
    }

    fn sort(&mut self, field: &str, direction: SortDirection) {
        self.call.sorts.push((field.to_string(), direction));
    }

    fn limit(&mut self, limit: usize) {
        self.call.limit = Some(limit);
    }

    fn offset(&mut self, offset: usize) {
        self.call.offset = Some(offset);
    }

    fn option(&mut self, _name: &str, _value: serde_json::Value) {}

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[async_trait]
impl EngineQuery for ScriptedQuery {
    fn handle(&mut self) -> &mut dyn QueryHandle {
        self
    }

    async fn get(&mut self) -> search_bridge::Result<EngineResultSet> {
        self.call.executions += 1;
        self.engine.calls.lock().push(self.call.clone());
        self.engine
            .response
            .lock()
            .clone()
            .map_err(SearchError::Backend)
    }
}

// =============================================================================
// Domain fixtures
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Product {
    id: DocId,
    name: String,
}

impl Searchable for Product {
    fn search_index() -> String {
        "products".into()
    }

    fn search_key(&self) -> DocId {
        self.id
    }
}

fn store(ids: &[DocId]) -> HashMap<DocId, Product> {
    ids.iter()
        .map(|&id| {
            (
                id,
                Product {
                    id,
                    name: format!("record {}", id),
                },
            )
        })
        .collect()
}

fn scout(engine: &ScriptedEngine) -> Scout {
    Scout::new(Arc::new(engine.clone()), ScoutConfig::default())
}

fn names(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
}

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn happy_simple_page_keeps_engine_order() {
    let engine = ScriptedEngine::answering(&[(9, 3.1), (4, 2.0)], 3);
    let scout = scout(&engine);

    let page = scout
        .search::<Product>("red shoes")
        .simple_paginate(&store(&[4, 7, 9]), PageRequest::new().per_page(2).page(1))
        .await
        .unwrap();

    assert_eq!(names(&page.items), vec!["record 9", "record 4"]);
    assert!(page.has_more_pages);
    assert_eq!(page.current_page, 1);

    let call = engine.last_call();
    assert_eq!(call.index, "products");
    assert_eq!(call.text, "red shoes");
    assert_eq!(call.limit, Some(2));
    assert_eq!(call.offset, Some(0));
    assert_eq!(call.executions, 1);
}

#[tokio::test]
async fn happy_simple_page_limits_at_the_engine() {
    let conn = InMemoryConnection::new();
    conn.upsert("products", 9, serde_json::json!({"name": "red red red shoes shoes"}))
        .unwrap();
    conn.upsert("products", 4, serde_json::json!({"name": "red red shoes"}))
        .unwrap();
    conn.upsert("products", 7, serde_json::json!({"name": "red shoes"}))
        .unwrap();
    conn.upsert("products", 2, serde_json::json!({"name": "blue hat"}))
        .unwrap();
    let scout = Scout::new(Arc::new(conn.clone()), ScoutConfig::default());

    let page = scout
        .search::<Product>("red shoes")
        .simple_paginate(&store(&[2, 4, 7, 9]), PageRequest::new().per_page(2).page(1))
        .await
        .unwrap();

    assert_eq!(names(&page.items), vec!["record 9", "record 4"]);
    assert!(page.has_more_pages);

    let request = conn.last_request().unwrap();
    assert_eq!(request.limit, Some(2));
    assert_eq!(request.offset, Some(0));
    assert_eq!(conn.requests().len(), 1);
}

#[tokio::test]
async fn happy_page_two_pushes_offset() {
    let engine = ScriptedEngine::answering(&[], 12);
    let scout = scout(&engine);

    let page = scout
        .search::<Product>("shoes")
        .paginate(&store(&[]), PageRequest::new().per_page(10).page(2))
        .await
        .unwrap();

    let call = engine.last_call();
    assert_eq!(call.offset, Some(10));
    assert_eq!(call.limit, Some(10));
    assert_eq!(page.total, 12);
    assert_eq!(page.last_page(), 2);
    assert!(!page.has_more_pages());
}

#[tokio::test]
async fn happy_exact_boundary_has_no_more_pages() {
    let engine = ScriptedEngine::answering(&[(1, 1.0), (2, 1.0)], 4);
    let scout = scout(&engine);

    let page = scout
        .search::<Product>("")
        .simple_paginate(&store(&[1, 2]), PageRequest::new().per_page(2).page(2))
        .await
        .unwrap();

    assert!(!page.has_more_pages);
    assert_eq!(page.next_page(), None);
    assert_eq!(page.previous_page(), Some(1));
}

#[tokio::test]
async fn happy_raw_page_skips_lookup() {
    let engine = ScriptedEngine::answering(&[(5, 2.5), (6, 1.0)], 2);
    let scout = scout(&engine);

    let page = scout
        .search_in("products", "boots")
        .paginate_raw(PageRequest::new().per_page(5))
        .await
        .unwrap();

    let ids: Vec<DocId> = page.items.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![5, 6]);
    assert_eq!(page.items[0].score, 2.5);
    assert_eq!(page.total, 2);
    assert_eq!(page.appends.get("query").map(String::as_str), Some("boots"));
}

#[tokio::test]
async fn happy_constraints_reach_engine_in_call_order() {
    let engine = ScriptedEngine::answering(&[], 0);
    let scout = scout(&engine);

    scout
        .search::<Product>("shoes")
        .where_eq("status", "active")
        .where_op("price", "!=", 30)
        .unwrap()
        .where_op("price", "<", 100)
        .unwrap()
        .where_not_in("brand", vec!["acme"])
        .order_by("price", SortDirection::Asc)
        .keys()
        .await
        .unwrap();

    let call = engine.last_call();
    assert_eq!(call.filters.len(), 2);
    assert_eq!(call.filters[0].field(), "status");
    assert_eq!(call.filters[1].field(), "price");
    assert_eq!(call.not_filters.len(), 2);
    assert_eq!(call.sorts, vec![("price".to_string(), SortDirection::Asc)]);
}

#[tokio::test]
async fn happy_defaults_come_from_config_and_context() {
    let engine = ScriptedEngine::answering(&[], 100);
    let config = ScoutConfig {
        per_page: 25,
        ..ScoutConfig::default()
    };
    let scout = Scout::new(Arc::new(engine.clone()), config)
        .with_context(Arc::new(StaticPaginationContext::new(Some(3), "/search")));

    let page = scout
        .search::<Product>("shoes")
        .paginate(&store(&[]), PageRequest::new().per_page(0))
        .await
        .unwrap();

    let call = engine.last_call();
    assert_eq!(call.limit, Some(25));
    assert_eq!(call.offset, Some(50));
    assert_eq!(page.current_page, 3);
    assert_eq!(page.path, "/search");
}

#[tokio::test]
async fn happy_missing_records_are_dropped() {
    let engine = ScriptedEngine::answering(&[(9, 3.1), (8, 2.0), (4, 1.0)], 3);
    let scout = scout(&engine);

    let records = scout
        .search::<Product>("shoes")
        .get(&store(&[4, 9]))
        .await
        .unwrap();

    assert_eq!(names(&records), vec!["record 9", "record 4"]);
}

// =============================================================================
// Failure scenarios
// =============================================================================

#[tokio::test]
async fn failure_backend_error_propagates() {
    let engine = ScriptedEngine::failing("connection refused");
    let scout = scout(&engine);

    let err = scout
        .search::<Product>("shoes")
        .paginate(&store(&[1]), PageRequest::new())
        .await
        .unwrap_err();

    assert_eq!(err, SearchError::Backend("connection refused".into()));
}

#[tokio::test]
async fn failure_invalid_operator_never_reaches_engine() {
    let engine = ScriptedEngine::answering(&[], 0);
    let scout = scout(&engine);

    let err = scout
        .search::<Product>("shoes")
        .where_op("price", "like", 5)
        .err()
        .unwrap();

    assert!(err.is_invalid_constraint());
    assert!(engine.calls.lock().is_empty());
}
