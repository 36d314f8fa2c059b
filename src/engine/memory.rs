//! In-process search engine.
//!
//! Implements the engine capability over `serde_json` documents so the
//! translation, mapping and pagination layers can run without a daemon.
//! Semantics follow the real engine where it matters to callers:
//!
//! - every query term must occur in some string attribute; the score is the
//!   sum of `1 + ln(tf)` over terms; an empty query matches everything
//! - `Equals(field, "")` matches a missing, null or empty attribute
//! - array attributes match when any element matches
//! - default limit is 20; `total` counts all matches before paging
//! - the `max_matches` option caps the reachable result window

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value as Json;
use std::any::Any;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::trace;

use super::{
    DocId, EngineHit, EngineQuery, EngineResultSet, IndexHandle, QueryHandle, SearchConnection,
    RELEVANCE_FIELD,
};
use crate::error::{Result, SearchError};
use crate::search::{Bound, Comparison, Filter, Scalar, SortDirection};

/// Limit applied when the query sets none.
pub const DEFAULT_LIMIT: usize = 20;

type Document = serde_json::Map<String, Json>;

/// Everything a query asked the engine for, captured at `get()` time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordedQuery {
    pub index: String,
    pub text: String,
    pub filters: Vec<Filter>,
    pub not_filters: Vec<Filter>,
    pub sorts: Vec<(String, SortDirection)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub options: serde_json::Map<String, Json>,
}

/// Shared in-memory engine. Clones share the same indexes.
#[derive(Clone, Default)]
pub struct InMemoryConnection {
    indexes: Arc<DashMap<String, BTreeMap<DocId, Document>>>,
    requests: Arc<Mutex<Vec<RecordedQuery>>>,
    fail_next: Arc<Mutex<Option<String>>>,
}

impl InMemoryConnection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index (no-op if it exists).
    pub fn create_index(&self, name: &str) {
        self.indexes.entry(name.to_string()).or_default();
    }

    /// Insert or replace a document. The document must be a JSON object.
    pub fn upsert(&self, index: &str, id: DocId, document: Json) -> Result<()> {
        let Json::Object(document) = document else {
            return Err(SearchError::Backend(format!(
                "document {} for index '{}' is not an object",
                id, index
            )));
        };
        self.indexes
            .entry(index.to_string())
            .or_default()
            .insert(id, document);
        Ok(())
    }

    /// Remove a document; returns whether it existed.
    pub fn remove(&self, index: &str, id: DocId) -> bool {
        self.indexes
            .get_mut(index)
            .map(|mut docs| docs.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Number of documents in an index (0 if it does not exist).
    #[must_use]
    pub fn len(&self, index: &str) -> usize {
        self.indexes.get(index).map(|docs| docs.len()).unwrap_or(0)
    }

    /// Make the next `get()` fail with a backend error.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    /// All executed requests, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedQuery> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<RecordedQuery> {
        self.requests.lock().last().cloned()
    }

    fn run(&self, request: &RecordedQuery) -> Result<EngineResultSet> {
        self.requests.lock().push(request.clone());

        if let Some(message) = self.fail_next.lock().take() {
            return Err(SearchError::Backend(message));
        }

        let docs = self.indexes.get(&request.index).ok_or_else(|| {
            SearchError::Backend(format!("unknown index '{}'", request.index))
        })?;

        let terms = tokenize(&request.text);
        let mut matched: Vec<Candidate<'_>> = docs
            .iter()
            .filter_map(|(id, doc)| {
                let score = relevance(&terms, doc)?;
                let keep = request.filters.iter().all(|f| matches_filter(f, doc))
                    && !request.not_filters.iter().any(|f| matches_filter(f, doc));
                keep.then_some(Candidate {
                    id: *id,
                    score,
                    doc,
                })
            })
            .collect();

        let default_sort = [(RELEVANCE_FIELD.to_string(), SortDirection::Desc)];
        let sorts = if request.sorts.is_empty() {
            &default_sort[..]
        } else {
            &request.sorts[..]
        };
        matched.sort_by(|a, b| compare_candidates(a, b, sorts));

        let total = matched.len() as u64;
        if let Some(max) = request.options.get("max_matches").and_then(Json::as_u64) {
            matched.truncate(usize::try_from(max).unwrap_or(usize::MAX));
        }

        let hits: Vec<EngineHit> = matched
            .into_iter()
            .skip(request.offset.unwrap_or(0))
            .take(request.limit.unwrap_or(DEFAULT_LIMIT))
            .map(|c| EngineHit {
                id: c.id,
                score: c.score,
                attributes: c.doc.clone(),
            })
            .collect();

        trace!(index = %request.index, total, returned = hits.len(), "in-memory search");
        Ok(EngineResultSet { hits, total })
    }
}

impl SearchConnection for InMemoryConnection {
    fn index(&self, name: &str) -> Box<dyn IndexHandle> {
        Box::new(MemoryIndex {
            name: name.to_string(),
            connection: self.clone(),
        })
    }
}

struct MemoryIndex {
    name: String,
    connection: InMemoryConnection,
}

impl IndexHandle for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, text: &str) -> Box<dyn EngineQuery> {
        Box::new(MemoryQuery {
            connection: self.connection.clone(),
            request: RecordedQuery {
                index: self.name.clone(),
                text: text.to_string(),
                ..Default::default()
            },
        })
    }
}

/// Query handle of the in-memory engine.
pub struct MemoryQuery {
    connection: InMemoryConnection,
    request: RecordedQuery,
}

impl MemoryQuery {
    /// The request as built so far.
    pub fn request(&self) -> &RecordedQuery {
        &self.request
    }
}

impl QueryHandle for MemoryQuery {
    fn filter(&mut self, filter: Filter) {
        self.request.filters.push(filter);
    }

    fn not_filter(&mut self, filter: Filter) {
        self.request.not_filters.push(filter);
    }

    fn sort(&mut self, field: &str, direction: SortDirection) {
        self.request.sorts.push((field.to_string(), direction));
    }

    fn limit(&mut self, limit: usize) {
        self.request.limit = Some(limit);
    }

    fn offset(&mut self, offset: usize) {
        self.request.offset = Some(offset);
    }

    fn option(&mut self, name: &str, value: Json) {
        self.request.options.insert(name.to_string(), value);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[async_trait]
impl EngineQuery for MemoryQuery {
    fn handle(&mut self) -> &mut dyn QueryHandle {
        self
    }

    async fn get(&mut self) -> Result<EngineResultSet> {
        self.connection.run(&self.request)
    }
}

struct Candidate<'a> {
    id: DocId,
    score: f32,
    doc: &'a Document,
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn collect_terms(value: &Json, counts: &mut HashMap<String, usize>) {
    match value {
        Json::String(s) => {
            for token in tokenize(s) {
                *counts.entry(token).or_default() += 1;
            }
        }
        Json::Array(items) => items.iter().for_each(|v| collect_terms(v, counts)),
        _ => {}
    }
}

fn relevance(terms: &[String], doc: &Document) -> Option<f32> {
    if terms.is_empty() {
        return Some(1.0);
    }
    let mut counts = HashMap::new();
    doc.values().for_each(|v| collect_terms(v, &mut counts));

    let mut score = 0.0;
    for term in terms {
        let tf = *counts.get(term)?;
        score += 1.0 + (tf as f32).ln();
    }
    Some(score)
}

fn compare_attr(attr: &Json, scalar: &Scalar) -> Option<Ordering> {
    match (attr, scalar) {
        (Json::Number(n), s) => n.as_f64()?.partial_cmp(&s.as_f64()?),
        (Json::String(a), Scalar::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        (Json::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn any_element(attr: Option<&Json>, pred: impl Fn(&Json) -> bool) -> bool {
    match attr {
        None => false,
        Some(Json::Array(items)) => items.iter().any(pred),
        Some(v) => pred(v),
    }
}

fn within(attr: &Json, lower: Option<&Bound>, upper: Option<&Bound>) -> bool {
    let lower_ok = lower.map_or(true, |b| match compare_attr(attr, &b.value) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => b.inclusive,
        _ => false,
    });
    let upper_ok = upper.map_or(true, |b| match compare_attr(attr, &b.value) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => b.inclusive,
        _ => false,
    });
    lower_ok && upper_ok
}

fn matches_filter(filter: &Filter, doc: &Document) -> bool {
    let attr = doc.get(filter.field());
    match filter {
        Filter::Equals {
            value: Scalar::Text(s),
            ..
        } if s.is_empty() => match attr {
            None | Some(Json::Null) => true,
            Some(v) => v.as_str() == Some(""),
        },
        Filter::Equals { value, .. } => {
            any_element(attr, |v| compare_attr(v, value) == Some(Ordering::Equal))
        }
        Filter::Compare { op, value, .. } => any_element(attr, |v| {
            let Some(ord) = compare_attr(v, value) else {
                return false;
            };
            match op {
                Comparison::Lt => ord == Ordering::Less,
                Comparison::Gt => ord == Ordering::Greater,
                Comparison::Lte => ord != Ordering::Greater,
                Comparison::Gte => ord != Ordering::Less,
            }
        }),
        Filter::Range { lower, upper, .. } => {
            any_element(attr, |v| within(v, lower.as_ref(), upper.as_ref()))
        }
        Filter::In { values, .. } => values.iter().any(|s| {
            any_element(attr, |v| compare_attr(v, s) == Some(Ordering::Equal))
        }),
    }
}

fn type_rank(value: &Json) -> u8 {
    match value {
        Json::Null => 0,
        Json::Bool(_) => 1,
        Json::Number(_) => 2,
        Json::String(_) => 3,
        Json::Array(_) => 4,
        Json::Object(_) => 5,
    }
}

// Total order: null < bool < number < string < array < object.
fn compare_values(a: &Json, b: &Json) -> Ordering {
    match (a, b) {
        (Json::Bool(x), Json::Bool(y)) => x.cmp(y),
        (Json::Number(x), Json::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Json::String(x), Json::String(y)) => x.cmp(y),
        (Json::Array(x), Json::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(x, y)| compare_values(x, y))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_json(a: Option<&Json>, b: Option<&Json>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => compare_values(x, y),
        // Present values before missing ones
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_candidates(
    a: &Candidate<'_>,
    b: &Candidate<'_>,
    sorts: &[(String, SortDirection)],
) -> Ordering {
    for (field, direction) in sorts {
        let ord = if field == RELEVANCE_FIELD {
            a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal)
        } else {
            compare_json(a.doc.get(field), b.doc.get(field))
        };
        let ord = match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id.cmp(&b.id)
}
