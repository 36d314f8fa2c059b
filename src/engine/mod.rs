//! Engine client capability.
//!
//! The search daemon's wire protocol lives behind these traits. A connection
//! hands out index handles, an index handle starts a query, and the query
//! collects filters, sort keys and paging before a single `get()` round trip.
//!
//! ```text
//! SearchConnection::index(name) ─→ IndexHandle::search(text) ─→ EngineQuery
//!                                                                 ├─ filter / not_filter
//!                                                                 ├─ sort / limit / offset / option
//!                                                                 └─ get().await ─→ EngineResultSet
//! ```
//!
//! [`QueryHandle`] is the non-executing half of a query. Extension callbacks
//! receive it, so they can customise a request but never run it.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use std::any::Any;

use crate::error::Result;
use crate::search::{Filter, SortDirection};

/// Document identifier assigned by the engine.
pub type DocId = u64;

/// Sort key that orders by relevance score.
pub const RELEVANCE_FIELD: &str = "_score";

/// Mutating view of an in-flight engine query.
pub trait QueryHandle: Send {
    fn filter(&mut self, filter: Filter);
    fn not_filter(&mut self, filter: Filter);
    fn sort(&mut self, field: &str, direction: SortDirection);
    fn limit(&mut self, limit: usize);
    fn offset(&mut self, offset: usize);
    /// Engine-specific query option (e.g. `max_matches`, `ranker`).
    fn option(&mut self, name: &str, value: serde_json::Value);
    /// Downcast hook for callbacks that need the concrete engine type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An engine query that can be executed.
#[async_trait]
pub trait EngineQuery: QueryHandle {
    /// The non-executing view handed to extension callbacks.
    fn handle(&mut self) -> &mut dyn QueryHandle;

    /// Run the query. Exactly one engine round trip.
    async fn get(&mut self) -> Result<EngineResultSet>;
}

pub trait IndexHandle: Send + Sync {
    fn name(&self) -> &str;
    fn search(&self, text: &str) -> Box<dyn EngineQuery>;
}

pub trait SearchConnection: Send + Sync {
    fn index(&self, name: &str) -> Box<dyn IndexHandle>;
}

/// One matched document as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineHit {
    pub id: DocId,
    pub score: f32,
    /// Stored attributes returned with the match
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl EngineHit {
    pub fn new(id: DocId, score: f32) -> Self {
        Self {
            id,
            score,
            attributes: serde_json::Map::new(),
        }
    }
}

/// Bounded page of hits plus the engine's total match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineResultSet {
    /// Hits in engine rank order
    pub hits: Vec<EngineHit>,
    /// Matches before paging (`total_found`)
    pub total: u64,
}

impl EngineResultSet {
    /// Number of hits in this page.
    #[must_use]
    pub fn count(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }
}
