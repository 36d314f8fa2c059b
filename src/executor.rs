//! Search execution.
//!
//! [`SearchExecutor`] turns a [`Query`] snapshot into exactly one engine round
//! trip:
//!
//! ```text
//! index(query.index).search(query.text)
//!     ├─→ filter / not_filter   (one per constraint, call order)
//!     ├─→ callback(handle)      (once, cannot execute)
//!     ├─→ sort                  (explicit keys, else _score desc)
//!     ├─→ limit / offset        (pushed down, never truncated locally)
//!     └─→ get()                 → hits in rank order + engine total
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::engine::{DocId, SearchConnection, RELEVANCE_FIELD};
use crate::error::Result;
use crate::metrics;
use crate::search::{Query, SortDirection};

/// One matched document in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub id: DocId,
    pub score: f32,
    /// Zero-based position in the full result order (offset included)
    pub rank: usize,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// Ordered hits plus the engine-reported match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    pub hits: Vec<Hit>,
    /// Full match count, independent of the requested page size
    pub total_count: u64,
}

impl SearchResult {
    #[must_use]
    pub fn count(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hit identifiers in rank order.
    #[must_use]
    pub fn ids(&self) -> Vec<DocId> {
        self.hits.iter().map(|h| h.id).collect()
    }
}

/// Drives the engine for one query at a time.
#[derive(Clone)]
pub struct SearchExecutor {
    connection: Arc<dyn SearchConnection>,
    default_limit: Option<usize>,
}

impl SearchExecutor {
    pub fn new(connection: Arc<dyn SearchConnection>) -> Self {
        Self {
            connection,
            default_limit: None,
        }
    }

    /// Limit applied by [`execute`](Self::execute) when the query sets none.
    #[must_use]
    pub fn with_default_limit(mut self, limit: Option<usize>) -> Self {
        self.default_limit = limit;
        self
    }

    /// Run the query with its own limit/offset.
    pub async fn execute(&self, query: &Query) -> Result<SearchResult> {
        self.run(query, query.limit.or(self.default_limit), query.offset)
            .await
    }

    /// Run one page of the query. `page` is 1-based; 0 is treated as 1.
    pub async fn paginate(&self, query: &Query, per_page: usize, page: usize) -> Result<SearchResult> {
        let offset = per_page.saturating_mul(page.max(1) - 1);
        self.run(query, Some(per_page), Some(offset)).await
    }

    async fn run(&self, query: &Query, limit: Option<usize>, offset: Option<usize>) -> Result<SearchResult> {
        let start = Instant::now();
        let index = self.connection.index(&query.index);
        let mut request = index.search(&query.text);

        for clause in query.clauses() {
            if clause.negated {
                request.not_filter(clause.filter);
            } else {
                request.filter(clause.filter);
            }
        }

        if query.soft_delete {
            debug!(index = %query.index, scope = ?query.trashed, "Soft-delete scope recorded, no filter applied");
        }

        if let Some(callback) = &query.callback {
            callback(request.handle());
        }

        if query.sorts.is_empty() {
            request.sort(RELEVANCE_FIELD, SortDirection::Desc);
        } else {
            for key in &query.sorts {
                request.sort(&key.field, key.direction);
            }
        }

        if let Some(limit) = limit {
            request.limit(limit);
        }
        if let Some(offset) = offset {
            request.offset(offset);
        }

        debug!(
            index = %query.index,
            text = %query.text,
            constraints = query.constraints.len() + query.negated_constraints.len(),
            ?limit,
            ?offset,
            "Dispatching search"
        );

        let raw = match request.get().await {
            Ok(raw) => raw,
            Err(e) => {
                metrics::record_search_query(&query.index, "error");
                warn!(index = %query.index, error = %e, "Search failed");
                return Err(e);
            }
        };

        metrics::record_search_query(&query.index, "success");
        metrics::record_search_latency(&query.index, start.elapsed());
        metrics::record_search_results(raw.count());

        let mut total_count = raw.total();
        if (total_count as usize) < raw.count() {
            warn!(
                index = %query.index,
                total = total_count,
                returned = raw.count(),
                "Engine total is smaller than the returned page"
            );
            total_count = raw.count() as u64;
        }

        let base = offset.unwrap_or(0);
        let hits = raw
            .hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| Hit {
                id: hit.id,
                score: hit.score,
                rank: base + i,
                attributes: hit.attributes,
            })
            .collect();

        Ok(SearchResult { hits, total_count })
    }
}
