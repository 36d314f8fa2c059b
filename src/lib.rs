//! # Search Bridge
//!
//! Relational-style search constraints on top of a full-text engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SearchBuilder                           │
//! │  • where_eq / where_op / where_in / where_between ...       │
//! │  • Operator aliases resolved, shapes validated on entry    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (FilterTranslator per constraint)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SearchExecutor                          │
//! │  • filter / not_filter, callback, sort, limit, offset      │
//! │  • One engine round trip, hits in rank order + total       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │            ResultMapper / PaginationAssembler               │
//! │  • One batch record lookup, rank order preserved           │
//! │  • Simple, length-aware and raw pages                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use search_bridge::{InMemoryConnection, PageRequest, Scout, ScoutConfig};
//! use search_bridge::mapper::Searchable;
//! use serde_json::json;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Product { id: u64 }
//!
//! impl Searchable for Product {
//!     fn search_index() -> String { "products".into() }
//!     fn search_key(&self) -> u64 { self.id }
//! }
//!
//! # async fn run() -> search_bridge::Result<()> {
//! let conn = InMemoryConnection::new();
//! conn.upsert("products", 1, json!({"name": "red shoes", "price": 40}))?;
//! let store: HashMap<u64, Product> = [(1, Product { id: 1 })].into_iter().collect();
//!
//! let scout = Scout::new(Arc::new(conn), ScoutConfig::default());
//! let page = scout
//!     .search::<Product>("red shoes")
//!     .where_op("price", "<", 50)?
//!     .paginate(&store, PageRequest::new().per_page(10))
//!     .await?;
//! assert_eq!(page.total, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`search`]: Constraint model, operator table and filter translation
//! - [`engine`]: Engine capability traits and the in-memory engine
//! - [`executor`]: Single round-trip query execution
//! - [`mapper`]: Hit to record hydration
//! - [`pagination`]: Page assembly
//! - [`scout`]: Entry point

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod metrics;
pub mod pagination;
pub mod scout;
pub mod search;

pub use config::ScoutConfig;
pub use engine::memory::InMemoryConnection;
pub use engine::{DocId, EngineHit, EngineQuery, EngineResultSet, IndexHandle, QueryHandle, SearchConnection};
pub use error::{Result, SearchError};
pub use executor::{Hit, SearchExecutor, SearchResult};
pub use mapper::{RecordLookup, ResultMapper, Searchable};
pub use pagination::{
    LengthAwarePaginator, PageRequest, PaginationAssembler, PaginationContext, Paginator,
    StaticPaginationContext,
};
pub use scout::Scout;
pub use search::{OperatorKind, Query, SearchBuilder, SortDirection, Value};
