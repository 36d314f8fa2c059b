// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for search-bridge.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter.
//!
//! # Metric Naming Convention
//! - `search_bridge_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `index`: engine index name
//! - `status`: success, error
//! - `kind`: simple, length_aware, raw

use metrics::{counter, histogram};
use std::time::Duration;

/// Record an executed search
pub fn record_search_query(index: &str, status: &str) {
    counter!(
        "search_bridge_queries_total",
        "index" => index.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record search round-trip latency
pub fn record_search_latency(index: &str, duration: Duration) {
    histogram!(
        "search_bridge_query_seconds",
        "index" => index.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record hits returned in a page
pub fn record_search_results(count: usize) {
    histogram!("search_bridge_hits_returned").record(count as f64);
}

/// Record hits whose records no longer resolve
pub fn record_dropped_hits(count: usize) {
    if count > 0 {
        counter!("search_bridge_dropped_hits_total").increment(count as u64);
    }
}

/// Record a rejected builder call
pub fn record_invalid_constraint() {
    counter!("search_bridge_invalid_constraints_total").increment(1);
}

/// Record an assembled page
pub fn record_page(kind: &str) {
    counter!(
        "search_bridge_pages_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}
