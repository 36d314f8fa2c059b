// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic search-bridge usage example.
//!
//! Demonstrates:
//! 1. Seeding the in-memory engine with a small product catalogue
//! 2. Building a constrained search with operator tokens
//! 3. Fetching a length-aware page of hydrated records
//! 4. Fetching a simple page and raw hits
//! 5. Displaying captured metrics
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_search
//! ```

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use search_bridge::{
    DocId, InMemoryConnection, PageRequest, Scout, ScoutConfig, Searchable, SortDirection,
    StaticPaginationContext,
};

#[derive(Debug, Clone)]
struct Product {
    id: DocId,
    name: String,
    price: u32,
}

impl Searchable for Product {
    fn search_index() -> String {
        "products".into()
    }

    fn search_key(&self) -> DocId {
        self.id
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           search-bridge: Basic Search Example                 ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Seed the engine and the record store
    // ─────────────────────────────────────────────────────────────────────────
    println!("📦 Seeding catalogue...");

    let catalogue = [
        (1, "red running shoes", 80, "active"),
        (2, "red leather shoes", 120, "active"),
        (3, "blue canvas shoes", 45, "active"),
        (4, "red suede shoes", 95, "archived"),
        (5, "red trail shoes", 60, "active"),
        (6, "red hat", 20, "active"),
    ];

    let conn = InMemoryConnection::new();
    let mut store: HashMap<DocId, Product> = HashMap::new();
    for (id, name, price, status) in catalogue {
        conn.upsert(
            "products",
            id,
            json!({"name": name, "price": price, "status": status}),
        )?;
        store.insert(
            id,
            Product {
                id,
                name: name.to_string(),
                price,
            },
        );
        println!("   └─ {} → {} ({})", id, name, price);
    }

    let scout = Scout::new(Arc::new(conn), ScoutConfig::default())
        .with_context(Arc::new(StaticPaginationContext::new(None, "/products")));

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Constrained, length-aware page
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🔍 \"red shoes\" where status = active and price <= 100, cheapest first");

    let page = scout
        .search::<Product>("red shoes")
        .where_eq("status", "active")
        .where_op("price", "<=", 100)?
        .order_by("price", SortDirection::Asc)
        .paginate(&store, PageRequest::new().per_page(2))
        .await?;

    println!(
        "   Page {}/{} ({} total, items {:?}..{:?})",
        page.current_page,
        page.last_page(),
        page.total,
        page.first_item(),
        page.last_item()
    );
    for product in &page.items {
        println!("   └─ {} ({})", product.name, product.price);
    }
    println!("   JSON: {}", serde_json::to_string(&page.appends)?);

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Simple page and raw hits
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📄 Simple page 2 of \"red\" (per page 2)");

    let simple = scout
        .search::<Product>("red")
        .where_not_in("status", vec!["archived"])
        .simple_paginate(&store, PageRequest::new().per_page(2).page(2))
        .await?;
    for product in &simple.items {
        println!("   └─ {}", product.name);
    }
    println!("   More pages: {}", simple.has_more_pages);

    println!("\n🧾 Raw hits for \"shoes\" between 50 and 100");
    let raw = scout
        .search::<Product>("shoes")
        .where_between("price", 50, 100)?
        .raw()
        .await?;
    for hit in &raw.hits {
        println!("   └─ #{} id={} score={:.2}", hit.rank, hit.id, hit.score);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Dump metrics
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Metrics:");
    dump_metrics(&snapshotter);

    Ok(())
}

fn dump_metrics(snapshotter: &Snapshotter) {
    let mut lines: Vec<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, value)| {
            let (_, key) = composite_key.into_parts();
            let labels: Vec<_> = key
                .labels()
                .map(|l| format!("{}={}", l.key(), l.value()))
                .collect();
            let label_str = if labels.is_empty() {
                String::new()
            } else {
                format!("{{{}}}", labels.join(","))
            };
            let value = match value {
                DebugValue::Counter(v) => v.to_string(),
                DebugValue::Gauge(v) => format!("{:.2}", v.into_inner()),
                DebugValue::Histogram(samples) => format!("{} samples", samples.len()),
            };
            format!("{}{} = {}", key.name(), label_str, value)
        })
        .collect();
    lines.sort();
    for line in lines {
        println!("   └─ {}", line);
    }
}
