//! Hit to record mapping.
//!
//! The engine decides the order; the record store only supplies records. The
//! mapper fetches every hit's record in one batch, drops records nobody asked
//! for, and sorts the rest back into rank order. A hit whose record is gone is
//! dropped silently.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::engine::DocId;
use crate::error::Result;
use crate::executor::Hit;
use crate::metrics;

/// A domain record stored in a search index.
pub trait Searchable: Send + Sync {
    /// Index holding this record type.
    fn search_index() -> String
    where
        Self: Sized;

    /// Identifier the engine knows this record by.
    fn search_key(&self) -> DocId;
}

/// Batch fetch of domain records.
///
/// Returned records may come back in any order and may be missing entries.
#[async_trait]
pub trait RecordLookup<R>: Send + Sync {
    async fn find_by_ids(&self, ids: &[DocId]) -> Result<Vec<R>>;
}

#[async_trait]
impl<R> RecordLookup<R> for HashMap<DocId, R>
where
    R: Searchable + Clone + 'static,
{
    async fn find_by_ids(&self, ids: &[DocId]) -> Result<Vec<R>> {
        Ok(ids.iter().filter_map(|id| self.get(id).cloned()).collect())
    }
}

pub struct ResultMapper;

impl ResultMapper {
    /// Hydrate hits into records, preserving rank order.
    pub async fn map<R, L>(hits: &[Hit], lookup: &L) -> Result<Vec<R>>
    where
        R: Searchable,
        L: RecordLookup<R> + ?Sized,
    {
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids = Self::map_ids(hits);
        let mut positions: HashMap<DocId, usize> = HashMap::with_capacity(ids.len());
        for (position, id) in ids.iter().enumerate() {
            positions.entry(*id).or_insert(position);
        }

        let fetched = lookup.find_by_ids(&ids).await?;
        let fetched_count = fetched.len();

        let mut records: Vec<(usize, R)> = fetched
            .into_iter()
            .filter_map(|record| {
                // Each requested id is claimed once; repeats are dropped.
                positions
                    .remove(&record.search_key())
                    .map(|position| (position, record))
            })
            .collect();
        records.sort_by_key(|(position, _)| *position);

        let dropped = ids.len().saturating_sub(records.len());
        if dropped > 0 || fetched_count != records.len() {
            debug!(
                requested = ids.len(),
                fetched = fetched_count,
                kept = records.len(),
                "Dropped unresolved or unrequested records"
            );
        }
        metrics::record_dropped_hits(dropped);

        Ok(records.into_iter().map(|(_, record)| record).collect())
    }

    /// Hit identifiers in rank order. No lookup.
    pub fn map_ids(hits: &[Hit]) -> Vec<DocId> {
        hits.iter().map(|hit| hit.id).collect()
    }
}
