// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Builder - fluent constraint API
//!
//! Collects constraints, sort keys and bounds into a [`Query`] and runs it
//! through the owning [`Scout`].
//!
//! # Example
//!
//! ```rust,no_run
//! # use search_bridge::{Scout, PageRequest, search::SortDirection};
//! # use search_bridge::mapper::{RecordLookup, Searchable};
//! # async fn example<R: Searchable, L: RecordLookup<R>>(scout: &Scout, lookup: &L) -> search_bridge::Result<()> {
//! let page = scout
//!     .search_in("products", "red shoes")
//!     .where_eq("status", "active")
//!     .where_op("price", "<=", 100)?
//!     .where_in("size", vec![41, 42, 43])
//!     .where_between("rating", 3, 5)?
//!     .order_by("price", SortDirection::Asc)
//!     .paginate::<R, _>(lookup, PageRequest::new().per_page(10).page(2))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use tracing::{debug, warn};

use super::operator::{OperatorKind, SortDirection};
use super::query::{Constraint, Query, Scalar, SortKey, TrashedScope, Value};
use crate::engine::{DocId, QueryHandle};
use crate::error::Result;
use crate::executor::{Hit, SearchResult};
use crate::mapper::{RecordLookup, ResultMapper, Searchable};
use crate::metrics;
use crate::pagination::{LengthAwarePaginator, PageRequest, Paginator};
use crate::scout::Scout;
use std::sync::Arc;

/// Fluent builder bound to a [`Scout`].
#[derive(Clone)]
pub struct SearchBuilder<'s> {
    scout: &'s Scout,
    query: Query,
}

impl<'s> SearchBuilder<'s> {
    pub fn new(scout: &'s Scout, query: Query) -> Self {
        Self { scout, query }
    }

    /// Search a different index.
    #[must_use]
    pub fn within(mut self, index: impl Into<String>) -> Self {
        self.query.index = index.into();
        self
    }

    /// General constraint entry point.
    ///
    /// `None` as operator is the two-argument form (equality); otherwise the
    /// token goes through the operator alias table.
    pub fn constrain(
        self,
        field: impl Into<String>,
        operator: Option<&str>,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let constraint = Constraint::resolve(field, operator, value.into());
        self.record(constraint)
    }

    /// `field = value`
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push_valid(field, OperatorKind::Equals, Value::Scalar(value.into()));
        self
    }

    /// `field <op> value`, with `op` resolved through the alias table.
    pub fn where_op(
        self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Result<Self> {
        self.constrain(field, Some(operator), value)
    }

    /// `field != value`, as a negated equality.
    #[must_use]
    pub fn where_not(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.push_valid(field, OperatorKind::NotEquals, Value::Scalar(value.into()));
        self
    }

    /// Set membership. An empty list matches nothing.
    #[must_use]
    pub fn where_in<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push_valid(field, OperatorKind::In, Value::List(values));
        self
    }

    /// Negated set membership. An empty list matches everything.
    #[must_use]
    pub fn where_not_in<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push_valid(field, OperatorKind::NotIn, Value::List(values));
        self
    }

    #[must_use]
    pub fn where_null(mut self, field: impl Into<String>) -> Self {
        self.push_valid(field, OperatorKind::IsNull, Value::Null);
        self
    }

    #[must_use]
    pub fn where_not_null(mut self, field: impl Into<String>) -> Self {
        self.push_valid(field, OperatorKind::IsNotNull, Value::Null);
        self
    }

    /// Inclusive range. `from` may be a list holding both bounds; null bounds
    /// are left open and two null bounds add nothing.
    pub fn where_between(
        self,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Result<Self> {
        self.where_between_ops(field, from, to, "gte", "lte")
    }

    /// Range with explicit bound operators (`gt`/`gte`, `lt`/`lte`).
    pub fn where_between_ops(
        mut self,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
        lower_op: &str,
        upper_op: &str,
    ) -> Result<Self> {
        let field = field.into();
        match Constraint::between(field.as_str(), from.into(), to.into(), lower_op, upper_op) {
            Ok(Some(constraint)) => {
                self.query.push(constraint);
                Ok(self)
            }
            Ok(None) => {
                debug!(field = %field, "Between without bounds, no filter added");
                Ok(self)
            }
            Err(e) => {
                metrics::record_invalid_constraint();
                Err(e)
            }
        }
    }

    /// Include soft-deleted records. Recorded only; no filter is applied.
    #[must_use]
    pub fn with_trashed(mut self) -> Self {
        self.query.trashed = TrashedScope::Include;
        self
    }

    /// Only soft-deleted records. Recorded only; no filter is applied.
    #[must_use]
    pub fn only_trashed(mut self) -> Self {
        self.query.trashed = TrashedScope::Only;
        self
    }

    /// Add a sort key. Later calls add secondary keys.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sorts.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.order_by(field, SortDirection::Desc)
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Alias for [`limit`](Self::limit).
    #[must_use]
    pub fn take(self, limit: usize) -> Self {
        self.limit(limit)
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Customise the engine query right before it runs.
    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut dyn QueryHandle) + Send + Sync + 'static,
    {
        self.query.callback = Some(Arc::new(callback));
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    /// Execute and return the raw hits.
    pub async fn raw(&self) -> Result<SearchResult> {
        self.scout.executor().execute(&self.query).await
    }

    /// Execute and return hit identifiers in rank order.
    pub async fn keys(&self) -> Result<Vec<DocId>> {
        let result = self.raw().await?;
        Ok(ResultMapper::map_ids(&result.hits))
    }

    /// Execute and hydrate every hit.
    pub async fn get<R, L>(&self, lookup: &L) -> Result<Vec<R>>
    where
        R: Searchable,
        L: RecordLookup<R> + ?Sized,
    {
        let result = self.raw().await?;
        ResultMapper::map(&result.hits, lookup).await
    }

    /// Length-aware page of hydrated records.
    pub async fn paginate<R, L>(&self, lookup: &L, request: PageRequest) -> Result<LengthAwarePaginator<R>>
    where
        R: Searchable,
        L: RecordLookup<R> + ?Sized,
    {
        self.scout
            .assembler()
            .paginate_length_aware(&self.query, lookup, request)
            .await
    }

    /// Simple page of hydrated records.
    pub async fn simple_paginate<R, L>(&self, lookup: &L, request: PageRequest) -> Result<Paginator<R>>
    where
        R: Searchable,
        L: RecordLookup<R> + ?Sized,
    {
        self.scout
            .assembler()
            .paginate_simple(&self.query, lookup, request)
            .await
    }

    /// Length-aware page of raw hits.
    pub async fn paginate_raw(&self, request: PageRequest) -> Result<LengthAwarePaginator<Hit>> {
        self.scout
            .assembler()
            .paginate_raw(&self.query, request)
            .await
    }

    fn record(mut self, constraint: Result<Constraint>) -> Result<Self> {
        match constraint {
            Ok(constraint) => {
                self.query.push(constraint);
                Ok(self)
            }
            Err(e) => {
                metrics::record_invalid_constraint();
                debug!(error = %e, "Rejected constraint");
                Err(e)
            }
        }
    }

    // Only for operator/value pairs that always pass shape validation.
    fn push_valid(&mut self, field: impl Into<String>, operator: OperatorKind, value: Value) {
        match Constraint::new(field, operator, value) {
            Ok(constraint) => self.query.push(constraint),
            Err(e) => {
                debug_assert!(false, "infallible constraint rejected: {}", e);
                metrics::record_invalid_constraint();
                warn!(error = %e, "Constraint dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoutConfig;
    use crate::engine::memory::InMemoryConnection;
    use crate::search::{Bound, Clause, Filter};

    fn scout() -> Scout {
        Scout::new(Arc::new(InMemoryConnection::new()), ScoutConfig::default())
    }

    fn clauses(builder: &SearchBuilder<'_>) -> Vec<Clause> {
        builder.query().clauses().collect()
    }

    #[test]
    fn test_chain_records_in_order() {
        let scout = scout();
        let builder = scout
            .search_in("products", "shoes")
            .where_eq("status", "active")
            .where_op("price", "<=", 100)
            .unwrap()
            .where_not("brand", "acme")
            .where_in("size", vec![41, 42]);

        let query = builder.query();
        assert_eq!(query.constraints.len(), 3);
        assert_eq!(query.negated_constraints.len(), 1);
        assert_eq!(query.constraints[1].operator(), OperatorKind::LessOrEqual);
    }

    #[test]
    fn test_where_op_rejects_bad_input() {
        let scout = scout();
        assert!(scout
            .search_in("products", "")
            .where_op("price", "~", 5)
            .err()
            .is_some_and(|e| e.is_invalid_constraint()));
        assert!(scout
            .search_in("products", "")
            .where_op("price", ">", Value::Null)
            .is_err());
    }

    #[test]
    fn test_diamond_translates_to_exact_range() {
        let scout = scout();
        let builder = scout
            .search_in("products", "")
            .where_op("price", "<>", 5)
            .unwrap();
        assert_eq!(
            clauses(&builder),
            vec![Clause {
                filter: Filter::Range {
                    field: "price".into(),
                    lower: Some(Bound::inclusive(5)),
                    upper: Some(Bound::inclusive(5)),
                },
                negated: false,
            }]
        );
    }

    #[test]
    fn test_between_forms_are_equivalent() {
        let scout = scout();
        let pair = scout
            .search_in("products", "")
            .where_between("price", vec![5, 10], Value::Null)
            .unwrap();
        let scalars = scout
            .search_in("products", "")
            .where_between("price", 5, 10)
            .unwrap();
        assert_eq!(clauses(&pair), clauses(&scalars));

        let lower_only = scout
            .search_in("products", "")
            .where_between("price", vec![7], Value::Null)
            .unwrap();
        assert_eq!(
            clauses(&lower_only)[0].filter,
            Filter::Range {
                field: "price".into(),
                lower: Some(Bound::inclusive(7)),
                upper: None,
            }
        );

        let none = scout
            .search_in("products", "")
            .where_between("price", Value::Null, Value::Null)
            .unwrap();
        assert!(none.query().constraints.is_empty());
    }

    #[test]
    fn test_null_checks_and_trashed_scope() {
        let scout = scout();
        let builder = scout
            .search_in("products", "")
            .where_null("deleted_at")
            .where_not_null("published_at")
            .with_trashed();
        let clauses = clauses(&builder);
        assert!(!clauses[0].negated);
        assert!(clauses[1].negated);
        assert_eq!(builder.query().trashed, TrashedScope::Include);
        assert_eq!(builder.only_trashed().query().trashed, TrashedScope::Only);
    }

    #[test]
    fn test_order_by_appends_and_take_aliases_limit() {
        let scout = scout();
        let query = scout
            .search_in("products", "")
            .order_by("price", SortDirection::Asc)
            .order_by_desc("created_at")
            .take(5)
            .offset(10)
            .into_query();
        assert_eq!(query.sorts.len(), 2);
        assert_eq!(query.sorts[0].field, "price");
        assert_eq!(query.sorts[1].direction, SortDirection::Desc);
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.offset, Some(10));
    }

    #[test]
    fn test_infallible_calls_always_record() {
        let scout = scout();
        let query = scout
            .search_in("products", "")
            .where_eq("a", 1)
            .where_eq("b", "")
            .where_not("c", false)
            .where_in("d", Vec::<i64>::new())
            .where_not_in("e", vec![1.5])
            .where_null("f")
            .where_not_null("g")
            .into_query();
        assert_eq!(query.constraints.len() + query.negated_constraints.len(), 7);
        assert_eq!(query.clauses().count(), 7);
    }

    #[test]
    fn test_within_switches_index() {
        let scout = scout();
        let builder = scout.search_in("products", "x").within("archive");
        assert_eq!(builder.query().index, "archive");
    }
}
