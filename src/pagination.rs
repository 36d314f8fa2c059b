//! Page assembly.
//!
//! Three flavours sit on top of [`SearchExecutor::paginate`]:
//!
//! | entry point              | items            | paging metadata             |
//! |--------------------------|------------------|-----------------------------|
//! | `paginate_simple`        | mapped records   | `has_more_pages` only       |
//! | `paginate_length_aware`  | mapped records   | exact `total`               |
//! | `paginate_raw`           | raw [`Hit`]s     | exact `total`               |
//!
//! Missing `per_page`/`page` values are filled from [`ScoutConfig`] and the
//! [`PaginationContext`]; every page carries the request path and appends the
//! free-text query so regenerated links keep the search term.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::ScoutConfig;
use crate::error::Result;
use crate::executor::{Hit, SearchExecutor};
use crate::mapper::{RecordLookup, ResultMapper, Searchable};
use crate::metrics;
use crate::search::Query;

/// Ambient request state used to fill pagination defaults.
pub trait PaginationContext: Send + Sync {
    /// Page number requested under `page_name`, if any.
    fn current_page(&self, page_name: &str) -> Option<usize>;

    /// Path of the current request, used as the base for page links.
    fn current_path(&self) -> String;
}

/// Context with a fixed page and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPaginationContext {
    page: Option<usize>,
    path: String,
}

impl StaticPaginationContext {
    pub fn new(page: Option<usize>, path: impl Into<String>) -> Self {
        Self {
            page,
            path: path.into(),
        }
    }
}

impl Default for StaticPaginationContext {
    fn default() -> Self {
        Self::new(None, "/")
    }
}

impl PaginationContext for StaticPaginationContext {
    fn current_page(&self, _page_name: &str) -> Option<usize> {
        self.page
    }

    fn current_path(&self) -> String {
        self.path.clone()
    }
}

/// Caller-supplied paging arguments. Unset or zero values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub per_page: Option<usize>,
    pub page: Option<usize>,
    pub page_name: Option<String>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    #[must_use]
    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn page_name(mut self, name: impl Into<String>) -> Self {
        self.page_name = Some(name.into());
        self
    }
}

/// Page without a total: only knows whether another page exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginator<T> {
    pub items: Vec<T>,
    pub per_page: usize,
    pub current_page: usize,
    pub has_more_pages: bool,
    pub path: String,
    pub page_name: String,
    /// Extra parameters for page links (the search term)
    pub appends: BTreeMap<String, String>,
}

impl<T> Paginator<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn on_first_page(&self) -> bool {
        self.current_page <= 1
    }

    #[must_use]
    pub fn next_page(&self) -> Option<usize> {
        self.has_more_pages.then(|| self.current_page + 1)
    }

    #[must_use]
    pub fn previous_page(&self) -> Option<usize> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }
}

/// Page with the exact match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthAwarePaginator<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: usize,
    pub current_page: usize,
    pub path: String,
    pub page_name: String,
    pub appends: BTreeMap<String, String>,
}

impl<T> LengthAwarePaginator<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last page number; at least 1.
    #[must_use]
    pub fn last_page(&self) -> usize {
        let per_page = self.per_page.max(1) as u64;
        usize::try_from(self.total.div_ceil(per_page))
            .unwrap_or(usize::MAX)
            .max(1)
    }

    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page()
    }

    #[must_use]
    pub fn on_first_page(&self) -> bool {
        self.current_page <= 1
    }

    #[must_use]
    pub fn next_page(&self) -> Option<usize> {
        self.has_more_pages().then(|| self.current_page + 1)
    }

    #[must_use]
    pub fn previous_page(&self) -> Option<usize> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// 1-based number of the first item on this page, `None` when empty.
    #[must_use]
    pub fn first_item(&self) -> Option<usize> {
        (!self.items.is_empty()).then(|| {
            self.current_page
                .saturating_sub(1)
                .saturating_mul(self.per_page)
                .saturating_add(1)
        })
    }

    /// 1-based number of the last item on this page, `None` when empty.
    #[must_use]
    pub fn last_item(&self) -> Option<usize> {
        self.first_item()
            .map(|first| first.saturating_add(self.items.len() - 1))
    }
}

struct ResolvedPage {
    per_page: usize,
    page: usize,
    page_name: String,
    path: String,
    appends: BTreeMap<String, String>,
}

/// Runs paginated searches and wraps the results.
pub struct PaginationAssembler<'a> {
    executor: &'a SearchExecutor,
    context: &'a dyn PaginationContext,
    config: &'a ScoutConfig,
}

impl<'a> PaginationAssembler<'a> {
    pub fn new(
        executor: &'a SearchExecutor,
        context: &'a dyn PaginationContext,
        config: &'a ScoutConfig,
    ) -> Self {
        Self {
            executor,
            context,
            config,
        }
    }

    /// Mapped records plus a has-more flag.
    pub async fn paginate_simple<R, L>(
        &self,
        query: &Query,
        lookup: &L,
        request: PageRequest,
    ) -> Result<Paginator<R>>
    where
        R: Searchable,
        L: RecordLookup<R> + ?Sized,
    {
        let resolved = self.resolve(query, request);
        let result = self
            .executor
            .paginate(query, resolved.per_page, resolved.page)
            .await?;
        let items = ResultMapper::map(&result.hits, lookup).await?;

        let seen = (resolved.per_page as u64).saturating_mul(resolved.page as u64);
        let has_more_pages = seen < result.total_count;

        info!(
            index = %query.index,
            page = resolved.page,
            per_page = resolved.per_page,
            items = items.len(),
            has_more_pages,
            "Simple page assembled"
        );
        metrics::record_page("simple");

        Ok(Paginator {
            items,
            per_page: resolved.per_page,
            current_page: resolved.page,
            has_more_pages,
            path: resolved.path,
            page_name: resolved.page_name,
            appends: resolved.appends,
        })
    }

    /// Mapped records plus the exact total.
    pub async fn paginate_length_aware<R, L>(
        &self,
        query: &Query,
        lookup: &L,
        request: PageRequest,
    ) -> Result<LengthAwarePaginator<R>>
    where
        R: Searchable,
        L: RecordLookup<R> + ?Sized,
    {
        let resolved = self.resolve(query, request);
        let result = self
            .executor
            .paginate(query, resolved.per_page, resolved.page)
            .await?;
        let items = ResultMapper::map(&result.hits, lookup).await?;

        info!(
            index = %query.index,
            page = resolved.page,
            per_page = resolved.per_page,
            items = items.len(),
            total = result.total_count,
            "Page assembled"
        );
        metrics::record_page("length_aware");

        Ok(Self::length_aware(items, result.total_count, resolved))
    }

    /// Raw hits plus the exact total; no record lookup.
    pub async fn paginate_raw(
        &self,
        query: &Query,
        request: PageRequest,
    ) -> Result<LengthAwarePaginator<Hit>> {
        let resolved = self.resolve(query, request);
        let result = self
            .executor
            .paginate(query, resolved.per_page, resolved.page)
            .await?;

        info!(
            index = %query.index,
            page = resolved.page,
            per_page = resolved.per_page,
            hits = result.count(),
            total = result.total_count,
            "Raw page assembled"
        );
        metrics::record_page("raw");

        Ok(Self::length_aware(result.hits, result.total_count, resolved))
    }

    fn length_aware<T>(items: Vec<T>, total: u64, resolved: ResolvedPage) -> LengthAwarePaginator<T> {
        LengthAwarePaginator {
            items,
            total,
            per_page: resolved.per_page,
            current_page: resolved.page,
            path: resolved.path,
            page_name: resolved.page_name,
            appends: resolved.appends,
        }
    }

    fn resolve(&self, query: &Query, request: PageRequest) -> ResolvedPage {
        let page_name = request
            .page_name
            .unwrap_or_else(|| self.config.page_name.clone());
        let per_page = request
            .per_page
            .filter(|&n| n > 0)
            .unwrap_or(self.config.per_page)
            .max(1);
        let page = request
            .page
            .filter(|&n| n > 0)
            .or_else(|| self.context.current_page(&page_name))
            .filter(|&n| n > 0)
            .unwrap_or(1);

        let mut appends = BTreeMap::new();
        appends.insert(self.config.query_param.clone(), query.text.clone());

        ResolvedPage {
            per_page,
            page,
            page_name,
            path: self.context.current_path(),
            appends,
        }
    }
}
