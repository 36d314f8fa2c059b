//! Entry point tying a connection, configuration and pagination context
//! together.

use std::sync::Arc;

use crate::config::ScoutConfig;
use crate::engine::SearchConnection;
use crate::executor::SearchExecutor;
use crate::mapper::Searchable;
use crate::pagination::{PaginationAssembler, PaginationContext, StaticPaginationContext};
use crate::search::{Query, SearchBuilder};

/// Shared search handle. Cheap to clone.
#[derive(Clone)]
pub struct Scout {
    executor: SearchExecutor,
    config: ScoutConfig,
    context: Arc<dyn PaginationContext>,
}

impl Scout {
    pub fn new(connection: Arc<dyn SearchConnection>, config: ScoutConfig) -> Self {
        let executor = SearchExecutor::new(connection).with_default_limit(config.default_limit);
        Self {
            executor,
            config,
            context: Arc::new(StaticPaginationContext::default()),
        }
    }

    /// Replace the request context used for pagination defaults.
    #[must_use]
    pub fn with_context(mut self, context: Arc<dyn PaginationContext>) -> Self {
        self.context = context;
        self
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    pub fn executor(&self) -> &SearchExecutor {
        &self.executor
    }

    pub fn assembler(&self) -> PaginationAssembler<'_> {
        PaginationAssembler::new(&self.executor, self.context.as_ref(), &self.config)
    }

    /// Start a search against the index of `M`.
    pub fn search<M: Searchable>(&self, text: impl Into<String>) -> SearchBuilder<'_> {
        self.search_in(M::search_index(), text)
    }

    /// Start a search against a named index.
    pub fn search_in(&self, index: impl Into<String>, text: impl Into<String>) -> SearchBuilder<'_> {
        let mut query = Query::new(index, text);
        query.soft_delete = self.config.soft_delete;
        SearchBuilder::new(self, query)
    }
}
