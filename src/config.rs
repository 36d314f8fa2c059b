//! Configuration for search-bridge.
//!
//! # Example
//!
//! ```
//! use search_bridge::ScoutConfig;
//!
//! // Minimal config (uses defaults)
//! let config = ScoutConfig::default();
//! assert_eq!(config.per_page, 15);
//! assert_eq!(config.page_name, "page");
//!
//! // Override what differs
//! let config = ScoutConfig {
//!     per_page: 25,
//!     default_limit: Some(100),
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Configuration for searches and page assembly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoutConfig {
    /// Page size used when the caller passes none (default: 15)
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Request parameter holding the current page (default: "page")
    #[serde(default = "default_page_name")]
    pub page_name: String,

    /// Parameter name under which the free-text query is appended to pages
    #[serde(default = "default_query_param")]
    pub query_param: String,

    /// Limit for unpaginated searches that set none; `None` defers to the engine
    #[serde(default)]
    pub default_limit: Option<usize>,

    /// Whether searched records use soft deletes
    #[serde(default)]
    pub soft_delete: bool,
}

fn default_per_page() -> usize { 15 }
fn default_page_name() -> String { "page".to_string() }
fn default_query_param() -> String { "query".to_string() }

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            page_name: default_page_name(),
            query_param: default_query_param(),
            default_limit: None,
            soft_delete: false,
        }
    }
}
