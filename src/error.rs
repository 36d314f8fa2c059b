//! Error types shared by the builder, executor and mapper.

use thiserror::Error;

/// Errors surfaced by search-bridge.
///
/// Translation errors are raised by the builder call that introduced the bad
/// input. Execution errors are never folded into an empty result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The constraint cannot be expressed: unknown operator token, a null
    /// value paired with a recognised operator, or a value of the wrong shape.
    #[error("Invalid constraint on '{field}': {reason}")]
    InvalidConstraint { field: String, reason: String },

    /// Engine, network or malformed-query failure, carrying the engine's diagnostic.
    #[error("Search backend error: {0}")]
    Backend(String),

    /// The record store failed while hydrating hits.
    #[error("Record lookup failed: {0}")]
    Lookup(String),
}

impl SearchError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised locally before any engine call.
    #[must_use]
    pub fn is_invalid_constraint(&self) -> bool {
        matches!(self, Self::InvalidConstraint { .. })
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
