// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Query Model
//!
//! Constraints are collected by [`SearchBuilder`], validated on entry and
//! translated into engine filters at execution time.
//!
//! # Architecture
//!
//! ```text
//! SearchBuilder (fluent API)
//!     ↓
//! Constraint (field, OperatorKind, Value)   ← alias table + shape check
//!     ↓
//! FilterTranslator → Clause { Filter, negated }
//!     ↓
//! SearchExecutor → filter() / not_filter() on the engine query
//! ```
//!
//! # Operator Tokens
//!
//! ```text
//! =  equals              - Equality
//! <  lt   >  gt          - Strict comparison
//! <= lte  >= gte         - Inclusive comparison
//! <>                     - Exact inclusive range [v, v]
//! != (negated)           - Not equal
//! between range          - Range from bounds
//! in                     - Set membership
//! ```

mod filter_translator;
mod operator;
mod query;
mod query_builder;

pub use filter_translator::{Clause, Comparison, Filter, FilterTranslator};
pub use operator::{OperatorKind, SortDirection};
pub use query::{
    Bound, Constraint, Query, QueryCallback, RangeBounds, Scalar, SortKey, TrashedScope, Value,
};
pub use query_builder::SearchBuilder;
