// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Operator vocabulary
//!
//! Every operator token a caller can pass to `where_op` resolves to exactly
//! one [`OperatorKind`] through a fixed alias table:
//!
//! ```text
//! =  equals      → Equals
//! <  lt          → LessThan
//! >  gt          → GreaterThan
//! <= lte         → LessOrEqual
//! >= gte         → GreaterOrEqual
//! <>             → ExclusiveRange   (translated as lower = upper = value)
//! !=             → NotEquals        (translated as a negated equality)
//! between range  → Range
//! in             → In
//! ```
//!
//! `NotIn`, `IsNull`, `IsNotNull` and `Between` have no token; they are only
//! produced by the dedicated builder methods.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of constraint operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    Equals,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    NotEquals,
    /// `<>`: kept as an exact-match range, not an exclusion.
    ExclusiveRange,
    Range,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
}

impl OperatorKind {
    /// Resolve an external operator token through the alias table.
    ///
    /// Returns `None` for tokens outside the table.
    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token {
            "=" | "equals" => Self::Equals,
            "<" | "lt" => Self::LessThan,
            ">" | "gt" => Self::GreaterThan,
            "<=" | "lte" => Self::LessOrEqual,
            ">=" | "gte" => Self::GreaterOrEqual,
            "<>" => Self::ExclusiveRange,
            "!=" => Self::NotEquals,
            "between" | "range" => Self::Range,
            "in" => Self::In,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the operator takes an ordered list of scalars.
    pub fn expects_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// Whether the operator takes lower/upper bounds.
    pub fn expects_bounds(self) -> bool {
        matches!(self, Self::Range | Self::Between)
    }

    /// Whether the operator compiles to a negated engine filter.
    pub fn is_negated(self) -> bool {
        matches!(self, Self::NotEquals | Self::NotIn | Self::IsNotNull)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equals => "equals",
            Self::LessThan => "lt",
            Self::GreaterThan => "gt",
            Self::LessOrEqual => "lte",
            Self::GreaterOrEqual => "gte",
            Self::NotEquals => "ne",
            Self::ExclusiveRange => "<>",
            Self::Range => "range",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::Between => "between",
        };
        f.write_str(name)
    }
}

/// Sort direction for `order_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(format!("unknown sort direction '{}'", s))
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}
