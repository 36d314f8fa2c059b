// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter Translator
//!
//! Translates validated [`Constraint`]s into the engine's filter vocabulary.
//!
//! # Engine filter vocabulary
//!
//! ```text
//! Equals  { field, value }          - attribute equals value
//! Compare { field, lt|gt|lte|gte }  - one-sided comparison
//! Range   { field, lower, upper }   - bounded range, each side optional
//! In      { field, [values] }       - set membership
//! ```
//!
//! Any of these can be applied as a filter or a negated filter. The
//! vocabulary has no inequality or null primitive, so:
//!
//! ```text
//! a != v        → NOT Equals(a, v)
//! a <> v        → Range(a, >= v, <= v)     (exact match, not exclusion)
//! a NOT IN [..] → NOT In(a, [..])
//! a IS NULL     → Equals(a, "")
//! a IS NOT NULL → NOT Equals(a, "")
//! ```

use serde::Serialize;
use std::fmt;

use super::operator::OperatorKind;
use super::query::{Bound, Constraint, RangeBounds, Scalar, Value};

/// One-sided comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Lt,
    Gt,
    Lte,
    Gte,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Gte => "gte",
        };
        f.write_str(op)
    }
}

/// Engine filter primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Filter {
    Equals {
        field: String,
        value: Scalar,
    },
    Compare {
        field: String,
        op: Comparison,
        value: Scalar,
    },
    Range {
        field: String,
        lower: Option<Bound>,
        upper: Option<Bound>,
    },
    In {
        field: String,
        values: Vec<Scalar>,
    },
}

impl Filter {
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. }
            | Self::Compare { field, .. }
            | Self::Range { field, .. }
            | Self::In { field, .. } => field,
        }
    }
}

/// A filter plus its polarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    pub filter: Filter,
    pub negated: bool,
}

impl Clause {
    fn must(filter: Filter) -> Self {
        Self {
            filter,
            negated: false,
        }
    }

    fn must_not(filter: Filter) -> Self {
        Self {
            filter,
            negated: true,
        }
    }
}

/// Constraint to filter translator
pub struct FilterTranslator;

impl FilterTranslator {
    /// Translate one constraint into an engine clause.
    pub fn translate(constraint: &Constraint) -> Clause {
        let field = constraint.field().to_string();
        let value = constraint.value();

        match constraint.operator() {
            OperatorKind::Equals => Clause::must(Filter::Equals {
                field,
                value: Self::scalar(value),
            }),
            OperatorKind::NotEquals => Clause::must_not(Filter::Equals {
                field,
                value: Self::scalar(value),
            }),
            OperatorKind::LessThan => Self::compare(field, Comparison::Lt, value),
            OperatorKind::GreaterThan => Self::compare(field, Comparison::Gt, value),
            OperatorKind::LessOrEqual => Self::compare(field, Comparison::Lte, value),
            OperatorKind::GreaterOrEqual => Self::compare(field, Comparison::Gte, value),
            OperatorKind::ExclusiveRange => {
                let RangeBounds { lower, upper } = RangeBounds::exact(Self::scalar(value));
                Clause::must(Filter::Range {
                    field,
                    lower,
                    upper,
                })
            }
            OperatorKind::Range | OperatorKind::Between => {
                let (lower, upper) = match value {
                    Value::Range(bounds) => (bounds.lower.clone(), bounds.upper.clone()),
                    _ => (None, None),
                };
                Clause::must(Filter::Range {
                    field,
                    lower,
                    upper,
                })
            }
            OperatorKind::In => Clause::must(Filter::In {
                field,
                values: Self::list(value),
            }),
            OperatorKind::NotIn => Clause::must_not(Filter::In {
                field,
                values: Self::list(value),
            }),
            OperatorKind::IsNull => Clause::must(Filter::Equals {
                field,
                value: Scalar::empty(),
            }),
            OperatorKind::IsNotNull => Clause::must_not(Filter::Equals {
                field,
                value: Scalar::empty(),
            }),
        }
    }

    fn compare(field: String, op: Comparison, value: &Value) -> Clause {
        Clause::must(Filter::Compare {
            field,
            op,
            value: Self::scalar(value),
        })
    }

    // Constraint::new guarantees the shape; the fallbacks are unreachable in practice.
    fn scalar(value: &Value) -> Scalar {
        match value {
            Value::Scalar(s) => s.clone(),
            _ => Scalar::empty(),
        }
    }

    fn list(value: &Value) -> Vec<Scalar> {
        match value {
            Value::List(values) => values.clone(),
            _ => Vec::new(),
        }
    }
}
