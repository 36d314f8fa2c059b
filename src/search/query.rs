// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query model
//!
//! A [`Query`] is a plain value: index, free text, the recorded constraints,
//! sort keys and paging bounds. The fluent [`SearchBuilder`](super::SearchBuilder)
//! fills it in; the executor only ever sees it by shared reference.
//!
//! [`Constraint`] keeps its fields private so that every constraint in a query
//! has already passed shape validation (lists for `In`, bounds for ranges,
//! scalars for comparisons). Translation to engine filters is therefore
//! infallible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::filter_translator::{Clause, FilterTranslator};
use super::operator::{OperatorKind, SortDirection};
use crate::engine::QueryHandle;
use crate::error::{Result, SearchError};

/// A single comparable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// The empty string stands in for null: the engine has no null type.
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        i64::try_from(v).map(Self::Int).unwrap_or(Self::Float(v as f64))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One side of a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: Scalar,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: impl Into<Scalar>) -> Self {
        Self {
            value: value.into(),
            inclusive: true,
        }
    }

    pub fn exclusive(value: impl Into<Scalar>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
        }
    }
}

/// Lower/upper bound pair; either side may be open.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeBounds {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl RangeBounds {
    pub fn new(lower: Option<Bound>, upper: Option<Bound>) -> Self {
        Self { lower, upper }
    }

    /// Both sides inclusive and equal.
    pub fn exact(value: Scalar) -> Self {
        Self {
            lower: Some(Bound::inclusive(value.clone())),
            upper: Some(Bound::inclusive(value)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

/// Constraint value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Scalar(Scalar),
    List(Vec<Scalar>),
    Range(RangeBounds),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
            Self::Range(_) => "range",
        }
    }
}

macro_rules! value_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Scalar(v.into())
                }
            }
        )*
    };
}

value_from_scalar!(i64, i32, u32, u64, f64, f32, bool, &str, String);

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, |s| Self::Scalar(s.into()))
    }
}

impl From<RangeBounds> for Value {
    fn from(v: RangeBounds) -> Self {
        Self::Range(v)
    }
}

/// A validated field/operator/value restriction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    field: String,
    operator: OperatorKind,
    value: Value,
}

impl Constraint {
    /// Build a constraint, checking that the value has the shape the operator needs.
    ///
    /// - `In`/`NotIn`: a list (possibly empty)
    /// - `Range`/`Between`: a bound pair or a list of one or two scalars, with
    ///   at least one bound present
    /// - `IsNull`/`IsNotNull`: any value, stored as null
    /// - everything else: a scalar
    pub fn new(field: impl Into<String>, operator: OperatorKind, value: Value) -> Result<Self> {
        let field = field.into();
        let value = match operator {
            OperatorKind::IsNull | OperatorKind::IsNotNull => Value::Null,
            OperatorKind::In | OperatorKind::NotIn => match value {
                Value::List(values) => Value::List(values),
                other => {
                    return Err(SearchError::invalid(
                        field,
                        format!("operator '{}' needs a list, got {}", operator, other.shape()),
                    ))
                }
            },
            OperatorKind::Range | OperatorKind::Between => {
                let bounds = match value {
                    Value::Range(bounds) => bounds,
                    Value::List(values) if (1..=2).contains(&values.len()) => {
                        let mut values = values.into_iter();
                        RangeBounds::new(
                            values.next().map(Bound::inclusive),
                            values.next().map(Bound::inclusive),
                        )
                    }
                    other => {
                        return Err(SearchError::invalid(
                            field,
                            format!(
                                "operator '{}' needs one or two bounds, got {}",
                                operator,
                                other.shape()
                            ),
                        ))
                    }
                };
                if bounds.is_open() {
                    return Err(SearchError::invalid(field, "range has neither bound"));
                }
                Value::Range(bounds)
            }
            _ => match value {
                Value::Scalar(s) => Value::Scalar(s),
                other => {
                    return Err(SearchError::invalid(
                        field,
                        format!("operator '{}' needs a scalar, got {}", operator, other.shape()),
                    ))
                }
            },
        };
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    /// Resolve a `where`-style call.
    ///
    /// With no operator token the call is an equality; a null value is sent as
    /// the empty-string null marker. With a token, a null value is rejected whenever the token is
    /// in the alias table, then the token itself must resolve.
    // NOTE: the null check rejects every recognised operator, which reads like
    // an inverted condition. It is kept literal until callers agree on which
    // operators may take null.
    pub fn resolve(field: impl Into<String>, operator: Option<&str>, value: Value) -> Result<Self> {
        let field = field.into();
        let Some(token) = operator else {
            return match value {
                Value::Null => Self::new(field, OperatorKind::Equals, Value::Scalar(Scalar::empty())),
                value => Self::new(field, OperatorKind::Equals, value),
            };
        };

        let kind = OperatorKind::from_token(token);
        if value.is_null() && kind.is_some() {
            return Err(SearchError::invalid(
                field,
                "illegal operator and value combination",
            ));
        }
        let kind = kind.ok_or_else(|| {
            SearchError::invalid(field.clone(), format!("unknown operator '{}'", token))
        })?;
        Self::new(field, kind, value)
    }

    /// Build a `Between` constraint from `where_between` arguments.
    ///
    /// `from` may be a list: two or more elements supply both bounds (and
    /// override `to`), a single element is the lower bound only, an empty list
    /// is no bound. Returns `Ok(None)` when both bounds end up null.
    pub fn between(
        field: impl Into<String>,
        from: Value,
        to: Value,
        lower_op: &str,
        upper_op: &str,
    ) -> Result<Option<Self>> {
        let field = field.into();
        let lower_inclusive = match lower_op {
            "gte" | ">=" => true,
            "gt" | ">" => false,
            other => {
                return Err(SearchError::invalid(
                    field,
                    format!("unknown lower bound operator '{}'", other),
                ))
            }
        };
        let upper_inclusive = match upper_op {
            "lte" | "<=" => true,
            "lt" | "<" => false,
            other => {
                return Err(SearchError::invalid(
                    field,
                    format!("unknown upper bound operator '{}'", other),
                ))
            }
        };

        let (from, to) = match from {
            Value::List(values) if values.len() >= 2 => {
                let mut values = values.into_iter();
                (values.next(), values.next())
            }
            Value::List(values) => (values.into_iter().next(), Self::bound_scalar(&field, to)?),
            other => (Self::bound_scalar(&field, other)?, Self::bound_scalar(&field, to)?),
        };

        let bounds = RangeBounds::new(
            from.map(|value| Bound {
                value,
                inclusive: lower_inclusive,
            }),
            to.map(|value| Bound {
                value,
                inclusive: upper_inclusive,
            }),
        );
        if bounds.is_open() {
            return Ok(None);
        }
        Self::new(field, OperatorKind::Between, Value::Range(bounds)).map(Some)
    }

    fn bound_scalar(field: &str, value: Value) -> Result<Option<Scalar>> {
        match value {
            Value::Null => Ok(None),
            Value::Scalar(s) => Ok(Some(s)),
            other => Err(SearchError::invalid(
                field,
                format!("between bound must be a scalar, got {}", other.shape()),
            )),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> OperatorKind {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// One `order_by` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Soft-delete scope requested by the caller.
///
/// Recorded on the query but not turned into a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrashedScope {
    #[default]
    Exclude,
    Include,
    Only,
}

/// Engine-specific customisation hook, run once before execution.
pub type QueryCallback = Arc<dyn Fn(&mut dyn QueryHandle) + Send + Sync>;

/// A search request against one index.
#[derive(Clone, Default)]
pub struct Query {
    /// Target index name
    pub index: String,
    /// Free-text match expression
    pub text: String,
    /// Positive constraints, in call order
    pub constraints: Vec<Constraint>,
    /// Constraints compiled to negated filters, in call order
    pub negated_constraints: Vec<Constraint>,
    /// Sort keys; the first is primary
    pub sorts: Vec<SortKey>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub callback: Option<QueryCallback>,
    /// Whether the searched records use soft deletes
    pub soft_delete: bool,
    pub trashed: TrashedScope,
}

impl Query {
    pub fn new(index: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Record a constraint on the list matching its polarity.
    pub fn push(&mut self, constraint: Constraint) {
        if constraint.operator().is_negated() {
            self.negated_constraints.push(constraint);
        } else {
            self.constraints.push(constraint);
        }
    }

    /// Engine filter clauses for every recorded constraint.
    pub fn clauses(&self) -> impl Iterator<Item = Clause> + '_ {
        self.constraints
            .iter()
            .chain(self.negated_constraints.iter())
            .map(FilterTranslator::translate)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("index", &self.index)
            .field("text", &self.text)
            .field("constraints", &self.constraints)
            .field("negated_constraints", &self.negated_constraints)
            .field("sorts", &self.sorts)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .field("soft_delete", &self.soft_delete)
            .field("trashed", &self.trashed)
            .finish()
    }
}
