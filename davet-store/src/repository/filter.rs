//! Filter predicates for set-oriented repository operations
//!
//! A [`FilterCondition`] names a column, an operator and a value. Conditions are
//! AND-ed together into a WHERE clause. Column names are checked against the
//! entity's known columns before they are written into SQL and every value is a
//! bound parameter.
//!
//! # Example
//!
//! ```rust
//! use davet_store::repository::FilterCondition;
//!
//! let filters = vec![
//!     FilterCondition::eq("is_active", true),
//!     FilterCondition::in_integers("user_id", vec![1, 2, 3]),
//! ];
//! assert_eq!(filters.len(), 2);
//! ```

use std::fmt;

use sqlx::{QueryBuilder, Sqlite};

use super::entity::Entity;
use super::error::{RepositoryError, RepositoryOperation};

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Not equal to (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
    /// Pattern matching (LIKE)
    Like,
    /// Value is in a list (IN)
    In,
    /// Value is null (IS NULL)
    IsNull,
    /// Value is not null (IS NOT NULL)
    IsNotNull,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::In => write!(f, "IN"),
            Self::IsNull => write!(f, "IS NULL"),
            Self::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// A value that can be used in filter conditions
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String value
    String(String),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// List of string values (for IN operator)
    StringList(Vec<String>),
    /// List of integer values (for IN operator)
    IntegerList(Vec<i64>),
    /// Null value (for IS NULL / IS NOT NULL)
    Null,
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(list: Vec<String>) -> Self {
        Self::StringList(list)
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(list: Vec<i64>) -> Self {
        Self::IntegerList(list)
    }
}

/// A single filter condition for querying entities
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// The column to filter on
    pub field: String,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter (field = value)
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value.into())
    }

    /// Create a not-equal filter (field != value)
    pub fn ne(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::NotEqual, value.into())
    }

    /// Create a greater-than filter (field > value)
    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value.into())
    }

    /// Create a greater-than-or-equal filter (field >= value)
    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value.into())
    }

    /// Create a less-than filter (field < value)
    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, value.into())
    }

    /// Create a less-than-or-equal filter (field <= value)
    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value.into())
    }

    /// Create a LIKE pattern filter
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Like, FilterValue::String(pattern.into()))
    }

    /// Create an IN list filter for strings
    pub fn in_strings(field: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(field, FilterOperator::In, FilterValue::StringList(values))
    }

    /// Create an IN list filter for integers
    pub fn in_integers(field: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(field, FilterOperator::In, FilterValue::IntegerList(values))
    }

    /// Create an IS NULL filter
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, FilterValue::Null)
    }

    /// Create an IS NOT NULL filter
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, FilterValue::Null)
    }
}

/// Append ` WHERE ...` for `filters` to `qb`; nothing is appended for an empty slice
///
/// Fails without touching `qb` if a column is unknown to `E` or an operator is
/// paired with a value it cannot take.
pub(crate) fn push_where<E: Entity>(
    qb: &mut QueryBuilder<'_, Sqlite>,
    filters: &[FilterCondition],
    operation: RepositoryOperation,
) -> Result<(), RepositoryError> {
    for filter in filters {
        validate::<E>(filter, operation)?;
    }

    for (index, filter) in filters.iter().enumerate() {
        qb.push(if index == 0 { " WHERE " } else { " AND " });
        qb.push(&filter.field);

        match (&filter.operator, &filter.value) {
            (FilterOperator::IsNull | FilterOperator::IsNotNull, _) => {
                qb.push(" ").push(filter.operator);
            }
            (FilterOperator::In, FilterValue::StringList(values)) => {
                push_in_list(qb, values.iter().cloned());
            }
            (FilterOperator::In, FilterValue::IntegerList(values)) => {
                push_in_list(qb, values.iter().copied());
            }
            (operator, value) => {
                qb.push(" ").push(operator).push(" ");
                push_scalar(qb, value.clone());
            }
        }
    }
    Ok(())
}

fn validate<E: Entity>(
    filter: &FilterCondition,
    operation: RepositoryOperation,
) -> Result<(), RepositoryError> {
    if !E::is_known_column(&filter.field) {
        return Err(RepositoryError::validation_failed(
            operation,
            format!("Unknown filter column '{}'", filter.field),
        )
        .with_entity_type(E::NAME));
    }

    let is_list = matches!(
        filter.value,
        FilterValue::StringList(_) | FilterValue::IntegerList(_)
    );
    let valid = match filter.operator {
        FilterOperator::In => is_list,
        FilterOperator::IsNull | FilterOperator::IsNotNull => true,
        _ => !is_list && filter.value != FilterValue::Null,
    };
    if !valid {
        return Err(RepositoryError::validation_failed(
            operation,
            format!(
                "Operator {} cannot be applied to {:?} on '{}'",
                filter.operator, filter.value, filter.field
            ),
        )
        .with_entity_type(E::NAME));
    }
    Ok(())
}

fn push_in_list<'args, T>(qb: &mut QueryBuilder<'args, Sqlite>, values: impl Iterator<Item = T>)
where
    T: 'args + sqlx::Encode<'args, Sqlite> + sqlx::Type<Sqlite>,
{
    qb.push(" IN (");
    let mut empty = true;
    for (index, value) in values.enumerate() {
        if index > 0 {
            qb.push(", ");
        }
        qb.push_bind(value);
        empty = false;
    }
    if empty {
        // `IN ()` is not valid SQL; an empty list matches nothing
        qb.push("NULL");
    }
    qb.push(")");
}

fn push_scalar(qb: &mut QueryBuilder<'_, Sqlite>, value: FilterValue) {
    match value {
        FilterValue::String(s) => qb.push_bind(s),
        FilterValue::Integer(n) => qb.push_bind(n),
        FilterValue::Float(n) => qb.push_bind(n),
        FilterValue::Boolean(b) => qb.push_bind(b),
        FilterValue::StringList(_) | FilterValue::IntegerList(_) | FilterValue::Null => {
            qb.push("NULL")
        }
    };
}
