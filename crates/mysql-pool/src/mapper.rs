//! Row output strategies.
//!
//! Every executor operation that returns rows hands each [`Row`] to a
//! [`RowMapper`] chosen when the executor is built:
//!
//! | Mapper | Output |
//! |--------|--------|
//! | [`RowFormat::Mapping`] | [`Record::Map`], column name to value |
//! | [`RowFormat::Tuple`] | [`Record::Tuple`], values in column order |
//! | [`AsRow`] | the driver [`Row`] itself |
//! | [`FromRowMapper<T>`] | any `T: FromRow` |

use std::collections::BTreeMap;
use std::marker::PhantomData;

use mysql_pool_client::{FromRow, Row};
use mysql_pool_types::{FromSql, SqlValue, TypeError};

/// Converts a materialized row into the executor's output type.
pub trait RowMapper: Send + Sync {
    /// Mapped row type.
    type Output: Send;

    /// Convert one row.
    fn map_row(&self, row: Row) -> Result<Self::Output, TypeError>;
}

/// Runtime row-format flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RowFormat {
    /// Rows as column-name to value mappings.
    #[default]
    Mapping,
    /// Rows as positional value lists.
    Tuple,
}

impl RowFormat {
    /// `true` for [`RowFormat::Mapping`].
    #[must_use]
    pub fn is_mapping(self) -> bool {
        matches!(self, Self::Mapping)
    }
}

/// A row produced by the [`RowFormat`] mapper.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Column name to value. A repeated column name keeps its last value.
    Map(BTreeMap<String, SqlValue>),
    /// Values in column order.
    Tuple(Vec<SqlValue>),
}

impl Record {
    /// Look up a value by column name (mapping records only).
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        match self {
            Self::Map(map) => map.get(column),
            Self::Tuple(_) => None,
        }
    }

    /// Look up a value by position (tuple records only).
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        match self {
            Self::Map(_) => None,
            Self::Tuple(values) => values.get(index),
        }
    }

    /// Convert the value of a named column.
    pub fn try_get<T: FromSql>(&self, column: &str) -> Result<T, TypeError> {
        let value = self
            .get(column)
            .ok_or_else(|| TypeError::UnknownColumn(column.to_string()))?;
        T::from_sql(value)
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Map(map) => map.len(),
            Self::Tuple(values) => values.len(),
        }
    }

    /// Check if the record has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the mapping, if this is a mapping record.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, SqlValue>> {
        match self {
            Self::Map(map) => Some(map),
            Self::Tuple(_) => None,
        }
    }

    /// Borrow the values, if this is a tuple record.
    #[must_use]
    pub fn as_tuple(&self) -> Option<&[SqlValue]> {
        match self {
            Self::Map(_) => None,
            Self::Tuple(values) => Some(values),
        }
    }
}

impl RowMapper for RowFormat {
    type Output = Record;

    fn map_row(&self, row: Row) -> Result<Record, TypeError> {
        Ok(match self {
            Self::Mapping => {
                let names: Vec<String> = row.columns().iter().map(|c| c.name.clone()).collect();
                Record::Map(names.into_iter().zip(row.into_values()).collect())
            }
            Self::Tuple => Record::Tuple(row.into_values()),
        })
    }
}

/// Mapper that returns the driver [`Row`] unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsRow;

impl RowMapper for AsRow {
    type Output = Row;

    fn map_row(&self, row: Row) -> Result<Row, TypeError> {
        Ok(row)
    }
}

/// Mapper that converts rows through [`FromRow`].
pub struct FromRowMapper<T>(PhantomData<fn() -> T>);

impl<T> FromRowMapper<T> {
    /// Create the mapper.
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromRowMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FromRowMapper<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for FromRowMapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FromRowMapper")
    }
}

impl<T: FromRow + Send> RowMapper for FromRowMapper<T> {
    type Output = T;

    fn map_row(&self, row: Row) -> Result<T, TypeError> {
        T::from_row(&row)
    }
}
