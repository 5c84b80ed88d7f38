//! Row representation for query results.
//!
//! Rows are fully materialized: every value has already been decoded into a
//! [`SqlValue`] by the driver. Column metadata is shared across all rows of a
//! result set through an [`Arc`].

use std::sync::Arc;

use mysql_pool_types::{FromSql, SqlValue, TypeError};

/// Column metadata describing a result set column.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future versions without breaking semver compatibility. Use
/// [`Column::new()`] or builder methods to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Column {
    /// Column name (the alias when the query uses `AS`).
    pub name: String,
    /// Column index (0-based).
    pub index: usize,
    /// MySQL type name (e.g., "INT", "VARCHAR").
    pub type_name: String,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Whether an integer column is declared UNSIGNED.
    pub unsigned: bool,
    /// Name of the originating table, if any.
    pub table: Option<String>,
}

impl Column {
    /// Create a new column with basic metadata.
    pub fn new(name: impl Into<String>, index: usize, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index,
            type_name: type_name.into(),
            nullable: true,
            unsigned: false,
            table: None,
        }
    }

    /// Set whether the column is nullable.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark the column as UNSIGNED.
    #[must_use]
    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    /// Set the originating table name.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Shared column metadata for a result set.
///
/// This is shared across all rows in the result set to avoid
/// duplicating metadata per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColMetaData {
    /// Column definitions.
    pub columns: Vec<Column>,
}

impl ColMetaData {
    /// Create new column metadata from a list of columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Get the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a column by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find a column index by name.
    ///
    /// An exact match wins; otherwise the first case-insensitive match is
    /// returned, mirroring MySQL's case-insensitive column names.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }
}

/// A row from a query result.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    metadata: Arc<ColMetaData>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Create a row sharing existing result set metadata.
    ///
    /// `values` must hold one entry per column, in column order.
    pub fn new(metadata: Arc<ColMetaData>, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(metadata.len(), values.len());
        Self { metadata, values }
    }

    /// Create a row from owned columns and values.
    pub fn from_values(columns: Vec<Column>, values: Vec<SqlValue>) -> Self {
        Self::new(Arc::new(ColMetaData::new(columns)), values)
    }

    /// Get a value by column index with type conversion.
    ///
    /// Uses the `FromSql` trait to convert the raw value to the requested type.
    pub fn get<T: FromSql>(&self, index: usize) -> Result<T, TypeError> {
        let value = self.values.get(index).ok_or(TypeError::IndexOutOfRange {
            index,
            len: self.values.len(),
        })?;
        T::from_sql(value)
    }

    /// Get a value by column name with type conversion.
    pub fn get_by_name<T: FromSql>(&self, name: &str) -> Result<T, TypeError> {
        let index = self
            .metadata
            .find_by_name(name)
            .ok_or_else(|| TypeError::UnknownColumn(name.to_string()))?;
        self.get(index)
    }

    /// Try to get a value by column index, returning None if NULL or not found.
    pub fn try_get<T: FromSql>(&self, index: usize) -> Option<T> {
        self.values
            .get(index)
            .and_then(|v| T::from_sql_nullable(v).ok().flatten())
    }

    /// Try to get a value by column name, returning None if NULL or not found.
    pub fn try_get_by_name<T: FromSql>(&self, name: &str) -> Option<T> {
        let index = self.metadata.find_by_name(name)?;
        self.try_get(index)
    }

    /// Get the raw SQL value by index.
    #[must_use]
    pub fn get_raw(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Get the raw SQL value by column name.
    #[must_use]
    pub fn get_raw_by_name(&self, name: &str) -> Option<&SqlValue> {
        let index = self.metadata.find_by_name(name)?;
        self.values.get(index)
    }

    /// Get the number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the column metadata.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.metadata.columns
    }

    /// Get the shared column metadata.
    #[must_use]
    pub fn metadata(&self) -> &Arc<ColMetaData> {
        &self.metadata
    }

    /// All values in column order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Consume the row, returning its values in column order.
    #[must_use]
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    /// Check if a column value is NULL.
    ///
    /// Out-of-range indices report `true`.
    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        self.values.get(index).is_none_or(SqlValue::is_null)
    }

    /// Iterate over `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.metadata
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.values.iter())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user_row() -> Row {
        Row::from_values(
            vec![
                Column::new("id", 0, "INT").with_nullable(false),
                Column::new("name", 1, "VARCHAR"),
                Column::new("age", 2, "INT"),
            ],
            vec![
                SqlValue::Int(1),
                SqlValue::String("John Doe".into()),
                SqlValue::Null,
            ],
        )
    }

    #[test]
    fn test_get_by_index_and_name() {
        let row = user_row();
        assert_eq!(row.get::<i32>(0).unwrap(), 1);
        assert_eq!(row.get_by_name::<String>("name").unwrap(), "John Doe");
        assert_eq!(row.get_by_name::<String>("NAME").unwrap(), "John Doe");
        assert_eq!(row.get_by_name::<Option<i32>>("age").unwrap(), None);
    }

    #[test]
    fn test_missing_column_errors() {
        let row = user_row();
        assert!(matches!(
            row.get::<i32>(9),
            Err(TypeError::IndexOutOfRange { index: 9, len: 3 })
        ));
        assert!(matches!(
            row.get_by_name::<i32>("email"),
            Err(TypeError::UnknownColumn(name)) if name == "email"
        ));
    }

    #[test]
    fn test_try_get_swallows_null_and_missing() {
        let row = user_row();
        assert_eq!(row.try_get::<i32>(2), None);
        assert_eq!(row.try_get::<i32>(7), None);
        assert_eq!(row.try_get_by_name::<i32>("id"), Some(1));
        assert!(row.is_null(2));
        assert!(row.is_null(7));
        assert!(!row.is_null(0));
    }

    #[test]
    fn test_exact_name_preferred_over_case_insensitive() {
        let row = Row::from_values(
            vec![Column::new("Value", 0, "INT"), Column::new("value", 1, "INT")],
            vec![SqlValue::Int(1), SqlValue::Int(2)],
        );
        assert_eq!(row.get_by_name::<i32>("value").unwrap(), 2);
        assert_eq!(row.get_by_name::<i32>("VALUE").unwrap(), 1);
    }

    #[test]
    fn test_iter_pairs_names_with_values() {
        let row = user_row();
        let names: Vec<&str> = row.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["id", "name", "age"]);
        assert_eq!(row.into_values().len(), 3);
    }
}
