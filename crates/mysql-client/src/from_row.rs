//! FromRow trait for row-to-struct mapping.
//!
//! Implement [`FromRow`] for a struct to have the pool hand back typed
//! records instead of generic rows:
//!
//! ```rust,ignore
//! use mysql_pool_client::{FromRow, Row};
//! use mysql_pool_types::TypeError;
//!
//! struct User {
//!     id: i32,
//!     name: String,
//!     age: Option<i32>,
//! }
//!
//! impl FromRow for User {
//!     fn from_row(row: &Row) -> Result<Self, TypeError> {
//!         Ok(Self {
//!             id: row.get_by_name("id")?,
//!             name: row.get_by_name("name")?,
//!             age: row.get_by_name("age")?,
//!         })
//!     }
//! }
//! ```

use mysql_pool_types::TypeError;

use crate::row::Row;

/// Trait for types that can be constructed from a database row.
pub trait FromRow: Sized {
    /// Construct an instance of this type from a database row.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing or a column value
    /// cannot be converted to the expected Rust type.
    fn from_row(row: &Row) -> Result<Self, TypeError>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self, TypeError> {
        Ok(row.clone())
    }
}

macro_rules! tuple_from_row {
    ($len:literal => $($ty:ident $idx:tt),+) => {
        impl<$($ty: mysql_pool_types::FromSql),+> FromRow for ($($ty,)+) {
            fn from_row(row: &Row) -> Result<Self, TypeError> {
                if row.len() < $len {
                    return Err(TypeError::IndexOutOfRange {
                        index: $len - 1,
                        len: row.len(),
                    });
                }
                Ok(($(row.get::<$ty>($idx)?,)+))
            }
        }
    };
}

tuple_from_row!(1 => A 0);
tuple_from_row!(2 => A 0, B 1);
tuple_from_row!(3 => A 0, B 1, C 2);
tuple_from_row!(4 => A 0, B 1, C 2, D 3);
tuple_from_row!(5 => A 0, B 1, C 2, D 3, E 4);
tuple_from_row!(6 => A 0, B 1, C 2, D 3, E 4, F 5);

/// Extension trait for iterating over rows as typed structs.
///
/// This trait is automatically implemented for any iterator of [`Row`].
pub trait RowIteratorExt: Iterator<Item = Row> + Sized {
    /// Map each row to a struct implementing `FromRow`.
    fn map_rows<T: FromRow>(self) -> MapRows<Self, T>;
}

impl<I: Iterator<Item = Row>> RowIteratorExt for I {
    fn map_rows<T: FromRow>(self) -> MapRows<Self, T> {
        MapRows {
            inner: self,
            _marker: std::marker::PhantomData,
        }
    }
}

/// Iterator adapter that maps rows to typed structs.
pub struct MapRows<I, T> {
    inner: I,
    _marker: std::marker::PhantomData<T>,
}

impl<I, T> Iterator for MapRows<I, T>
where
    I: Iterator<Item = Row>,
    T: FromRow,
{
    type Item = Result<T, TypeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|row| T::from_row(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::row::Column;
    use mysql_pool_types::SqlValue;

    struct TestUser {
        id: i32,
        name: String,
    }

    impl FromRow for TestUser {
        fn from_row(row: &Row) -> Result<Self, TypeError> {
            Ok(Self {
                id: row.get_by_name("id")?,
                name: row.get_by_name("name")?,
            })
        }
    }

    fn columns() -> Vec<Column> {
        vec![Column::new("id", 0, "INT"), Column::new("name", 1, "VARCHAR")]
    }

    #[test]
    fn test_from_row_manual_impl() {
        let row = Row::from_values(
            columns(),
            vec![SqlValue::Int(42), SqlValue::String("Alice".to_string())],
        );

        let user = TestUser::from_row(&row).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn test_tuple_from_row() {
        let row = Row::from_values(
            columns(),
            vec![SqlValue::Int(7), SqlValue::String("Bob".to_string())],
        );

        let (id, name): (i64, String) = FromRow::from_row(&row).unwrap();
        assert_eq!(id, 7);
        assert_eq!(name, "Bob");

        let short: Result<(i64, String, i32), _> = FromRow::from_row(&row);
        assert!(matches!(short, Err(TypeError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_map_rows_iterator() {
        let rows = vec![
            Row::from_values(
                columns(),
                vec![SqlValue::Int(1), SqlValue::String("Alice".to_string())],
            ),
            Row::from_values(
                columns(),
                vec![SqlValue::Int(2), SqlValue::String("Bob".to_string())],
            ),
        ];

        let users: Vec<TestUser> = rows
            .into_iter()
            .map_rows::<TestUser>()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[1].name, "Bob");
    }
}
