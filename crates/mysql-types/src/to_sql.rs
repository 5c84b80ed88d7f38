//! Trait for converting Rust types to SQL values.

use crate::value::SqlValue;

/// Trait for types that can be bound as statement parameters.
///
/// Every supported Rust type has a lossless MySQL counterpart, so the
/// conversion cannot fail. The trait is object safe; parameter lists are
/// written as `&[&(dyn ToSql + Sync)]`.
pub trait ToSql {
    /// Convert this value to a SQL value.
    fn to_sql(&self) -> SqlValue;

    /// Get the MySQL type name for this value.
    fn sql_type(&self) -> &'static str;
}

macro_rules! to_sql_via_from {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> SqlValue {
                    SqlValue::from(*self)
                }

                fn sql_type(&self) -> &'static str {
                    $name
                }
            }
        )*
    };
}

to_sql_via_from!(
    bool => "BOOL",
    i32 => "INT",
    i64 => "BIGINT",
    u32 => "INT UNSIGNED",
    u64 => "BIGINT UNSIGNED",
    f32 => "FLOAT",
    f64 => "DOUBLE",
);

impl ToSql for i8 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Int(i64::from(*self))
    }

    fn sql_type(&self) -> &'static str {
        "TINYINT"
    }
}

impl ToSql for i16 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Int(i64::from(*self))
    }

    fn sql_type(&self) -> &'static str {
        "SMALLINT"
    }
}

impl ToSql for u8 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::UInt(u64::from(*self))
    }

    fn sql_type(&self) -> &'static str {
        "TINYINT UNSIGNED"
    }
}

impl ToSql for u16 {
    fn to_sql(&self) -> SqlValue {
        SqlValue::UInt(u64::from(*self))
    }

    fn sql_type(&self) -> &'static str {
        "SMALLINT UNSIGNED"
    }
}

impl ToSql for str {
    fn to_sql(&self) -> SqlValue {
        SqlValue::String(self.to_owned())
    }

    fn sql_type(&self) -> &'static str {
        "VARCHAR"
    }
}

impl ToSql for String {
    fn to_sql(&self) -> SqlValue {
        SqlValue::String(self.clone())
    }

    fn sql_type(&self) -> &'static str {
        "VARCHAR"
    }
}

impl ToSql for [u8] {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Bytes(bytes::Bytes::copy_from_slice(self))
    }

    fn sql_type(&self) -> &'static str {
        "VARBINARY"
    }
}

impl ToSql for Vec<u8> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Bytes(bytes::Bytes::copy_from_slice(self))
    }

    fn sql_type(&self) -> &'static str {
        "VARBINARY"
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> SqlValue {
        self.clone()
    }

    fn sql_type(&self) -> &'static str {
        self.type_name()
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_sql(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql(),
            None => SqlValue::Null,
        }
    }

    fn sql_type(&self) -> &'static str {
        match self {
            Some(v) => v.sql_type(),
            None => "NULL",
        }
    }
}

impl<T: ToSql + ?Sized> ToSql for &T {
    fn to_sql(&self) -> SqlValue {
        (*self).to_sql()
    }

    fn sql_type(&self) -> &'static str {
        (*self).sql_type()
    }
}

#[cfg(feature = "decimal")]
impl ToSql for rust_decimal::Decimal {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Decimal(*self)
    }

    fn sql_type(&self) -> &'static str {
        "DECIMAL"
    }
}

#[cfg(feature = "chrono")]
impl ToSql for chrono::NaiveDate {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Date(*self)
    }

    fn sql_type(&self) -> &'static str {
        "DATE"
    }
}

#[cfg(feature = "chrono")]
impl ToSql for chrono::NaiveTime {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Time(*self)
    }

    fn sql_type(&self) -> &'static str {
        "TIME"
    }
}

#[cfg(feature = "chrono")]
impl ToSql for chrono::NaiveDateTime {
    fn to_sql(&self) -> SqlValue {
        SqlValue::DateTime(*self)
    }

    fn sql_type(&self) -> &'static str {
        "DATETIME"
    }
}

#[cfg(feature = "json")]
impl ToSql for serde_json::Value {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Json(self.clone())
    }

    fn sql_type(&self) -> &'static str {
        "JSON"
    }
}
