//! # mysql-pool-types
//!
//! MySQL to Rust value mappings and conversions.
//!
//! This crate provides the driver-independent value model used by the pool:
//! [`SqlValue`] carries a single column value or bound parameter, [`ToSql`]
//! turns Rust values into parameters, and [`FromSql`] extracts Rust values
//! from result columns.
//!
//! ## Features
//!
//! - `chrono` (default): Enable date/time type support via chrono
//! - `decimal` (default): Enable decimal type support via rust_decimal
//! - `json`: Enable JSON type support via serde_json
//!
//! ## Type Mappings
//!
//! | MySQL Type | Rust Type |
//! |------------|-----------|
//! | `TINYINT(1)`/`BOOL` | `bool` |
//! | `TINYINT`..`BIGINT` | `i8`..`i64` |
//! | `... UNSIGNED` | `u8`..`u64` |
//! | `FLOAT` | `f32` |
//! | `DOUBLE` | `f64` |
//! | `DECIMAL` | `rust_decimal::Decimal` |
//! | `CHAR`/`VARCHAR`/`TEXT` | `String` |
//! | `BINARY`/`VARBINARY`/`BLOB` | `Vec<u8>` / `bytes::Bytes` |
//! | `DATE` | `chrono::NaiveDate` |
//! | `TIME` | `chrono::NaiveTime` |
//! | `DATETIME`/`TIMESTAMP` | `chrono::NaiveDateTime` |
//! | `JSON` | `serde_json::Value` |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod from_sql;
pub mod to_sql;
pub mod value;

pub use error::TypeError;
pub use from_sql::FromSql;
pub use to_sql::ToSql;
pub use value::SqlValue;
