//! Type conversion edge case tests.
//!
//! Tests edge cases for:
//! - NULL handling
//! - Integer range boundaries
//! - Text and binary interplay
//! - Date/time and decimal columns

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use bytes::Bytes;
use mysql_pool_types::{FromSql, SqlValue, ToSql, TypeError};
use proptest::prelude::*;

// ============================================================================
// NULL Handling Edge Cases
// ============================================================================

mod null_handling {
    use super::*;

    #[test]
    fn test_null_to_option_i32() {
        let result = Option::<i32>::from_sql(&SqlValue::Null);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_null_to_non_option_fails() {
        let result = i32::from_sql(&SqlValue::Null);
        assert!(matches!(result, Err(TypeError::UnexpectedNull)));
    }

    #[test]
    fn test_null_to_string_fails() {
        let result = String::from_sql(&SqlValue::Null);
        assert!(matches!(result, Err(TypeError::UnexpectedNull)));
    }

    #[test]
    fn test_option_none_to_sql() {
        let none_value: Option<i32> = None;
        assert!(none_value.to_sql().is_null());
        assert_eq!(none_value.sql_type(), "NULL");
    }
}

// ============================================================================
// Integer Boundaries
// ============================================================================

mod integer_boundaries {
    use super::*;

    #[test]
    fn test_unsigned_into_signed_in_range() {
        assert_eq!(i32::from_sql(&SqlValue::UInt(42)).unwrap(), 42);
    }

    #[test]
    fn test_bigint_into_i32_out_of_range() {
        let result = i32::from_sql(&SqlValue::Int(i64::from(i32::MAX) + 1));
        assert!(matches!(
            result,
            Err(TypeError::OutOfRange { target_type: "i32" })
        ));
    }

    #[test]
    fn test_negative_into_unsigned_fails() {
        let result = u64::from_sql(&SqlValue::Int(-1));
        assert!(matches!(result, Err(TypeError::OutOfRange { .. })));
    }

    #[test]
    fn test_u64_max_round_trips_as_unsigned() {
        let value = u64::MAX.to_sql();
        assert_eq!(value, SqlValue::UInt(u64::MAX));
        assert_eq!(u64::from_sql(&value).unwrap(), u64::MAX);
    }

    #[test]
    fn test_tinyint_one_reads_as_bool() {
        assert!(bool::from_sql(&SqlValue::Int(1)).unwrap());
        assert!(!bool::from_sql(&SqlValue::UInt(0)).unwrap());
    }

    proptest! {
        #[test]
        fn prop_i64_extracts_losslessly(v in any::<i64>()) {
            prop_assert_eq!(i64::from_sql(&v.to_sql()).unwrap(), v);
        }

        #[test]
        fn prop_i16_accepts_exactly_its_range(v in any::<i64>()) {
            let result = i16::from_sql(&SqlValue::Int(v));
            prop_assert_eq!(result.is_ok(), i16::try_from(v).is_ok());
        }
    }
}

// ============================================================================
// Text and Binary
// ============================================================================

mod text_and_binary {
    use super::*;

    #[test]
    fn test_utf8_bytes_read_as_string() {
        let value = SqlValue::Bytes(Bytes::from_static("héllo".as_bytes()));
        assert_eq!(String::from_sql(&value).unwrap(), "héllo");
    }

    #[test]
    fn test_invalid_utf8_bytes_fail_as_string() {
        let value = SqlValue::Bytes(Bytes::from_static(&[0xff, 0xfe]));
        assert!(matches!(
            String::from_sql(&value),
            Err(TypeError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_string_into_int_is_type_mismatch() {
        let result = i32::from_sql(&SqlValue::String("30".into()));
        match result {
            Err(TypeError::TypeMismatch { expected, actual }) => {
                assert_eq!(expected, "i32");
                assert_eq!(actual, "VARCHAR");
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_byte_slice_to_sql() {
        let data: &[u8] = &[1, 2, 3];
        assert_eq!(data.to_sql(), SqlValue::Bytes(Bytes::from_static(&[1, 2, 3])));
    }
}

// ============================================================================
// Decimal and Date/Time
// ============================================================================

#[cfg(feature = "decimal")]
mod decimal {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_decimal_from_string_column() {
        let value = SqlValue::String("12.50".into());
        assert_eq!(
            Decimal::from_sql(&value).unwrap(),
            Decimal::new(1250, 2)
        );
    }

    #[test]
    fn test_decimal_from_garbage_fails() {
        let value = SqlValue::String("twelve".into());
        assert!(matches!(
            Decimal::from_sql(&value),
            Err(TypeError::InvalidDecimal(_))
        ));
    }
}

#[cfg(feature = "chrono")]
mod datetime {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    #[test]
    fn test_date_widens_to_datetime_at_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let dt = NaiveDateTime::from_sql(&SqlValue::Date(date)).unwrap();
        assert_eq!(dt.date(), date);
        assert_eq!(dt.time(), chrono::NaiveTime::MIN);
    }

    #[test]
    fn test_datetime_narrows_to_date() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            NaiveDate::from_sql(&dt.to_sql()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }
}
