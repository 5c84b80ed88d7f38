//! Production backend over `mysql_async`.
//!
//! [`MySqlConnector`] opens one [`mysql_async::Conn`] per pooled session;
//! pooling itself is left to the caller. Parameterless statements go over
//! the text protocol (so statements such as `USE` that cannot be prepared
//! still work); statements with parameters are prepared and executed over
//! the binary protocol after `pyformat` placeholders have been rewritten.

use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::consts::{ColumnFlags, ColumnType};
use mysql_async::prelude::{Protocol, Queryable};
use mysql_async::{Conn, Opts, OptsBuilder, QueryResult, Value};
use tracing::Instrument;
use url::Url;

use mysql_pool_types::SqlValue;

use crate::config::Config;
use crate::connection::{Connection, Connector};
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::instrumentation::{InstrumentationContext, SanitizationConfig, record_rows_affected};
use crate::params::Params;
use crate::placeholders::rewrite_pyformat;
use crate::row::{ColMetaData, Column, Row};

/// Collation id of the `binary` character set.
const BINARY_CHARSET: u16 = 63;

/// Opens sessions with `mysql_async`.
#[derive(Debug, Clone, Default)]
pub struct MySqlConnector {
    sanitization: SanitizationConfig,
}

impl MySqlConnector {
    /// Create a connector with default statement sanitization.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how statements are recorded in spans.
    #[must_use]
    pub fn sanitization(mut self, config: SanitizationConfig) -> Self {
        self.sanitization = config;
        self
    }
}

/// Translate pool configuration into driver options.
fn driver_opts(config: &Config) -> Result<Opts> {
    let base = if config.options.is_empty() {
        Opts::default()
    } else {
        let mut url = Url::parse("mysql://localhost/")
            .map_err(|e| Error::Config(format!("invalid driver option: {e}")))?;
        url.query_pairs_mut().extend_pairs(&config.options);
        Opts::from_url(url.as_str())
            .map_err(|e| Error::Config(format!("invalid driver option: {e}")))?
    };

    let mut init = Vec::new();
    if !config.autocommit {
        init.push("SET autocommit = 0".to_string());
    }

    let builder = OptsBuilder::from_opts(base)
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(config.user.clone())
        .pass(config.password.clone())
        .db_name(config.database.clone())
        .init(init);

    Ok(builder.into())
}

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, config: &Config) -> Result<Box<dyn Connection>> {
        let instrumentation = InstrumentationContext::new(config.host.clone(), config.port)
            .with_database(config.database.clone())
            .with_sanitization(self.sanitization.clone());
        let span = instrumentation.connection_span();

        let opts = driver_opts(config)?;
        let conn = tokio::time::timeout(config.connect_timeout, Conn::new(opts))
            .instrument(span.clone())
            .await
            .map_err(|_| Error::ConnectionTimeout)?
            .map_err(|e| match map_error(e) {
                Error::Query(msg) => Error::Connection(msg),
                other => other,
            })?;

        span.record("db.connection_id", conn.id());
        tracing::debug!(
            parent: &span,
            address = %config.address(),
            connection_id = conn.id(),
            "connection established"
        );

        Ok(Box::new(MySqlConnection {
            conn,
            autocommit: config.autocommit,
            instrumentation,
        }))
    }
}

/// A session opened by [`MySqlConnector`].
pub struct MySqlConnection {
    conn: Conn,
    autocommit: bool,
    instrumentation: InstrumentationContext,
}

impl std::fmt::Debug for MySqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConnection")
            .field("id", &self.conn.id())
            .field("autocommit", &self.autocommit)
            .finish_non_exhaustive()
    }
}

impl MySqlConnection {
    async fn run(&mut self, sql: &str, params: &Params) -> Result<Cursor> {
        if params.is_empty() {
            let result = self.conn.query_iter(sql).await.map_err(map_error)?;
            materialize(result).await
        } else {
            let sql = rewrite_pyformat(sql);
            let result = self
                .conn
                .exec_iter(sql.as_ref(), to_driver_params(params))
                .await
                .map_err(map_error)?;
            materialize(result).await
        }
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn query(&mut self, sql: &str, params: &Params) -> Result<Cursor> {
        let span = self.instrumentation.query_span(sql);
        let cursor = self.run(sql, params).instrument(span.clone()).await?;
        record_rows_affected(&span, cursor.rows_affected());
        Ok(cursor)
    }

    async fn commit(&mut self) -> Result<()> {
        let span = self.instrumentation.transaction_span("COMMIT");
        self.conn
            .query_drop("COMMIT")
            .instrument(span)
            .await
            .map_err(|e| match map_error(e) {
                Error::Query(msg) => Error::Transaction(msg),
                other => other,
            })
    }

    async fn rollback(&mut self) -> Result<()> {
        let span = self.instrumentation.transaction_span("ROLLBACK");
        self.conn
            .query_drop("ROLLBACK")
            .instrument(span)
            .await
            .map_err(|e| match map_error(e) {
                Error::Query(msg) => Error::Transaction(msg),
                other => other,
            })
    }

    async fn ping(&mut self) -> Result<()> {
        self.conn.ping().await.map_err(map_error)
    }

    async fn reset(&mut self) -> Result<()> {
        let span = self.instrumentation.transaction_span("RESET");
        async {
            let supported = self.conn.reset().await.map_err(map_error)?;
            if !supported {
                // Pre-5.7 servers: clear what a checkin must not leak.
                self.conn.query_drop("ROLLBACK").await.map_err(map_error)?;
            }
            if !self.autocommit {
                self.conn
                    .query_drop("SET autocommit = 0")
                    .await
                    .map_err(map_error)?;
            }
            Ok::<(), Error>(())
        }
        .instrument(span)
        .await
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.disconnect().await.map_err(map_error)
    }

    fn connection_id(&self) -> Option<u64> {
        Some(u64::from(self.conn.id()))
    }
}

/// Drain a driver result into a [`Cursor`].
///
/// Only the first result set is kept; any further result sets (multi-
/// statement text or `CALL`) are consumed and discarded.
async fn materialize<P>(mut result: QueryResult<'_, '_, P>) -> Result<Cursor>
where
    P: Protocol + Unpin,
{
    let driver_columns = result.columns_ref().to_vec();
    let metadata = Arc::new(ColMetaData::new(
        driver_columns
            .iter()
            .enumerate()
            .map(|(index, column)| column_metadata(index, column))
            .collect(),
    ));

    let driver_rows: Vec<mysql_async::Row> = result.collect().await.map_err(map_error)?;
    let rows_affected = result.affected_rows();
    let last_insert_id = result.last_insert_id();
    let warnings = result.warnings();
    result.drop_result().await.map_err(map_error)?;

    if driver_columns.is_empty() {
        return Ok(Cursor::affected(rows_affected, last_insert_id).with_warnings(warnings));
    }

    let rows = driver_rows
        .into_iter()
        .map(|mut row| {
            let values = driver_columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value: Value = row.take(i).unwrap_or(Value::NULL);
                    from_driver_value(value, column)
                })
                .collect();
            Row::new(Arc::clone(&metadata), values)
        })
        .collect();

    Ok(Cursor::result_set(metadata, rows)
        .with_rows_affected(rows_affected)
        .with_warnings(warnings))
}

fn column_metadata(index: usize, column: &mysql_async::Column) -> Column {
    let flags = column.flags();
    let table = column.org_table_str();
    let mut meta = Column::new(
        column.name_str().into_owned(),
        index,
        type_name(column.column_type()),
    )
    .with_nullable(!flags.contains(ColumnFlags::NOT_NULL_FLAG))
    .with_unsigned(flags.contains(ColumnFlags::UNSIGNED_FLAG));
    if !table.is_empty() {
        meta = meta.with_table(table.into_owned());
    }
    meta
}

fn type_name(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::MYSQL_TYPE_TINY => "TINYINT",
        ColumnType::MYSQL_TYPE_SHORT => "SMALLINT",
        ColumnType::MYSQL_TYPE_INT24 => "MEDIUMINT",
        ColumnType::MYSQL_TYPE_LONG => "INT",
        ColumnType::MYSQL_TYPE_LONGLONG => "BIGINT",
        ColumnType::MYSQL_TYPE_YEAR => "YEAR",
        ColumnType::MYSQL_TYPE_FLOAT => "FLOAT",
        ColumnType::MYSQL_TYPE_DOUBLE => "DOUBLE",
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => "DECIMAL",
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => "DATE",
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => "TIME",
        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_DATETIME2 => "DATETIME",
        ColumnType::MYSQL_TYPE_TIMESTAMP | ColumnType::MYSQL_TYPE_TIMESTAMP2 => "TIMESTAMP",
        ColumnType::MYSQL_TYPE_JSON => "JSON",
        ColumnType::MYSQL_TYPE_BIT => "BIT",
        ColumnType::MYSQL_TYPE_ENUM => "ENUM",
        ColumnType::MYSQL_TYPE_SET => "SET",
        ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB => "BLOB",
        ColumnType::MYSQL_TYPE_STRING => "CHAR",
        ColumnType::MYSQL_TYPE_GEOMETRY => "GEOMETRY",
        ColumnType::MYSQL_TYPE_NULL => "NULL",
        _ => "VARCHAR",
    }
}

/// Convert a driver value using the column it came from.
///
/// The text protocol delivers every non-NULL value as bytes; those are
/// parsed according to the column type. Values that do not parse (zero
/// dates, out-of-range `TIME`) are kept as their text.
fn from_driver_value(value: Value, column: &mysql_async::Column) -> SqlValue {
    let column_type = column.column_type();
    let unsigned = column.flags().contains(ColumnFlags::UNSIGNED_FLAG);

    match value {
        Value::NULL => SqlValue::Null,
        Value::Int(v) => SqlValue::Int(v),
        Value::UInt(v) => SqlValue::UInt(v),
        Value::Float(v) => SqlValue::Float(v),
        Value::Double(v) => SqlValue::Double(v),
        Value::Bytes(bytes) => from_text(bytes, column_type, unsigned, column.character_set()),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            from_date_parts(column_type, year, month, day, hour, minute, second, micros)
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            from_time_parts(negative, days, hours, minutes, seconds, micros)
        }
    }
}

fn from_text(bytes: Vec<u8>, column_type: ColumnType, unsigned: bool, charset: u16) -> SqlValue {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => return SqlValue::Bytes(e.into_bytes().into()),
    };

    match column_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => {
            let parsed = if unsigned {
                text.parse().map(SqlValue::UInt).ok()
            } else {
                text.parse().map(SqlValue::Int).ok()
            };
            parsed.unwrap_or(SqlValue::String(text))
        }
        ColumnType::MYSQL_TYPE_FLOAT => text
            .parse()
            .map(SqlValue::Float)
            .unwrap_or(SqlValue::String(text)),
        ColumnType::MYSQL_TYPE_DOUBLE => text
            .parse()
            .map(SqlValue::Double)
            .unwrap_or(SqlValue::String(text)),
        #[cfg(feature = "decimal")]
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => text
            .parse()
            .map(SqlValue::Decimal)
            .unwrap_or(SqlValue::String(text)),
        #[cfg(feature = "chrono")]
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .map(SqlValue::Date)
                .unwrap_or(SqlValue::String(text))
        }
        #[cfg(feature = "chrono")]
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_DATETIME2
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_TIMESTAMP2 => {
            chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
                .map(SqlValue::DateTime)
                .unwrap_or(SqlValue::String(text))
        }
        #[cfg(feature = "chrono")]
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => {
            chrono::NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
                .map(SqlValue::Time)
                .unwrap_or(SqlValue::String(text))
        }
        #[cfg(feature = "json")]
        ColumnType::MYSQL_TYPE_JSON => serde_json::from_str(&text)
            .map(SqlValue::Json)
            .unwrap_or(SqlValue::String(text)),
        ColumnType::MYSQL_TYPE_BIT => SqlValue::Bytes(text.into_bytes().into()),
        _ if charset == BINARY_CHARSET => SqlValue::Bytes(text.into_bytes().into()),
        _ => SqlValue::String(text),
    }
}

#[allow(clippy::too_many_arguments)]
fn from_date_parts(
    column_type: ColumnType,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
) -> SqlValue {
    #[cfg(feature = "chrono")]
    {
        let date = chrono::NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day));
        let time = chrono::NaiveTime::from_hms_micro_opt(
            u32::from(hour),
            u32::from(minute),
            u32::from(second),
            micros,
        );
        if let (Some(date), Some(time)) = (date, time) {
            return if matches!(
                column_type,
                ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE
            ) {
                SqlValue::Date(date)
            } else {
                SqlValue::DateTime(date.and_time(time))
            };
        }
    }
    #[cfg(not(feature = "chrono"))]
    let _ = column_type;

    SqlValue::String(format!(
        "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micros:06}"
    ))
}

fn from_time_parts(
    negative: bool,
    days: u32,
    hours: u8,
    minutes: u8,
    seconds: u8,
    micros: u32,
) -> SqlValue {
    #[cfg(feature = "chrono")]
    if !negative && days == 0 {
        if let Some(time) = chrono::NaiveTime::from_hms_micro_opt(
            u32::from(hours),
            u32::from(minutes),
            u32::from(seconds),
            micros,
        ) {
            return SqlValue::Time(time);
        }
    }

    let sign = if negative { "-" } else { "" };
    let total_hours = days * 24 + u32::from(hours);
    SqlValue::String(format!(
        "{sign}{total_hours:02}:{minutes:02}:{seconds:02}.{micros:06}"
    ))
}

fn to_driver_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Bool(v) => Value::Int(i64::from(*v)),
        SqlValue::Int(v) => Value::Int(*v),
        SqlValue::UInt(v) => Value::UInt(*v),
        SqlValue::Float(v) => Value::Float(*v),
        SqlValue::Double(v) => Value::Double(*v),
        SqlValue::String(v) => Value::Bytes(v.as_bytes().to_vec()),
        SqlValue::Bytes(v) => Value::Bytes(v.to_vec()),
        #[cfg(feature = "decimal")]
        SqlValue::Decimal(v) => Value::Bytes(v.to_string().into_bytes()),
        #[cfg(feature = "chrono")]
        SqlValue::Date(v) => {
            use chrono::Datelike;
            Value::Date(
                u16::try_from(v.year()).unwrap_or_default(),
                v.month() as u8,
                v.day() as u8,
                0,
                0,
                0,
                0,
            )
        }
        #[cfg(feature = "chrono")]
        SqlValue::Time(v) => {
            use chrono::Timelike;
            Value::Time(
                false,
                0,
                v.hour() as u8,
                v.minute() as u8,
                v.second() as u8,
                v.nanosecond() / 1_000,
            )
        }
        #[cfg(feature = "chrono")]
        SqlValue::DateTime(v) => {
            use chrono::{Datelike, Timelike};
            Value::Date(
                u16::try_from(v.year()).unwrap_or_default(),
                v.month() as u8,
                v.day() as u8,
                v.hour() as u8,
                v.minute() as u8,
                v.second() as u8,
                v.nanosecond() / 1_000,
            )
        }
        #[cfg(feature = "json")]
        SqlValue::Json(v) => Value::Bytes(v.to_string().into_bytes()),
    }
}

fn to_driver_params(params: &Params) -> mysql_async::Params {
    match params {
        Params::None => mysql_async::Params::Empty,
        Params::Positional(values) => {
            mysql_async::Params::Positional(values.iter().map(to_driver_value).collect())
        }
        Params::Named(values) => mysql_async::Params::from(
            values
                .iter()
                .map(|p| (p.name.clone(), to_driver_value(&p.value)))
                .collect::<Vec<_>>(),
        ),
    }
}

fn map_error(error: mysql_async::Error) -> Error {
    match error {
        mysql_async::Error::Server(e) => Error::Server {
            code: e.code,
            state: e.state,
            message: e.message,
        },
        mysql_async::Error::Io(e) => Error::Connection(e.to_string()),
        mysql_async::Error::Url(e) => Error::Config(e.to_string()),
        mysql_async::Error::Driver(mysql_async::DriverError::ConnectionClosed) => {
            Error::ConnectionClosed
        }
        other => Error::Query(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_opts_carry_config() {
        let config = Config::new()
            .host("db.internal")
            .port(3307)
            .user("app")
            .password("pw")
            .database("shop");
        let opts = driver_opts(&config).unwrap();

        assert_eq!(opts.ip_or_hostname(), "db.internal");
        assert_eq!(opts.tcp_port(), 3307);
        assert_eq!(opts.user(), Some("app"));
        assert_eq!(opts.db_name(), Some("shop"));
        assert!(opts.init().is_empty());
    }

    #[test]
    fn test_driver_opts_disable_autocommit() {
        let opts = driver_opts(&Config::new().autocommit(false)).unwrap();
        assert_eq!(opts.init().len(), 1);
        assert_eq!(opts.init()[0], "SET autocommit = 0");
    }

    #[test]
    fn test_driver_opts_keep_option_values_intact() {
        let config = Config::from_url("mysql://localhost/?socket=%2Ftmp%2Fa%23b%26c%3Dd%20e%2Bf")
            .unwrap();
        assert_eq!(
            config.options.get("socket").map(String::as_str),
            Some("/tmp/a#b&c=d e+f")
        );

        let opts = driver_opts(&config).unwrap();
        assert_eq!(opts.socket(), Some("/tmp/a#b&c=d e+f"));
    }

    #[test]
    fn test_driver_opts_reject_unknown_option() {
        let config = Config::new().option("definitely_not_an_option", "1");
        assert!(matches!(driver_opts(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_text_integers_respect_unsigned() {
        assert_eq!(
            from_text(b"42".to_vec(), ColumnType::MYSQL_TYPE_LONG, false, 33),
            SqlValue::Int(42)
        );
        assert_eq!(
            from_text(
                b"18446744073709551615".to_vec(),
                ColumnType::MYSQL_TYPE_LONGLONG,
                true,
                63
            ),
            SqlValue::UInt(u64::MAX)
        );
    }

    #[test]
    fn test_text_strings_and_binary() {
        assert_eq!(
            from_text(b"John Doe".to_vec(), ColumnType::MYSQL_TYPE_VAR_STRING, false, 255),
            SqlValue::String("John Doe".into())
        );
        assert_eq!(
            from_text(b"\x01\x02".to_vec(), ColumnType::MYSQL_TYPE_BLOB, false, BINARY_CHARSET),
            SqlValue::Bytes(bytes::Bytes::from_static(b"\x01\x02"))
        );
        assert!(matches!(
            from_text(vec![0xff], ColumnType::MYSQL_TYPE_VAR_STRING, false, 255),
            SqlValue::Bytes(_)
        ));
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn test_text_dates_and_zero_date() {
        assert_eq!(
            from_text(b"2024-02-29".to_vec(), ColumnType::MYSQL_TYPE_DATE, false, 63),
            SqlValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(
            from_text(b"0000-00-00".to_vec(), ColumnType::MYSQL_TYPE_DATE, false, 63),
            SqlValue::String("0000-00-00".into())
        );
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn test_binary_date_parts() {
        let value = from_date_parts(ColumnType::MYSQL_TYPE_DATETIME, 2024, 1, 2, 3, 4, 5, 6);
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 6)
            .unwrap();
        assert_eq!(value, SqlValue::DateTime(expected));
    }

    #[test]
    fn test_long_time_kept_as_text() {
        assert_eq!(
            from_time_parts(true, 1, 2, 3, 4, 0),
            SqlValue::String("-26:03:04.000000".into())
        );
    }

    #[test]
    fn test_params_conversion() {
        let positional = to_driver_params(&Params::positional(&[&"Ada", &30, &true]));
        assert_eq!(
            positional,
            mysql_async::Params::Positional(vec![
                Value::Bytes(b"Ada".to_vec()),
                Value::Int(30),
                Value::Int(1),
            ])
        );
        assert_eq!(to_driver_params(&Params::None), mysql_async::Params::Empty);
        assert!(matches!(
            to_driver_params(&Params::named(&[("name", &"Ada")])),
            mysql_async::Params::Named(_)
        ));
    }

    /// Requires a running server reachable through `MYSQL_*` variables.
    #[tokio::test]
    #[ignore = "Requires MySQL"]
    async fn test_round_trip_against_server() {
        let config = Config::new()
            .host(std::env::var("MYSQL_HOST").unwrap_or_else(|_| "localhost".into()))
            .user(std::env::var("MYSQL_USER").unwrap_or_else(|_| "root".into()))
            .password(std::env::var("MYSQL_PASSWORD").unwrap_or_default());

        let mut conn = MySqlConnector::new().connect(&config).await.unwrap();
        let mut cursor = conn
            .query("SELECT %s AS greeting, 41 + 1 AS answer", &Params::positional(&[&"hi"]))
            .await
            .unwrap();
        let row = cursor.fetch_one().unwrap();
        assert_eq!(row.get_by_name::<String>("greeting").unwrap(), "hi");
        assert_eq!(row.get_by_name::<i64>("answer").unwrap(), 42);

        conn.reset().await.unwrap();
        conn.ping().await.unwrap();
        conn.close().await.unwrap();
    }
}
