//! Scripted in-memory driver for unit testing.
//!
//! [`MockConnector`] implements [`Connector`] without any network access.
//! Statements are answered from a table of scripted [`MockResponse`]s; a
//! handful of session statements are understood natively:
//!
//! - `SELECT DATABASE()` returns the session's selected database
//! - `USE <db>` switches it (unknown databases fail with error 1049)
//! - `CREATE DATABASE [IF NOT EXISTS] <db>` registers a database
//! - `SELECT 1` returns a single row
//!
//! Every call is appended to a shared [`MockEvent`] log, and the connector
//! counts sessions opened, closed and currently alive, which is what pool
//! tests assert on.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mysql_pool_testing::mock::{MockColumn, MockConnector, MockResponse};
//! use mysql_pool_types::SqlValue;
//!
//! let connector = MockConnector::builder()
//!     .with_database("test_db")
//!     .with_response(
//!         "SELECT * FROM users",
//!         MockResponse::rows(
//!             vec![MockColumn::int("id"), MockColumn::varchar("name")],
//!             vec![vec![SqlValue::Int(1), SqlValue::from("Ada")]],
//!         ),
//!     )
//!     .build();
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use mysql_pool_client::{
    ColMetaData, Column, Config, Connection, Connector, Cursor, Error, Params, Result, Row,
};
use mysql_pool_types::SqlValue;

/// Scripted response to a statement.
#[derive(Clone)]
pub enum MockResponse {
    /// Return a result set.
    Rows {
        /// Column definitions.
        columns: Vec<MockColumn>,
        /// Row data.
        rows: Vec<Vec<SqlValue>>,
    },

    /// Return an affected-row count and generated id.
    Affected {
        /// Rows affected.
        rows_affected: u64,
        /// Generated `AUTO_INCREMENT` value.
        last_insert_id: Option<u64>,
    },

    /// Fail with a server error.
    Error {
        /// MySQL error code.
        code: u16,
        /// Error message.
        message: String,
    },

    /// Fail as if the network connection dropped.
    ConnectionLost,

    /// Answer with the inner response after a delay.
    Delayed(Duration, Box<MockResponse>),

    /// Compute the response from the statement and its parameters.
    Custom(Arc<dyn Fn(&str, &Params) -> MockResponse + Send + Sync>),
}

impl fmt::Debug for MockResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows { columns, rows } => f
                .debug_struct("Rows")
                .field("columns", columns)
                .field("rows", rows)
                .finish(),
            Self::Affected {
                rows_affected,
                last_insert_id,
            } => f
                .debug_struct("Affected")
                .field("rows_affected", rows_affected)
                .field("last_insert_id", last_insert_id)
                .finish(),
            Self::Error { code, message } => f
                .debug_struct("Error")
                .field("code", code)
                .field("message", message)
                .finish(),
            Self::ConnectionLost => f.write_str("ConnectionLost"),
            Self::Delayed(delay, inner) => {
                f.debug_tuple("Delayed").field(delay).field(inner).finish()
            }
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

impl MockResponse {
    /// Create a multi-row response.
    pub fn rows(columns: Vec<MockColumn>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self::Rows { columns, rows }
    }

    /// Create a single-value response.
    pub fn scalar(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::Rows {
            columns: vec![MockColumn::new(name, "BIGINT")],
            rows: vec![vec![value.into()]],
        }
    }

    /// Create an empty result set with the given columns.
    pub fn empty_rows(columns: Vec<MockColumn>) -> Self {
        Self::Rows {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a rows affected response.
    pub fn affected(count: u64) -> Self {
        Self::Affected {
            rows_affected: count,
            last_insert_id: None,
        }
    }

    /// Create an insert response carrying a generated id.
    pub fn inserted(count: u64, last_insert_id: u64) -> Self {
        Self::Affected {
            rows_affected: count,
            last_insert_id: Some(last_insert_id),
        }
    }

    /// Create a server error response.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// Delay this response.
    #[must_use]
    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }

    /// Create a response computed per call.
    pub fn custom(f: impl Fn(&str, &Params) -> MockResponse + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }
}

/// Column definition for mock result sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockColumn {
    /// Column name.
    pub name: String,
    /// MySQL type name.
    pub type_name: String,
}

impl MockColumn {
    /// Create a column.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an `INT` column.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, "INT")
    }

    /// Create a `VARCHAR` column.
    pub fn varchar(name: impl Into<String>) -> Self {
        Self::new(name, "VARCHAR")
    }
}

/// Something that happened to a mock session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// A session was opened.
    Connect {
        /// Session id.
        id: u64,
    },
    /// A statement was executed (successfully or not).
    Query {
        /// Session id.
        id: u64,
        /// Statement text as received.
        sql: String,
    },
    /// `commit()` was called.
    Commit {
        /// Session id.
        id: u64,
    },
    /// `rollback()` was called.
    Rollback {
        /// Session id.
        id: u64,
    },
    /// `ping()` was called.
    Ping {
        /// Session id.
        id: u64,
    },
    /// `reset()` was called.
    Reset {
        /// Session id.
        id: u64,
    },
    /// `close()` was called.
    Close {
        /// Session id.
        id: u64,
    },
}

impl MockEvent {
    /// Session the event belongs to.
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            Self::Connect { id }
            | Self::Query { id, .. }
            | Self::Commit { id }
            | Self::Rollback { id }
            | Self::Ping { id }
            | Self::Reset { id }
            | Self::Close { id } => *id,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    responses: Mutex<HashMap<String, MockResponse>>,
    default_response: Mutex<Option<MockResponse>>,
    databases: Mutex<HashSet<String>>,
    events: Mutex<Vec<MockEvent>>,
    connect_delay: Mutex<Option<Duration>>,
    reset_delay: Mutex<Option<Duration>>,
    failing_connects: AtomicUsize,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
    fail_reset: AtomicBool,
    fail_ping: AtomicBool,
    next_id: AtomicU64,
    opened: AtomicUsize,
    closed: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
}

impl MockState {
    fn record(&self, event: MockEvent) {
        tracing::trace!(?event, "mock event");
        self.events.lock().push(event);
    }
}

/// Builder for [`MockConnector`].
#[derive(Debug, Default)]
pub struct MockConnectorBuilder {
    responses: HashMap<String, MockResponse>,
    default_response: Option<MockResponse>,
    databases: HashSet<String>,
    connect_delay: Option<Duration>,
}

impl MockConnectorBuilder {
    /// Script the response to a statement (matched after trimming).
    #[must_use]
    pub fn with_response(mut self, sql: impl Into<String>, response: MockResponse) -> Self {
        self.responses.insert(normalize(&sql.into()), response);
        self
    }

    /// Response for statements without a scripted one.
    ///
    /// Without it, unscripted statements report zero affected rows.
    #[must_use]
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Register a database that `USE` accepts.
    #[must_use]
    pub fn with_database(mut self, name: impl Into<String>) -> Self {
        self.databases.insert(name.into());
        self
    }

    /// Delay every connection attempt.
    #[must_use]
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// Build the connector.
    pub fn build(self) -> MockConnector {
        let state = MockState {
            responses: Mutex::new(self.responses),
            default_response: Mutex::new(self.default_response),
            databases: Mutex::new(self.databases),
            connect_delay: Mutex::new(self.connect_delay),
            ..MockState::default()
        };
        MockConnector {
            state: Arc::new(state),
        }
    }
}

/// In-memory [`Connector`] with scripted responses.
///
/// Clones share state, so a test can keep one clone for assertions and
/// hand another to the pool.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    /// Create a connector with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> MockConnectorBuilder {
        MockConnectorBuilder::default()
    }

    /// Script (or replace) the response to a statement.
    pub fn set_response(&self, sql: impl Into<String>, response: MockResponse) {
        self.state
            .responses
            .lock()
            .insert(normalize(&sql.into()), response);
    }

    /// Make the next `n` connection attempts fail.
    pub fn fail_next_connects(&self, n: usize) {
        self.state.failing_connects.store(n, Ordering::SeqCst);
    }

    /// Make `commit()` fail.
    pub fn set_fail_commit(&self, fail: bool) {
        self.state.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Make `rollback()` fail.
    pub fn set_fail_rollback(&self, fail: bool) {
        self.state.fail_rollback.store(fail, Ordering::SeqCst);
    }

    /// Make `reset()` fail.
    pub fn set_fail_reset(&self, fail: bool) {
        self.state.fail_reset.store(fail, Ordering::SeqCst);
    }

    /// Delay every `reset()` by `delay`, or stop delaying with `None`.
    pub fn set_reset_delay(&self, delay: Option<Duration>) {
        *self.state.reset_delay.lock() = delay;
    }

    /// Make `ping()` fail.
    pub fn set_fail_ping(&self, fail: bool) {
        self.state.fail_ping.store(fail, Ordering::SeqCst);
    }

    /// Register a database that `USE` accepts.
    pub fn add_database(&self, name: impl Into<String>) {
        self.state.databases.lock().insert(name.into());
    }

    /// Sessions opened so far.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed through `close()`.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Sessions currently alive (opened and not yet closed or dropped).
    #[must_use]
    pub fn live(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Highest number of sessions alive at the same time.
    #[must_use]
    pub fn peak_live(&self) -> usize {
        self.state.peak_live.load(Ordering::SeqCst)
    }

    /// Snapshot of the event log.
    #[must_use]
    pub fn events(&self) -> Vec<MockEvent> {
        self.state.events.lock().clone()
    }

    /// Statements executed so far, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.state
            .events
            .lock()
            .iter()
            .filter_map(|e| match e {
                MockEvent::Query { sql, .. } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Count events matching a predicate.
    pub fn count_events(&self, predicate: impl Fn(&MockEvent) -> bool) -> usize {
        self.state.events.lock().iter().filter(|e| predicate(e)).count()
    }

    /// Clear the event log.
    pub fn clear_events(&self) {
        self.state.events.lock().clear();
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, config: &Config) -> Result<Box<dyn Connection>> {
        let delay = *self.state.connect_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .state
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Connection(format!(
                "mock refused connection to {}",
                config.address()
            )));
        }

        if let Some(db) = &config.database {
            if !self.state.databases.lock().contains(db) {
                return Err(unknown_database(db));
            }
        }

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.state.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_live.fetch_max(live, Ordering::SeqCst);
        self.state.record(MockEvent::Connect { id });

        Ok(Box::new(MockConnection {
            id,
            database: config.database.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

/// A session opened by [`MockConnector`].
#[derive(Debug)]
pub struct MockConnection {
    id: u64,
    database: Option<String>,
    state: Arc<MockState>,
}

impl MockConnection {
    fn builtin(&mut self, sql: &str) -> Option<MockResponse> {
        let upper = sql.to_ascii_uppercase();
        if upper == "SELECT DATABASE()" {
            let value = SqlValue::from(self.database.clone());
            return Some(MockResponse::rows(
                vec![MockColumn::varchar("DATABASE()")],
                vec![vec![value]],
            ));
        }
        if upper == "SELECT 1" {
            return Some(MockResponse::scalar("1", 1i64));
        }
        if let Some(rest) = strip_keyword(sql, "USE") {
            let name = unquote(rest);
            if self.state.databases.lock().contains(name) {
                self.database = Some(name.to_string());
                return Some(MockResponse::affected(0));
            }
            return Some(MockResponse::Error {
                code: 1049,
                message: format!("Unknown database '{name}'"),
            });
        }
        if let Some(rest) = strip_keyword(sql, "CREATE DATABASE") {
            let (if_not_exists, rest) = match strip_keyword(rest, "IF NOT EXISTS") {
                Some(rest) => (true, rest),
                None => (false, rest),
            };
            let name = unquote(rest).to_string();
            let inserted = self.state.databases.lock().insert(name.clone());
            return Some(match (inserted, if_not_exists) {
                (true, _) => MockResponse::affected(1),
                (false, true) => MockResponse::affected(0),
                (false, false) => MockResponse::Error {
                    code: 1007,
                    message: format!("Can't create database '{name}'; database exists"),
                },
            });
        }
        None
    }

    async fn answer(&mut self, sql: &str, params: &Params, response: MockResponse) -> Result<Cursor> {
        let mut response = response;
        while matches!(
            response,
            MockResponse::Delayed(..) | MockResponse::Custom(_)
        ) {
            response = match response {
                MockResponse::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    *inner
                }
                MockResponse::Custom(f) => f(sql, params),
                other => other,
            };
        }

        match response {
            MockResponse::Rows { columns, rows } => {
                let metadata = Arc::new(ColMetaData::new(
                    columns
                        .into_iter()
                        .enumerate()
                        .map(|(i, c)| Column::new(c.name, i, c.type_name))
                        .collect(),
                ));
                let rows = rows
                    .into_iter()
                    .map(|values| Row::new(Arc::clone(&metadata), values))
                    .collect();
                Ok(Cursor::result_set(metadata, rows))
            }
            MockResponse::Affected {
                rows_affected,
                last_insert_id,
            } => Ok(Cursor::affected(rows_affected, last_insert_id)),
            MockResponse::Error { code, message } => Err(Error::Server {
                code,
                state: "HY000".to_string(),
                message,
            }),
            MockResponse::ConnectionLost => Err(Error::ConnectionClosed),
            MockResponse::Delayed(..) | MockResponse::Custom(_) => {
                Err(Error::Query("unresolved mock response".to_string()))
            }
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(&mut self, sql: &str, params: &Params) -> Result<Cursor> {
        self.state.record(MockEvent::Query {
            id: self.id,
            sql: sql.to_string(),
        });

        let key = normalize(sql);
        let scripted = self.state.responses.lock().get(&key).cloned();
        let response = match scripted {
            Some(response) => response,
            None => match self.builtin(&key) {
                Some(response) => response,
                None => self
                    .state
                    .default_response
                    .lock()
                    .clone()
                    .unwrap_or(MockResponse::affected(0)),
            },
        };

        self.answer(sql, params, response).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.state.record(MockEvent::Commit { id: self.id });
        if self.state.fail_commit.load(Ordering::SeqCst) {
            return Err(Error::Transaction("mock commit failure".to_string()));
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.state.record(MockEvent::Rollback { id: self.id });
        if self.state.fail_rollback.load(Ordering::SeqCst) {
            return Err(Error::Transaction("mock rollback failure".to_string()));
        }
        Ok(())
    }

    async fn ping(&mut self) -> Result<()> {
        self.state.record(MockEvent::Ping { id: self.id });
        if self.state.fail_ping.load(Ordering::SeqCst) {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }

    async fn reset(&mut self) -> Result<()> {
        self.state.record(MockEvent::Reset { id: self.id });
        let delay = *self.state.reset_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.state.fail_reset.load(Ordering::SeqCst) {
            return Err(Error::Server {
                code: 1927,
                state: "70100".to_string(),
                message: "Connection was killed".to_string(),
            });
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.record(MockEvent::Close { id: self.id });
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn connection_id(&self) -> Option<u64> {
        Some(self.id)
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn normalize(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim().to_string()
}

fn strip_keyword<'a>(sql: &'a str, keyword: &str) -> Option<&'a str> {
    let head = sql.get(..keyword.len())?;
    let rest = &sql[keyword.len()..];
    if head.eq_ignore_ascii_case(keyword) && rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn unquote(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix('`')
        .and_then(|n| n.strip_suffix('`'))
        .unwrap_or(name)
}

fn unknown_database(name: &str) -> Error {
    Error::Server {
        code: 1049,
        state: "42000".to_string(),
        message: format!("Unknown database '{name}'"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_rows() {
        let connector = MockConnector::builder()
            .with_response(
                "SELECT * FROM users",
                MockResponse::rows(
                    vec![MockColumn::int("id"), MockColumn::varchar("name")],
                    vec![vec![SqlValue::Int(1), SqlValue::from("Ada")]],
                ),
            )
            .build();

        let mut conn = connector.connect(&Config::default()).await.unwrap();
        let mut cursor = conn
            .query("SELECT * FROM users;", &Params::None)
            .await
            .unwrap();
        let row = cursor.fetch_one().unwrap();
        assert_eq!(row.get_by_name::<String>("name").unwrap(), "Ada");
    }

    #[tokio::test]
    async fn test_use_and_database() {
        let connector = MockConnector::builder().with_database("test_db").build();
        let mut conn = connector.connect(&Config::default()).await.unwrap();

        let mut cursor = conn.query("SELECT DATABASE()", &Params::None).await.unwrap();
        assert!(cursor.fetch_one().unwrap().get_raw(0).unwrap().is_null());

        conn.query("USE `test_db`", &Params::None).await.unwrap();
        let mut cursor = conn.query("SELECT DATABASE()", &Params::None).await.unwrap();
        assert_eq!(cursor.fetch_one().unwrap().get::<String>(0).unwrap(), "test_db");

        let err = conn.query("USE nope", &Params::None).await.unwrap_err();
        assert!(err.is_server_error(1049));
    }

    #[tokio::test]
    async fn test_create_database_registers_it() {
        let connector = MockConnector::new();
        let mut conn = connector.connect(&Config::default()).await.unwrap();

        conn.query("CREATE DATABASE IF NOT EXISTS shop", &Params::None)
            .await
            .unwrap();
        let err = conn.query("CREATE DATABASE shop", &Params::None).await.unwrap_err();
        assert!(err.is_server_error(1007));
        conn.query("use shop", &Params::None).await.unwrap();
    }

    #[tokio::test]
    async fn test_live_counting() {
        let connector = MockConnector::new();
        let a = connector.connect(&Config::default()).await.unwrap();
        let b = connector.connect(&Config::default()).await.unwrap();
        assert_eq!(connector.live(), 2);

        a.close().await.unwrap();
        drop(b);
        assert_eq!(connector.live(), 0);
        assert_eq!(connector.opened(), 2);
        assert_eq!(connector.closed(), 1);
        assert_eq!(connector.peak_live(), 2);
    }

    #[tokio::test]
    async fn test_failing_connects() {
        let connector = MockConnector::new();
        connector.fail_next_connects(1);
        assert!(connector.connect(&Config::default()).await.is_err());
        assert!(connector.connect(&Config::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_login_database() {
        let connector = MockConnector::new();
        let err = connector
            .connect(&Config::default().database("missing"))
            .await
            .err()
            .unwrap();
        assert!(err.is_server_error(1049));
        assert_eq!(connector.opened(), 0);
    }

    #[test]
    fn test_strip_keyword() {
        assert_eq!(strip_keyword("USE db", "USE"), Some("db"));
        assert_eq!(strip_keyword("USER x", "USE"), None);
        assert_eq!(strip_keyword("US", "USE"), None);
    }
}
