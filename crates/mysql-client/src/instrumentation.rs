//! Tracing instrumentation for database operations.
//!
//! Spans follow the OpenTelemetry database semantic conventions so that a
//! `tracing-opentelemetry` layer can export them unchanged:
//!
//! - `db.system`: "mysql"
//! - `db.name`: Database name
//! - `db.statement`: SQL statement (sanitized if configured)
//! - `db.operation`: Query operation type (SELECT, INSERT, etc.)
//! - `server.address`: Server hostname
//! - `server.port`: Server port
//!
//! Statements are never logged verbatim by default: [`SanitizationConfig`]
//! replaces string and numeric literals with a placeholder and truncates
//! long statements.

use tracing::Span;

/// Database system identifier for MySQL.
pub const DB_SYSTEM: &str = "mysql";

/// Span names for database operations.
pub mod span_names {
    /// Span name for connection establishment.
    pub const CONNECT: &str = "mysql.connect";
    /// Span name for statement execution.
    pub const QUERY: &str = "mysql.query";
    /// Span name for committing a transaction.
    pub const COMMIT: &str = "mysql.commit";
    /// Span name for rolling back a transaction.
    pub const ROLLBACK: &str = "mysql.rollback";
    /// Span name for session reset.
    pub const RESET: &str = "mysql.reset";
}

/// Attribute keys following OpenTelemetry semantic conventions.
pub mod attributes {
    /// Database system type.
    pub const DB_SYSTEM: &str = "db.system";
    /// Database name.
    pub const DB_NAME: &str = "db.name";
    /// SQL statement (may be sanitized).
    pub const DB_STATEMENT: &str = "db.statement";
    /// Database operation type.
    pub const DB_OPERATION: &str = "db.operation";
    /// Server hostname.
    pub const SERVER_ADDRESS: &str = "server.address";
    /// Server port.
    pub const SERVER_PORT: &str = "server.port";
    /// Number of rows affected.
    pub const DB_ROWS_AFFECTED: &str = "db.rows_affected";
    /// Connection ID.
    pub const DB_CONNECTION_ID: &str = "db.connection_id";
}

/// Configuration for SQL statement sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationConfig {
    /// Whether to sanitize SQL statements.
    pub enabled: bool,
    /// Maximum length of statement to record, in bytes.
    pub max_length: usize,
    /// Placeholder to use for sanitized values.
    pub placeholder: String,
}

impl Default for SanitizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_length: 2048,
            placeholder: "?".to_string(),
        }
    }
}

impl SanitizationConfig {
    /// Create a configuration that doesn't sanitize statements.
    #[must_use]
    pub fn no_sanitization() -> Self {
        Self {
            enabled: false,
            max_length: usize::MAX,
            placeholder: String::new(),
        }
    }

    /// Sanitize a SQL statement according to the configuration.
    #[must_use]
    pub fn sanitize(&self, sql: &str) -> String {
        if !self.enabled {
            return truncate_string(sql, self.max_length);
        }

        let sanitized = sanitize_sql(sql, &self.placeholder);
        truncate_string(&sanitized, self.max_length)
    }
}

/// Replace string and numeric literals with `placeholder`.
///
/// Backtick-quoted identifiers are kept. Inside string literals both the
/// doubled quote and the backslash escape are recognized.
fn sanitize_sql(sql: &str, placeholder: &str) -> String {
    let mut result = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut in_string = false;
    let mut string_char = ' ';
    let mut in_identifier = false;

    while let Some(c) = chars.next() {
        if in_identifier {
            result.push(c);
            if c == '`' {
                in_identifier = false;
            }
            continue;
        }

        if in_string {
            if c == '\\' {
                chars.next();
                continue;
            }
            if c == string_char {
                if chars.peek() == Some(&string_char) {
                    chars.next();
                    continue;
                }
                in_string = false;
                result.push_str(placeholder);
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                in_string = true;
                string_char = c;
            }
            '`' => {
                in_identifier = true;
                result.push(c);
            }
            _ if c.is_ascii_digit()
                && !result.ends_with(|ch: char| ch.is_alphanumeric() || ch == '_') =>
            {
                while chars
                    .peek()
                    .is_some_and(|ch| ch.is_ascii_digit() || *ch == '.')
                {
                    chars.next();
                }
                result.push_str(placeholder);
            }
            _ => result.push(c),
        }
    }

    if in_string {
        result.push_str(placeholder);
    }

    result
}

/// Truncate a string to at most `max_len` bytes, appending `...`.
///
/// The cut always lands on a character boundary.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Extract the operation type from a SQL statement.
#[must_use]
pub fn extract_operation(sql: &str) -> &'static str {
    let keyword = sql
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    match keyword.as_str() {
        "SELECT" | "WITH" => "SELECT",
        "INSERT" => "INSERT",
        "REPLACE" => "REPLACE",
        "UPDATE" => "UPDATE",
        "DELETE" => "DELETE",
        "CALL" => "CALL",
        "START" | "BEGIN" => "BEGIN",
        "COMMIT" => "COMMIT",
        "ROLLBACK" => "ROLLBACK",
        "CREATE" => "CREATE",
        "ALTER" => "ALTER",
        "DROP" => "DROP",
        "TRUNCATE" => "TRUNCATE",
        "USE" => "USE",
        "SHOW" => "SHOW",
        "SET" => "SET",
        _ => "OTHER",
    }
}

/// Per-connection instrumentation context.
#[derive(Debug, Clone)]
pub struct InstrumentationContext {
    /// Server address.
    pub server_address: String,
    /// Server port.
    pub server_port: u16,
    /// Database name.
    pub database: Option<String>,
    /// Sanitization configuration.
    pub sanitization: SanitizationConfig,
}

impl InstrumentationContext {
    /// Create a new instrumentation context.
    #[must_use]
    pub fn new(server_address: impl Into<String>, server_port: u16) -> Self {
        Self {
            server_address: server_address.into(),
            server_port,
            database: None,
            sanitization: SanitizationConfig::default(),
        }
    }

    /// Set the database name.
    #[must_use]
    pub fn with_database(mut self, database: Option<impl Into<String>>) -> Self {
        self.database = database.map(Into::into);
        self
    }

    /// Set the sanitization configuration.
    #[must_use]
    pub fn with_sanitization(mut self, config: SanitizationConfig) -> Self {
        self.sanitization = config;
        self
    }

    /// Create a connection span.
    pub fn connection_span(&self) -> Span {
        tracing::debug_span!(
            "mysql.connect",
            db.system = DB_SYSTEM,
            db.name = self.database.as_deref(),
            server.address = %self.server_address,
            server.port = self.server_port,
            db.connection_id = tracing::field::Empty,
        )
    }

    /// Create a statement span.
    ///
    /// `db.rows_affected` is left empty; fill it with [`record_rows_affected`].
    pub fn query_span(&self, sql: &str) -> Span {
        tracing::debug_span!(
            "mysql.query",
            db.system = DB_SYSTEM,
            db.name = self.database.as_deref(),
            db.operation = extract_operation(sql),
            db.statement = %self.sanitization.sanitize(sql),
            server.address = %self.server_address,
            server.port = self.server_port,
            db.rows_affected = tracing::field::Empty,
        )
    }

    /// Create a transaction-control span (`COMMIT`, `ROLLBACK`) or a reset span.
    pub fn transaction_span(&self, operation: &'static str) -> Span {
        match operation {
            "COMMIT" => tracing::debug_span!("mysql.commit", db.system = DB_SYSTEM),
            "ROLLBACK" => tracing::debug_span!("mysql.rollback", db.system = DB_SYSTEM),
            _ => tracing::debug_span!("mysql.reset", db.system = DB_SYSTEM),
        }
    }
}

/// Record the affected-row count on a span created by
/// [`InstrumentationContext::query_span`].
pub fn record_rows_affected(span: &Span, rows_affected: u64) {
    span.record(attributes::DB_ROWS_AFFECTED, rows_affected);
}
