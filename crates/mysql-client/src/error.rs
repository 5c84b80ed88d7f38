//! Client error types.

use thiserror::Error;

/// Errors raised by a database driver behind the [`Connection`] boundary.
///
/// [`Connection`]: crate::connection::Connection
#[derive(Debug, Error)]
pub enum Error {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Type conversion error.
    #[error("type error: {0}")]
    Type(#[from] mysql_pool_types::TypeError),

    /// Driver-side query failure that is not a server error.
    #[error("query error: {0}")]
    Query(String),

    /// Server returned an error.
    #[error("server error {code} ({state}): {message}")]
    Server {
        /// MySQL error code (e.g. 1062 for duplicate entry).
        code: u16,
        /// SQLSTATE value.
        state: String,
        /// Error message.
        message: String,
    },

    /// Transaction control (commit/rollback) failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection timeout occurred.
    #[error("connection timed out")]
    ConnectionTimeout,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is transient and may succeed on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout | Self::ConnectionClosed | Self::Io(_)
        ) || matches!(self, Self::Server { code, .. } if is_transient_server_code(*code))
    }

    /// Check if the session this error came from can no longer be trusted.
    ///
    /// A pooled connection that produced such an error is discarded on
    /// release instead of being returned to the idle set.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::ConnectionClosed | Self::ConnectionTimeout | Self::Io(_)
        ) || matches!(self, Self::Server { code, .. } if is_fatal_server_code(*code))
    }

    /// Check if this is a server error with a specific code.
    #[must_use]
    pub fn is_server_error(&self, code: u16) -> bool {
        matches!(self, Self::Server { code: c, .. } if *c == code)
    }

    /// Get the MySQL error code if this is a server error.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Deadlock (1213) and lock wait timeout (1205).
fn is_transient_server_code(code: u16) -> bool {
    matches!(code, 1205 | 1213)
}

/// Server shutdown (1053), aborted connection (1152..=1161 read/write
/// failures), and killed session (1927).
fn is_fatal_server_code(code: u16) -> bool {
    matches!(code, 1053 | 1152..=1161 | 1927)
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn server(code: u16) -> Error {
        Error::Server {
            code,
            state: "HY000".into(),
            message: "boom".into(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::ConnectionTimeout.is_transient());
        assert!(server(1213).is_transient());
        assert!(!server(1062).is_transient());
        assert!(!Error::Query("syntax".into()).is_transient());
    }

    #[test]
    fn test_connection_lost_classification() {
        assert!(Error::ConnectionClosed.is_connection_lost());
        assert!(server(1053).is_connection_lost());
        assert!(!server(1146).is_connection_lost());
        assert!(!Error::Transaction("rejected".into()).is_connection_lost());
    }

    #[test]
    fn test_server_error_display() {
        let err = server(1062);
        assert!(err.is_server_error(1062));
        assert_eq!(err.code(), Some(1062));
        assert_eq!(err.to_string(), "server error 1062 (HY000): boom");
    }
}
