//! Pool error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during pool, manager and executor operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No pool manager has been registered yet.
    #[error("pool manager is not initialized; call PoolManager::get_or_create first")]
    NotInitialized,

    /// No connection became available within the acquisition timeout.
    #[error("pool exhausted: no connection available after {0:?}")]
    PoolExhausted(Duration),

    /// Pool is closed.
    #[error("pool is closed")]
    PoolClosed,

    /// A new connection could not be established.
    #[error("connection error: {0}")]
    Connection(#[source] mysql_pool_client::Error),

    /// The statement failed.
    #[error("query error: {0}")]
    Query(#[source] mysql_pool_client::Error),

    /// The commit after a successful statement failed.
    #[error("commit failed: {0}")]
    Commit(#[source] mysql_pool_client::Error),

    /// A row could not be converted by the row mapper.
    #[error("row mapping failed: {0}")]
    RowMapping(#[from] mysql_pool_types::TypeError),

    /// Pool configuration error.
    #[error("pool configuration error: {0}")]
    Configuration(String),

    /// The statement did not finish within the command timeout.
    #[error("statement exceeded command timeout of {0:?}")]
    CommandTimeout(Duration),

    /// A database name was rejected before reaching the server.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
}

impl PoolError {
    /// The underlying driver error, if any.
    #[must_use]
    pub fn driver_error(&self) -> Option<&mysql_pool_client::Error> {
        match self {
            Self::Connection(e) | Self::Query(e) | Self::Commit(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this is a server error with a specific MySQL error code.
    #[must_use]
    pub fn is_server_error(&self, code: u16) -> bool {
        self.driver_error().is_some_and(|e| e.is_server_error(code))
    }
}

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
