//! The driver boundary.
//!
//! The pool never speaks the wire protocol itself. It talks to a
//! [`Connector`], which opens sessions, and to the [`Connection`] objects
//! the connector hands back. The production backend lives in
//! [`crate::mysql`]; tests plug in a scripted mock.
//!
//! Both traits use `#[async_trait]` so they can be used as trait objects.

use async_trait::async_trait;

use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::params::Params;

/// Opens new database sessions.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Establish a new session using `config`.
    async fn connect(&self, config: &Config) -> Result<Box<dyn Connection>>;
}

/// A live database session.
///
/// A session is owned by exactly one caller at a time; none of these
/// methods are called concurrently on the same value.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Run one statement and materialize its outcome.
    async fn query(&mut self, sql: &str, params: &Params) -> Result<Cursor>;

    /// Commit the current transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the current transaction.
    async fn rollback(&mut self) -> Result<()>;

    /// Check that the session is still usable.
    async fn ping(&mut self) -> Result<()>;

    /// Clear session state before the session is reused.
    ///
    /// Implementations must keep the currently selected database.
    async fn reset(&mut self) -> Result<()>;

    /// Close the session.
    async fn close(self: Box<Self>) -> Result<()>;

    /// Server-assigned session id, if known.
    fn connection_id(&self) -> Option<u64> {
        None
    }
}
