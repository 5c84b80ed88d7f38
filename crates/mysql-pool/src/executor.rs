//! One-statement query execution.
//!
//! Every [`QueryExecutor`] operation follows the same shape:
//!
//! ```text
//! ACQUIRE -> EXECUTE -> (FETCH | COMMIT)? -> RELEASE
//! ```
//!
//! and reaches `RELEASE` from every state, success or failure. Rows are
//! converted by the executor's [`RowMapper`] after the connection has been
//! returned, so a mapping failure never holds a connection.
//!
//! [`QueryExecutor::execute_raw`] is the exception: it hands the connection to
//! the caller inside a [`RawExecution`] guard.

use std::fmt;

use tracing::Instrument;

use mysql_pool_client::instrumentation::extract_operation;
use mysql_pool_client::{Cursor, Error, ExecuteResult, Params, Row};

use crate::error::PoolError;
use crate::manager::PoolManager;
use crate::mapper::{RowFormat, RowMapper};
use crate::pool::PooledConnection;

/// Runs single statements against a managed pool.
#[derive(Clone)]
pub struct QueryExecutor<M = RowFormat> {
    manager: PoolManager,
    mapper: M,
}

impl<M: RowMapper> QueryExecutor<M> {
    /// Create an executor that converts rows with `mapper`.
    #[must_use]
    pub fn new(manager: PoolManager, mapper: M) -> Self {
        Self { manager, mapper }
    }

    /// The manager this executor draws connections from.
    #[must_use]
    pub fn manager(&self) -> &PoolManager {
        &self.manager
    }

    /// The row mapper.
    #[must_use]
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Run a statement and keep the connection checked out.
    ///
    /// The returned guard owns the connection until
    /// [`RawExecution::release`] is called.
    pub async fn execute_raw(
        &self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<RawExecution, PoolError> {
        let params = params.into();
        let span = tracing::debug_span!("mysql.execute_raw", db.operation = extract_operation(sql));
        async {
            let mut conn = self.manager.pool().get().await?;
            match conn.query(sql, &params).await {
                Ok(cursor) => Ok(RawExecution {
                    cursor,
                    conn: Some(conn),
                }),
                Err(e) => {
                    conn.release().await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run a statement and release the connection.
    ///
    /// Returns the cursor, plus every row when the statement produced a
    /// result set.
    pub async fn execute_safe(
        &self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<(Cursor, Option<Vec<M::Output>>), PoolError> {
        let params = params.into();
        let span = tracing::debug_span!("mysql.execute_safe", db.operation = extract_operation(sql));
        let mut cursor = self.run(sql, &params).instrument(span).await?;

        let rows = if cursor.with_rows() {
            Some(self.map_rows(cursor.fetch_all())?)
        } else {
            None
        };
        Ok((cursor, rows))
    }

    /// Run a query and return its first row, if any.
    pub async fn fetch_one(
        &self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<Option<M::Output>, PoolError> {
        let params = params.into();
        let span = tracing::debug_span!("mysql.fetch_one", db.operation = extract_operation(sql));
        let mut cursor = self.run(sql, &params).instrument(span).await?;

        match cursor.fetch_one() {
            Some(row) => Ok(Some(self.mapper.map_row(row)?)),
            None => Ok(None),
        }
    }

    /// Run a query and return every row.
    pub async fn fetch_all(
        &self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<Vec<M::Output>, PoolError> {
        let params = params.into();
        let span = tracing::debug_span!("mysql.fetch_all", db.operation = extract_operation(sql));
        let mut cursor = self.run(sql, &params).instrument(span).await?;
        self.map_rows(cursor.fetch_all())
    }

    /// Run a data-modifying statement and commit it before releasing.
    ///
    /// When the commit fails a rollback is attempted and the call fails with
    /// [`PoolError::Commit`]. A connection whose rollback also fails is
    /// discarded.
    pub async fn commit_execute(
        &self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<ExecuteResult, PoolError> {
        let params = params.into();
        let span = tracing::debug_span!(
            "mysql.commit_execute",
            db.operation = extract_operation(sql)
        );
        async {
            let mut conn = self.manager.pool().get().await?;
            let outcome = execute_and_commit(&mut conn, sql, &params).await;
            conn.release().await;
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, sql: &str, params: &Params) -> Result<Cursor, PoolError> {
        let mut conn = self.manager.pool().get().await?;
        let outcome = conn.query(sql, params).await;
        conn.release().await;
        outcome
    }

    fn map_rows(&self, rows: Vec<Row>) -> Result<Vec<M::Output>, PoolError> {
        rows.into_iter()
            .map(|row| self.mapper.map_row(row).map_err(PoolError::from))
            .collect()
    }
}

async fn execute_and_commit(
    conn: &mut PooledConnection,
    sql: &str,
    params: &Params,
) -> Result<ExecuteResult, PoolError> {
    let cursor = conn.query(sql, params).await?;
    if let Err(commit_error) = conn.commit().await {
        if let Err(rollback_error) = conn.rollback().await {
            tracing::warn!(
                connection_id = conn.id(),
                error = %rollback_error,
                "rollback after failed commit also failed; discarding connection"
            );
            conn.mark_broken();
        }
        return Err(commit_error);
    }
    Ok(cursor.execute_result())
}

impl<M: fmt::Debug> fmt::Debug for QueryExecutor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("manager", &self.manager)
            .field("mapper", &self.mapper)
            .finish()
    }
}

/// A statement result that still holds its connection.
///
/// Call [`release`](Self::release) when done. A guard dropped without
/// releasing returns the connection from a background task and logs a
/// warning.
#[must_use = "a raw execution holds a pooled connection until released"]
pub struct RawExecution {
    cursor: Cursor,
    conn: Option<PooledConnection>,
}

impl RawExecution {
    /// The statement's cursor.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The statement's cursor, for fetching.
    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Run another statement on the same connection.
    pub async fn query(&mut self, sql: &str, params: impl Into<Params>) -> Result<Cursor, PoolError> {
        let params = params.into();
        self.connection()?.query(sql, &params).await
    }

    /// Commit on the held connection.
    pub async fn commit(&mut self) -> Result<(), PoolError> {
        self.connection()?.commit().await
    }

    /// Roll back on the held connection.
    pub async fn rollback(&mut self) -> Result<(), PoolError> {
        self.connection()?.rollback().await
    }

    /// Return the connection to the pool.
    pub async fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            conn.release().await;
        }
    }

    fn connection(&mut self) -> Result<&mut PooledConnection, PoolError> {
        self.conn
            .as_mut()
            .ok_or(PoolError::Connection(Error::ConnectionClosed))
    }
}

impl fmt::Debug for RawExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawExecution")
            .field("cursor", &self.cursor)
            .field("conn", &self.conn)
            .finish()
    }
}

impl Drop for RawExecution {
    fn drop(&mut self) {
        if let Some(conn) = &self.conn {
            tracing::warn!(
                connection_id = conn.id(),
                "raw execution dropped without release"
            );
        }
    }
}
