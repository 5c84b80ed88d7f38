//! Materialized statement results.
//!
//! A [`Cursor`] is produced by [`Connection::query`] and owns everything the
//! statement returned: column metadata, any rows, the affected-row count and
//! the generated id. It never borrows the connection, so the connection can
//! go back to the pool while the caller is still reading rows.
//!
//! [`Connection::query`]: crate::connection::Connection::query

use std::collections::VecDeque;
use std::sync::Arc;

use crate::row::{ColMetaData, Column, Row};

/// Result of a statement that modifies data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteResult {
    /// Number of rows affected by the statement.
    pub rows_affected: u64,
    /// Value generated for an `AUTO_INCREMENT` column, if any.
    pub last_insert_id: Option<u64>,
}

impl ExecuteResult {
    /// Create a new execute result.
    pub fn new(rows_affected: u64, last_insert_id: Option<u64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

/// The fully materialized outcome of one statement.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    metadata: Arc<ColMetaData>,
    rows: VecDeque<Row>,
    rows_affected: u64,
    last_insert_id: Option<u64>,
    with_rows: bool,
    warnings: u16,
}

impl Cursor {
    /// Build a cursor for a statement that produced a result set.
    ///
    /// An empty `rows` still counts as a result set (`with_rows() == true`).
    pub fn result_set(metadata: Arc<ColMetaData>, rows: Vec<Row>) -> Self {
        Self {
            metadata,
            rows: rows.into(),
            rows_affected: 0,
            last_insert_id: None,
            with_rows: true,
            warnings: 0,
        }
    }

    /// Build a cursor for a statement without a result set.
    ///
    /// MySQL reports `0` when no id was generated; that is normalized to
    /// `None`.
    pub fn affected(rows_affected: u64, last_insert_id: Option<u64>) -> Self {
        Self {
            metadata: Arc::default(),
            rows: VecDeque::new(),
            rows_affected,
            last_insert_id: last_insert_id.filter(|id| *id != 0),
            with_rows: false,
            warnings: 0,
        }
    }

    /// Attach the server-reported affected-row count.
    #[must_use]
    pub fn with_rows_affected(mut self, rows_affected: u64) -> Self {
        self.rows_affected = rows_affected;
        self
    }

    /// Attach the server warning count.
    #[must_use]
    pub fn with_warnings(mut self, warnings: u16) -> Self {
        self.warnings = warnings;
        self
    }

    /// Whether the statement produced a result set.
    #[must_use]
    pub fn with_rows(&self) -> bool {
        self.with_rows
    }

    /// Column metadata of the result set (empty without one).
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.metadata.columns
    }

    /// Shared column metadata.
    #[must_use]
    pub fn metadata(&self) -> &Arc<ColMetaData> {
        &self.metadata
    }

    /// Rows affected as reported by the server.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Generated `AUTO_INCREMENT` value, if the statement produced one.
    #[must_use]
    pub fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id
    }

    /// Number of warnings raised by the statement.
    #[must_use]
    pub fn warnings(&self) -> u16 {
        self.warnings
    }

    /// Rows not yet fetched.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Row count and generated id as an [`ExecuteResult`].
    #[must_use]
    pub fn execute_result(&self) -> ExecuteResult {
        ExecuteResult::new(self.rows_affected, self.last_insert_id)
    }

    /// Take the next row.
    pub fn fetch_one(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// Take up to `n` rows.
    pub fn fetch_many(&mut self, n: usize) -> Vec<Row> {
        let n = n.min(self.rows.len());
        self.rows.drain(..n).collect()
    }

    /// Take every remaining row.
    pub fn fetch_all(&mut self) -> Vec<Row> {
        self.rows.drain(..).collect()
    }
}

impl Iterator for Cursor {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetch_one()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rows.len(), Some(self.rows.len()))
    }
}
