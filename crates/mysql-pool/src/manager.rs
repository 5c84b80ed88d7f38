//! Process-wide pool manager.
//!
//! A [`PoolManager`] owns one [`Pool`] together with the row format that
//! executors created from it use by default. It is a cheap, cloneable handle:
//! pass it explicitly where possible, or register one process-wide instance
//! through [`PoolManager::get_or_create`] and look it up later with
//! [`PoolManager::get_instance`].
//!
//! Registration is first-writer-wins. Once an instance exists, later calls to
//! `get_or_create` return it unchanged and report through [`Registration`]
//! whether their configuration matched.

use std::fmt;
use std::sync::Arc;

use mysql_pool_client::Params;

use crate::error::PoolError;
use crate::executor::QueryExecutor;
use crate::mapper::{RowFormat, RowMapper};
use crate::pool::{Pool, PoolBuilder};

static INIT: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());
static INSTANCE: parking_lot::RwLock<Option<PoolManager>> = parking_lot::const_rwlock(None);

/// Outcome of [`PoolManager::get_or_create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// This call built and registered the instance.
    Created,
    /// An instance existed and its configuration matches the one supplied.
    Existing,
    /// An instance existed with a different configuration; the supplied one
    /// was ignored.
    ConfigIgnored,
}

/// Shared handle to a pool and its row-format policy.
#[derive(Clone)]
pub struct PoolManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    pool: Pool,
    row_format: RowFormat,
}

impl PoolManager {
    /// Return the registered manager, building it from `builder` if none
    /// exists yet.
    ///
    /// Concurrent first callers build exactly one pool. When an instance is
    /// already registered, `builder` is not used and no connection is opened.
    pub async fn get_or_create(builder: PoolBuilder) -> Result<(Self, Registration), PoolError> {
        if let Some(existing) = INSTANCE.read().clone() {
            let registration = existing.compare(&builder);
            return Ok((existing, registration));
        }

        let _guard = INIT.lock().await;
        if let Some(existing) = INSTANCE.read().clone() {
            let registration = existing.compare(&builder);
            return Ok((existing, registration));
        }

        let row_format = builder.config.row_format;
        let pool = builder.build().await?;
        let manager = Self::new(pool, row_format);
        *INSTANCE.write() = Some(manager.clone());

        tracing::info!(pool = %manager.pool().name(), "pool manager registered");
        Ok((manager, Registration::Created))
    }

    /// Return the registered manager.
    ///
    /// Fails with [`PoolError::NotInitialized`] before the first successful
    /// [`get_or_create`](Self::get_or_create).
    pub fn get_instance() -> Result<Self, PoolError> {
        INSTANCE.read().clone().ok_or(PoolError::NotInitialized)
    }

    /// Wrap an existing pool without registering it process-wide.
    #[must_use]
    pub fn new(pool: Pool, row_format: RowFormat) -> Self {
        Self {
            inner: Arc::new(ManagerInner { pool, row_format }),
        }
    }

    fn compare(&self, builder: &PoolBuilder) -> Registration {
        let pool = self.pool();
        if pool.config() == &builder.config && pool.client_config() == &builder.client_config {
            Registration::Existing
        } else {
            tracing::warn!(
                pool = %pool.name(),
                "pool manager already initialized; ignoring new configuration"
            );
            Registration::ConfigIgnored
        }
    }

    /// Close the pool and unregister this manager if it is the registered
    /// instance.
    pub async fn shutdown(&self) {
        {
            let mut instance = INSTANCE.write();
            if instance
                .as_ref()
                .is_some_and(|registered| Arc::ptr_eq(&registered.inner, &self.inner))
            {
                *instance = None;
            }
        }
        self.inner.pool.close().await;
    }

    /// Row format used by [`executor`](Self::executor).
    #[must_use]
    pub fn row_format(&self) -> RowFormat {
        self.inner.row_format
    }

    /// The managed pool.
    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.inner.pool
    }

    /// Ask a live session which database it has selected.
    pub async fn current_database(&self) -> Result<Option<String>, PoolError> {
        let mut conn = self.pool().get().await?;
        let outcome = conn.query("SELECT DATABASE()", &Params::None).await;
        conn.release().await;

        let row = outcome?.fetch_one();
        match row {
            Some(row) => Ok(row.get::<Option<String>>(0)?),
            None => Ok(None),
        }
    }

    /// Make `database` the database of every connection acquired from now on.
    ///
    /// The name is checked locally, then selected on one pooled session to
    /// prove it exists. Connections that are checked out at the time of the
    /// call keep their database until they are returned and acquired again.
    pub async fn switch_database(&self, database: &str) -> Result<(), PoolError> {
        validate_database_name(database)?;

        let mut conn = self.pool().get().await?;
        let outcome = conn.use_database(database).await;
        conn.release().await;
        outcome?;

        let previous = self.pool().target_database();
        self.pool().set_target_database(Some(database.to_string()));
        tracing::info!(
            pool = %self.pool().name(),
            from = ?previous,
            to = database,
            "switched database"
        );
        Ok(())
    }

    /// Executor that returns rows in this manager's [`RowFormat`].
    #[must_use]
    pub fn executor(&self) -> QueryExecutor<RowFormat> {
        QueryExecutor::new(self.clone(), self.row_format())
    }

    /// Executor with a custom row mapper.
    #[must_use]
    pub fn executor_with<M: RowMapper>(&self, mapper: M) -> QueryExecutor<M> {
        QueryExecutor::new(self.clone(), mapper)
    }
}

impl fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManager")
            .field("pool", &self.inner.pool)
            .field("row_format", &self.inner.row_format)
            .finish()
    }
}

/// Check a database name before it is spliced into `USE`.
///
/// Accepts 1 to 64 characters without backticks, NUL, path separators or
/// dots, and without a trailing space.
pub(crate) fn validate_database_name(name: &str) -> Result<(), PoolError> {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static DATABASE_NAME_RE: Lazy<Option<Regex>> =
        Lazy::new(|| Regex::new(r"^[^`\x00/\\.]{0,63}[^`\x00/\\. ]$").ok());

    if !DATABASE_NAME_RE.as_ref().is_some_and(|re| re.is_match(name)) {
        return Err(PoolError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}
