//! Connection pool implementation.
//!
//! Capacity is a [`Semaphore`] with `max_connections` permits. A caller that
//! holds a permit owns exactly one connection: either one popped from the
//! idle stack or a freshly opened one. The permit travels inside the
//! [`PooledConnection`] and is only released after the connection has been
//! reset and pushed back (or discarded), so the number of live sessions never
//! exceeds `max_connections`.
//!
//! The idle stack is LIFO and guarded by a `parking_lot` mutex that is never
//! held across an `.await`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::time::Instant;

use mysql_pool_client::instrumentation::extract_operation;
use mysql_pool_client::placeholders::contains_keyword;
use mysql_pool_client::{Config, Connection, Connector, Cursor, Error, Params};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::lifecycle::{ConnectionMetadata, ConnectionState, HealthCheckResult};
use crate::mapper::RowFormat;
use crate::metrics::{AtomicPoolMetrics, PoolMetrics};

/// A pool of MySQL sessions to one server and database.
///
/// `Pool` is cheap to clone; clones share the same connections.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    config: PoolConfig,
    client_config: Config,
    connector: Arc<dyn Connector>,
    idle: Mutex<Vec<IdleConnection>>,
    semaphore: Arc<Semaphore>,
    target_database: RwLock<Option<String>>,
    closed: AtomicBool,
    next_id: AtomicU64,
    in_use: AtomicU32,
    returned: Notify,
    metrics: AtomicPoolMetrics,
}

struct IdleConnection {
    conn: Box<dyn Connection>,
    meta: ConnectionMetadata,
}

/// Builder for [`Pool`].
pub struct PoolBuilder {
    pub(crate) client_config: Config,
    pub(crate) config: PoolConfig,
    connector: Option<Arc<dyn Connector>>,
    validate_on_build: bool,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self {
            client_config: Config::default(),
            config: PoolConfig::default(),
            connector: None,
            validate_on_build: true,
        }
    }
}

impl fmt::Debug for PoolBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("client_config", &self.client_config)
            .field("config", &self.config)
            .field("custom_connector", &self.connector.is_some())
            .field("validate_on_build", &self.validate_on_build)
            .finish()
    }
}

impl PoolBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection configuration.
    #[must_use]
    pub fn client_config(mut self, config: Config) -> Self {
        self.client_config = config;
        self
    }

    /// Replace the whole pool configuration.
    #[must_use]
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom driver instead of the built-in MySQL backend.
    #[must_use]
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Set the pool name.
    #[must_use]
    pub fn pool_name(mut self, name: impl Into<String>) -> Self {
        self.config.pool_name = name.into();
        self
    }

    /// Set the minimum number of connections.
    #[must_use]
    pub fn min_connections(mut self, count: u32) -> Self {
        self.config.min_connections = count;
        self
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub fn max_connections(mut self, count: u32) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the connection acquisition timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Set the maximum connection lifetime.
    #[must_use]
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.config.max_lifetime = lifetime;
        self
    }

    /// Enable or disable testing connections on checkout.
    #[must_use]
    pub fn test_on_checkout(mut self, enabled: bool) -> Self {
        self.config.test_on_checkout = enabled;
        self
    }

    /// Set how long a connection may sit unchecked before checkout tests it.
    #[must_use]
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.config.health_check_interval = interval;
        self
    }

    /// Enable or disable the session reset on return.
    #[must_use]
    pub fn reset_on_checkin(mut self, enabled: bool) -> Self {
        self.config.reset_on_checkin = enabled;
        self
    }

    /// Bound every statement by `timeout`.
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = Some(timeout);
        self
    }

    /// Set the row format used by executors.
    #[must_use]
    pub fn row_format(mut self, format: RowFormat) -> Self {
        self.config.row_format = format;
        self
    }

    /// Open one connection during [`build`](Self::build) so that bad
    /// credentials or an unreachable server fail early (default: `true`).
    #[must_use]
    pub fn validate_on_build(mut self, enabled: bool) -> Self {
        self.validate_on_build = enabled;
        self
    }

    /// Build the pool.
    ///
    /// Opens `max(min_connections, 1)` connections when validation is on,
    /// `min_connections` otherwise.
    pub async fn build(self) -> Result<Pool, PoolError> {
        self.config.validate()?;
        let connector = match self.connector {
            Some(connector) => connector,
            None => default_connector()?,
        };

        let warm = self
            .config
            .min_connections
            .max(u32::from(self.validate_on_build));
        let pool = Pool::from_parts(self.client_config, self.config, connector);

        if let Err(e) = pool.warm_up(warm).await {
            pool.close().await;
            return Err(e);
        }

        tracing::info!(
            pool = %pool.name(),
            server = %pool.inner.client_config.address(),
            database = ?pool.target_database(),
            max_connections = pool.inner.config.max_connections,
            warm,
            "connection pool created"
        );
        Ok(pool)
    }
}

#[cfg(feature = "mysql")]
fn default_connector() -> Result<Arc<dyn Connector>, PoolError> {
    Ok(Arc::new(mysql_pool_client::MySqlConnector::new()))
}

#[cfg(not(feature = "mysql"))]
fn default_connector() -> Result<Arc<dyn Connector>, PoolError> {
    Err(PoolError::Configuration(
        "no connector configured; enable the `mysql` feature or call PoolBuilder::connector".into(),
    ))
}

impl Pool {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    /// Build a pool with the built-in MySQL backend.
    pub async fn new(config: PoolConfig, client_config: Config) -> Result<Self, PoolError> {
        Self::builder()
            .config(config)
            .client_config(client_config)
            .build()
            .await
    }

    fn from_parts(client_config: Config, config: PoolConfig, connector: Arc<dyn Connector>) -> Self {
        let max = config.max_connections as usize;
        Self {
            inner: Arc::new(PoolInner {
                semaphore: Arc::new(Semaphore::new(max)),
                idle: Mutex::new(Vec::with_capacity(max)),
                target_database: RwLock::new(client_config.database.clone()),
                closed: AtomicBool::new(false),
                next_id: AtomicU64::new(0),
                in_use: AtomicU32::new(0),
                returned: Notify::new(),
                metrics: AtomicPoolMetrics::default(),
                config,
                client_config,
                connector,
            }),
        }
    }

    async fn warm_up(&self, count: u32) -> Result<(), PoolError> {
        for _ in 0..count {
            let entry = self.inner.open_connection().await?;
            self.inner.idle.lock().push(entry);
        }
        Ok(())
    }

    /// Get a connection from the pool.
    ///
    /// Reuses an idle connection when one is available, opens a new one if the
    /// pool is below capacity, and otherwise waits until a connection is
    /// returned. Fails with [`PoolError::PoolExhausted`] once
    /// `connection_timeout` elapses.
    pub async fn get(&self) -> Result<PooledConnection, PoolError> {
        if self.is_closed() {
            return Err(PoolError::PoolClosed);
        }

        tracing::trace!(pool = %self.name(), "acquiring connection from pool");
        let started = Instant::now();
        let timeout = self.inner.config.connection_timeout;

        let acquire = Arc::clone(&self.inner.semaphore).acquire_owned();
        let permit = match tokio::time::timeout(timeout, acquire).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(PoolError::PoolClosed),
            Err(_) => {
                self.inner.metrics.record_exhausted();
                tracing::warn!(
                    pool = %self.name(),
                    timeout_ms = timeout.as_millis() as u64,
                    in_use = self.inner.in_use.load(Ordering::SeqCst),
                    "connection pool exhausted"
                );
                return Err(PoolError::PoolExhausted(timeout));
            }
        };

        self.inner.checkout(permit, started).await
    }

    /// Take an idle connection without waiting and without I/O.
    ///
    /// Returns `Ok(None)` when the pool is at capacity or no idle connection
    /// can be handed out as-is (expired, due for a health check, or on a
    /// different database than the pool's target).
    pub fn try_get(&self) -> Result<Option<PooledConnection>, PoolError> {
        if self.is_closed() {
            return Err(PoolError::PoolClosed);
        }

        let permit = match Arc::clone(&self.inner.semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => return Ok(None),
            Err(TryAcquireError::Closed) => return Err(PoolError::PoolClosed),
        };

        let target = self.inner.target_database.read().clone();
        let config = &self.inner.config;
        let entry = {
            let mut idle = self.inner.idle.lock();
            idle.iter()
                .rposition(|e| {
                    !e.meta.is_expired(config.max_lifetime)
                        && !e.meta.is_idle_expired(config.idle_timeout)
                        && !(config.test_on_checkout
                            && e.meta.needs_health_check(config.health_check_interval))
                        && (target.is_none() || e.meta.database == target)
                })
                .map(|i| idle.remove(i))
        };

        Ok(entry.map(|entry| self.inner.hand_out(entry, permit, Instant::now(), true)))
    }

    /// Get the current pool status.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let available = u32::try_from(self.inner.idle.lock().len()).unwrap_or(u32::MAX);
        let in_use = self.inner.in_use.load(Ordering::SeqCst);
        PoolStatus {
            available,
            in_use,
            total: available.saturating_add(in_use),
            max: self.inner.config.max_connections,
        }
    }

    /// Snapshot of cumulative pool counters.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        self.inner.metrics.snapshot()
    }

    /// Close the pool.
    ///
    /// New acquisitions fail with [`PoolError::PoolClosed`] immediately. The
    /// call then waits up to `connection_timeout` for checked-out connections
    /// to come back, and closes every idle connection. Connections returned
    /// after that are closed on return.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.semaphore.close();

        let deadline = Instant::now() + self.inner.config.connection_timeout;
        while self.inner.in_use.load(Ordering::SeqCst) > 0 {
            if tokio::time::timeout_at(deadline, self.inner.returned.notified())
                .await
                .is_err()
            {
                tracing::warn!(
                    pool = %self.name(),
                    in_use = self.inner.in_use.load(Ordering::SeqCst),
                    "closing pool with connections still checked out"
                );
                break;
            }
        }

        let idle: Vec<IdleConnection> = self.inner.idle.lock().drain(..).collect();
        for entry in idle {
            self.inner.discard(entry, "pool closed").await;
        }
        tracing::info!(pool = %self.name(), "connection pool closed");
    }

    /// Check if the pool is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Get the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Get the connection configuration.
    #[must_use]
    pub fn client_config(&self) -> &Config {
        &self.inner.client_config
    }

    /// Pool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.pool_name
    }

    /// Database that connections are switched to at checkout.
    #[must_use]
    pub fn target_database(&self) -> Option<String> {
        self.inner.target_database.read().clone()
    }

    pub(crate) fn set_target_database(&self, database: Option<String>) {
        *self.inner.target_database.write() = database;
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("name", &self.name())
            .field("status", &self.status())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl PoolInner {
    async fn open_connection(&self) -> Result<IdleConnection, PoolError> {
        let database = self.target_database.read().clone();
        let mut config = self.client_config.clone();
        config.database.clone_from(&database);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let started = Instant::now();
        let conn = self.connector.connect(&config).await.map_err(|e| {
            tracing::warn!(
                pool = %self.config.pool_name,
                server = %config.address(),
                error = %e,
                "failed to open connection"
            );
            PoolError::Connection(e)
        })?;

        AtomicPoolMetrics::incr(&self.metrics.connections_created);
        tracing::debug!(
            pool = %self.config.pool_name,
            connection_id = id,
            server_connection_id = ?conn.connection_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "opened connection"
        );

        let mut meta = ConnectionMetadata::new(id, database);
        meta.mark_health_check();
        Ok(IdleConnection { conn, meta })
    }

    async fn checkout(
        self: &Arc<Self>,
        permit: OwnedSemaphorePermit,
        started: Instant,
    ) -> Result<PooledConnection, PoolError> {
        let deadline = started + self.config.connection_timeout;
        loop {
            let candidate = self.idle.lock().pop();
            let Some(mut entry) = candidate else {
                break;
            };

            if entry.meta.is_expired(self.config.max_lifetime) {
                AtomicPoolMetrics::incr(&self.metrics.lifetime_expired);
                self.discard(entry, "max lifetime exceeded").await;
                continue;
            }
            if entry.meta.is_idle_expired(self.config.idle_timeout) {
                AtomicPoolMetrics::incr(&self.metrics.idle_expired);
                self.discard(entry, "idle timeout exceeded").await;
                continue;
            }

            let needs_check = self.config.test_on_checkout
                && entry
                    .meta
                    .needs_health_check(self.config.health_check_interval);
            if Instant::now() >= deadline && (needs_check || self.needs_sync(&entry)) {
                self.idle.lock().push(entry);
                self.metrics.record_exhausted();
                tracing::warn!(
                    pool = %self.config.pool_name,
                    timeout_ms = self.config.connection_timeout.as_millis() as u64,
                    "connection timeout reached while preparing connection"
                );
                return Err(PoolError::PoolExhausted(self.config.connection_timeout));
            }

            if needs_check {
                let result = self.health_check(&mut entry, self.step_limit(deadline)).await;
                if !result.healthy {
                    tracing::warn!(
                        pool = %self.config.pool_name,
                        connection_id = entry.meta.id,
                        error = result.error.as_deref().unwrap_or_default(),
                        "health check failed; discarding connection"
                    );
                    self.discard(entry, "health check failed").await;
                    continue;
                }
            }

            match self.sync_database(&mut entry, self.step_limit(deadline)).await {
                Ok(()) => return Ok(self.hand_out(entry, permit, started, true)),
                Err(e) if e.is_connection_lost() => {
                    tracing::warn!(
                        pool = %self.config.pool_name,
                        connection_id = entry.meta.id,
                        error = %e,
                        "connection lost while selecting database; discarding it"
                    );
                    self.discard(entry, "connection lost").await;
                }
                Err(e) => {
                    entry.meta.mark_checkin();
                    self.idle.lock().push(entry);
                    AtomicPoolMetrics::incr(&self.metrics.checkouts_failed);
                    return Err(PoolError::Query(e));
                }
            }
        }

        match self.open_connection().await {
            Ok(entry) => Ok(self.hand_out(entry, permit, started, false)),
            Err(e) => {
                AtomicPoolMetrics::incr(&self.metrics.checkouts_failed);
                Err(e)
            }
        }
    }

    /// Time allowed for one server round trip while preparing a checkout.
    fn step_limit(&self, deadline: Instant) -> Duration {
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.config
            .command_timeout
            .map_or(remaining, |limit| limit.min(remaining))
    }

    /// Time allowed for housekeeping round trips outside checkout.
    fn command_limit(&self) -> Duration {
        self.config
            .command_timeout
            .unwrap_or(self.config.connection_timeout)
    }

    fn needs_sync(&self, entry: &IdleConnection) -> bool {
        let target = self.target_database.read();
        target.is_some() && entry.meta.database != *target
    }

    /// Issue `USE` when the session is not on the pool's target database.
    ///
    /// A `USE` that outlives `limit` fails with [`Error::ConnectionTimeout`].
    async fn sync_database(&self, entry: &mut IdleConnection, limit: Duration) -> Result<(), Error> {
        let target = self.target_database.read().clone();
        let Some(target) = target else {
            return Ok(());
        };
        if entry.meta.database.as_deref() == Some(target.as_str()) {
            return Ok(());
        }

        tracing::debug!(
            pool = %self.config.pool_name,
            connection_id = entry.meta.id,
            from = ?entry.meta.database,
            to = %target,
            "switching connection database"
        );
        let statement = use_statement(&target);
        tokio::time::timeout(limit, entry.conn.query(&statement, &Params::None))
            .await
            .map_err(|_| Error::ConnectionTimeout)??;
        entry.meta.database = Some(target);
        Ok(())
    }

    async fn health_check(&self, entry: &mut IdleConnection, limit: Duration) -> HealthCheckResult {
        entry.meta.state = ConnectionState::Checking;
        let check = run_health_check(&mut *entry.conn, &self.config.health_check_query);
        let result = tokio::time::timeout(limit, check)
            .await
            .unwrap_or_else(|_| HealthCheckResult::unhealthy(limit, "health check timed out"));
        entry.meta.mark_health_check();
        entry.meta.state = ConnectionState::Idle;

        AtomicPoolMetrics::incr(&self.metrics.health_checks_performed);
        if !result.healthy {
            AtomicPoolMetrics::incr(&self.metrics.health_checks_failed);
        }
        result
    }

    fn hand_out(
        self: &Arc<Self>,
        mut entry: IdleConnection,
        permit: OwnedSemaphorePermit,
        started: Instant,
        reused: bool,
    ) -> PooledConnection {
        entry.meta.mark_checkout();
        self.in_use.fetch_add(1, Ordering::SeqCst);

        let waited = started.elapsed();
        self.metrics.record_checkout(waited);
        tracing::trace!(
            pool = %self.config.pool_name,
            connection_id = entry.meta.id,
            reused,
            wait_us = waited.as_micros() as u64,
            "connection checked out"
        );

        PooledConnection {
            conn: Some(entry.conn),
            meta: entry.meta,
            pool: Arc::clone(self),
            permit: Some(permit),
            broken: false,
        }
    }

    /// Return a checked-out connection: reset it and push it back, or close it.
    async fn checkin(&self, conn: Box<dyn Connection>, meta: ConnectionMetadata, broken: bool) {
        let _in_use = InUseGuard(self);
        let mut entry = IdleConnection { conn, meta };

        let reason = if broken {
            Some("marked broken")
        } else if self.closed.load(Ordering::SeqCst) {
            Some("pool closed")
        } else if entry.meta.is_expired(self.config.max_lifetime) {
            AtomicPoolMetrics::incr(&self.metrics.lifetime_expired);
            Some("max lifetime exceeded")
        } else {
            None
        };
        if let Some(reason) = reason {
            self.discard(entry, reason).await;
            return;
        }

        if self.config.reset_on_checkin {
            entry.meta.state = ConnectionState::Resetting;
            AtomicPoolMetrics::incr(&self.metrics.resets_performed);
            let limit = self.command_limit();
            let outcome = tokio::time::timeout(limit, entry.conn.reset())
                .await
                .unwrap_or(Err(Error::ConnectionTimeout));
            if let Err(e) = outcome {
                AtomicPoolMetrics::incr(&self.metrics.resets_failed);
                tracing::warn!(
                    pool = %self.config.pool_name,
                    connection_id = entry.meta.id,
                    error = %e,
                    "session reset failed; discarding connection"
                );
                self.discard(entry, "reset failed").await;
                return;
            }
        }

        entry.meta.mark_checkin();
        tracing::trace!(
            pool = %self.config.pool_name,
            connection_id = entry.meta.id,
            "returning connection to pool"
        );
        self.idle.lock().push(entry);
    }

    async fn discard(&self, mut entry: IdleConnection, reason: &'static str) {
        entry.meta.state = ConnectionState::Closed;
        tracing::debug!(
            pool = %self.config.pool_name,
            connection_id = entry.meta.id,
            reason,
            "closing connection"
        );
        if let Err(e) = entry.conn.close().await {
            tracing::debug!(
                pool = %self.config.pool_name,
                connection_id = entry.meta.id,
                error = %e,
                "error while closing connection"
            );
        }
        AtomicPoolMetrics::incr(&self.metrics.connections_closed);
    }
}

/// Decrements the in-use count when a checkin finishes, even if cancelled.
struct InUseGuard<'a>(&'a PoolInner);

impl Drop for InUseGuard<'_> {
    fn drop(&mut self) {
        self.0.in_use.fetch_sub(1, Ordering::SeqCst);
        self.0.returned.notify_one();
    }
}

async fn run_health_check(conn: &mut dyn Connection, query: &str) -> HealthCheckResult {
    let started = Instant::now();
    match conn.query(query, &Params::None).await {
        Ok(_) => HealthCheckResult::healthy(started.elapsed()),
        Err(e) => HealthCheckResult::unhealthy(started.elapsed(), e.to_string()),
    }
}

/// `USE` statement for an already validated database name.
pub(crate) fn use_statement(database: &str) -> String {
    format!("USE `{}`", database.replace('`', "``"))
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of idle connections available.
    pub available: u32,
    /// Number of connections currently checked out (including ones being returned).
    pub in_use: u32,
    /// Total number of connections.
    pub total: u32,
    /// Maximum allowed connections.
    pub max: u32,
}

impl PoolStatus {
    /// Fraction of capacity currently checked out.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            f64::from(self.in_use) / f64::from(self.max)
        }
    }
}

/// A connection checked out of the pool.
///
/// Return it with [`release`](Self::release). Dropping it without releasing
/// returns it from a background task instead.
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    meta: ConnectionMetadata,
    pool: Arc<PoolInner>,
    permit: Option<OwnedSemaphorePermit>,
    broken: bool,
}

impl PooledConnection {
    /// Lifecycle metadata for this connection.
    #[must_use]
    pub fn metadata(&self) -> &ConnectionMetadata {
        &self.meta
    }

    /// Pool-assigned connection id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.meta.id
    }

    /// Database the session has selected, as far as the pool knows.
    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.meta.database.as_deref()
    }

    /// Check whether the connection will be discarded on release.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Discard this connection on release instead of reusing it.
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    /// Run one statement.
    ///
    /// A failure that leaves the session unusable marks the connection
    /// broken. So does exceeding the pool's command timeout.
    pub async fn query(&mut self, sql: &str, params: &Params) -> Result<Cursor, PoolError> {
        if contains_keyword(sql, "USE") {
            // Only `use_database` knows which database a USE selects.
            self.meta.database = None;
        }
        tracing::debug!(
            connection_id = self.meta.id,
            operation = extract_operation(sql),
            params = params.len(),
            "executing statement"
        );

        let command_timeout = self.pool.config.command_timeout;
        let conn = self
            .conn
            .as_mut()
            .ok_or(PoolError::Connection(Error::ConnectionClosed))?;
        let outcome = match command_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.query(sql, params)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.broken = true;
                    tracing::warn!(
                        connection_id = self.meta.id,
                        timeout_ms = limit.as_millis() as u64,
                        "statement exceeded command timeout; connection will be discarded"
                    );
                    return Err(PoolError::CommandTimeout(limit));
                }
            },
            None => conn.query(sql, params).await,
        };

        outcome.map_err(|e| {
            self.note_failure(&e);
            PoolError::Query(e)
        })
    }

    /// Commit the current transaction.
    pub async fn commit(&mut self) -> Result<(), PoolError> {
        let outcome = self.connection()?.commit().await;
        outcome.map_err(|e| {
            self.note_failure(&e);
            PoolError::Commit(e)
        })
    }

    /// Roll back the current transaction.
    pub async fn rollback(&mut self) -> Result<(), PoolError> {
        let outcome = self.connection()?.rollback().await;
        outcome.map_err(|e| {
            self.note_failure(&e);
            PoolError::Query(e)
        })
    }

    /// Check that the session is alive.
    pub async fn ping(&mut self) -> Result<(), PoolError> {
        let outcome = self.connection()?.ping().await;
        outcome.map_err(|e| {
            self.note_failure(&e);
            PoolError::Connection(e)
        })
    }

    /// Run the pool's health check query on this connection.
    pub async fn health_check(&mut self) -> HealthCheckResult {
        let query = Arc::clone(&self.pool.config.health_check_query);
        let limit = self.pool.command_limit();
        let result = match self.conn.as_mut() {
            Some(conn) => tokio::time::timeout(limit, run_health_check(&mut **conn, &query))
                .await
                .unwrap_or_else(|_| HealthCheckResult::unhealthy(limit, "health check timed out")),
            None => HealthCheckResult::unhealthy(Duration::ZERO, "connection closed"),
        };
        self.meta.mark_health_check();
        if !result.healthy {
            self.broken = true;
        }
        result
    }

    /// Select `database` on this session.
    ///
    /// The name must already be validated.
    pub(crate) async fn use_database(&mut self, database: &str) -> Result<(), PoolError> {
        self.query(&use_statement(database), &Params::None).await?;
        self.meta.database = Some(database.to_string());
        Ok(())
    }

    /// Return the connection to the pool.
    ///
    /// The session is reset (when `reset_on_checkin` is set) before it
    /// becomes available again; a broken connection is closed instead.
    pub async fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.checkin(conn, self.meta.clone(), self.broken).await;
        }
        self.permit.take();
    }

    fn connection(&mut self) -> Result<&mut Box<dyn Connection>, PoolError> {
        self.conn
            .as_mut()
            .ok_or(PoolError::Connection(Error::ConnectionClosed))
    }

    fn note_failure(&mut self, error: &Error) {
        if error.is_connection_lost() {
            self.broken = true;
        }
    }
}

impl fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("id", &self.meta.id)
            .field("database", &self.meta.database)
            .field("broken", &self.broken)
            .finish()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let pool = Arc::clone(&self.pool);
        let meta = self.meta.clone();
        let broken = self.broken;
        let permit = self.permit.take();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    pool.checkin(conn, meta, broken).await;
                    drop(permit);
                });
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = meta.id,
                    "no Tokio runtime while returning connection; closing it"
                );
                drop(conn);
                AtomicPoolMetrics::incr(&pool.metrics.connections_closed);
                drop(InUseGuard(&pool));
                drop(permit);
            }
        }
    }
}
