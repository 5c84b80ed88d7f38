//! Pool configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::error::PoolError;
use crate::mapper::RowFormat;

/// Default pool name.
pub const DEFAULT_POOL_NAME: &str = "mysql_pool";

/// Default maximum pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default health check query.
pub const DEFAULT_HEALTH_CHECK_QUERY: &str = "SELECT 1";

/// Longest accepted pool name.
const MAX_POOL_NAME_LEN: usize = 64;

/// Configuration for the connection pool.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future minor versions without breaking changes. Use the builder
/// pattern methods or [`Default::default()`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct PoolConfig {
    /// Pool identifier, used in logs.
    pub pool_name: String,

    /// Connections opened when the pool is built and kept warm.
    pub min_connections: u32,

    /// Maximum number of connections allowed.
    pub max_connections: u32,

    /// Time to wait for a free connection before failing with
    /// [`PoolError::PoolExhausted`].
    pub connection_timeout: Duration,

    /// Time a connection can be idle before being closed.
    pub idle_timeout: Duration,

    /// Maximum lifetime of a connection.
    pub max_lifetime: Duration,

    /// Whether to run the health check query on checkout.
    pub test_on_checkout: bool,

    /// Minimum time between health checks of the same connection.
    pub health_check_interval: Duration,

    /// Whether to reset session state (`COM_RESET_CONNECTION`) on return.
    pub reset_on_checkin: bool,

    /// Query executed to verify a connection is healthy.
    ///
    /// # Examples
    ///
    /// - `SELECT 1` - Simple ping (default)
    /// - `SELECT VERSION()` - Check server version
    /// - `SELECT 1 FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = 'mydb'` - Check database exists
    pub health_check_query: Arc<str>,

    /// Upper bound on a single statement, if any.
    pub command_timeout: Option<Duration>,

    /// Row format used by executors created from a manager.
    pub row_format: RowFormat,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_name: DEFAULT_POOL_NAME.to_string(),
            min_connections: 0,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
            test_on_checkout: true,
            health_check_interval: Duration::from_secs(30),
            reset_on_checkin: true,
            health_check_query: Arc::from(DEFAULT_HEALTH_CHECK_QUERY),
            command_timeout: None,
            row_format: RowFormat::Mapping,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pool name.
    #[must_use]
    pub fn pool_name(mut self, name: impl Into<String>) -> Self {
        self.pool_name = name.into();
        self
    }

    /// Set the minimum number of connections.
    #[must_use]
    pub fn min_connections(mut self, count: u32) -> Self {
        self.min_connections = count;
        self
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub fn max_connections(mut self, count: u32) -> Self {
        self.max_connections = count;
        self
    }

    /// Set the connection acquisition timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the maximum connection lifetime.
    #[must_use]
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Enable or disable testing connections on checkout.
    #[must_use]
    pub fn test_on_checkout(mut self, enabled: bool) -> Self {
        self.test_on_checkout = enabled;
        self
    }

    /// Set the health check interval.
    #[must_use]
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Enable or disable the session reset on return.
    #[must_use]
    pub fn reset_on_checkin(mut self, enabled: bool) -> Self {
        self.reset_on_checkin = enabled;
        self
    }

    /// Set a custom health check query.
    ///
    /// ```rust
    /// use mysql_connection_pool::PoolConfig;
    ///
    /// let config = PoolConfig::new().health_check_query("SELECT VERSION()");
    /// assert_eq!(&*config.health_check_query, "SELECT VERSION()");
    /// ```
    #[must_use]
    pub fn health_check_query(mut self, query: impl Into<Arc<str>>) -> Self {
        self.health_check_query = query.into();
        self
    }

    /// Bound every statement by `timeout`.
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Set the row format.
    #[must_use]
    pub fn row_format(mut self, format: RowFormat) -> Self {
        self.row_format = format;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_connections == 0 {
            return Err(PoolError::Configuration(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(PoolError::Configuration(
                "min_connections cannot be greater than max_connections".into(),
            ));
        }
        if self.connection_timeout.is_zero() {
            return Err(PoolError::Configuration(
                "connection_timeout must be greater than 0".into(),
            ));
        }
        if self.health_check_query.trim().is_empty() {
            return Err(PoolError::Configuration(
                "health_check_query cannot be empty".into(),
            ));
        }
        validate_pool_name(&self.pool_name)
    }
}

fn validate_pool_name(name: &str) -> Result<(), PoolError> {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static POOL_NAME_RE: Lazy<Option<Regex>> = Lazy::new(|| {
        Regex::new(&format!(r"^[A-Za-z0-9._:*$#-]{{1,{MAX_POOL_NAME_LEN}}}$")).ok()
    });

    if !POOL_NAME_RE.as_ref().is_some_and(|re| re.is_match(name)) {
        return Err(PoolError::Configuration(format!(
            "invalid pool_name '{name}': must be 1 to {MAX_POOL_NAME_LEN} characters \
             from A-Z, a-z, 0-9 and . _ : - * $ #"
        )));
    }
    Ok(())
}
