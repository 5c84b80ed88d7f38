//! # mysql-connection-pool
//!
//! Bounded connection pool for MySQL with a process-wide manager and a
//! one-statement query executor.
//!
//! The pool never hands the same session to two callers, never keeps more
//! than `max_connections` sessions open, and resets every session before it
//! is reused.
//!
//! ## Features
//!
//! - Lazy connection creation up to `max_connections`, optional warm-up
//! - Bounded waiting for a free connection (`connection_timeout`)
//! - Session reset on return, discard of broken sessions
//! - Health checks via `SELECT 1`, lifetime and idle expiry
//! - Database switching that applies to every later checkout
//! - Rows as mappings, tuples, driver rows or `FromRow` types
//!
//! ## Example
//!
//! ```rust,ignore
//! use mysql_connection_pool::{Pool, PoolManager, RowFormat};
//! use mysql_pool_client::{Config, Params};
//!
//! let builder = Pool::builder()
//!     .client_config(Config::new().host("localhost").user("root").password("secret"))
//!     .max_connections(5);
//! let (manager, _) = PoolManager::get_or_create(builder).await?;
//!
//! manager.switch_database("test_db").await?;
//! let executor = manager.executor();
//! let result = executor
//!     .commit_execute(
//!         "INSERT INTO users (name, age) VALUES (%s, %s)",
//!         Params::positional(&[&"John Doe", &30]),
//!     )
//!     .await?;
//! let users = executor.fetch_all("SELECT * FROM users", ()).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod manager;
pub mod mapper;
pub mod metrics;
pub mod pool;

pub use config::PoolConfig;
pub use error::{PoolError, Result};
pub use executor::{QueryExecutor, RawExecution};
pub use lifecycle::{ConnectionMetadata, ConnectionState, HealthCheckResult};
pub use manager::{PoolManager, Registration};
pub use mapper::{AsRow, FromRowMapper, Record, RowFormat, RowMapper};
pub use metrics::PoolMetrics;
pub use pool::{Pool, PoolBuilder, PoolStatus, PooledConnection};
