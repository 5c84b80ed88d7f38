//! # mysql-pool-testing
//!
//! Test infrastructure for the MySQL connection pool.
//!
//! ## Features
//!
//! - Scripted in-memory driver implementing `Connector` (no Docker required)
//! - MySQL container management via testcontainers
//! - SQL fixtures for the `users` table used across tests
//!
//! ## Mock Example
//!
//! ```rust,ignore
//! use mysql_pool_testing::mock::{MockConnector, MockResponse};
//!
//! #[tokio::test]
//! async fn test_with_mock() {
//!     let connector = MockConnector::builder()
//!         .with_response("INSERT INTO users (name, age) VALUES (%s, %s)", MockResponse::inserted(1, 1))
//!         .build();
//!
//!     // Hand `connector.clone()` to the pool, keep `connector` for assertions.
//!     assert_eq!(connector.live(), 0);
//! }
//! ```
//!
//! ## Container Example
//!
//! ```rust,ignore
//! use mysql_pool_testing::MySqlContainer;
//! use testcontainers::runners::AsyncRunner;
//!
//! #[tokio::test]
//! async fn test_with_real_server() {
//!     let container = MySqlContainer::default().start().await.unwrap();
//!     let port = container.get_host_port_ipv4(3306).await.unwrap();
//!     // Connect to localhost:port...
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod container;
pub mod fixtures;
pub mod mock;

pub use container::MySqlContainer;
pub use fixtures::{TestFixture, USERS_TABLE_DDL};
pub use mock::{MockColumn, MockConnection, MockConnector, MockConnectorBuilder, MockEvent, MockResponse};
