//! Connection pool integration tests.
//!
//! These tests require a running MySQL server. They are ignored by default
//! and can be run with:
//!
//! ```bash
//! # Set connection details via environment variables
//! export MYSQL_HOST=localhost
//! export MYSQL_PORT=3306
//! export MYSQL_USER=root
//! export MYSQL_PASSWORD=YourPassword
//!
//! # Run integration tests
//! cargo test -p mysql-connection-pool --test integration -- --ignored
//! ```
//!
//! Each test works in its own scratch database, dropped at the end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use mysql_connection_pool::{AsRow, Pool, PoolError, PoolManager, RowFormat};
use mysql_pool_client::{Config, Params};
use mysql_pool_testing::{TestFixture, USERS_TABLE_DDL};
use mysql_pool_types::SqlValue;

/// Helper to get test configuration from environment variables.
fn get_test_config() -> Option<Config> {
    let host = std::env::var("MYSQL_HOST").ok()?;
    let port = std::env::var("MYSQL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3306);
    let user = std::env::var("MYSQL_USER").unwrap_or_else(|_| "root".into());
    let password = std::env::var("MYSQL_PASSWORD").unwrap_or_else(|_| "Password123!".into());

    Some(
        Config::new()
            .host(host)
            .port(port)
            .user(user)
            .password(password),
    )
}

async fn scratch_manager(database: &str, max: u32) -> PoolManager {
    let client_config = get_test_config().expect("MySQL config required");
    let pool = Pool::builder()
        .client_config(client_config)
        .max_connections(max)
        .build()
        .await
        .expect("Failed to create pool");
    let manager = PoolManager::new(pool, RowFormat::Mapping);

    let fixture = TestFixture::new(database).with_users_table();
    let executor = manager.executor();
    executor
        .execute_safe(&fixture.drop_database_sql(), ())
        .await
        .expect("Failed to drop scratch database");
    executor
        .execute_safe(&fixture.create_database_sql(), ())
        .await
        .expect("Failed to create scratch database");
    manager
        .switch_database(database)
        .await
        .expect("Failed to switch database");
    executor
        .execute_safe(USERS_TABLE_DDL, ())
        .await
        .expect("Failed to create users table");
    manager
}

async fn drop_scratch(manager: PoolManager, database: &str) {
    let fixture = TestFixture::new(database);
    manager
        .executor()
        .execute_safe(&fixture.drop_database_sql(), ())
        .await
        .expect("Failed to drop scratch database");
    manager.shutdown().await;
}

// =============================================================================
// Basic Pool Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_pool_create_and_close() {
    let client_config = get_test_config().expect("MySQL config required");

    let pool = Pool::builder()
        .client_config(client_config)
        .max_connections(5)
        .build()
        .await
        .expect("Failed to create pool");

    assert!(!pool.is_closed());
    let status = pool.status();
    assert_eq!(status.max, 5);
    assert_eq!(status.in_use, 0);
    assert_eq!(status.available, 1);

    pool.close().await;
    assert!(pool.is_closed());
    assert!(matches!(pool.get().await, Err(PoolError::PoolClosed)));
}

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_pool_bad_credentials_fail_at_build() {
    let client_config = get_test_config()
        .expect("MySQL config required")
        .password("definitely-not-the-password");

    let err = Pool::builder()
        .client_config(client_config)
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, PoolError::Connection(_)));
}

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_pool_concurrent_access() {
    let client_config = get_test_config().expect("MySQL config required");
    let pool = Pool::builder()
        .client_config(client_config)
        .max_connections(5)
        .build()
        .await
        .expect("Failed to create pool");

    let sessions: Arc<Mutex<HashSet<u64>>> = Arc::default();
    let mut handles = Vec::new();
    for i in 0..10i64 {
        let pool = pool.clone();
        let sessions = Arc::clone(&sessions);
        handles.push(tokio::spawn(async move {
            let mut conn = pool.get().await.expect("Failed to get connection");
            let mut cursor = conn
                .query(
                    "SELECT ? AS task_id, CONNECTION_ID() AS session",
                    &Params::positional(&[&i]),
                )
                .await
                .expect("Query failed");
            let row = cursor.fetch_one().expect("Row expected");
            assert_eq!(row.get::<i64>(0).unwrap(), i);

            // No two tasks hold the same server session at once.
            let session: u64 = row.get(1).unwrap();
            assert!(sessions.lock().insert(session));
            tokio::time::sleep(Duration::from_millis(20)).await;
            sessions.lock().remove(&session);
            conn.release().await;
        }));
    }
    for handle in handles {
        handle.await.expect("Task panicked");
    }

    assert!(pool.metrics().connections_created <= 5);
    pool.close().await;
}

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_pool_connection_timeout() {
    let client_config = get_test_config().expect("MySQL config required");
    let pool = Pool::builder()
        .client_config(client_config)
        .max_connections(1)
        .connection_timeout(Duration::from_millis(200))
        .build()
        .await
        .expect("Failed to create pool");

    let held = pool.get().await.unwrap();
    let err = pool.get().await.unwrap_err();
    assert!(matches!(err, PoolError::PoolExhausted(_)));

    held.release().await;
    pool.close().await;
}

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_session_state_reset_between_checkouts() {
    let client_config = get_test_config().expect("MySQL config required");
    let pool = Pool::builder()
        .client_config(client_config)
        .max_connections(1)
        .build()
        .await
        .expect("Failed to create pool");

    let mut conn = pool.get().await.unwrap();
    conn.query("SET @marker = 42", &Params::None).await.unwrap();
    conn.release().await;

    let mut conn = pool.get().await.unwrap();
    let mut cursor = conn.query("SELECT @marker", &Params::None).await.unwrap();
    let marker: Option<i64> = cursor.fetch_one().unwrap().get(0).unwrap();
    assert_eq!(marker, None);
    conn.release().await;

    pool.close().await;
}

// =============================================================================
// Executor Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_insert_and_fetch_all() {
    let database = "pool_it_insert";
    let manager = scratch_manager(database, 5).await;
    let executor = manager.executor();

    let result = executor
        .commit_execute(
            "INSERT INTO users (name, age) VALUES (%s, %s)",
            Params::positional(&[&"Ada", &30i32]),
        )
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 1);
    assert!(result.last_insert_id.is_some());

    let users = executor.fetch_all("SELECT * FROM users", ()).await.unwrap();
    assert_eq!(users.len(), 1);
    let user = users[0].as_map().expect("mapping rows expected");
    assert_eq!(user.get("name"), Some(&SqlValue::from("Ada")));
    assert_eq!(users[0].try_get::<i32>("age").unwrap(), 30);

    drop_scratch(manager, database).await;
}

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_named_parameters_and_fetch_one() {
    let database = "pool_it_named";
    let manager = scratch_manager(database, 2).await;
    let executor = manager.executor_with(AsRow);

    executor
        .commit_execute(
            "INSERT INTO users (name, age) VALUES (%(name)s, %(age)s)",
            Params::named(&[("name", &"Grace"), ("age", &85i32)]),
        )
        .await
        .unwrap();

    let row = executor
        .fetch_one(
            "SELECT name FROM users WHERE age > :min_age",
            Params::named(&[("min_age", &80i32)]),
        )
        .await
        .unwrap()
        .expect("Row expected");
    assert_eq!(row.get_by_name::<String>("name").unwrap(), "Grace");

    let none = executor
        .fetch_one("SELECT * FROM users WHERE age > ?", Params::positional(&[&200i32]))
        .await
        .unwrap();
    assert!(none.is_none());

    drop_scratch(manager, database).await;
}

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_switch_database_and_current_database() {
    let database = "pool_it_switch";
    let manager = scratch_manager(database, 3).await;

    for _ in 0..3 {
        assert_eq!(
            manager.current_database().await.unwrap().as_deref(),
            Some(database)
        );
    }

    let err = manager
        .switch_database("pool_it_does_not_exist")
        .await
        .unwrap_err();
    assert!(err.is_server_error(1049));
    assert_eq!(
        manager.current_database().await.unwrap().as_deref(),
        Some(database)
    );

    drop_scratch(manager, database).await;
}

#[tokio::test]
#[ignore = "Requires MySQL"]
async fn test_query_error_releases_connection() {
    let database = "pool_it_errors";
    let manager = scratch_manager(database, 1).await;
    let executor = manager.executor();

    let err = executor
        .fetch_all("SELECT * FROM no_such_table", ())
        .await
        .unwrap_err();
    assert!(err.is_server_error(1146));
    assert_eq!(manager.pool().status().in_use, 0);

    let rows = executor.fetch_all("SELECT * FROM users", ()).await.unwrap();
    assert!(rows.is_empty());

    drop_scratch(manager, database).await;
}
