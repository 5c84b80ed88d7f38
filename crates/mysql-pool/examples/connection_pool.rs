//! Pool manager walkthrough.
//!
//! Registers the process-wide pool manager, creates a database and a table,
//! inserts a row and reads it back, then prints the pool status and metrics.
//!
//! # Running
//!
//! ```bash
//! export MYSQL_HOST=localhost
//! export MYSQL_USER=root
//! export MYSQL_PASSWORD=Password123!
//!
//! cargo run --example connection_pool
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use mysql_connection_pool::{Pool, PoolManager, Registration};
use mysql_pool_client::{Config, Params};
use tracing_subscriber::EnvFilter;

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(100),
    age INT
)";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let host = std::env::var("MYSQL_HOST").unwrap_or_else(|_| "localhost".into());
    let user = std::env::var("MYSQL_USER").unwrap_or_else(|_| "root".into());
    let password = std::env::var("MYSQL_PASSWORD").unwrap_or_else(|_| "Password123!".into());

    let client_config = Config::new().host(host).user(user).password(password);

    println!("=== MySQL Pool Manager Example ===\n");

    let builder = Pool::builder()
        .client_config(client_config)
        .max_connections(5)
        .connection_timeout(Duration::from_secs(10));
    let (manager, registration) = PoolManager::get_or_create(builder).await?;
    assert_eq!(registration, Registration::Created);

    // Later lookups anywhere in the process get the same manager.
    let manager_again = PoolManager::get_instance()?;
    println!(
        "Pool '{}' registered ({} connections max)",
        manager_again.pool().name(),
        manager_again.pool().config().max_connections
    );

    let executor = manager.executor();

    // 1. Create and select a database
    println!("\n1. Preparing database:");
    executor
        .execute_safe("CREATE DATABASE IF NOT EXISTS test_db", ())
        .await?;
    manager.switch_database("test_db").await?;
    println!("  Current database: {:?}", manager.current_database().await?);

    // 2. Create a table
    println!("\n2. Creating table:");
    executor.execute_safe(CREATE_USERS, ()).await?;
    println!("  Table 'users' ready");

    // 3. Insert a row and commit
    println!("\n3. Inserting a row:");
    let result = executor
        .commit_execute(
            "INSERT INTO users (name, age) VALUES (%s, %s)",
            Params::positional(&[&"John Doe", &30i32]),
        )
        .await?;
    println!(
        "  Rows affected: {}, last insert id: {:?}",
        result.rows_affected, result.last_insert_id
    );

    // 4. Read everything back
    println!("\n4. Reading rows:");
    for user in executor.fetch_all("SELECT * FROM users", ()).await? {
        println!("  {user:?}");
    }

    let oldest = executor
        .fetch_one(
            "SELECT name, age FROM users WHERE age >= %(min_age)s ORDER BY age DESC",
            Params::named(&[("min_age", &18i32)]),
        )
        .await?;
    println!("  Oldest adult: {oldest:?}");

    // 5. Pool health
    println!("\n5. Pool status:");
    let status = manager.pool().status();
    println!(
        "  Available: {}, in use: {}, total: {}, max: {}",
        status.available, status.in_use, status.total, status.max
    );
    let metrics = manager.pool().metrics();
    println!("  Connections created: {}", metrics.connections_created);
    println!("  Checkouts: {}", metrics.checkouts_successful);
    println!("  Resets: {}", metrics.resets_performed);
    println!("  Average wait: {:?}", metrics.average_wait());

    manager.shutdown().await;
    println!("\n=== Example Complete ===");
    Ok(())
}
