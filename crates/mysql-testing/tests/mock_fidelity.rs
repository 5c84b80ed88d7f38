//! Mock Driver Fidelity Tests
//!
//! These tests check that the statements the mock answers natively behave the
//! way a real MySQL server does, so pool tests written against the mock hold
//! against production too.
//!
//! Run mock tests (no MySQL required):
//! ```bash
//! cargo test -p mysql-pool-testing --test mock_fidelity
//! ```
//!
//! Run comparison tests against a real server:
//! ```bash
//! MYSQL_HOST=localhost MYSQL_USER=root MYSQL_PASSWORD='Password123!' \
//!     cargo test -p mysql-pool-testing --test mock_fidelity -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mysql_pool_client::{Config, Connection, Connector, MySqlConnector, Params};
use mysql_pool_testing::{MockConnector, MockEvent, MySqlContainer, TestFixture};
use testcontainers::runners::AsyncRunner;

const FIDELITY_DB: &str = "mock_fidelity_db";

/// Session statements whose outcome must match between mock and server.
///
/// Each entry is `(statement, expected server error code)`.
const SCRIPT: &[(&str, Option<u16>)] = &[
    ("CREATE DATABASE IF NOT EXISTS mock_fidelity_db", None),
    ("CREATE DATABASE mock_fidelity_db", Some(1007)),
    ("USE mock_fidelity_db", None),
    ("USE `mock_fidelity_missing`", Some(1049)),
    ("SELECT 1", None),
];

/// Run [`SCRIPT`] and report each statement's error code.
async fn run_script(conn: &mut dyn Connection) -> Vec<Option<u16>> {
    let mut codes = Vec::new();
    for (sql, _) in SCRIPT {
        let code = match conn.query(sql, &Params::None).await {
            Ok(_) => None,
            Err(e) => Some(e.code().expect("server error expected")),
        };
        codes.push(code);
    }
    codes
}

async fn selected_database(conn: &mut dyn Connection) -> Option<String> {
    let mut cursor = conn
        .query("SELECT DATABASE()", &Params::None)
        .await
        .unwrap();
    cursor.fetch_one().unwrap().get(0).unwrap()
}

fn expected_codes() -> Vec<Option<u16>> {
    SCRIPT.iter().map(|(_, code)| *code).collect()
}

// =============================================================================
// Mock Behavior (no server required)
// =============================================================================

#[tokio::test]
async fn test_mock_follows_script() {
    let connector = MockConnector::new();
    let mut conn = connector.connect(&Config::new()).await.unwrap();

    assert_eq!(selected_database(&mut *conn).await, None);
    assert_eq!(run_script(&mut *conn).await, expected_codes());
    assert_eq!(selected_database(&mut *conn).await.as_deref(), Some(FIDELITY_DB));
}

#[tokio::test]
async fn test_mock_reset_keeps_database() {
    let connector = MockConnector::builder().with_database(FIDELITY_DB).build();
    let mut conn = connector
        .connect(&Config::new().database(FIDELITY_DB))
        .await
        .unwrap();

    conn.reset().await.unwrap();
    assert_eq!(selected_database(&mut *conn).await.as_deref(), Some(FIDELITY_DB));
}

#[tokio::test]
async fn test_mock_records_session_lifecycle() {
    let connector = MockConnector::new();
    let mut conn = connector.connect(&Config::new()).await.unwrap();
    conn.ping().await.unwrap();
    conn.commit().await.unwrap();
    conn.close().await.unwrap();

    let events = connector.events();
    assert!(matches!(events[0], MockEvent::Connect { .. }));
    assert!(matches!(events[1], MockEvent::Ping { .. }));
    assert!(matches!(events[2], MockEvent::Commit { .. }));
    assert!(matches!(events[3], MockEvent::Close { .. }));
    assert!(events.iter().all(|e| e.id() == events[0].id()));
    assert_eq!(connector.live(), 0);
}

#[tokio::test]
async fn test_mock_login_to_unknown_database() {
    let connector = MockConnector::new();
    let err = connector
        .connect(&Config::new().database("nope"))
        .await
        .err()
        .unwrap();
    assert!(err.is_server_error(1049));
    assert_eq!(connector.opened(), 0);
}

// =============================================================================
// Comparison With a Real Server
// =============================================================================

fn real_server_config() -> Option<Config> {
    let host = std::env::var("MYSQL_HOST").ok()?;
    let user = std::env::var("MYSQL_USER").unwrap_or_else(|_| "root".into());
    let password = std::env::var("MYSQL_PASSWORD").unwrap_or_else(|_| "Password123!".into());
    Some(Config::new().host(host).user(user).password(password))
}

async fn compare_with_server(config: &Config) {
    let mut conn = MySqlConnector::new()
        .connect(config)
        .await
        .expect("Failed to connect to MySQL");
    let fixture = TestFixture::new(FIDELITY_DB);
    conn.query(&fixture.drop_database_sql(), &Params::None)
        .await
        .unwrap();

    assert_eq!(run_script(&mut *conn).await, expected_codes());
    assert_eq!(selected_database(&mut *conn).await.as_deref(), Some(FIDELITY_DB));

    conn.reset().await.unwrap();
    assert_eq!(selected_database(&mut *conn).await.as_deref(), Some(FIDELITY_DB));

    conn.query(&fixture.drop_database_sql(), &Params::None)
        .await
        .unwrap();
    conn.close().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires MySQL for comparison"]
async fn test_compare_with_real_server() {
    let config = real_server_config().expect("MYSQL_HOST required");
    compare_with_server(&config).await;
}

#[tokio::test]
#[ignore = "Requires Docker"]
async fn test_compare_with_container() {
    let image = MySqlContainer::new();
    let password = image.root_password.clone();
    let container = image.start().await.expect("Failed to start MySQL container");
    let port = container
        .get_host_port_ipv4(mysql_pool_testing::container::MYSQL_PORT)
        .await
        .unwrap();

    let config = Config::new()
        .host("127.0.0.1")
        .port(port)
        .user("root")
        .password(password);
    compare_with_server(&config).await;
}
