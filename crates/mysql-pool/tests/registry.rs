//! Process-wide manager registration.
//!
//! The registry is global, so every scenario runs inside one test.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mysql_connection_pool::{Pool, PoolError, PoolManager, Registration, RowFormat};
use mysql_pool_client::Config;
use mysql_pool_testing::MockConnector;

fn builder(connector: &MockConnector, database: &str, max: u32) -> mysql_connection_pool::PoolBuilder {
    Pool::builder()
        .connector(connector.clone())
        .client_config(Config::new().database(database))
        .max_connections(max)
}

#[tokio::test]
async fn test_first_writer_wins() {
    let connector = MockConnector::builder()
        .with_database("first")
        .with_database("second")
        .build();

    // Not registered yet.
    assert!(matches!(
        PoolManager::get_instance(),
        Err(PoolError::NotInitialized)
    ));

    let (created, registration) = PoolManager::get_or_create(builder(&connector, "first", 3))
        .await
        .unwrap();
    assert_eq!(registration, Registration::Created);
    assert_eq!(connector.opened(), 1);

    // Same configuration.
    let (again, registration) = PoolManager::get_or_create(builder(&connector, "first", 3))
        .await
        .unwrap();
    assert_eq!(registration, Registration::Existing);
    assert_eq!(again.pool().config().max_connections, 3);

    // Different configuration is ignored and opens nothing.
    let (ignored, registration) = PoolManager::get_or_create(
        builder(&connector, "second", 8).row_format(RowFormat::Tuple),
    )
    .await
    .unwrap();
    assert_eq!(registration, Registration::ConfigIgnored);
    assert_eq!(ignored.pool().config().max_connections, 3);
    assert_eq!(ignored.row_format(), RowFormat::Mapping);
    assert_eq!(
        ignored.current_database().await.unwrap().as_deref(),
        Some("first")
    );
    assert_eq!(connector.opened(), 1);

    let instance = PoolManager::get_instance().unwrap();
    assert_eq!(instance.pool().name(), created.pool().name());

    // Shutdown unregisters.
    created.shutdown().await;
    assert!(instance.pool().is_closed());
    assert!(matches!(
        PoolManager::get_instance(),
        Err(PoolError::NotInitialized)
    ));

    // Concurrent first callers build exactly one pool.
    let connector = MockConnector::builder().with_database("first").build();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let connector = connector.clone();
        handles.push(tokio::spawn(async move {
            PoolManager::get_or_create(builder(&connector, "first", 2))
                .await
                .map(|(_, registration)| registration)
        }));
    }
    let mut created_count = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() == Registration::Created {
            created_count += 1;
        }
    }
    assert_eq!(created_count, 1);
    assert_eq!(connector.opened(), 1);

    PoolManager::get_instance().unwrap().shutdown().await;
}
