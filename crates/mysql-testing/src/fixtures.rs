//! Test fixture utilities.

/// DDL for the `users` table used across pool tests and the demo.
pub const USERS_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS users (
    id INT AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    age INT
)";

/// Test database fixture for setting up and tearing down test data.
#[derive(Debug, Clone)]
pub struct TestFixture {
    /// Database name.
    pub database: String,
    /// Tables created by this fixture, as `(name, ddl)`.
    pub tables: Vec<(String, String)>,
}

impl TestFixture {
    /// Create a new test fixture.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            tables: Vec::new(),
        }
    }

    /// Add a table to the fixture.
    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, ddl: impl Into<String>) -> Self {
        self.tables.push((name.into(), ddl.into()));
        self
    }

    /// Add the standard `users` table.
    #[must_use]
    pub fn with_users_table(self) -> Self {
        self.with_table("users", USERS_TABLE_DDL)
    }

    /// Generate SQL to create the test database.
    #[must_use]
    pub fn create_database_sql(&self) -> String {
        format!("CREATE DATABASE IF NOT EXISTS `{}`", self.database)
    }

    /// Generate SQL to drop the test database.
    #[must_use]
    pub fn drop_database_sql(&self) -> String {
        format!("DROP DATABASE IF EXISTS `{}`", self.database)
    }

    /// Statements that create the database, then every table inside it.
    #[must_use]
    pub fn setup_sql(&self) -> Vec<String> {
        let mut statements = vec![
            self.create_database_sql(),
            format!("USE `{}`", self.database),
        ];
        statements.extend(self.tables.iter().map(|(_, ddl)| ddl.clone()));
        statements
    }

    /// Statements that empty every table, leaving the schema in place.
    #[must_use]
    pub fn truncate_sql(&self) -> Vec<String> {
        self.tables
            .iter()
            .map(|(name, _)| format!("TRUNCATE TABLE `{}`.`{name}`", self.database))
            .collect()
    }
}
