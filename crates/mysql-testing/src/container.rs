//! MySQL container support via testcontainers.

use testcontainers::Image;
use testcontainers::core::{ContainerPort, WaitFor};

/// Port MySQL listens on inside the container.
pub const MYSQL_PORT: u16 = 3306;

/// MySQL container image.
///
/// Uses the official `mysql` Docker Hub image.
#[derive(Debug, Clone)]
pub struct MySqlContainer {
    /// Root password.
    pub root_password: String,
    /// Database created at startup.
    pub database: Option<String>,
    /// Container tag (version).
    pub tag: String,
}

impl Default for MySqlContainer {
    fn default() -> Self {
        Self {
            root_password: "Password123!".to_string(),
            database: None,
            tag: "8.0".to_string(),
        }
    }
}

impl MySqlContainer {
    /// Create a new MySQL container configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root password.
    #[must_use]
    pub fn with_root_password(mut self, password: impl Into<String>) -> Self {
        self.root_password = password.into();
        self
    }

    /// Create a database when the container starts.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the container tag (MySQL version).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

impl Image for MySqlContainer {
    fn name(&self) -> &str {
        "mysql"
    }

    fn tag(&self) -> &str {
        &self.tag
    }

    fn ready_conditions(&self) -> Vec<WaitFor> {
        // The entrypoint starts a temporary server first; the second
        // message belongs to the real one listening on 3306.
        vec![
            WaitFor::message_on_stderr("port: 3306  MySQL Community Server"),
            WaitFor::seconds(2),
        ]
    }

    fn env_vars(
        &self,
    ) -> impl IntoIterator<
        Item = (
            impl Into<std::borrow::Cow<'_, str>>,
            impl Into<std::borrow::Cow<'_, str>>,
        ),
    > {
        let mut vars = vec![("MYSQL_ROOT_PASSWORD", self.root_password.as_str())];
        if let Some(database) = &self.database {
            vars.push(("MYSQL_DATABASE", database.as_str()));
        }
        vars
    }

    fn expose_ports(&self) -> &[ContainerPort] {
        &[ContainerPort::Tcp(MYSQL_PORT)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_env() {
        let image = MySqlContainer::new()
            .with_root_password("secret")
            .with_database("test_db")
            .with_tag("8.4");

        assert_eq!(image.name(), "mysql");
        assert_eq!(image.tag(), "8.4");

        let vars: Vec<(String, String)> = image
            .env_vars()
            .into_iter()
            .map(|(k, v)| (k.into().into_owned(), v.into().into_owned()))
            .collect();
        assert!(vars.contains(&("MYSQL_ROOT_PASSWORD".into(), "secret".into())));
        assert!(vars.contains(&("MYSQL_DATABASE".into(), "test_db".into())));
    }
}
