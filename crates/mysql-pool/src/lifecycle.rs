//! Connection lifecycle tracking.
//!
//! The pool keeps a [`ConnectionMetadata`] next to every session it owns.
//! Timestamps use [`tokio::time::Instant`], so expiry follows the Tokio clock
//! (and can be driven by a paused clock in tests).

use std::time::Duration;

use tokio::time::Instant;

/// Health check result with timing information.
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    /// Whether the health check passed.
    pub healthy: bool,
    /// Time taken to complete the health check.
    pub latency: Duration,
    /// Error message if unhealthy.
    pub error: Option<String>,
}

impl HealthCheckResult {
    /// Create a successful health check result.
    pub fn healthy(latency: Duration) -> Self {
        Self {
            healthy: true,
            latency,
            error: None,
        }
    }

    /// Create a failed health check result.
    pub fn unhealthy(latency: Duration, error: impl Into<String>) -> Self {
        Self {
            healthy: false,
            latency,
            error: Some(error.into()),
        }
    }
}

/// Connection state tracked by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection is idle and available for use.
    Idle,
    /// Connection is currently in use.
    InUse,
    /// Connection is being health-checked.
    Checking,
    /// Connection is being reset.
    Resetting,
    /// Connection is closed and should be removed.
    Closed,
}

impl ConnectionState {
    /// Check if the connection is available for checkout.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if the connection is currently busy.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::InUse | Self::Checking | Self::Resetting)
    }
}

/// Metadata about a pooled connection.
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    /// Pool-assigned identifier, unique within one pool.
    pub id: u64,
    /// When the connection was created.
    pub created_at: Instant,
    /// When the connection was last checked out or returned.
    pub last_used_at: Instant,
    /// When the connection was last health-checked.
    pub last_checked_at: Option<Instant>,
    /// Number of times the connection has been checked out.
    pub checkout_count: u64,
    /// Current state of the connection.
    pub state: ConnectionState,
    /// Database the session has selected, `None` when unknown or unset.
    pub database: Option<String>,
}

impl ConnectionMetadata {
    /// Create metadata for a new connection.
    pub fn new(id: u64, database: Option<String>) -> Self {
        let now = Instant::now();
        Self {
            id,
            created_at: now,
            last_used_at: now,
            last_checked_at: None,
            checkout_count: 0,
            state: ConnectionState::Idle,
            database,
        }
    }

    /// Check if the connection has exceeded its maximum lifetime.
    #[must_use]
    pub fn is_expired(&self, max_lifetime: Duration) -> bool {
        self.created_at.elapsed() > max_lifetime
    }

    /// Check if the connection has been idle too long.
    #[must_use]
    pub fn is_idle_expired(&self, idle_timeout: Duration) -> bool {
        self.last_used_at.elapsed() > idle_timeout
    }

    /// Check if a health check is due.
    #[must_use]
    pub fn needs_health_check(&self, check_interval: Duration) -> bool {
        match self.last_checked_at {
            Some(last) => last.elapsed() > check_interval,
            None => true,
        }
    }

    /// Mark the connection as checked out.
    pub fn mark_checkout(&mut self) {
        self.last_used_at = Instant::now();
        self.checkout_count += 1;
        self.state = ConnectionState::InUse;
    }

    /// Mark the connection as returned to idle.
    pub fn mark_checkin(&mut self) {
        self.last_used_at = Instant::now();
        self.state = ConnectionState::Idle;
    }

    /// Mark the connection as health-checked.
    pub fn mark_health_check(&mut self) {
        self.last_checked_at = Some(Instant::now());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_availability() {
        assert!(ConnectionState::Idle.is_available());
        assert!(!ConnectionState::InUse.is_available());
        assert!(!ConnectionState::Checking.is_available());
        assert!(!ConnectionState::Closed.is_busy());
        assert!(ConnectionState::Resetting.is_busy());
    }

    #[test]
    fn test_connection_metadata_checkout_checkin() {
        let mut meta = ConnectionMetadata::new(1, Some("test_db".into()));
        assert_eq!(meta.checkout_count, 0);
        assert_eq!(meta.state, ConnectionState::Idle);

        meta.mark_checkout();
        assert_eq!(meta.checkout_count, 1);
        assert_eq!(meta.state, ConnectionState::InUse);

        meta.mark_checkin();
        assert_eq!(meta.state, ConnectionState::Idle);
        assert_eq!(meta.database.as_deref(), Some("test_db"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_follows_tokio_clock() {
        let mut meta = ConnectionMetadata::new(7, None);
        assert!(meta.needs_health_check(Duration::from_secs(30)));
        meta.mark_health_check();
        assert!(!meta.needs_health_check(Duration::from_secs(30)));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(meta.needs_health_check(Duration::from_secs(30)));
        assert!(meta.is_idle_expired(Duration::from_secs(30)));
        assert!(!meta.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_health_check_result() {
        let ok = HealthCheckResult::healthy(Duration::from_millis(5));
        assert!(ok.healthy);
        assert!(ok.error.is_none());

        let failed = HealthCheckResult::unhealthy(Duration::from_millis(1000), "timeout");
        assert!(!failed.healthy);
        assert_eq!(failed.error.as_deref(), Some("timeout"));
    }
}
