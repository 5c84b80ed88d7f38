//! Pool counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Snapshot of cumulative pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Connections opened.
    pub connections_created: u64,
    /// Connections closed or discarded.
    pub connections_closed: u64,
    /// Successful checkouts.
    pub checkouts_successful: u64,
    /// Failed checkouts (timeouts and connection failures).
    pub checkouts_failed: u64,
    /// Checkouts that timed out waiting for capacity.
    pub pool_exhausted: u64,
    /// Health checks run on checkout.
    pub health_checks_performed: u64,
    /// Health checks that failed.
    pub health_checks_failed: u64,
    /// Session resets run on checkin.
    pub resets_performed: u64,
    /// Session resets that failed.
    pub resets_failed: u64,
    /// Connections retired for exceeding `max_lifetime`.
    pub lifetime_expired: u64,
    /// Connections retired for exceeding `idle_timeout`.
    pub idle_expired: u64,
    /// Total time callers spent waiting in `get()`.
    pub total_wait_time: Duration,
}

impl PoolMetrics {
    /// Fraction of checkouts that succeeded, `1.0` when there were none.
    #[must_use]
    pub fn checkout_success_rate(&self) -> f64 {
        let total = self.checkouts_successful + self.checkouts_failed;
        if total == 0 {
            1.0
        } else {
            self.checkouts_successful as f64 / total as f64
        }
    }

    /// Mean wait per successful checkout.
    #[must_use]
    pub fn average_wait(&self) -> Duration {
        match u32::try_from(self.checkouts_successful) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_wait_time / n,
            Err(_) => Duration::ZERO,
        }
    }
}

/// Lock-free counters behind [`PoolMetrics`].
#[derive(Debug, Default)]
pub(crate) struct AtomicPoolMetrics {
    pub(crate) connections_created: AtomicU64,
    pub(crate) connections_closed: AtomicU64,
    pub(crate) checkouts_successful: AtomicU64,
    pub(crate) checkouts_failed: AtomicU64,
    pub(crate) pool_exhausted: AtomicU64,
    pub(crate) health_checks_performed: AtomicU64,
    pub(crate) health_checks_failed: AtomicU64,
    pub(crate) resets_performed: AtomicU64,
    pub(crate) resets_failed: AtomicU64,
    pub(crate) lifetime_expired: AtomicU64,
    pub(crate) idle_expired: AtomicU64,
    total_wait_micros: AtomicU64,
}

impl AtomicPoolMetrics {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_checkout(&self, waited: Duration) {
        Self::incr(&self.checkouts_successful);
        let micros = u64::try_from(waited.as_micros()).unwrap_or(u64::MAX);
        self.total_wait_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub(crate) fn record_exhausted(&self) {
        Self::incr(&self.pool_exhausted);
        Self::incr(&self.checkouts_failed);
    }

    pub(crate) fn snapshot(&self) -> PoolMetrics {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        PoolMetrics {
            connections_created: load(&self.connections_created),
            connections_closed: load(&self.connections_closed),
            checkouts_successful: load(&self.checkouts_successful),
            checkouts_failed: load(&self.checkouts_failed),
            pool_exhausted: load(&self.pool_exhausted),
            health_checks_performed: load(&self.health_checks_performed),
            health_checks_failed: load(&self.health_checks_failed),
            resets_performed: load(&self.resets_performed),
            resets_failed: load(&self.resets_failed),
            lifetime_expired: load(&self.lifetime_expired),
            idle_expired: load(&self.idle_expired),
            total_wait_time: Duration::from_micros(load(&self.total_wait_micros)),
        }
    }
}
