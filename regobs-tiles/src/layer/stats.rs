//! Per-layer counters.
//!
//! ```text
//! load_tile ─────► LayerMetrics ─────► LayerStatsSnapshot ─────► CLI / logs
//!                  (atomic counters)   (point-in-time copy)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by a layer.
#[derive(Debug, Default)]
pub struct LayerMetrics {
    network_loads: AtomicU64,
    store_substitutions: AtomicU64,
    ancestor_substitutions: AtomicU64,
    exhausted: AtomicU64,
    invalid: AtomicU64,
    cancelled: AtomicU64,
    fetch_failures: AtomicU64,
    saves_queued: AtomicU64,
}

impl LayerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network_loaded(&self) {
        self.network_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn store_substituted(&self) {
        self.store_substitutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ancestor_substituted(&self) {
        self.ancestor_substitutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn chain_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn invalid_tile(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub fn load_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// A network fetch (original or ancestor) failed or did not decode.
    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn save_queued(&self) {
        self.saves_queued.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> LayerStatsSnapshot {
        LayerStatsSnapshot {
            network_loads: self.network_loads.load(Ordering::Relaxed),
            store_substitutions: self.store_substitutions.load(Ordering::Relaxed),
            ancestor_substitutions: self.ancestor_substitutions.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            saves_queued: self.saves_queued.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LayerMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerStatsSnapshot {
    pub network_loads: u64,
    pub store_substitutions: u64,
    pub ancestor_substitutions: u64,
    pub exhausted: u64,
    pub invalid: u64,
    pub cancelled: u64,
    pub fetch_failures: u64,
    pub saves_queued: u64,
}

impl LayerStatsSnapshot {
    /// Tiles that ended up displayed by any means.
    pub fn displayed(&self) -> u64 {
        self.network_loads + self.store_substitutions + self.ancestor_substitutions
    }
}

impl fmt::Display for LayerStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "network={} offline={} ancestor={} exhausted={} invalid={} cancelled={} fetch_failures={} saves_queued={}",
            self.network_loads,
            self.store_substitutions,
            self.ancestor_substitutions,
            self.exhausted,
            self.invalid,
            self.cancelled,
            self.fetch_failures,
            self.saves_queued
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let metrics = LayerMetrics::new();
        metrics.network_loaded();
        metrics.network_loaded();
        metrics.ancestor_substituted();
        metrics.fetch_failed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.network_loads, 2);
        assert_eq!(snapshot.ancestor_substitutions, 1);
        assert_eq!(snapshot.fetch_failures, 1);
        assert_eq!(snapshot.displayed(), 3);
    }

    #[test]
    fn test_display() {
        let snapshot = LayerStatsSnapshot {
            invalid: 3,
            ..Default::default()
        };
        assert!(snapshot.to_string().contains("invalid=3"));
    }
}
