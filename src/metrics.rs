//! Import counters.
//!
//! Lock-free counters covering the whole life of the process. Relaxed
//! ordering is enough, readers only ever want a point-in-time snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    statements_downloaded: AtomicU64,
    accounts_discovered: AtomicU64,
    transactions_imported: AtomicU64,
    transfers_imported: AtomicU64,
    sync_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statement_downloaded(&self) {
        self.statements_downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn account_discovered(&self) {
        self.accounts_discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// One transaction landed downstream together with its transfers.
    pub fn transaction_imported(&self, transfers: u64) {
        self.transactions_imported.fetch_add(1, Ordering::Relaxed);
        self.transfers_imported.fetch_add(transfers, Ordering::Relaxed);
    }

    pub fn sync_failed(&self) {
        self.sync_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            statements_downloaded: self.statements_downloaded.load(Ordering::Relaxed),
            accounts_discovered: self.accounts_discovered.load(Ordering::Relaxed),
            transactions_imported: self.transactions_imported.load(Ordering::Relaxed),
            transfers_imported: self.transfers_imported.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub statements_downloaded: u64,
    pub accounts_discovered: u64,
    pub transactions_imported: u64,
    pub transfers_imported: u64,
    pub sync_failures: u64,
}

// ============================================================
// Tests
// ============================================================
