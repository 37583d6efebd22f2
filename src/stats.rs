//! Per-interface transfer counters.
//!
//! Updated from both caller and completion context, so everything is a
//! relaxed atomic. Counters only grow; history is kept for diagnostics.

use core::sync::atomic::{AtomicU32, Ordering};

/// Lock-free transfer statistics.
pub struct TransferStats {
    /// Transfers that got past the guard and reached the transport.
    started: AtomicU32,

    /// Transfers that completed successfully.
    completed: AtomicU32,

    /// Transfers the transport reported as failed (sync or async).
    failed: AtomicU32,

    /// Requests refused before reaching the transport
    /// (in progress, overflow, underflow).
    rejected: AtomicU32,

    /// Completions that arrived with nothing outstanding.
    spurious: AtomicU32,
}

impl TransferStats {
    /// Create zeroed counters.
    pub const fn new() -> Self {
        Self {
            started: AtomicU32::new(0),
            completed: AtomicU32::new(0),
            failed: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
            spurious: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_spurious(&self) {
        self.spurious.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    #[inline]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            spurious: self.spurious.load(Ordering::Relaxed),
        }
    }
}

impl Default for TransferStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transfer statistics at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub started: u32,
    pub completed: u32,
    pub failed: u32,
    pub rejected: u32,
    pub spurious: u32,
}

impl StatsSnapshot {
    /// Transfers started but not yet completed or failed.
    pub fn outstanding(&self) -> u32 {
        self.started
            .saturating_sub(self.completed)
            .saturating_sub(self.failed)
    }
}
