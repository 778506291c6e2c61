//! Lock-free counters for capture and forwarding activity.
//!
//! Written from the polling loop, readable from anywhere (status logging,
//! a second core). Relaxed ordering is enough: each counter is independent.

use core::sync::atomic::{AtomicU32, Ordering};

/// Snapshot of [`Stats`] at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub captured: u32,
    pub duplicates: u32,
    pub abandoned: u32,
    pub parity_warnings: u32,
    pub evicted: u32,
    pub rejected: u32,
    pub transmitted: u32,
    pub sink_errors: u32,
}

pub struct Stats {
    captured: AtomicU32,
    duplicates: AtomicU32,
    abandoned: AtomicU32,
    parity_warnings: AtomicU32,
    evicted: AtomicU32,
    rejected: AtomicU32,
    transmitted: AtomicU32,
    sink_errors: AtomicU32,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            captured: AtomicU32::new(0),
            duplicates: AtomicU32::new(0),
            abandoned: AtomicU32::new(0),
            parity_warnings: AtomicU32::new(0),
            evicted: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
            transmitted: AtomicU32::new(0),
            sink_errors: AtomicU32::new(0),
        }
    }

    #[inline]
    fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_captured(&self) {
        Self::bump(&self.captured);
    }

    pub fn record_duplicate(&self) {
        Self::bump(&self.duplicates);
    }

    pub fn record_abandoned(&self) {
        Self::bump(&self.abandoned);
    }

    pub fn record_parity_warning(&self) {
        Self::bump(&self.parity_warnings);
    }

    pub fn record_evicted(&self) {
        Self::bump(&self.evicted);
    }

    pub fn record_rejected(&self) {
        Self::bump(&self.rejected);
    }

    pub fn record_transmitted(&self) {
        Self::bump(&self.transmitted);
    }

    pub fn record_sink_error(&self) {
        Self::bump(&self.sink_errors);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            captured: self.captured.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            parity_warnings: self.parity_warnings.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            transmitted: self.transmitted.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
