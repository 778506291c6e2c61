//! Dead-time edge filter shared by both Wiegand lines.
//!
//! Lives in the interrupt handler, so all state is lock-free. `portable_atomic`
//! provides the 64-bit atomics that the ESP32 lacks natively.

use core::sync::atomic::Ordering;
use portable_atomic::AtomicU64;

use crate::config::EdgeFilterMode;

// No edge accepted yet
const NEVER: u64 = u64::MAX;
// Stored dead time meaning "filter disabled"
const DISABLED: u64 = 0;

pub struct EdgeFilter {
    dead_time_us: AtomicU64,
    last_edge_us: AtomicU64,
}

impl EdgeFilter {
    /// A filter that accepts everything until configured.
    pub const fn new() -> Self {
        Self {
            dead_time_us: AtomicU64::new(DISABLED),
            last_edge_us: AtomicU64::new(NEVER),
        }
    }

    pub fn configure(&self, mode: EdgeFilterMode) {
        let dead_time = match mode {
            EdgeFilterMode::Disabled => DISABLED,
            EdgeFilterMode::DeadTime { dead_time_us } => dead_time_us,
        };
        self.dead_time_us.store(dead_time, Ordering::Relaxed);
        self.last_edge_us.store(NEVER, Ordering::Release);
    }

    pub fn mode(&self) -> EdgeFilterMode {
        match self.dead_time_us.load(Ordering::Relaxed) {
            DISABLED => EdgeFilterMode::Disabled,
            dead_time_us => EdgeFilterMode::DeadTime { dead_time_us },
        }
    }

    /// Decide whether an edge at `now_us` is a real bit.
    ///
    /// Accepted when at least the dead time has passed since the last accepted
    /// edge on either line. Rejected edges leave the clock untouched.
    pub fn accept(&self, now_us: u64) -> bool {
        let dead_time = self.dead_time_us.load(Ordering::Relaxed);
        if dead_time == DISABLED {
            return true;
        }

        let last = self.last_edge_us.load(Ordering::Acquire);
        if last != NEVER && now_us.saturating_sub(last) < dead_time {
            return false;
        }

        // Both lines share one priority level, but a lost CAS still means
        // another edge was just accepted inside our dead time.
        self.last_edge_us
            .compare_exchange(last, now_us, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self::new()
    }
}
