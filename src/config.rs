//! Runtime configuration for capture, queueing and transmission.
//!
//! Every timing constant is a plain value passed into constructors so that
//! both edge-filter modes and both overflow policies can run in one binary.
//! `Config::get()` layers compile-time overrides from the environment on top
//! of the defaults (see build.rs).

use core::fmt;

/// Slots reserved for the tag queue. The runtime capacity may be lower.
pub const MAX_QUEUE_CAPACITY: usize = 256;

/// Largest accepted millisecond setting (about 49 days). Keeps the
/// microsecond conversions in range and fits the firmware's `u32` delay.
pub const MAX_INTERVAL_MS: u64 = u32::MAX as u64;

/// What the tag queue does when a push arrives while it is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Evict the longest-resident identifier and store the new one.
    DropOldest,
    /// Refuse the new identifier and leave the queue untouched.
    Reject,
}

/// Edge filter strategy applied in the interrupt handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeFilterMode {
    /// Every edge is accepted.
    Disabled,
    /// Edges closer than `dead_time_us` to the previous accepted edge are dropped.
    DeadTime { dead_time_us: u64 },
}

/// Configuration rejected by [`Config::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Poll interval of zero would spin the main loop.
    ZeroPollInterval,
    /// A timeout is shorter than one poll interval and could be missed.
    TimeoutBelowPollInterval { name: &'static str, value_ms: u64 },
    /// Queue capacity outside `1..=MAX_QUEUE_CAPACITY`.
    InvalidQueueCapacity(usize),
    /// Transmission cadence of zero.
    ZeroSendInterval,
    /// A millisecond setting above [`MAX_INTERVAL_MS`].
    ValueTooLarge { name: &'static str, value_ms: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroPollInterval => write!(f, "poll interval must be non-zero"),
            ConfigError::TimeoutBelowPollInterval { name, value_ms } => {
                write!(f, "{} ({} ms) is shorter than the poll interval", name, value_ms)
            }
            ConfigError::InvalidQueueCapacity(cap) => write!(
                f,
                "queue capacity {} outside 1..={}",
                cap, MAX_QUEUE_CAPACITY
            ),
            ConfigError::ZeroSendInterval => write!(f, "send interval must be non-zero"),
            ConfigError::ValueTooLarge { name, value_ms } => {
                write!(f, "{} ({} ms) exceeds {} ms", name, value_ms, MAX_INTERVAL_MS)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub edge_filter: EdgeFilterMode,
    /// Silence after an incomplete frame before it is abandoned.
    pub partial_timeout_ms: u64,
    /// Silence after bit 26 before the frame is treated as settled.
    pub complete_gap_ms: u64,
    /// Minimum spacing between transmission attempts.
    pub send_interval_ms: u64,
    /// Same identifier within this window counts as one presentation.
    pub duplicate_window_ms: u64,
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub poll_interval_ms: u64,
    /// Serial link baud rate (firmware only).
    pub baud_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edge_filter: EdgeFilterMode::DeadTime { dead_time_us: 200 },
            partial_timeout_ms: 200,
            complete_gap_ms: 20,
            send_interval_ms: 10_000,
            duplicate_window_ms: 300,
            queue_capacity: MAX_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::DropOldest,
            poll_interval_ms: 5,
            baud_rate: 9600,
        }
    }
}

impl Config {
    /// Defaults with compile-time overrides applied.
    pub fn get() -> Self {
        let mut config = Self::default();

        if let Some(s) = option_env!("WIEGAND_DEAD_TIME_US") {
            config = config.with_dead_time_us(parse_u64(s, 200));
        }
        if let Some(s) = option_env!("WIEGAND_PARTIAL_TIMEOUT_MS") {
            config.partial_timeout_ms = parse_u64(s, config.partial_timeout_ms);
        }
        if let Some(s) = option_env!("WIEGAND_COMPLETE_GAP_MS") {
            config.complete_gap_ms = parse_u64(s, config.complete_gap_ms);
        }
        if let Some(s) = option_env!("WIEGAND_SEND_INTERVAL_MS") {
            config.send_interval_ms = parse_u64(s, config.send_interval_ms);
        }
        if let Some(s) = option_env!("WIEGAND_DUPLICATE_WINDOW_MS") {
            config.duplicate_window_ms = parse_u64(s, config.duplicate_window_ms);
        }
        if let Some(s) = option_env!("WIEGAND_QUEUE_CAPACITY") {
            config.queue_capacity = parse_u64(s, config.queue_capacity as u64) as usize;
        }
        if let Some(s) = option_env!("WIEGAND_OVERFLOW_POLICY") {
            config.overflow_policy = parse_policy(s).unwrap_or(config.overflow_policy);
        }
        if let Some(s) = option_env!("WIEGAND_POLL_INTERVAL_MS") {
            config.poll_interval_ms = parse_u64(s, config.poll_interval_ms);
        }
        if let Some(s) = option_env!("WIEGAND_BAUD") {
            config.baud_rate = parse_u64(s, config.baud_rate as u64) as u32;
        }

        config
    }

    /// Set the dead time; zero disables the edge filter.
    pub fn with_dead_time_us(mut self, dead_time_us: u64) -> Self {
        self.edge_filter = if dead_time_us == 0 {
            EdgeFilterMode::Disabled
        } else {
            EdgeFilterMode::DeadTime { dead_time_us }
        };
        self
    }

    pub fn with_partial_timeout_ms(mut self, ms: u64) -> Self {
        self.partial_timeout_ms = ms;
        self
    }

    pub fn with_complete_gap_ms(mut self, ms: u64) -> Self {
        self.complete_gap_ms = ms;
        self
    }

    pub fn with_send_interval_ms(mut self, ms: u64) -> Self {
        self.send_interval_ms = ms;
        self
    }

    pub fn with_duplicate_window_ms(mut self, ms: u64) -> Self {
        self.duplicate_window_ms = ms;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Check that every timeout can be observed by the polling loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.send_interval_ms == 0 {
            return Err(ConfigError::ZeroSendInterval);
        }
        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ConfigError::InvalidQueueCapacity(self.queue_capacity));
        }

        let settings = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("partial_timeout_ms", self.partial_timeout_ms),
            ("complete_gap_ms", self.complete_gap_ms),
            ("send_interval_ms", self.send_interval_ms),
            ("duplicate_window_ms", self.duplicate_window_ms),
        ];
        for (name, value_ms) in settings {
            if value_ms > MAX_INTERVAL_MS {
                return Err(ConfigError::ValueTooLarge { name, value_ms });
            }
        }

        let timeouts = [
            ("partial_timeout_ms", self.partial_timeout_ms),
            ("complete_gap_ms", self.complete_gap_ms),
            ("send_interval_ms", self.send_interval_ms),
        ];
        for (name, value_ms) in timeouts {
            if value_ms < self.poll_interval_ms {
                return Err(ConfigError::TimeoutBelowPollInterval { name, value_ms });
            }
        }

        Ok(())
    }
}

/// Parse a decimal value, ignoring non-digit characters (const fn compatible).
/// Empty or digit-free input yields `default`.
pub const fn parse_u64(s: &str, default: u64) -> u64 {
    let bytes = s.as_bytes();
    let mut result: u64 = 0;
    let mut seen_digit = false;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if digit >= b'0' && digit <= b'9' {
            result = result.saturating_mul(10).saturating_add((digit - b'0') as u64);
            seen_digit = true;
        }
        i += 1;
    }
    if seen_digit { result } else { default }
}

/// Parse an overflow policy name (`drop-oldest` or `reject`, case-insensitive).
pub fn parse_policy(s: &str) -> Option<OverflowPolicy> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("reject") {
        Some(OverflowPolicy::Reject)
    } else if s.eq_ignore_ascii_case("drop-oldest") || s.eq_ignore_ascii_case("drop_oldest") {
        Some(OverflowPolicy::DropOldest)
    } else {
        None
    }
}
