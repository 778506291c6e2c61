//! Wiegand 26 reader to serial forwarder.
//!
//! Architecture:
//! - Interrupt context ([`capture`]): dead-time edge filter and 26-bit frame assembly
//! - Polling context ([`forwarder`]): decode, duplicate suppression, tag queue and
//!   the fixed-cadence serial scheduler
//!
//! Everything here is `no_std` and hardware-free so it runs under host tests;
//! `main.rs` wires it to ESP32 pins, UART and LED.

#![cfg_attr(not(test), no_std)]

pub mod capture;
pub mod config;
pub mod dedup;
pub mod events;
pub mod filter;
pub mod forwarder;
pub mod indicator;
pub mod output;
pub mod queue;
pub mod scheduler;
pub mod stats;
pub mod wiegand;

pub use capture::{EdgeOutcome, FrameEvent, FrameTiming, WiegandCapture};
pub use config::{
    Config, ConfigError, EdgeFilterMode, OverflowPolicy, MAX_INTERVAL_MS, MAX_QUEUE_CAPACITY,
};
pub use events::{Event, EventSink};
pub use forwarder::{Admission, Forwarder};
pub use indicator::{Indicator, Pattern};
pub use output::{format_line, SinkError, TagSink};
pub use queue::{Pushed, QueueFull, TagQueue};
pub use scheduler::{Attempt, TransmitScheduler};
pub use stats::{Stats, StatsSnapshot};
pub use wiegand::{decode_26, CardId, Frame, Line, FRAME_BITS};
