//! Non-blocking LED feedback.
//!
//! Events map to pulse patterns that are played back from the polling loop.
//! `poll` only toggles the pin when a phase has expired, so feedback never
//! delays bit capture the way a busy-wait blink would.

use embedded_hal::digital::OutputPin;
use heapless::Deque;

use crate::events::{Event, EventSink};

/// Patterns waiting behind the one currently playing.
pub const MAX_PENDING_PATTERNS: usize = 4;

// LED stays dark this long after a pattern so consecutive ones stay distinct
const PATTERN_GAP_MS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pattern {
    pub pulses: u8,
    pub on_ms: u64,
    pub off_ms: u64,
}

impl Pattern {
    pub const CAPTURED: Pattern = Pattern { pulses: 1, on_ms: 60, off_ms: 60 };
    pub const TRANSMITTED: Pattern = Pattern { pulses: 2, on_ms: 60, off_ms: 60 };
    pub const ERROR: Pattern = Pattern { pulses: 3, on_ms: 70, off_ms: 70 };

    pub fn for_event(event: &Event) -> Pattern {
        match event {
            Event::Captured(_) => Self::CAPTURED,
            Event::Transmitted(_) => Self::TRANSMITTED,
            Event::CaptureError { .. } | Event::QueueOverflow { .. } => Self::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    On { until_us: u64, remaining: u8, pattern: Pattern },
    Off { until_us: u64, remaining: u8, pattern: Pattern },
}

pub struct Indicator<P: OutputPin> {
    pin: P,
    phase: Phase,
    pending: Deque<Pattern, MAX_PENDING_PATTERNS>,
}

impl<P: OutputPin> Indicator<P> {
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self {
            pin,
            phase: Phase::Idle,
            pending: Deque::new(),
        }
    }

    /// Queue a pattern. Dropped if too many are already waiting.
    pub fn play(&mut self, pattern: Pattern) {
        if self.pending.push_back(pattern).is_err() {
            log::debug!("indicator: pattern queue full, dropping");
        }
    }

    /// Advance the current pattern. Call every loop iteration.
    pub fn poll(&mut self, now_us: u64) {
        match self.phase {
            Phase::Idle => {
                if let Some(pattern) = self.pending.pop_front() {
                    let remaining = pattern.pulses.saturating_sub(1);
                    self.start_pulse(now_us, pattern, remaining);
                }
            }
            Phase::On { until_us, remaining, pattern } if now_us >= until_us => {
                let _ = self.pin.set_low();
                let off_ms = if remaining > 0 { pattern.off_ms } else { PATTERN_GAP_MS };
                self.phase = Phase::Off {
                    until_us: now_us + off_ms * 1000,
                    remaining,
                    pattern,
                };
            }
            Phase::Off { until_us, remaining, pattern } if now_us >= until_us => {
                if remaining > 0 {
                    self.start_pulse(now_us, pattern, remaining - 1);
                } else {
                    self.phase = Phase::Idle;
                }
            }
            _ => {}
        }
    }

    fn start_pulse(&mut self, now_us: u64, pattern: Pattern, remaining: u8) {
        let _ = self.pin.set_high();
        self.phase = Phase::On {
            until_us: now_us + pattern.on_ms * 1000,
            remaining,
            pattern,
        };
    }

    /// True while a pattern is playing or waiting.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle || !self.pending.is_empty()
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn into_pin(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> EventSink for Indicator<P> {
    fn emit(&mut self, event: Event) {
        self.play(Pattern::for_event(&event));
    }
}
