//! Interrupt-side bit capture and frame assembly.
//!
//! The interrupt handler calls [`WiegandCapture::on_edge`] for every falling
//! edge; the polling loop calls [`WiegandCapture::poll`] to collect finished or
//! abandoned frames. Wiegand has no end marker, so both outcomes are inferred
//! from silence on the lines.
//!
//! The frame buffer lives behind a `critical_section::Mutex`. Each poll takes a
//! single snapshot and performs any reset inside the same critical section, so
//! the count, bits and last-bit timestamp are always seen together.

use core::cell::Cell;
use critical_section::Mutex;

use crate::config::{Config, EdgeFilterMode};
use crate::filter::EdgeFilter;
use crate::wiegand::{Frame, Line, FRAME_BITS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrameBuffer {
    bits: u32,
    count: u8,
    last_bit_us: u64,
}

impl FrameBuffer {
    const EMPTY: Self = Self {
        bits: 0,
        count: 0,
        last_bit_us: 0,
    };
}

/// Silence thresholds used by [`FrameAssembler::poll`], in microseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTiming {
    pub partial_timeout_us: u64,
    pub complete_gap_us: u64,
}

impl From<&Config> for FrameTiming {
    fn from(config: &Config) -> Self {
        Self {
            partial_timeout_us: config.partial_timeout_ms.saturating_mul(1000),
            complete_gap_us: config.complete_gap_ms.saturating_mul(1000),
        }
    }
}

/// Result of a poll that changed the frame state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    /// 26 bits followed by the settle gap.
    Complete(Frame),
    /// Partial frame went stale and was discarded.
    Abandoned { bits: u8 },
}

/// What happened to a single edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Dropped by the dead-time filter.
    Filtered,
    /// Appended to the frame.
    Recorded,
    /// Frame already full; edge ignored.
    Overrun,
}

/// 26-bit frame accumulator shared between interrupt and polling context.
pub struct FrameAssembler {
    state: Mutex<Cell<FrameBuffer>>,
}

impl FrameAssembler {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(FrameBuffer::EMPTY)),
        }
    }

    /// Append one bit. Returns false once the frame already holds 26 bits.
    pub fn record_bit(&self, line: Line, now_us: u64) -> bool {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let buf = cell.get();
            if buf.count >= FRAME_BITS {
                return false;
            }
            cell.set(FrameBuffer {
                bits: (buf.bits << 1) | line.bit(),
                count: buf.count + 1,
                last_bit_us: now_us,
            });
            true
        })
    }

    /// Check the buffered frame for completion or abandonment.
    pub fn poll(&self, now_us: u64, timing: FrameTiming) -> Option<FrameEvent> {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let buf = cell.get();
            if buf.count == 0 {
                return None;
            }

            let idle = now_us.saturating_sub(buf.last_bit_us);
            if buf.count < FRAME_BITS {
                if idle > timing.partial_timeout_us {
                    cell.set(FrameBuffer::EMPTY);
                    return Some(FrameEvent::Abandoned { bits: buf.count });
                }
                return None;
            }

            if idle > timing.complete_gap_us {
                cell.set(FrameBuffer::EMPTY);
                return Some(FrameEvent::Complete(Frame::from_raw(buf.bits)));
            }
            None
        })
    }

    /// Bits currently buffered (0..=26).
    pub fn bit_count(&self) -> u8 {
        critical_section::with(|cs| self.state.borrow(cs).get().count)
    }

    pub fn reset(&self) {
        critical_section::with(|cs| self.state.borrow(cs).set(FrameBuffer::EMPTY));
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge filter and frame assembler for one reader.
///
/// Intended to live in a `static` so the GPIO handler can reach it.
pub struct WiegandCapture {
    filter: EdgeFilter,
    frame: FrameAssembler,
}

impl WiegandCapture {
    pub const fn new() -> Self {
        Self {
            filter: EdgeFilter::new(),
            frame: FrameAssembler::new(),
        }
    }

    /// Apply the edge filter mode and drop any partial frame.
    pub fn configure(&self, mode: EdgeFilterMode) {
        self.filter.configure(mode);
        self.frame.reset();
    }

    /// Interrupt entry point: one falling edge on `line` at `now_us`.
    pub fn on_edge(&self, line: Line, now_us: u64) -> EdgeOutcome {
        if !self.filter.accept(now_us) {
            return EdgeOutcome::Filtered;
        }
        if self.frame.record_bit(line, now_us) {
            EdgeOutcome::Recorded
        } else {
            EdgeOutcome::Overrun
        }
    }

    pub fn poll(&self, now_us: u64, timing: FrameTiming) -> Option<FrameEvent> {
        self.frame.poll(now_us, timing)
    }

    pub fn filter(&self) -> &EdgeFilter {
        &self.filter
    }

    pub fn assembler(&self) -> &FrameAssembler {
        &self.frame
    }
}

impl Default for WiegandCapture {
    fn default() -> Self {
        Self::new()
    }
}
