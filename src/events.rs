//! Feedback events raised by the polling context.
//!
//! The core never drives indicators itself; it hands events to an
//! [`EventSink`] and returns immediately.

use crate::wiegand::CardId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A card identifier was decoded and enqueued.
    Captured(CardId),
    /// A partial frame timed out and was discarded.
    CaptureError { bits: u8 },
    /// Push hit a full queue. `lost` is the evicted entry under drop-oldest,
    /// or the new identifier under reject.
    QueueOverflow { lost: CardId },
    /// An identifier was written to the serial sink.
    Transmitted(CardId),
}

/// Receiver for feedback events. Must not block.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// Discards all events.
impl EventSink for () {
    fn emit(&mut self, _event: Event) {}
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: Event) {
        (**self).emit(event)
    }
}

/// Buffers up to `N` events; newer ones are dropped when full.
impl<const N: usize> EventSink for heapless::Vec<Event, N> {
    fn emit(&mut self, event: Event) {
        let _ = self.push(event);
    }
}
