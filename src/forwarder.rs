//! Polling-context pipeline: frame completion → decode → duplicate check →
//! queue → timed transmission.
//!
//! One call to [`Forwarder::poll`] is one main-loop iteration. It never blocks;
//! the caller sleeps for the poll interval between calls.

use crate::capture::{FrameEvent, FrameTiming, WiegandCapture};
use crate::config::{Config, ConfigError};
use crate::dedup::DuplicateSuppressor;
use crate::events::{Event, EventSink};
use crate::output::TagSink;
use crate::queue::{Pushed, QueueFull, TagQueue};
use crate::scheduler::{Attempt, TransmitScheduler};
use crate::stats::Stats;
use crate::wiegand::{CardId, Frame};

/// Outcome of handing one decoded identifier to the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Enqueued,
    /// Enqueued after evicting the oldest entry.
    EnqueuedEvicting(CardId),
    Duplicate,
    Rejected,
}

pub struct Forwarder<'a, const N: usize> {
    capture: &'a WiegandCapture,
    queue: &'a TagQueue<N>,
    stats: &'a Stats,
    timing: FrameTiming,
    dedup: DuplicateSuppressor,
    scheduler: TransmitScheduler,
}

impl<'a, const N: usize> Forwarder<'a, N> {
    /// Wire the pipeline to shared capture and queue state.
    ///
    /// Applies the edge filter mode to `capture` and resizes `queue`, which
    /// discards anything already buffered in either.
    pub fn new(
        config: &Config,
        capture: &'a WiegandCapture,
        queue: &'a TagQueue<N>,
        stats: &'a Stats,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        queue.configure(config.queue_capacity, config.overflow_policy)?;
        capture.configure(config.edge_filter);

        Ok(Self {
            capture,
            queue,
            stats,
            timing: FrameTiming::from(config),
            dedup: DuplicateSuppressor::new(config.duplicate_window_ms),
            scheduler: TransmitScheduler::new(config.send_interval_ms),
        })
    }

    /// Run one polling iteration at `now_us`.
    pub fn poll<S: TagSink, E: EventSink>(&mut self, now_us: u64, sink: &mut S, events: &mut E) {
        match self.capture.poll(now_us, self.timing) {
            Some(FrameEvent::Complete(frame)) => {
                self.handle_frame(frame, now_us, events);
            }
            Some(FrameEvent::Abandoned { bits }) => {
                log::warn!("wiegand: partial frame reset ({} bits)", bits);
                self.stats.record_abandoned();
                events.emit(Event::CaptureError { bits });
            }
            None => {}
        }

        match self.scheduler.poll(now_us, self.queue, sink) {
            Some(Attempt::Sent(id)) => {
                log::info!("send: card={} ({} queued)", id, self.queue.len());
                self.stats.record_transmitted();
                events.emit(Event::Transmitted(id));
            }
            Some(Attempt::Failed(id, e)) => {
                log::warn!("send: card={} lost: {}", id, e);
                self.stats.record_sink_error();
            }
            Some(Attempt::Idle) | None => {}
        }
    }

    fn handle_frame<E: EventSink>(&mut self, frame: Frame, now_us: u64, events: &mut E) {
        let id = frame.card_id();
        log::debug!("wiegand: bin={} card={}", frame, id);
        if !frame.parity_ok() {
            log::warn!("wiegand: parity mismatch on card={}", id);
            self.stats.record_parity_warning();
        }
        self.admit(id, now_us, events);
    }

    /// Duplicate-check and enqueue a decoded identifier.
    pub fn admit<E: EventSink>(&mut self, id: CardId, now_us: u64, events: &mut E) -> Admission {
        if self.dedup.is_duplicate(id, now_us) {
            log::debug!("wiegand: duplicate card={} suppressed", id);
            self.stats.record_duplicate();
            return Admission::Duplicate;
        }

        let admission = match self.queue.push(id) {
            Ok(Pushed::Stored) => Admission::Enqueued,
            Ok(Pushed::Evicted(lost)) => {
                log::warn!("queue: full, dropped oldest card={}", lost);
                self.stats.record_evicted();
                events.emit(Event::QueueOverflow { lost });
                Admission::EnqueuedEvicting(lost)
            }
            Err(QueueFull(lost)) => {
                log::warn!("queue: full, rejected card={}", lost);
                self.stats.record_rejected();
                events.emit(Event::QueueOverflow { lost });
                return Admission::Rejected;
            }
        };

        self.dedup.record(id, now_us);
        self.stats.record_captured();
        log::info!("scan: card={}", id);
        events.emit(Event::Captured(id));
        admission
    }

    pub fn queue(&self) -> &TagQueue<N> {
        self.queue
    }

    pub fn stats(&self) -> &Stats {
        self.stats
    }
}
