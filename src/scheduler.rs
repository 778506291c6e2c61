//! Fixed-cadence transmission of queued identifiers.
//!
//! At most one identifier leaves per interval. The interval is measured from
//! the last attempt, empty or not, so a backlog drains one entry per interval
//! and never bursts after an idle period.

use crate::output::{format_line, SinkError, TagSink};
use crate::queue::TagQueue;
use crate::wiegand::CardId;

/// What a due poll did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// Queue was empty.
    Idle,
    Sent(CardId),
    /// The sink refused the line; the identifier is dropped.
    Failed(CardId, SinkError),
}

pub struct TransmitScheduler {
    interval_us: u64,
    last_attempt_us: u64,
}

impl TransmitScheduler {
    /// First attempt becomes due one interval after time zero.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_us: interval_ms.saturating_mul(1000),
            last_attempt_us: 0,
        }
    }

    pub fn is_due(&self, now_us: u64) -> bool {
        now_us.saturating_sub(self.last_attempt_us) >= self.interval_us
    }

    /// Returns `None` when no attempt is due yet.
    pub fn poll<const N: usize, S: TagSink>(
        &mut self,
        now_us: u64,
        queue: &TagQueue<N>,
        sink: &mut S,
    ) -> Option<Attempt> {
        if !self.is_due(now_us) {
            return None;
        }
        self.last_attempt_us = now_us;

        let id = match queue.pop() {
            Some(id) => id,
            None => return Some(Attempt::Idle),
        };

        let line = format_line(id);
        match sink.write_line(line.as_bytes()) {
            Ok(()) => Some(Attempt::Sent(id)),
            Err(e) => Some(Attempt::Failed(id, e)),
        }
    }

    pub fn last_attempt_us(&self) -> u64 {
        self.last_attempt_us
    }
}
