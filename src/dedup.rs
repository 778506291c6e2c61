//! Short-window duplicate suppression.
//!
//! A card held in the reader field is retransmitted several times. Repeats of
//! the last forwarded identifier inside the window collapse into one
//! presentation.

use crate::wiegand::CardId;

pub struct DuplicateSuppressor {
    window_us: u64,
    last: Option<(CardId, u64)>,
}

impl DuplicateSuppressor {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_us: window_ms.saturating_mul(1000),
            last: None,
        }
    }

    /// True if `id` repeats the last forwarded identifier within the window.
    pub fn is_duplicate(&self, id: CardId, now_us: u64) -> bool {
        match self.last {
            Some((last_id, at_us)) => {
                last_id == id && now_us.saturating_sub(at_us) < self.window_us
            }
            None => false,
        }
    }

    /// Remember `id` as forwarded. Call only once it has been enqueued.
    pub fn record(&mut self, id: CardId, now_us: u64) {
        self.last = Some((id, now_us));
    }

    pub fn last_forwarded(&self) -> Option<CardId> {
        self.last.map(|(id, _)| id)
    }
}
