//! Fixed-capacity FIFO of card identifiers awaiting transmission.
//!
//! Storage is `N` slots; the usable capacity is set at runtime (at most `N`).
//! An explicit occupancy count lets every slot be used, so head == tail means
//! either empty or full depending on the count.

use core::cell::RefCell;
use core::fmt;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::{ConfigError, OverflowPolicy};
use crate::wiegand::CardId;

/// Push refused under [`OverflowPolicy::Reject`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueFull(pub CardId);

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag queue full, card {} rejected", self.0)
    }
}

/// Successful push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pushed {
    Stored,
    /// Queue was full; the oldest entry was evicted to make room.
    Evicted(CardId),
}

struct TagQueueInner<const N: usize> {
    slots: [CardId; N],
    head: usize, // next write position
    tail: usize, // next read position
    count: usize,
    capacity: usize,
    policy: OverflowPolicy,
}

impl<const N: usize> TagQueueInner<N> {
    const fn new(policy: OverflowPolicy) -> Self {
        Self {
            slots: [CardId(0); N],
            head: 0,
            tail: 0,
            count: 0,
            capacity: N,
            policy,
        }
    }

    fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    fn push(&mut self, id: CardId) -> Result<Pushed, QueueFull> {
        let mut outcome = Pushed::Stored;

        if self.is_full() {
            match self.policy {
                OverflowPolicy::Reject => return Err(QueueFull(id)),
                OverflowPolicy::DropOldest => {
                    // Advance tail to discard the oldest entry
                    outcome = Pushed::Evicted(self.slots[self.tail]);
                    self.tail = (self.tail + 1) % self.capacity;
                    self.count -= 1;
                }
            }
        }

        self.slots[self.head] = id;
        self.head = (self.head + 1) % self.capacity;
        self.count += 1;
        Ok(outcome)
    }

    fn pop(&mut self) -> Option<CardId> {
        if self.count == 0 {
            return None;
        }
        let id = self.slots[self.tail];
        self.tail = (self.tail + 1) % self.capacity;
        self.count -= 1;
        Some(id)
    }

    fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}

/// Critical-section guarded tag queue.
///
/// Every operation runs under one lock, so a producer and a consumer in
/// different contexts never observe a half-applied push or pop.
pub struct TagQueue<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<TagQueueInner<N>>>,
}

impl<const N: usize> TagQueue<N> {
    /// Empty queue using all `N` slots.
    pub const fn new(policy: OverflowPolicy) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(TagQueueInner::new(policy))),
        }
    }

    /// Empty queue limited to `capacity` slots.
    pub fn with_capacity(capacity: usize, policy: OverflowPolicy) -> Result<Self, ConfigError> {
        let queue = Self::new(policy);
        queue.configure(capacity, policy)?;
        Ok(queue)
    }

    /// Change capacity and policy. Discards anything queued.
    pub fn configure(&self, capacity: usize, policy: OverflowPolicy) -> Result<(), ConfigError> {
        if capacity == 0 || capacity > N {
            return Err(ConfigError::InvalidQueueCapacity(capacity));
        }
        self.inner.lock(|inner| {
            let mut guard = inner.borrow_mut();
            guard.clear();
            guard.capacity = capacity;
            guard.policy = policy;
        });
        Ok(())
    }

    pub fn push(&self, id: CardId) -> Result<Pushed, QueueFull> {
        self.inner.lock(|inner| inner.borrow_mut().push(id))
    }

    pub fn pop(&self) -> Option<CardId> {
        self.inner.lock(|inner| inner.borrow_mut().pop())
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().count)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.inner.lock(|inner| inner.borrow().is_full())
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().capacity)
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.inner.lock(|inner| inner.borrow().policy)
    }

    pub fn clear(&self) {
        self.inner.lock(|inner| inner.borrow_mut().clear());
    }
}
