//! Deferred events keyed by simulation time.
//!
//! Entries fire in order of fire time, then insertion order. Cancelled
//! entries stay in the heap and are skipped when they surface.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};

/// Handle for cancelling a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Entry<E> {
    fire_at: f32,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .total_cmp(&other.fire_at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Priority queue of events waiting for a fire time.
#[derive(Debug)]
pub struct TimedEventQueue<E> {
    heap: BinaryHeap<Reverse<Entry<E>>>,
    pending: HashSet<u64>,
    next_seq: u64,
}

impl<E> Default for TimedEventQueue<E> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashSet::new(),
            next_seq: 0,
        }
    }
}

impl<E> TimedEventQueue<E> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `fire_at`.
    pub fn schedule(&mut self, fire_at: f32, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(seq);
        self.heap.push(Reverse(Entry { fire_at, seq, event }));
        TimerHandle(seq)
    }

    /// Cancel a scheduled event. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle.0)
    }

    /// Remove and return every live event due at or before `now`.
    pub fn drain_due(&mut self, now: f32) -> Vec<E> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|Reverse(entry)| entry.fire_at <= now) {
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            if self.pending.remove(&entry.seq) {
                due.push(entry.event);
            }
        }
        due
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }

    /// Number of live events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
