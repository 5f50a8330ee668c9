//! Request generations: drop responses that were superseded while in flight.
//!
//! Every fetch is tagged with a [`RequestId`] issued for a slot (a page's
//! table, a picker, ...). When a response arrives it is applied only if its id
//! is still the latest issued for that slot; older responses are discarded, so
//! a slow earlier request can never overwrite a newer one.

use std::collections::HashMap;
use std::hash::Hash;

/// Monotonic request tag. Ids are unique across all slots of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct SlotState {
    latest: RequestId,
    settled: bool,
}

#[derive(Debug, Clone)]
pub struct RequestTracker<S> {
    next: u64,
    slots: HashMap<S, SlotState>,
}

impl<S> Default for RequestTracker<S> {
    fn default() -> Self {
        Self {
            next: 1,
            slots: HashMap::new(),
        }
    }
}

impl<S: Copy + Eq + Hash> RequestTracker<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new id for `slot`, superseding any request still in flight.
    pub fn issue(&mut self, slot: S) -> RequestId {
        let id = RequestId(self.next);
        self.next += 1;
        self.slots.insert(
            slot,
            SlotState {
                latest: id,
                settled: false,
            },
        );
        id
    }

    pub fn is_current(&self, slot: S, id: RequestId) -> bool {
        self.slots.get(&slot).is_some_and(|s| s.latest == id)
    }

    /// Settle `slot` if `id` is its latest request. Returns whether the
    /// response should be applied.
    pub fn accept(&mut self, slot: S, id: RequestId) -> bool {
        match self.slots.get_mut(&slot) {
            Some(state) if state.latest == id && !state.settled => {
                state.settled = true;
                true
            }
            _ => false,
        }
    }

    /// Whether the latest request for `slot` is still outstanding.
    pub fn is_pending(&self, slot: S) -> bool {
        self.slots.get(&slot).is_some_and(|s| !s.settled)
    }

    /// Whether any slot is outstanding.
    pub fn any_pending(&self) -> bool {
        self.slots.values().any(|s| !s.settled)
    }
}
