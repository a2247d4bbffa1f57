//! Virtual clock and timer queue.

use alloc::collections::BTreeMap;
use domwatch_core::{TimerCallback, TimerId};

/// Timers keyed by scheduling order; fired by (deadline, order).
pub(crate) struct TimerQueue {
    now: u64,
    next_seq: u64,
    timers: BTreeMap<u64, (u64, TimerCallback)>,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            now: 0,
            next_seq: 1,
            timers: BTreeMap::new(),
        }
    }

    #[inline]
    pub(crate) fn now(&self) -> u64 {
        self.now
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn schedule(&mut self, delay_ms: u32, callback: TimerCallback) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers
            .insert(seq, (self.now + u64::from(delay_ms), callback));
        TimerId(seq)
    }

    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id.0).is_some()
    }

    /// Removes the earliest timer due at or before `until` and moves the
    /// clock to its deadline.
    pub(crate) fn pop_due(&mut self, until: u64) -> Option<TimerCallback> {
        let seq = self
            .timers
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= until)
            .min_by_key(|(seq, (deadline, _))| (*deadline, **seq))
            .map(|(seq, _)| *seq)?;
        let (deadline, callback) = self.timers.remove(&seq)?;
        self.now = self.now.max(deadline);
        Some(callback)
    }

    pub(crate) fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }
}
