//! Mutation watches and their pending record queues.

use crate::tree::{NodeId, Tree};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use domwatch_core::{BatchCallback, MutationRecord, ObserveInit, WatchId};

pub(crate) type SharedCallback = Rc<RefCell<BatchCallback<NodeId>>>;

struct Watch {
    id: WatchId,
    target: NodeId,
    init: ObserveInit,
    callback: SharedCallback,
    queue: Vec<MutationRecord<NodeId>>,
}

/// Watches in creation order, each with its own record queue.
pub(crate) struct WatchRegistry {
    watches: Vec<Watch>,
    next_id: u64,
}

impl WatchRegistry {
    pub(crate) fn new() -> Self {
        Self {
            watches: Vec::new(),
            next_id: 1,
        }
    }

    pub(crate) fn observe(
        &mut self,
        target: NodeId,
        init: ObserveInit,
        callback: BatchCallback<NodeId>,
    ) -> WatchId {
        let id = WatchId(self.next_id);
        self.next_id += 1;
        self.watches.push(Watch {
            id,
            target,
            init,
            callback: Rc::new(RefCell::new(callback)),
            queue: Vec::new(),
        });
        id
    }

    /// Removes the watch and its undelivered records.
    pub(crate) fn disconnect(&mut self, id: WatchId) -> bool {
        let before = self.watches.len();
        self.watches.retain(|w| w.id != id);
        self.watches.len() < before
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.watches.len()
    }

    /// Queues `record` on every watch interested in it.
    ///
    /// A watch is interested when its target is the record's target, or an
    /// ancestor of it and the watch covers the subtree.
    pub(crate) fn enqueue(&mut self, tree: &Tree, record: &MutationRecord<NodeId>) {
        let target = *record.target();
        for watch in &mut self.watches {
            if !watch.init.accepts(record) {
                continue;
            }
            let in_scope = watch.target == target
                || (watch.init.subtree && tree.is_inclusive_ancestor(watch.target, target));
            if !in_scope {
                continue;
            }

            let queued = match record {
                MutationRecord::Attributes { target, name, .. }
                    if !watch.init.attribute_old_value =>
                {
                    MutationRecord::Attributes {
                        target: *target,
                        name: name.clone(),
                        old_value: None,
                    }
                }
                other => other.clone(),
            };
            watch.queue.push(queued);
        }
    }

    /// Ids of watches with undelivered records, in creation order.
    pub(crate) fn pending(&self) -> Vec<WatchId> {
        self.watches
            .iter()
            .filter(|w| !w.queue.is_empty())
            .map(|w| w.id)
            .collect()
    }

    /// Drains one watch's queue. `None` if it was disconnected or is empty.
    pub(crate) fn take_batch(
        &mut self,
        id: WatchId,
    ) -> Option<(SharedCallback, Vec<MutationRecord<NodeId>>)> {
        let watch = self.watches.iter_mut().find(|w| w.id == id)?;
        if watch.queue.is_empty() {
            return None;
        }
        Some((watch.callback.clone(), core::mem::take(&mut watch.queue)))
    }
}
