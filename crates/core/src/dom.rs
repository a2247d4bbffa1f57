//! The host abstraction.
//!
//! The engine never touches a concrete tree. Everything it needs from the
//! page (matching, querying, mutation watches, timers) goes through `Dom`.

use crate::error::Result;
use crate::mutation::{MutationRecord, ObserveInit};
use crate::selector::Selector;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

/// Callback invoked with one coalesced batch of records.
pub type BatchCallback<N> = Box<dyn FnMut(&[MutationRecord<N>])>;

/// Callback invoked once when a timer expires.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Handle to an active mutation watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

/// Handle to a pending timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// A DOM-like host: tree queries, mutation watches and timers.
///
/// Implementations are cheap handles (`Clone` shares the same document).
/// All calls happen on one thread; callbacks are never invoked from inside
/// the call that caused the mutation.
pub trait Dom: Clone + 'static {
    /// Node handle. Equality and hashing must follow node identity.
    type Node: Clone + Eq + Hash + fmt::Debug + 'static;

    /// The document node.
    fn document(&self) -> Self::Node;

    /// The document body, if it exists yet.
    fn body(&self) -> Option<Self::Node>;

    /// Returns true if the node is an element (not text, not the document).
    fn is_element(&self, node: &Self::Node) -> bool;

    /// Checks selector syntax. Hosts that cannot check ahead of time accept
    /// everything and report failures as non-matches.
    fn check_selector(&self, selector: &Selector) -> Result<()> {
        let _ = selector;
        Ok(())
    }

    /// Returns true if the element itself matches.
    fn matches(&self, element: &Self::Node, selector: &Selector) -> bool;

    /// First descendant of `scope` matching `selector`, in document order.
    /// `scope` itself is not a candidate.
    fn query_selector(&self, scope: &Self::Node, selector: &Selector) -> Option<Self::Node>;

    /// Every descendant of `scope` matching `selector`, in document order.
    fn query_selector_all(&self, scope: &Self::Node, selector: &Selector) -> Vec<Self::Node>;

    /// Starts a mutation watch on `target`.
    ///
    /// Fails with `Error::InvalidOperation` when the host cannot attach the
    /// watch; nothing is registered then.
    fn observe(
        &self,
        target: &Self::Node,
        init: ObserveInit,
        callback: BatchCallback<Self::Node>,
    ) -> Result<WatchId>;

    /// Stops a watch and drops its undelivered records. Unknown ids are ignored.
    fn disconnect(&self, watch: WatchId);

    /// Schedules `callback` after `delay_ms` milliseconds.
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerId;

    /// Cancels a pending timer. Unknown or fired ids are ignored.
    fn clear_timeout(&self, timer: TimerId);
}
