//! `Dom` implementation for the in-memory document.

use crate::document::Document;
use crate::tree::NodeId;
use alloc::vec::Vec;
use domwatch_core::{BatchCallback, Dom, ObserveInit, Result, Selector, TimerCallback, TimerId, WatchId};

impl Dom for Document {
    type Node = NodeId;

    fn document(&self) -> NodeId {
        self.root()
    }

    fn body(&self) -> Option<NodeId> {
        Document::body(self)
    }

    fn is_element(&self, node: &NodeId) -> bool {
        Document::is_element(self, *node)
    }

    fn check_selector(&self, selector: &Selector) -> Result<()> {
        self.selector_list(selector).map(|_| ())
    }

    fn matches(&self, element: &NodeId, selector: &Selector) -> bool {
        match self.selector_list(selector) {
            Ok(list) => self.matches_parsed(*element, &list),
            Err(err) => {
                tracing::warn!(selector = %selector, error = %err, "selector cannot be matched");
                false
            }
        }
    }

    fn query_selector(&self, scope: &NodeId, selector: &Selector) -> Option<NodeId> {
        match self.selector_list(selector) {
            Ok(list) => self.query_parsed(*scope, &list, true).into_iter().next(),
            Err(err) => {
                tracing::warn!(selector = %selector, error = %err, "selector cannot be queried");
                None
            }
        }
    }

    fn query_selector_all(&self, scope: &NodeId, selector: &Selector) -> Vec<NodeId> {
        match self.selector_list(selector) {
            Ok(list) => self.query_parsed(*scope, &list, false),
            Err(err) => {
                tracing::warn!(selector = %selector, error = %err, "selector cannot be queried");
                Vec::new()
            }
        }
    }

    fn observe(&self, target: &NodeId, init: ObserveInit, callback: BatchCallback<NodeId>) -> Result<WatchId> {
        Ok(self.observe_boxed(*target, init, callback))
    }

    fn disconnect(&self, watch: WatchId) {
        Document::disconnect(self, watch)
    }

    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerId {
        self.set_timeout_boxed(delay_ms, callback)
    }

    fn clear_timeout(&self, timer: TimerId) {
        Document::clear_timeout(self, timer)
    }
}
