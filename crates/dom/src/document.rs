//! In-memory document with DOM-style mutation recording.
//!
//! Edits apply immediately and queue records on every interested watch.
//! Records are delivered later, by `flush()` (the microtask checkpoint) or
//! while advancing the virtual clock, never from inside the edit itself.

use crate::timer::TimerQueue;
use crate::tree::{NodeData, NodeId, NodeKind, Tree};
use crate::watch::WatchRegistry;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use domwatch_core::{
    Error, MutationRecord, ObserveInit, Result, Selector, SelectorList, TimerId, WatchId,
};
use hashbrown::HashMap;

/// A shared handle to an in-memory document.
///
/// Cloning is cheap and every clone refers to the same document.
///
/// # Example
///
/// ```
/// use domwatch_dom::Document;
///
/// let doc = Document::with_body();
/// let body = doc.body().unwrap();
/// let list = doc.create_element("ul");
/// doc.set_attribute(list, "id", "ncsList").unwrap();
/// doc.append_child(body, list).unwrap();
///
/// assert_eq!(doc.query_selector(doc.root(), "ul#ncsList").unwrap(), Some(list));
/// ```
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

struct DocumentInner {
    tree: RefCell<Tree>,
    document_element: NodeId,
    watches: RefCell<WatchRegistry>,
    delivering: Cell<bool>,
    timers: RefCell<TimerQueue>,
    /// Parsed selector cache, keyed by selector text
    selectors: RefCell<HashMap<String, Rc<SelectorList>>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with an `<html>` element and no body yet.
    pub fn new() -> Self {
        let mut tree = Tree::new();
        let html = tree.push(NodeKind::Element {
            tag: "html".into(),
            attributes: Vec::new(),
        });
        let root = tree.document();
        tree.insert(root, html, 0);

        Self {
            inner: Rc::new(DocumentInner {
                tree: RefCell::new(tree),
                document_element: html,
                watches: RefCell::new(WatchRegistry::new()),
                delivering: Cell::new(false),
                timers: RefCell::new(TimerQueue::new()),
                selectors: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Creates a document whose `<html>` already contains a `<body>`.
    pub fn with_body() -> Self {
        let doc = Self::new();
        {
            let mut tree = doc.inner.tree.borrow_mut();
            let body = tree.push(NodeKind::Element {
                tag: "body".into(),
                attributes: Vec::new(),
            });
            tree.insert(doc.inner.document_element, body, 0);
        }
        doc
    }

    /// Returns true if both handles refer to the same document.
    #[inline]
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // ---------------------------------------------------------------------
    // Tree access
    // ---------------------------------------------------------------------

    /// The document node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.inner.tree.borrow().document()
    }

    /// The `<html>` element.
    #[inline]
    pub fn document_element(&self) -> NodeId {
        self.inner.document_element
    }

    /// The first `<body>` child of `<html>`, if attached.
    pub fn body(&self) -> Option<NodeId> {
        let tree = self.inner.tree.borrow();
        let html = self.inner.document_element;
        if tree.parent(html) != Some(tree.document()) {
            return None;
        }
        tree.children(html)
            .iter()
            .copied()
            .find(|c| tree.tag(*c) == Some("body"))
    }

    /// Lowercased tag name, or `None` for non-elements.
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.tree.borrow().tag(node).map(String::from)
    }

    /// Attribute value by name (names are case-insensitive).
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .tree
            .borrow()
            .attribute(node, &name.to_ascii_lowercase())
            .map(String::from)
    }

    /// Text content of a text node.
    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.inner.tree.borrow().get(node).ok()?.kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.tree.borrow().children(node).to_vec()
    }

    /// Returns true if `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.tree.borrow().is_inclusive_ancestor(ancestor, node)
    }

    /// Returns true if the node is an element.
    pub fn is_element(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().is_element(node)
    }

    // ---------------------------------------------------------------------
    // Node creation
    // ---------------------------------------------------------------------

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.tree.borrow_mut().push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Creates `count` detached elements with the same tag.
    pub fn create_elements(&self, tag: &str, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.create_element(tag)).collect()
    }

    /// Creates a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner
            .tree
            .borrow_mut()
            .push(NodeKind::Text(text.into()))
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Appends several nodes at once; observers see a single record.
    pub fn append_all(&self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        {
            let tree = self.inner.tree.borrow();
            for child in children {
                Self::check_insert(&tree, parent, *child)?;
            }
        }
        for child in children {
            self.detach_recorded(*child)?;
        }
        {
            let mut tree = self.inner.tree.borrow_mut();
            for child in children {
                let end = tree.children(parent).len();
                tree.insert(parent, *child, end);
            }
        }
        if !children.is_empty() {
            self.enqueue(MutationRecord::ChildList {
                target: parent,
                added: children.to_vec(),
                removed: Vec::new(),
            });
        }
        Ok(())
    }

    /// Inserts `child` before `reference`, or at the end when `None`.
    ///
    /// A node that is already attached is moved: observers see its removal
    /// from the old parent, then its addition.
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let mut reference = reference;
        {
            let tree = self.inner.tree.borrow();
            Self::check_insert(&tree, parent, child)?;
            if let Some(r) = reference {
                if tree.parent(r) != Some(parent) {
                    return Err(Error::invalid_operation(
                        "Reference node is not a child of the parent",
                    ));
                }
                if r == child {
                    let siblings = tree.children(parent);
                    let position = siblings.iter().position(|c| *c == child);
                    reference = position.and_then(|p| siblings.get(p + 1).copied());
                }
            }
        }

        self.detach_recorded(child)?;
        {
            let mut tree = self.inner.tree.borrow_mut();
            let index = match reference {
                Some(r) => tree
                    .children(parent)
                    .iter()
                    .position(|c| *c == r)
                    .unwrap_or(usize::MAX),
                None => usize::MAX,
            };
            tree.insert(parent, child, index);
        }
        self.enqueue(MutationRecord::ChildList {
            target: parent,
            added: alloc::vec![child],
            removed: Vec::new(),
        });
        Ok(())
    }

    /// Detaches a node from its parent. No-op for detached nodes.
    pub fn remove(&self, node: NodeId) -> Result<()> {
        self.inner.tree.borrow().get(node)?;
        self.detach_recorded(node)
    }

    /// Sets an attribute, recording the previous value.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old_value = {
            let mut tree = self.inner.tree.borrow_mut();
            match &mut tree.get_mut(node)?.kind {
                NodeKind::Element { attributes, .. } => {
                    match attributes.iter_mut().find(|(n, _)| *n == name) {
                        Some((_, v)) => Some(core::mem::replace(v, value.into())),
                        None => {
                            attributes.push((name.clone(), value.into()));
                            None
                        }
                    }
                }
                _ => return Err(Error::invalid_operation("Attributes require an element")),
            }
        };
        self.enqueue(MutationRecord::Attributes {
            target: node,
            name,
            old_value,
        });
        Ok(())
    }

    /// Removes an attribute. Removing an absent attribute records nothing.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let old_value = {
            let mut tree = self.inner.tree.borrow_mut();
            match &mut tree.get_mut(node)?.kind {
                NodeKind::Element { attributes, .. } => {
                    let position = attributes.iter().position(|(n, _)| *n == name);
                    position.map(|p| attributes.remove(p).1)
                }
                _ => return Err(Error::invalid_operation("Attributes require an element")),
            }
        };
        if old_value.is_some() {
            self.enqueue(MutationRecord::Attributes {
                target: node,
                name,
                old_value,
            });
        }
        Ok(())
    }

    fn check_insert(tree: &Tree, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_data: &NodeData = tree.get(parent)?;
        if matches!(parent_data.kind, NodeKind::Text(_)) {
            return Err(Error::invalid_operation("Text nodes cannot have children"));
        }
        if matches!(tree.get(child)?.kind, NodeKind::Document) {
            return Err(Error::invalid_operation("The document cannot be inserted"));
        }
        if tree.is_inclusive_ancestor(child, parent) {
            return Err(Error::invalid_operation(
                "A node cannot be inserted into itself or its descendants",
            ));
        }
        Ok(())
    }

    fn detach_recorded(&self, node: NodeId) -> Result<()> {
        let former_parent = self.inner.tree.borrow_mut().detach(node);
        if let Some(parent) = former_parent {
            self.enqueue(MutationRecord::ChildList {
                target: parent,
                added: Vec::new(),
                removed: alloc::vec![node],
            });
        }
        Ok(())
    }

    fn enqueue(&self, record: MutationRecord<NodeId>) {
        let tree = self.inner.tree.borrow();
        self.inner.watches.borrow_mut().enqueue(&tree, &record);
    }

    // ---------------------------------------------------------------------
    // Selectors
    // ---------------------------------------------------------------------

    /// Parses (or fetches from cache) a selector list.
    pub(crate) fn selector_list(&self, selector: &Selector) -> Result<Rc<SelectorList>> {
        if let Some(list) = self.inner.selectors.borrow().get(selector.as_str()) {
            return Ok(list.clone());
        }
        let list = Rc::new(selector.parse()?);
        self.inner
            .selectors
            .borrow_mut()
            .insert(String::from(selector.as_str()), list.clone());
        Ok(list)
    }

    pub(crate) fn matches_parsed(&self, node: NodeId, list: &SelectorList) -> bool {
        self.inner.tree.borrow().matches(node, list)
    }

    pub(crate) fn query_parsed(&self, scope: NodeId, list: &SelectorList, first: bool) -> Vec<NodeId> {
        let tree = self.inner.tree.borrow();
        let mut found = Vec::new();
        for id in tree.descendants(scope) {
            if tree.matches(id, list) {
                found.push(id);
                if first {
                    break;
                }
            }
        }
        found
    }

    /// Returns true if the element matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        let list = self.selector_list(&Selector::new(selector)?)?;
        Ok(self.matches_parsed(node, &list))
    }

    /// First matching descendant of `scope`, in document order.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let list = self.selector_list(&Selector::new(selector)?)?;
        Ok(self.query_parsed(scope, &list, true).into_iter().next())
    }

    /// Every matching descendant of `scope`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let list = self.selector_list(&Selector::new(selector)?)?;
        Ok(self.query_parsed(scope, &list, false))
    }

    // ---------------------------------------------------------------------
    // Watches and delivery
    // ---------------------------------------------------------------------

    /// Starts a watch; records are delivered on `flush()`.
    pub fn observe<F>(&self, target: NodeId, init: ObserveInit, callback: F) -> WatchId
    where
        F: FnMut(&[MutationRecord<NodeId>]) + 'static,
    {
        self.observe_boxed(target, init, Box::new(callback))
    }

    pub(crate) fn observe_boxed(
        &self,
        target: NodeId,
        init: ObserveInit,
        callback: domwatch_core::BatchCallback<NodeId>,
    ) -> WatchId {
        let id = self.inner.watches.borrow_mut().observe(target, init, callback);
        tracing::trace!(watch = id.0, target = target.index(), "watch attached");
        id
    }

    /// Stops a watch and discards its undelivered records.
    pub fn disconnect(&self, watch: WatchId) {
        if self.inner.watches.borrow_mut().disconnect(watch) {
            tracing::trace!(watch = watch.0, "watch detached");
        }
    }

    /// Number of active watches.
    pub fn watch_count(&self) -> usize {
        self.inner.watches.borrow().len()
    }

    /// Delivers pending records, one batch per watch in creation order.
    ///
    /// Repeats while callbacks queue new records. Watches disconnected
    /// during a round are skipped. Calls made from inside a callback return
    /// immediately; the outer call picks their records up.
    pub fn flush(&self) {
        if self.inner.delivering.replace(true) {
            return;
        }
        let _guard = DeliveryGuard(&self.inner.delivering);

        loop {
            let pending = self.inner.watches.borrow().pending();
            if pending.is_empty() {
                break;
            }
            for id in pending {
                let batch = self.inner.watches.borrow_mut().take_batch(id);
                if let Some((callback, records)) = batch {
                    tracing::trace!(watch = id.0, records = records.len(), "delivering batch");
                    (callback.borrow_mut())(&records);
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------------

    /// Schedules `callback` to run `delay_ms` after the current virtual time.
    pub fn set_timeout<F>(&self, delay_ms: u32, callback: F) -> TimerId
    where
        F: FnOnce() + 'static,
    {
        self.inner
            .timers
            .borrow_mut()
            .schedule(delay_ms, Box::new(callback))
    }

    pub(crate) fn set_timeout_boxed(
        &self,
        delay_ms: u32,
        callback: domwatch_core::TimerCallback,
    ) -> TimerId {
        self.inner.timers.borrow_mut().schedule(delay_ms, callback)
    }

    /// Cancels a pending timer.
    pub fn clear_timeout(&self, timer: TimerId) {
        self.inner.timers.borrow_mut().cancel(timer);
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.inner.timers.borrow().now()
    }

    /// Number of timers not yet fired or cleared.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    /// Moves the virtual clock forward by `ms`.
    ///
    /// Pending records are flushed first, then every timer due within the
    /// window fires in deadline order, each followed by a flush.
    pub fn advance(&self, ms: u64) {
        let until = self.now() + ms;
        self.flush();
        loop {
            let due = self.inner.timers.borrow_mut().pop_due(until);
            match due {
                Some(callback) => {
                    callback();
                    self.flush();
                }
                None => break,
            }
        }
        self.inner.timers.borrow_mut().set_now(until);
    }
}

struct DeliveryGuard<'a>(&'a Cell<bool>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    type Log = Rc<RefCell<Vec<MutationRecord<NodeId>>>>;

    fn record_into(doc: &Document, target: NodeId, init: ObserveInit) -> (WatchId, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let id = doc.observe(target, init, move |records| {
            sink.borrow_mut().extend_from_slice(records)
        });
        (id, log)
    }

    #[test]
    fn test_new_document_has_no_body() {
        let doc = Document::new();
        assert_eq!(doc.body(), None);
        assert_eq!(doc.tag_name(doc.document_element()).as_deref(), Some("html"));
        assert_eq!(doc.parent(doc.document_element()), Some(doc.root()));

        let doc = Document::with_body();
        let body = doc.body().unwrap();
        assert_eq!(doc.tag_name(body).as_deref(), Some("body"));
    }

    #[test]
    fn test_records_are_deferred_until_flush() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let (_, log) = record_into(&doc, body, ObserveInit::everything());

        let div = doc.create_element("DIV");
        doc.append_child(body, div).unwrap();
        assert!(log.borrow().is_empty());

        doc.flush();
        assert_eq!(
            *log.borrow(),
            vec![MutationRecord::ChildList {
                target: body,
                added: vec![div],
                removed: vec![],
            }]
        );
    }

    #[test]
    fn test_subtree_scope() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(body, outer).unwrap();

        let (_, shallow) = record_into(
            &doc,
            body,
            ObserveInit {
                child_list: true,
                ..ObserveInit::default()
            },
        );
        let (_, deep) = record_into(&doc, body, ObserveInit::child_list_subtree());

        doc.append_child(outer, inner).unwrap();
        doc.flush();

        assert!(shallow.borrow().is_empty());
        assert_eq!(deep.borrow().len(), 1);
    }

    #[test]
    fn test_move_records_remove_then_add() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let [a, b, item] = [
            doc.create_element("div"),
            doc.create_element("div"),
            doc.create_element("p"),
        ];
        doc.append_all(body, &[a, b]).unwrap();
        doc.append_child(a, item).unwrap();
        let (_, log) = record_into(&doc, body, ObserveInit::child_list_subtree());

        doc.append_child(b, item).unwrap();
        doc.flush();

        assert_eq!(
            *log.borrow(),
            vec![
                MutationRecord::ChildList {
                    target: a,
                    added: vec![],
                    removed: vec![item],
                },
                MutationRecord::ChildList {
                    target: b,
                    added: vec![item],
                    removed: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_attribute_old_values() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let (_, with_old) = record_into(&doc, body, ObserveInit::everything());
        let (_, without_old) = record_into(
            &doc,
            body,
            ObserveInit {
                attributes: true,
                ..ObserveInit::default()
            },
        );

        doc.set_attribute(body, "class", "a").unwrap();
        doc.set_attribute(body, "Class", "b").unwrap();
        doc.remove_attribute(body, "class").unwrap();
        doc.remove_attribute(body, "class").unwrap();
        doc.flush();

        let olds: Vec<Option<String>> = with_old
            .borrow()
            .iter()
            .map(|r| match r {
                MutationRecord::Attributes { old_value, .. } => old_value.clone(),
                _ => panic!("unexpected record"),
            })
            .collect();
        assert_eq!(olds, vec![None, Some("a".into()), Some("b".into())]);
        assert!(without_old.borrow().iter().all(|r| matches!(
            r,
            MutationRecord::Attributes {
                old_value: None,
                ..
            }
        )));
        assert_eq!(doc.attribute(body, "class"), None);
    }

    #[test]
    fn test_disconnect_drops_pending() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let (id, log) = record_into(&doc, body, ObserveInit::everything());

        doc.set_attribute(body, "id", "x").unwrap();
        doc.disconnect(id);
        doc.flush();

        assert!(log.borrow().is_empty());
        assert_eq!(doc.watch_count(), 0);
    }

    #[test]
    fn test_callback_disconnecting_later_watch() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let (second, log) = {
            let victim: Rc<Cell<Option<WatchId>>> = Rc::new(Cell::new(None));
            let victim_c = victim.clone();
            let doc_c = doc.clone();
            doc.observe(body, ObserveInit::everything(), move |_| {
                if let Some(id) = victim_c.get() {
                    doc_c.disconnect(id);
                }
            });
            let (id, log) = record_into(&doc, body, ObserveInit::everything());
            victim.set(Some(id));
            (id, log)
        };

        doc.set_attribute(body, "id", "x").unwrap();
        doc.flush();

        assert!(log.borrow().is_empty());
        doc.disconnect(second);
    }

    #[test]
    fn test_records_queued_by_callbacks_are_delivered() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let (_, log) = record_into(&doc, body, ObserveInit::child_list_subtree());
        let doc_c = doc.clone();
        let once = Cell::new(false);
        doc.observe(body, ObserveInit::child_list_subtree(), move |_| {
            if !once.replace(true) {
                let p = doc_c.create_element("p");
                doc_c.append_child(doc_c.body().unwrap(), p).unwrap();
                doc_c.flush();
            }
        });

        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.flush();

        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_invalid_edits() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let text = doc.create_text("hello");
        let div = doc.create_element("div");

        assert!(doc.append_child(text, div).is_err());
        assert!(doc.append_child(body, doc.root()).is_err());
        assert!(doc.append_child(body, body).is_err());
        assert!(doc.append_child(body, doc.document_element()).is_err());
        assert!(doc.set_attribute(text, "id", "x").is_err());
        assert!(doc.insert_before(body, div, Some(text)).is_err());
        assert_eq!(doc.text(text).as_deref(), Some("hello"));
    }

    #[test]
    fn test_insert_before_ordering() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let [a, b, c] = [
            doc.create_element("a"),
            doc.create_element("b"),
            doc.create_element("c"),
        ];
        doc.append_child(body, a).unwrap();
        doc.append_child(body, c).unwrap();
        doc.insert_before(body, b, Some(c)).unwrap();
        assert_eq!(doc.children(body), vec![a, b, c]);

        doc.insert_before(body, b, Some(b)).unwrap();
        assert_eq!(doc.children(body), vec![a, b, c]);
    }

    #[test]
    fn test_selector_queries() {
        let doc = Document::with_body();
        let body = doc.body().unwrap();
        let items = doc.create_elements("li", 3);
        let list = doc.create_element("ul");
        doc.append_child(body, list).unwrap();
        doc.append_all(list, &items).unwrap();
        doc.set_attribute(items[1], "class", "active").unwrap();

        assert_eq!(doc.query_selector_all(doc.root(), "ul > li").unwrap(), items);
        assert_eq!(
            doc.query_selector(doc.root(), "li.active").unwrap(),
            Some(items[1])
        );
        assert!(doc.matches(items[2], "li.active ~ li").unwrap());
        assert!(doc.matches(list, " ").is_err());
        assert!(doc.query_selector(body, "li[").is_err());
        // the scope itself is not a candidate
        assert_eq!(doc.query_selector(list, "ul").unwrap(), None);
    }

    #[test]
    fn test_timers_advance() {
        let doc = Document::with_body();
        let fired = Rc::new(RefCell::new(Vec::new()));
        for delay in [20u32, 5] {
            let fired = fired.clone();
            let doc_c = doc.clone();
            doc.set_timeout(delay, move || fired.borrow_mut().push(doc_c.now()));
        }
        let cleared = doc.set_timeout(10, || panic!("cleared timer fired"));
        doc.clear_timeout(cleared);

        doc.advance(15);
        assert_eq!(*fired.borrow(), vec![5]);
        assert_eq!(doc.now(), 15);

        doc.advance(100);
        assert_eq!(*fired.borrow(), vec![5, 20]);
        assert_eq!(doc.pending_timers(), 0);
    }
}
