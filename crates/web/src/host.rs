//! `Dom` implementation over `web_sys`.
//!
//! Node identity: every node handed to the engine gets a numeric key,
//! stamped lazily in a `WeakMap` so the same DOM node always maps to the
//! same `WebNode` and the map never keeps nodes alive.
//!
//! Closures: each watch owns its `MutationObserver` callback and each
//! timer owns its `setTimeout` callback. A closure released while it is
//! running (a watch disconnected from inside its own batch, a timer that
//! fired) is dropped on a later microtask instead.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::hash::{Hash, Hasher};
use domwatch_core::{
    BatchCallback, Dom, Error, MutationRecord, ObserveInit, Result, Selector, TimerCallback,
    TimerId, WatchId,
};
use hashbrown::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MutationObserver, MutationObserverInit, Node, NodeList};

/// A DOM node with a stable identity key.
#[derive(Clone)]
pub struct WebNode {
    key: u64,
    node: Node,
}

impl WebNode {
    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }
}

impl PartialEq for WebNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for WebNode {}

impl Hash for WebNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for WebNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebNode")
            .field("key", &self.key)
            .field("name", &self.node.node_name())
            .finish()
    }
}

struct Watch {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

struct Timer {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

struct WebDomInner {
    window: web_sys::Window,
    document: web_sys::Document,
    /// Node -> identity key
    keys: js_sys::WeakMap,
    next_key: Cell<u64>,
    watches: RefCell<HashMap<u64, Watch>>,
    next_watch: Cell<u64>,
    timers: RefCell<HashMap<u64, Timer>>,
    next_timer: Cell<u64>,
}

/// Browser host. Cloning shares the identity map, watches and timers.
#[derive(Clone)]
pub struct WebDom {
    inner: Rc<WebDomInner>,
}

impl WebDom {
    /// Host for the global `window`.
    pub fn from_window() -> core::result::Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Window has no document"))?;
        Ok(Self::new(window, document))
    }

    pub fn new(window: web_sys::Window, document: web_sys::Document) -> Self {
        Self {
            inner: Rc::new(WebDomInner {
                window,
                document,
                keys: js_sys::WeakMap::new(),
                next_key: Cell::new(1),
                watches: RefCell::new(HashMap::new()),
                next_watch: Cell::new(1),
                timers: RefCell::new(HashMap::new()),
                next_timer: Cell::new(1),
            }),
        }
    }

    pub fn document_ref(&self) -> &web_sys::Document {
        &self.inner.document
    }

    /// Returns the identity-keyed handle for `node`.
    pub fn wrap(&self, node: Node) -> WebNode {
        let object: &js_sys::Object = node.as_ref();
        let key = match self.inner.keys.get(object).as_f64() {
            Some(key) => key as u64,
            None => {
                let key = self.inner.next_key.get();
                self.inner.next_key.set(key + 1);
                self.inner.keys.set(object, &JsValue::from_f64(key as f64));
                key
            }
        };
        WebNode { key, node }
    }

    fn wrap_list(&self, list: &NodeList) -> Vec<WebNode> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|node| self.wrap(node))
            .collect()
    }

    fn convert_records(&self, records: &js_sys::Array) -> Vec<MutationRecord<WebNode>> {
        let mut out = Vec::with_capacity(records.length() as usize);
        for value in records.iter() {
            let record: web_sys::MutationRecord = value.unchecked_into();
            let Some(target) = record.target() else {
                continue;
            };
            let target = self.wrap(target);
            match record.type_().as_str() {
                "childList" => out.push(MutationRecord::ChildList {
                    target,
                    added: self.wrap_list(&record.added_nodes()),
                    removed: self.wrap_list(&record.removed_nodes()),
                }),
                "attributes" => out.push(MutationRecord::Attributes {
                    target,
                    name: record.attribute_name().unwrap_or_default(),
                    old_value: record.old_value(),
                }),
                // characterData is never requested
                _ => {}
            }
        }
        out
    }

    fn first_match(&self, scope: &Node, selector: &str) -> core::result::Result<Option<web_sys::Element>, JsValue> {
        if let Some(element) = scope.dyn_ref::<web_sys::Element>() {
            element.query_selector(selector)
        } else if let Some(document) = scope.dyn_ref::<web_sys::Document>() {
            document.query_selector(selector)
        } else if let Some(fragment) = scope.dyn_ref::<web_sys::DocumentFragment>() {
            fragment.query_selector(selector)
        } else {
            Ok(None)
        }
    }

    fn all_matches(&self, scope: &Node, selector: &str) -> core::result::Result<Option<NodeList>, JsValue> {
        if let Some(element) = scope.dyn_ref::<web_sys::Element>() {
            element.query_selector_all(selector).map(Some)
        } else if let Some(document) = scope.dyn_ref::<web_sys::Document>() {
            document.query_selector_all(selector).map(Some)
        } else if let Some(fragment) = scope.dyn_ref::<web_sys::DocumentFragment>() {
            fragment.query_selector_all(selector).map(Some)
        } else {
            Ok(None)
        }
    }
}

fn js_reason(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| String::from("rejected by the browser"))
}

/// Drops `value` once the current task has unwound.
fn release_later<T: 'static>(value: T) {
    wasm_bindgen_futures::spawn_local(async move {
        drop(value);
    });
}

impl Dom for WebDom {
    type Node = WebNode;

    fn document(&self) -> WebNode {
        self.wrap(self.inner.document.clone().into())
    }

    fn body(&self) -> Option<WebNode> {
        self.inner
            .document
            .body()
            .map(|body| self.wrap(body.into()))
    }

    fn is_element(&self, node: &WebNode) -> bool {
        node.node.node_type() == Node::ELEMENT_NODE
    }

    fn check_selector(&self, selector: &Selector) -> Result<()> {
        // an empty fragment parses the selector without walking the page
        let scratch = self.inner.document.create_document_fragment();
        scratch
            .query_selector(selector.as_str())
            .map(|_| ())
            .map_err(|err| Error::invalid_selector(selector.as_str(), js_reason(&err)))
    }

    fn matches(&self, element: &WebNode, selector: &Selector) -> bool {
        let Some(element) = element.node.dyn_ref::<web_sys::Element>() else {
            return false;
        };
        match element.matches(selector.as_str()) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(selector = %selector, error = %js_reason(&err), "selector cannot be matched");
                false
            }
        }
    }

    fn query_selector(&self, scope: &WebNode, selector: &Selector) -> Option<WebNode> {
        match self.first_match(&scope.node, selector.as_str()) {
            Ok(found) => found.map(|element| self.wrap(element.into())),
            Err(err) => {
                tracing::warn!(selector = %selector, error = %js_reason(&err), "selector cannot be queried");
                None
            }
        }
    }

    fn query_selector_all(&self, scope: &WebNode, selector: &Selector) -> Vec<WebNode> {
        match self.all_matches(&scope.node, selector.as_str()) {
            Ok(Some(list)) => self.wrap_list(&list),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(selector = %selector, error = %js_reason(&err), "selector cannot be queried");
                Vec::new()
            }
        }
    }

    fn observe(&self, target: &WebNode, init: ObserveInit, mut callback: BatchCallback<WebNode>) -> Result<WatchId> {
        let id = self.inner.next_watch.get();
        self.inner.next_watch.set(id + 1);

        let weak: Weak<WebDomInner> = Rc::downgrade(&self.inner);
        let closure = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let host = WebDom { inner };
            let records = host.convert_records(&records);
            if !records.is_empty() {
                callback(&records);
            }
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref()).map_err(|err| {
            Error::invalid_operation(alloc::format!("cannot create MutationObserver: {}", js_reason(&err)))
        })?;

        let options = MutationObserverInit::new();
        options.set_child_list(init.child_list);
        options.set_attributes(init.attributes);
        if init.attributes {
            options.set_attribute_old_value(init.attribute_old_value);
        }
        options.set_subtree(init.subtree);

        observer
            .observe_with_options(&target.node, &options)
            .map_err(|err| Error::invalid_operation(alloc::format!("cannot observe node: {}", js_reason(&err))))?;

        self.inner.watches.borrow_mut().insert(
            id,
            Watch {
                observer,
                _callback: closure,
            },
        );
        Ok(WatchId(id))
    }

    fn disconnect(&self, watch: WatchId) {
        let removed = self.inner.watches.borrow_mut().remove(&watch.0);
        if let Some(removed) = removed {
            removed.observer.disconnect();
            release_later(removed);
        }
    }

    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerId {
        let id = self.inner.next_timer.get();
        self.inner.next_timer.set(id + 1);

        let weak: Weak<WebDomInner> = Rc::downgrade(&self.inner);
        let closure = Closure::once(move || {
            if let Some(inner) = weak.upgrade() {
                let fired = inner.timers.borrow_mut().remove(&id);
                if let Some(fired) = fired {
                    release_later(fired);
                }
            }
            callback();
        });

        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .inner
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), delay)
        {
            Ok(handle) => {
                self.inner.timers.borrow_mut().insert(
                    id,
                    Timer {
                        handle,
                        _callback: closure,
                    },
                );
            }
            Err(err) => tracing::error!(error = %js_reason(&err), "cannot schedule timer"),
        }
        TimerId(id)
    }

    fn clear_timeout(&self, timer: TimerId) {
        let removed = self.inner.timers.borrow_mut().remove(&timer.0);
        if let Some(removed) = removed {
            self.inner.window.clear_timeout_with_handle(removed.handle);
        }
    }
}
