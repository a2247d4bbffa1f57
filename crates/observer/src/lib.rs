//! domwatch observer - selector-scoped DOM mutation subscriptions.
//!
//! This crate multiplexes many subscribers onto one platform mutation watch
//! per root node. Each subscriber names a CSS selector, the handlers it
//! wants (add, remove, attribute) and how deep to look inside a changed
//! element; the translator turns raw mutation batches into per-subscriber
//! `MutationEvent`s.
//!
//! # Core Concepts
//!
//! - `ObserverManager`: at most one `ObserverInstance` per root, created on
//!   demand and evicted when its last subscriber leaves
//! - `ObserverInstance`: owns the platform watch and the ordered subscriber list
//! - `SubscribeOptions`: selector, per-kind `Descent` policy and handlers
//! - `SubscriptionHandle`: idempotent `unsubscribe()`
//! - `wait_for_element` / `on_body_ready`: one-shot waiters built on
//!   dedicated watches
//! - `observe_element`: a standalone watcher with explicit start/stop
//!
//! # Example
//!
//! ```rust
//! use domwatch_dom::Document;
//! use domwatch_observer::{Descent, EventKind, ObserverManager, SubscribeOptions};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let doc = Document::with_body();
//! let body = doc.body().unwrap();
//! let manager = ObserverManager::new(doc.clone());
//!
//! let added = Rc::new(RefCell::new(Vec::new()));
//! let added_c = added.clone();
//! let handle = manager
//!     .subscribe(
//!         &body,
//!         SubscribeOptions::selector("li.item")
//!             .descend(EventKind::Add, Descent::All)
//!             .on_add(move |event| added_c.borrow_mut().push(event.node)),
//!     )
//!     .unwrap();
//!
//! let ul = doc.create_element("ul");
//! let li = doc.create_element("li");
//! doc.set_attribute(li, "class", "item").unwrap();
//! doc.append_child(ul, li).unwrap();
//! doc.append_child(body, ul).unwrap();
//! doc.flush();
//!
//! assert_eq!(*added.borrow(), vec![li]);
//!
//! handle.unsubscribe();
//! assert_eq!(manager.instance_count(), 0);
//! ```

extern crate alloc;

mod body;
mod element;
pub mod event;
mod instance;
mod manager;
pub mod options;
mod subscription;
pub mod translate;
mod wait;

pub use body::{on_body_ready, BodyReadyCancel};
pub use element::{observe_element, ElementWatcher};
pub use event::{Change, Descent, EventKind, MutationEvent};
pub use instance::ObserverInstance;
pub use manager::ObserverManager;
pub use options::{DescentPolicy, Handler, SubscribeOptions};
pub use subscription::{SubscriptionHandle, SubscriptionId};
pub use translate::collect_matches;
pub use wait::{wait_for_element, WaitForElement, WaitOptions, WAIT_FOR_ELEMENT_DEFAULT_TIMEOUT};

// Re-export commonly used types from dependencies
pub use domwatch_core::{Dom, Error, Result, Selector};
