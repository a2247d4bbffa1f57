//! domwatch dom - an in-memory document host.
//!
//! `Document` implements `domwatch_core::Dom` without a browser. It keeps a
//! node arena, queues DOM-style mutation records per watch, and delivers
//! them only when the test (or embedding) reaches a checkpoint:
//!
//! - `flush()`: deliver pending records, like a microtask checkpoint
//! - `advance(ms)`: move the virtual clock, firing timers in order
//!
//! # Example
//!
//! ```rust
//! use domwatch_core::ObserveInit;
//! use domwatch_dom::Document;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let doc = Document::with_body();
//! let body = doc.body().unwrap();
//!
//! let seen = Rc::new(Cell::new(0));
//! let seen_c = seen.clone();
//! doc.observe(body, ObserveInit::child_list_subtree(), move |records| {
//!     seen_c.set(seen_c.get() + records.len());
//! });
//!
//! let div = doc.create_element("div");
//! doc.append_child(body, div).unwrap();
//! assert_eq!(seen.get(), 0); // not delivered yet
//!
//! doc.flush();
//! assert_eq!(seen.get(), 1);
//! ```

extern crate alloc;

mod document;
mod host;
mod timer;
mod tree;
mod watch;

pub use document::Document;
pub use tree::NodeId;
