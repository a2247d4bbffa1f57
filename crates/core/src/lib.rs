//! domwatch core - shared types for the mutation-subscription engine.
//!
//! This crate provides the pieces every host and the engine agree on:
//!
//! - `Dom`: the host trait (tree queries, mutation watches, timers)
//! - `MutationRecord` / `ObserveInit`: raw change records and watch scope
//! - `Selector`: validated selector text, plus a parser and matcher for
//!   hosts that evaluate selectors in Rust
//! - `NodeQueryResult`: node query result shapes and their flattening
//! - `Error`: error types
//!
//! # Example
//!
//! ```rust
//! use domwatch_core::selector::Selector;
//! use domwatch_core::strings::is_blank;
//!
//! assert!(is_blank("  "));
//! assert!(Selector::new("  ").is_err());
//!
//! let selector = Selector::new("ul#ncsList > li").unwrap();
//! let list = selector.parse().unwrap();
//! assert_eq!(list.selectors[0].compounds.len(), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod dom;
mod error;
pub mod mutation;
pub mod query;
pub mod selector;
pub mod strings;

pub use dom::{BatchCallback, Dom, TimerCallback, TimerId, WatchId};
pub use error::{Error, Result};
pub use mutation::{MutationRecord, ObserveInit};
pub use query::NodeQueryResult;
pub use selector::{Selector, SelectorElement, SelectorList};
