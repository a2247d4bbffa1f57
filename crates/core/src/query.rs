//! Flattening of node query results.
//!
//! XPath-style evaluation can produce several result shapes. Only the
//! iterator and snapshot shapes enumerate nodes; asking for nodes from any
//! other shape is an `Error::UnsupportedResult`.

use crate::error::{Error, Result};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// The result of a node query, by shape.
pub enum NodeQueryResult<N> {
    OrderedIterator(Box<dyn Iterator<Item = N>>),
    UnorderedIterator(Box<dyn Iterator<Item = N>>),
    OrderedSnapshot(Vec<N>),
    UnorderedSnapshot(Vec<N>),
    FirstOrderedNode(Option<N>),
    AnyUnorderedNode(Option<N>),
    Number(f64),
    String(String),
    Boolean(bool),
}

impl<N> NodeQueryResult<N> {
    /// Name of the result shape.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeQueryResult::OrderedIterator(_) => "ordered node iterator",
            NodeQueryResult::UnorderedIterator(_) => "unordered node iterator",
            NodeQueryResult::OrderedSnapshot(_) => "ordered node snapshot",
            NodeQueryResult::UnorderedSnapshot(_) => "unordered node snapshot",
            NodeQueryResult::FirstOrderedNode(_) => "first ordered node",
            NodeQueryResult::AnyUnorderedNode(_) => "any unordered node",
            NodeQueryResult::Number(_) => "number",
            NodeQueryResult::String(_) => "string",
            NodeQueryResult::Boolean(_) => "boolean",
        }
    }

    /// Collects every node of an iterator or snapshot result.
    ///
    /// ```
    /// use domwatch_core::query::NodeQueryResult;
    /// let snapshot = NodeQueryResult::OrderedSnapshot(vec![1, 2, 3]);
    /// assert_eq!(snapshot.into_nodes().unwrap(), vec![1, 2, 3]);
    ///
    /// let single = NodeQueryResult::FirstOrderedNode(Some(1));
    /// assert!(single.into_nodes().is_err());
    /// ```
    pub fn into_nodes(self) -> Result<Vec<N>> {
        match self {
            NodeQueryResult::OrderedIterator(iter) | NodeQueryResult::UnorderedIterator(iter) => {
                Ok(iter.collect())
            }
            NodeQueryResult::OrderedSnapshot(nodes)
            | NodeQueryResult::UnorderedSnapshot(nodes) => Ok(nodes),
            other => Err(Error::unsupported_result(other.kind())),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for NodeQueryResult<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeQueryResult::OrderedIterator(_) | NodeQueryResult::UnorderedIterator(_) => {
                f.debug_tuple(self.kind()).field(&"..").finish()
            }
            NodeQueryResult::OrderedSnapshot(nodes)
            | NodeQueryResult::UnorderedSnapshot(nodes) => {
                f.debug_tuple(self.kind()).field(nodes).finish()
            }
            NodeQueryResult::FirstOrderedNode(node) | NodeQueryResult::AnyUnorderedNode(node) => {
                f.debug_tuple(self.kind()).field(node).finish()
            }
            NodeQueryResult::Number(n) => f.debug_tuple(self.kind()).field(n).finish(),
            NodeQueryResult::String(s) => f.debug_tuple(self.kind()).field(s).finish(),
            NodeQueryResult::Boolean(b) => f.debug_tuple(self.kind()).field(b).finish(),
        }
    }
}
