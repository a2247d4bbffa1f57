//! XPath evaluation against the page.
//!
//! `Document.evaluate` results are read into `NodeQueryResult`, keyed
//! through the same identity map as every other node the host hands out.

use crate::host::{WebDom, WebNode};
use alloc::boxed::Box;
use alloc::vec::Vec;
use domwatch_core::query::NodeQueryResult;
use wasm_bindgen::prelude::*;
use web_sys::{Node, XPathResult};

#[wasm_bindgen]
extern "C" {
    /// Local view of `Document`, so the raw `evaluate` binding can be
    /// declared in this crate.
    #[wasm_bindgen(js_name = Document)]
    type XPathDocument;

    #[wasm_bindgen(method, catch, js_name = evaluate)]
    fn evaluate_xpath(
        this: &XPathDocument,
        expression: &str,
        context: &Node,
        resolver: &JsValue,
        result_type: u16,
        result: &JsValue,
    ) -> Result<XPathResult, JsValue>;
}

impl WebDom {
    /// Evaluates `expression` from `context` (default: the document),
    /// asking for `result_type` (one of the `XPathResult` type constants).
    pub fn evaluate_xpath(
        &self,
        expression: &str,
        context: Option<&WebNode>,
        result_type: u16,
    ) -> Result<NodeQueryResult<WebNode>, JsValue> {
        let result = self.raw_evaluate(expression, context, result_type)?;
        self.read_xpath_result(&result)
    }

    /// First node in document order selected by `expression`.
    pub fn node_by_xpath(
        &self,
        expression: &str,
        context: Option<&WebNode>,
    ) -> Result<Option<WebNode>, JsValue> {
        let result = self.raw_evaluate(expression, context, XPathResult::FIRST_ORDERED_NODE_TYPE)?;
        Ok(result.single_node_value()?.map(|node| self.wrap(node)))
    }

    /// Reads an `XPathResult` by its result type. Iterators are drained.
    pub fn read_xpath_result(&self, result: &XPathResult) -> Result<NodeQueryResult<WebNode>, JsValue> {
        Ok(match result.result_type() {
            XPathResult::NUMBER_TYPE => NodeQueryResult::Number(result.number_value()?),
            XPathResult::STRING_TYPE => NodeQueryResult::String(result.string_value()?),
            XPathResult::BOOLEAN_TYPE => NodeQueryResult::Boolean(result.boolean_value()?),
            XPathResult::UNORDERED_NODE_ITERATOR_TYPE => {
                NodeQueryResult::UnorderedIterator(Box::new(self.drain(result)?.into_iter()))
            }
            XPathResult::ORDERED_NODE_ITERATOR_TYPE => {
                NodeQueryResult::OrderedIterator(Box::new(self.drain(result)?.into_iter()))
            }
            XPathResult::UNORDERED_NODE_SNAPSHOT_TYPE => {
                NodeQueryResult::UnorderedSnapshot(self.snapshot(result)?)
            }
            XPathResult::ORDERED_NODE_SNAPSHOT_TYPE => {
                NodeQueryResult::OrderedSnapshot(self.snapshot(result)?)
            }
            XPathResult::ANY_UNORDERED_NODE_TYPE => {
                NodeQueryResult::AnyUnorderedNode(result.single_node_value()?.map(|n| self.wrap(n)))
            }
            XPathResult::FIRST_ORDERED_NODE_TYPE => {
                NodeQueryResult::FirstOrderedNode(result.single_node_value()?.map(|n| self.wrap(n)))
            }
            other => {
                return Err(JsValue::from_str(&alloc::format!(
                    "Unknown XPathResult type {}",
                    other
                )))
            }
        })
    }

    fn raw_evaluate(
        &self,
        expression: &str,
        context: Option<&WebNode>,
        result_type: u16,
    ) -> Result<XPathResult, JsValue> {
        let document = self.document_ref();
        let context: &Node = match context {
            Some(node) => node.node(),
            None => document.as_ref(),
        };
        document
            .unchecked_ref::<XPathDocument>()
            .evaluate_xpath(expression, context, &JsValue::NULL, result_type, &JsValue::NULL)
    }

    fn drain(&self, result: &XPathResult) -> Result<Vec<WebNode>, JsValue> {
        let mut nodes = Vec::new();
        while let Some(node) = result.iterate_next()? {
            nodes.push(self.wrap(node));
        }
        Ok(nodes)
    }

    fn snapshot(&self, result: &XPathResult) -> Result<Vec<WebNode>, JsValue> {
        let len = result.snapshot_length()?;
        let mut nodes = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(node) = result.snapshot_item(i)? {
                nodes.push(self.wrap(node));
            }
        }
        Ok(nodes)
    }
}
