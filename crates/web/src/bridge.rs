//! JavaScript API.
//!
//! Every function returned to JS (unsubscribe, cancel) is idempotent and
//! owned by JS from then on.

use crate::convert::{error_to_js, js_to_subscribe_options};
use crate::host::{WebDom, WebNode};
use alloc::boxed::Box;
use core::cell::Cell;
use domwatch_observer::{
    on_body_ready, wait_for_element, ObserverManager, WaitOptions, WAIT_FOR_ELEMENT_DEFAULT_TIMEOUT,
};
use wasm_bindgen::prelude::*;

/// Wraps a one-shot Rust action into a JS function that runs it at most once.
fn once_fn<F: FnOnce() + 'static>(action: F) -> js_sys::Function {
    let action = Cell::new(Some(action));
    let closure = Closure::wrap(Box::new(move || {
        if let Some(action) = action.take() {
            action();
        }
    }) as Box<dyn FnMut()>);
    let js_fn: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    closure.forget();
    js_fn
}

/// Shared page observer: one `MutationObserver` per root node.
///
/// ```javascript
/// const observer = new DomObserver();
/// const unsubscribe = observer.subscribe('li.item', {
///   deep: { add: 'all' },
///   onAdd: ({ node, deep }) => console.log('added', node, deep),
/// });
/// unsubscribe();
/// ```
#[wasm_bindgen]
pub struct DomObserver {
    manager: ObserverManager<WebDom>,
}

#[wasm_bindgen]
impl DomObserver {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<DomObserver, JsValue> {
        Ok(Self {
            manager: ObserverManager::new(WebDom::from_window()?),
        })
    }

    /// Subscribes to changes of elements matching `selector` (`null` for
    /// every element) under `baseNode` (default: the body, or the document
    /// while there is no body).
    ///
    /// Throws for a blank selector, an invalid selector or when no handler
    /// is given. Returns an unsubscribe function.
    pub fn subscribe(
        &self,
        selector: Option<String>,
        options: JsValue,
        base_node: Option<web_sys::Node>,
    ) -> Result<js_sys::Function, JsValue> {
        let options = js_to_subscribe_options(selector, &options)?;
        let handle = match base_node {
            Some(node) => {
                let root = self.manager.dom().wrap(node);
                self.manager.subscribe(&root, options)
            }
            None => self.manager.subscribe_default(options),
        }
        .map_err(error_to_js)?;

        Ok(once_fn(move || handle.unsubscribe()))
    }

    /// Returns the number of roots currently observed.
    #[wasm_bindgen(js_name = instanceCount)]
    pub fn instance_count(&self) -> usize {
        self.manager.instance_count()
    }
}

/// Resolves with the first element matching `selector` under `baseNode`
/// (default: the document), or with `null` after `timeout` milliseconds
/// (default 10000).
#[wasm_bindgen(js_name = waitForElement)]
pub fn wait_for_element_js(
    selector: &str,
    timeout: Option<u32>,
    base_node: Option<web_sys::Node>,
) -> Result<js_sys::Promise, JsValue> {
    let dom = WebDom::from_window()?;
    let options = WaitOptions {
        root: base_node.map(|node| dom.wrap(node)),
        timeout_ms: timeout.unwrap_or(WAIT_FOR_ELEMENT_DEFAULT_TIMEOUT),
    };
    let wait = wait_for_element(&dom, selector, options).map_err(error_to_js)?;

    Ok(wasm_bindgen_futures::future_to_promise(async move {
        Ok(match wait.await {
            Some(found) => found.into_node().into(),
            None => JsValue::NULL,
        })
    }))
}

/// Calls `callback(body)` once the body exists. Returns a cancel function
/// while waiting, or `undefined` when the callback already ran.
#[wasm_bindgen(js_name = onBodyReady)]
pub fn on_body_ready_js(callback: js_sys::Function) -> Result<JsValue, JsValue> {
    let dom = WebDom::from_window()?;
    let pending = on_body_ready(&dom, move |body| {
        callback.call1(&JsValue::NULL, body.node()).ok();
    })
    .map_err(error_to_js)?;

    Ok(match pending {
        Some(cancel) => once_fn(move || cancel.cancel()).into(),
        None => JsValue::UNDEFINED,
    })
}

/// First node selected by the XPath `expression`, evaluated from `node`
/// (default: the document).
#[wasm_bindgen(js_name = getNodeByXPathExpression)]
pub fn get_node_by_xpath_expression(
    expression: &str,
    node: Option<web_sys::Node>,
) -> Result<Option<web_sys::Node>, JsValue> {
    let dom = WebDom::from_window()?;
    let context = node.map(|node| dom.wrap(node));
    Ok(dom
        .node_by_xpath(expression, context.as_ref())?
        .map(WebNode::into_node))
}

/// Collects the nodes of an iterator or snapshot `XPathResult`. Throws for
/// any other result type.
#[wasm_bindgen(js_name = xPathResultToArray)]
pub fn xpath_result_to_array(result: &web_sys::XPathResult) -> Result<js_sys::Array, JsValue> {
    let dom = WebDom::from_window()?;
    let nodes = dom
        .read_xpath_result(result)?
        .into_nodes()
        .map_err(error_to_js)?;
    Ok(nodes
        .into_iter()
        .map(|node| JsValue::from(node.into_node()))
        .collect())
}

#[wasm_bindgen(js_name = isBlank)]
pub fn is_blank(s: &str) -> bool {
    domwatch_core::strings::is_blank(s)
}

#[wasm_bindgen(js_name = isEmpty)]
pub fn is_empty(s: &str) -> bool {
    domwatch_core::strings::is_empty(s)
}
