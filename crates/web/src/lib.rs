//! domwatch web - browser host and JavaScript API.
//!
//! This crate runs the domwatch engine against the real page: `WebDom`
//! implements `domwatch_core::Dom` on top of `web_sys`, and the
//! `#[wasm_bindgen]` exports give userscripts a small JS surface.
//!
//! # Core Components
//!
//! - `WebDom`: `MutationObserver`, `Element.matches`, `querySelector(All)`
//!   and `setTimeout` behind the host trait
//! - `WebNode`: a DOM node with a stable identity key
//! - `DomObserver`: shared observer with `subscribe` / `instanceCount`
//! - `waitForElement`, `onBodyReady`, `isBlank`, `isEmpty`
//! - `getNodeByXPathExpression`, `xPathResultToArray`
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import { DomObserver, waitForElement, onBodyReady } from 'domwatch';
//!
//! onBodyReady((body) => body.classList.add('ready'));
//!
//! const observer = new DomObserver();
//! const unsubscribe = observer.subscribe('.comment', {
//!   deep: { add: 'all' },
//!   onAdd: ({ node }) => node.classList.add('seen'),
//!   onAttribute: ({ node, value, oldValue }) => console.log(node, value, oldValue),
//! });
//!
//! const header = await waitForElement('#header', 5000);
//! if (header === null) unsubscribe();
//! ```

extern crate alloc;

pub mod bridge;
pub mod convert;
pub mod host;
pub mod xpath;

pub use bridge::{
    get_node_by_xpath_expression, is_blank, is_empty, on_body_ready_js, wait_for_element_js,
    xpath_result_to_array, DomObserver,
};
pub use host::{WebDom, WebNode};
