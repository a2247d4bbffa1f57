//! Conversion between JavaScript option/event objects and engine types.
//!
//! Options object accepted by `DomObserver.subscribe`:
//!
//! ```javascript
//! {
//!   deep: { add: 'all', remove: 'single', attribute: 'none' }, // optional
//!   onAdd(event) {},        // at least one handler
//!   onRemove(event) {},
//!   onAttribute(event) {},
//! }
//! ```
//!
//! Events handed to JS: `{ node, deep?, value?, oldValue? }`. `deep` is only
//! present for elements found by descent; `value` is the attribute name.

use crate::host::WebNode;
use domwatch_core::Error;
use domwatch_observer::{Change, Descent, DescentPolicy, EventKind, MutationEvent, SubscribeOptions};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DeepValue {
    None,
    Single,
    All,
}

impl From<DeepValue> for Descent {
    fn from(value: DeepValue) -> Self {
        match value {
            DeepValue::None => Descent::None,
            DeepValue::Single => Descent::Single,
            DeepValue::All => Descent::All,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeepOptions {
    add: Option<DeepValue>,
    remove: Option<DeepValue>,
    attribute: Option<DeepValue>,
}

impl From<DeepOptions> for DescentPolicy {
    fn from(deep: DeepOptions) -> Self {
        DescentPolicy {
            add: deep.add.map(Descent::from).unwrap_or_default(),
            remove: deep.remove.map(Descent::from).unwrap_or_default(),
            attribute: deep.attribute.map(Descent::from).unwrap_or_default(),
        }
    }
}

const HANDLER_KEYS: [(&str, EventKind); 3] = [
    ("onAdd", EventKind::Add),
    ("onRemove", EventKind::Remove),
    ("onAttribute", EventKind::Attribute),
];

/// Converts an engine error into the string thrown to JS.
pub fn error_to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Builds `SubscribeOptions` from a JS options object.
///
/// Validation of the selector and the handler count happens later, in
/// `ObserverInstance::subscribe`.
pub fn js_to_subscribe_options(
    selector: Option<String>,
    options: &JsValue,
) -> Result<SubscribeOptions<WebNode>, JsValue> {
    let mut out = SubscribeOptions::with_selector(selector);
    if options.is_null() || options.is_undefined() {
        return Ok(out);
    }

    let deep = js_sys::Reflect::get(options, &JsValue::from_str("deep"))?;
    if !deep.is_null() && !deep.is_undefined() {
        let deep: DeepOptions = serde_wasm_bindgen::from_value(deep)?;
        out = out.descent(deep.into());
    }

    for (key, kind) in HANDLER_KEYS {
        let value = js_sys::Reflect::get(options, &JsValue::from_str(key))?;
        if value.is_null() || value.is_undefined() {
            continue;
        }
        let callback: js_sys::Function = value
            .dyn_into()
            .map_err(|_| JsValue::from_str(&alloc::format!("{} must be a function", key)))?;
        out = out.on(kind, move |event| {
            match event_to_js(event) {
                Ok(js) => {
                    callback.call1(&JsValue::NULL, &js).ok();
                }
                Err(err) => tracing::warn!(error = ?err, "cannot build event object"),
            }
        });
    }

    Ok(out)
}

/// Converts an event into the JS object passed to handlers.
pub fn event_to_js(event: &MutationEvent<WebNode>) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &JsValue::from_str("node"), event.node.node())?;
    if event.descent != Descent::None {
        js_sys::Reflect::set(
            &obj,
            &JsValue::from_str("deep"),
            &JsValue::from_str(event.descent.as_str()),
        )?;
    }
    if let Change::AttributeChanged { name, old_value } = &event.change {
        js_sys::Reflect::set(&obj, &JsValue::from_str("value"), &JsValue::from_str(name))?;
        let old = old_value
            .as_deref()
            .map(JsValue::from_str)
            .unwrap_or(JsValue::NULL);
        js_sys::Reflect::set(&obj, &JsValue::from_str("oldValue"), &old)?;
    }
    Ok(obj.into())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::host::WebDom;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_deep_options() {
        let options = js_sys::Object::new();
        let deep = js_sys::Object::new();
        js_sys::Reflect::set(&deep, &"add".into(), &"all".into()).unwrap();
        js_sys::Reflect::set(&options, &"deep".into(), &deep).unwrap();
        let noop = js_sys::Function::new_no_args("");
        js_sys::Reflect::set(&options, &"onAdd".into(), &noop).unwrap();

        let converted = js_to_subscribe_options(Some("li".into()), &options.into()).unwrap();
        assert!(converted.handles(EventKind::Add));
        assert!(!converted.handles(EventKind::Remove));
        assert!(converted.validate().is_ok());
    }

    #[wasm_bindgen_test]
    fn test_bad_deep_value_rejected() {
        let options = js_sys::Object::new();
        let deep = js_sys::Object::new();
        js_sys::Reflect::set(&deep, &"add".into(), &"deepest".into()).unwrap();
        js_sys::Reflect::set(&options, &"deep".into(), &deep).unwrap();
        assert!(js_to_subscribe_options(None, &options.into()).is_err());
    }

    #[wasm_bindgen_test]
    fn test_event_to_js() {
        let dom = WebDom::from_window().unwrap();
        let div = dom.document_ref().create_element("div").unwrap();
        let node = dom.wrap(div.into());
        let event = MutationEvent::new(
            node,
            Change::AttributeChanged {
                name: "class".into(),
                old_value: None,
            },
            Descent::All,
        );

        let js = event_to_js(&event).unwrap();
        let get = |key: &str| js_sys::Reflect::get(&js, &JsValue::from_str(key)).unwrap();
        assert_eq!(get("deep").as_string().as_deref(), Some("all"));
        assert_eq!(get("value").as_string().as_deref(), Some("class"));
        assert!(get("oldValue").is_null());
    }
}
