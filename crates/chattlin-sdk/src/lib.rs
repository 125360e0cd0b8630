//! Browser loader for the Chattlin chat widget.
//!
//! Compiled to WebAssembly and loaded by the host page:
//!
//! ```js
//! import init, { run, setUser } from "./chattlin_sdk.js";
//! await init();
//! run({ baseUrl: "https://app.chattlin.com", websiteToken: "..." });
//! setUser("visitor-7", { name: "Ada", email: "ada@example.com" });
//! ```
//!
//! All widget behavior lives in `chattlin-widget`; this crate implements its
//! ports over `web-sys` and owns the page-wide instance.

mod browser;
mod runtime;

use chattlin_types::widget::WidgetConfig;
use wasm_bindgen::prelude::*;

use runtime::Command;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// Create the widget from the host's settings object. Calling it again on
/// the same page is a no-op that returns `false`.
#[wasm_bindgen]
pub fn run(settings: JsValue) -> Result<bool, JsValue> {
    let config: WidgetConfig = serde_wasm_bindgen::from_value(settings)?;
    if config.base_url.is_empty() || config.website_token.is_empty() {
        return Err(JsValue::from_str("baseUrl and websiteToken are required"));
    }
    runtime::install(config)
}

/// Identify the visitor. Sent on load when the frame is not ready yet.
#[wasm_bindgen(js_name = setUser)]
pub fn set_user(identifier: String, user: JsValue) -> Result<(), JsValue> {
    let user: serde_json::Value = if user.is_undefined() {
        serde_json::Value::Null
    } else {
        serde_wasm_bindgen::from_value(user)?
    };
    let user = runtime::widget_user(&identifier, user).map_err(|e| JsValue::from_str(&e))?;
    runtime::submit(Command::SetUser(user));
    Ok(())
}

/// Merge custom attributes into the visitor's contact.
#[wasm_bindgen(js_name = setCustomAttributes)]
pub fn set_custom_attributes(attributes: JsValue) -> Result<(), JsValue> {
    let attributes: serde_json::Map<String, serde_json::Value> =
        serde_wasm_bindgen::from_value(attributes)?;
    runtime::submit(Command::SetCustomAttributes(attributes));
    Ok(())
}

/// Open (`"open"`), close (`"close"`) or flip (no argument) the widget.
#[wasm_bindgen]
pub fn toggle(state: Option<String>) -> Result<(), JsValue> {
    let requested = runtime::toggle_request(state.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    runtime::submit(Command::Toggle(requested));
    Ok(())
}

/// Forget the visitor and the conversation cookie.
#[wasm_bindgen]
pub fn reset() {
    runtime::submit(Command::Reset);
}

/// Inbound relay counters, or `undefined` before `run`.
#[wasm_bindgen(js_name = relayStats)]
pub fn relay_stats() -> Result<JsValue, JsValue> {
    match runtime::relay_stats() {
        Some(stats) => Ok(serde_wasm_bindgen::to_value(&stats)?),
        None => Ok(JsValue::UNDEFINED),
    }
}
