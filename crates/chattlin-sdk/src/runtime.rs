//! The page-wide widget instance and its event plumbing.
//!
//! The controller lives in a thread-local `RefCell`. Browser listeners and
//! exported calls never touch it directly: they push a [`Command`] and drain
//! the queue. A command raised while the controller is already borrowed
//! (a host `chattlin:ready` handler calling `setUser`, say) stays queued
//! and runs when the outer borrow finishes its drain.

use std::cell::RefCell;
use std::collections::VecDeque;

use chattlin_types::widget::{WidgetConfig, WidgetUser};
use chattlin_widget::WidgetController;
use chattlin_widget::bubble::{BUBBLE_HOLDER_CLASS, WIDGET_HOLDER_CLASS};
use chattlin_widget::dom::{Document, PageListener};
use chattlin_widget::relay::RelayStats;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, MessageEvent, MutationObserver, MutationObserverInit, WheelEvent};

use crate::browser::{BrowserCookies, FramePort, WebDocument};

pub type BrowserController = WidgetController<WebDocument, BrowserCookies, FramePort>;

/// Work for the controller, in arrival order.
#[derive(Debug)]
pub enum Command {
    Message(Option<String>),
    Resize,
    BubbleClick,
    LocationChange { url: String, host: String },
    SetUser(WidgetUser),
    SetCustomAttributes(serde_json::Map<String, serde_json::Value>),
    Toggle(Option<bool>),
    Reset,
}

thread_local! {
    static CONTROLLER: RefCell<Option<BrowserController>> = const { RefCell::new(None) };
    static PENDING: RefCell<VecDeque<Command>> = const { RefCell::new(VecDeque::new()) };
    static LAST_HREF: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Create the page's widget. Returns `false` when one already exists,
/// including a `run` made from inside one of the widget's own callbacks.
pub fn install(config: WidgetConfig) -> Result<bool, JsValue> {
    if is_installed() {
        warn!("chattlin widget already running on this page");
        return Ok(false);
    }

    let doc = WebDocument::current().ok_or_else(|| JsValue::from_str("no browser document"))?;
    let cookies =
        BrowserCookies::new(&doc).ok_or_else(|| JsValue::from_str("document has no cookies"))?;
    let port = FramePort::new(&doc);

    let mut controller = WidgetController::new(config, doc, cookies, port);
    controller.create_frame();
    CONTROLLER.with(|cell| *cell.borrow_mut() = Some(controller));

    // Calls made before the loader ran.
    drain();
    Ok(true)
}

// A busy cell means a controller is mid-dispatch further up the stack.
fn is_installed() -> bool {
    CONTROLLER.with(|cell| cell.try_borrow().map_or(true, |guard| guard.is_some()))
}

pub fn submit(command: Command) {
    PENDING.with(|queue| queue.borrow_mut().push_back(command));
    drain();
}

fn drain() {
    CONTROLLER.with(|cell| {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            return;
        };
        let Some(controller) = guard.as_mut() else {
            return;
        };
        while let Some(command) = PENDING.with(|queue| queue.borrow_mut().pop_front()) {
            apply(controller, command);
        }
    });
}

fn apply(controller: &mut BrowserController, command: Command) {
    match command {
        Command::Message(data) => {
            controller.handle_message(data.as_deref());
        }
        Command::Resize => controller.on_resize(),
        Command::BubbleClick => controller.on_bubble_click(),
        Command::LocationChange { url, host } => controller.on_location_change(url, host),
        Command::SetUser(user) => controller.set_user(user),
        Command::SetCustomAttributes(attributes) => controller.set_custom_attributes(attributes),
        Command::Toggle(requested) => controller.toggle_bubble(requested),
        Command::Reset => controller.reset(),
    }
}

pub fn relay_stats() -> Option<RelayStats> {
    CONTROLLER.with(|cell| {
        cell.try_borrow()
            .ok()
            .and_then(|guard| guard.as_ref().map(|c| c.relay_stats()))
    })
}

/// Wire one page listener. Closures live as long as the page.
pub(crate) fn attach_listener(doc: &WebDocument, listener: PageListener) {
    let window = doc.window();
    let result = match listener {
        PageListener::WindowMessage => {
            let closure = Closure::<dyn FnMut(MessageEvent)>::new(|event: MessageEvent| {
                submit(Command::Message(event.data().as_string()));
            });
            let result = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref());
            closure.forget();
            result
        }
        PageListener::WindowResize => {
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(|_event: web_sys::Event| {
                submit(Command::Resize);
            });
            let result = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
            result
        }
        PageListener::HolderWheel => {
            let Some(holder) = doc.first_by_class(WIDGET_HOLDER_CLASS) else {
                debug!("no widget holder; wheel containment not wired");
                return;
            };
            let closure = Closure::<dyn FnMut(WheelEvent)>::new(|event: WheelEvent| {
                if should_contain_wheel(event.delta_y()) {
                    event.prevent_default();
                }
            });
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            let result = holder.add_event_listener_with_callback_and_add_event_listener_options(
                "wheel",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
            result
        }
        PageListener::BubbleClick => {
            let Some(holder) = doc.first_by_class(BUBBLE_HOLDER_CLASS) else {
                debug!("no bubble holder; click not wired");
                return;
            };
            let closure = Closure::<dyn FnMut(web_sys::Event)>::new(|_event: web_sys::Event| {
                submit(Command::BubbleClick);
            });
            let result =
                holder.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
            result
        }
        PageListener::LocationChange => observe_location(doc),
    };
    if let Err(e) = result {
        warn!(?listener, error = ?e, "failed to attach listener");
    }
}

// Wheel handling has to answer synchronously; a busy controller lets the
// event through.
fn should_contain_wheel(delta_y: f64) -> bool {
    CONTROLLER.with(|cell| {
        cell.try_borrow()
            .ok()
            .and_then(|guard| guard.as_ref().map(|c| c.on_wheel(delta_y)))
            .unwrap_or(false)
    })
}

/// Single-page apps change the URL without a load; watch DOM mutations and
/// compare `location.href`.
fn observe_location(doc: &WebDocument) -> Result<(), JsValue> {
    let Some(body) = doc.body() else {
        return Ok(());
    };
    let location = doc.window().location();
    LAST_HREF.with(|last| *last.borrow_mut() = location.href().ok());

    let closure = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |_records: js_sys::Array, _observer: MutationObserver| {
            let Ok(href) = location.href() else {
                return;
            };
            let changed = LAST_HREF.with(|last| {
                let mut last = last.borrow_mut();
                if last.as_deref() == Some(href.as_str()) {
                    false
                } else {
                    *last = Some(href.clone());
                    true
                }
            });
            if changed {
                let host = location.host().unwrap_or_default();
                submit(Command::LocationChange { url: href, host });
            }
        },
    );
    let observer = MutationObserver::new(closure.as_ref().unchecked_ref())?;
    closure.forget();

    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&body, &init)
}

/// Parse the bubble state argument of `toggle`.
pub fn toggle_request(state: Option<&str>) -> Result<Option<bool>, String> {
    match state {
        None => Ok(None),
        Some("open") => Ok(Some(true)),
        Some("close") => Ok(Some(false)),
        Some(other) => Err(format!("unknown bubble state '{other}', expected open or close")),
    }
}

const RESERVED_USER_KEYS: &[&str] = &["event", "version"];

/// Build a visitor identity from `setUser(identifier, user)` arguments.
pub fn widget_user(identifier: &str, user: serde_json::Value) -> Result<WidgetUser, String> {
    if identifier.trim().is_empty() {
        return Err("identifier must not be empty".to_string());
    }
    let mut user = match user {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        _ => return Err("user must be an object".to_string()),
    };
    // Relay envelope fields; a host value would shadow the message tag.
    for reserved in RESERVED_USER_KEYS {
        if user.remove(*reserved).is_some() {
            debug!(key = *reserved, "dropped reserved key from user");
        }
    }
    user.insert(
        "identifier".to_string(),
        serde_json::Value::String(identifier.to_string()),
    );
    serde_json::from_value(serde_json::Value::Object(user)).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chattlin_types::relay::OutboundMessage;
    use serde_json::json;

    #[test]
    fn test_toggle_request() {
        assert_eq!(toggle_request(None), Ok(None));
        assert_eq!(toggle_request(Some("open")), Ok(Some(true)));
        assert_eq!(toggle_request(Some("close")), Ok(Some(false)));
        assert!(toggle_request(Some("flip")).is_err());
    }

    #[test]
    fn test_widget_user_sets_identifier_and_keeps_extras() {
        let user = widget_user(
            "visitor-7",
            json!({"name": "Ada", "email": "ada@example.com", "plan": "pro"}),
        )
        .unwrap();
        assert_eq!(user.identifier, "visitor-7");
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.extra["plan"], "pro");

        // The explicit identifier wins over one inside the object.
        let user = widget_user("a", json!({"identifier": "b"})).unwrap();
        assert_eq!(user.identifier, "a");
    }

    #[test]
    fn test_widget_user_rejects_bad_input() {
        assert!(widget_user("", json!({})).is_err());
        assert!(widget_user("id", json!("nope")).is_err());
        assert!(widget_user("id", json!(null)).is_ok());
    }

    #[test]
    fn test_widget_user_drops_envelope_keys() {
        let user = widget_user(
            "visitor-7",
            json!({"event": "closeChat", "version": 9, "plan": "pro"}),
        )
        .unwrap();
        assert!(!user.extra.contains_key("event"));
        assert!(!user.extra.contains_key("version"));

        let message = serde_json::to_value(OutboundMessage::SetUser(user)).unwrap();
        assert_eq!(message["event"], "set-user");
        assert_eq!(message["plan"], "pro");
    }

    #[test]
    fn test_run_while_dispatching_reports_existing_widget() {
        assert!(!is_installed());

        // Stands in for a drain that is applying a command.
        CONTROLLER.with(|cell| {
            let _guard = cell.borrow_mut();
            assert!(is_installed());
            let installed = install(WidgetConfig::new("https://app.chattlin.com", "token"));
            assert!(matches!(installed, Ok(false)));
        });

        assert!(!is_installed());
    }

    #[test]
    fn test_commands_queue_until_installed() {
        submit(Command::Toggle(Some(true)));
        submit(Command::Reset);
        let queued = PENDING.with(|queue| queue.borrow().len());
        assert_eq!(queued, 2);
        assert!(relay_stats().is_none());
        PENDING.with(|queue| queue.borrow_mut().clear());
    }
}
