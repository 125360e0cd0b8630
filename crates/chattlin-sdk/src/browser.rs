//! Widget ports implemented over `web-sys`.

use chattlin_types::error::RelayError;
use chattlin_types::session::CookieAttributes;
use chattlin_types::widget::FRAME_ELEMENT_ID;
use chattlin_widget::dom::{Document, PageListener};
use chattlin_widget::relay::FrameTransport;
use chattlin_widget::scroll::ScrollMetrics;
use chattlin_widget::session::{CookieJar, format_expired_cookie, format_set_cookie, parse_cookie};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlDocument, HtmlElement, HtmlIFrameElement};

use crate::runtime;

/// The host page's window and document.
#[derive(Clone)]
pub struct WebDocument {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl WebDocument {
    pub fn current() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &web_sys::Window {
        &self.window
    }
}

impl Document for WebDocument {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn first_by_class(&self, class: &str) -> Option<Element> {
        self.document.get_elements_by_class_name(class).item(0)
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Into::into)
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Into::into)
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        if let Err(e) = parent.append_child(child) {
            warn!(error = ?e, "append_child failed");
        }
    }

    fn set_id(&self, element: &Element, id: &str) {
        element.set_id(id);
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        if let Err(e) = element.set_attribute(name, value) {
            warn!(attribute = name, error = ?e, "set_attribute failed");
        }
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(element) = element.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if let Err(e) = result {
            warn!(property, error = ?e, "style update failed");
        }
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn add_class(&self, element: &Element, classes: &str) {
        let list = element.class_list();
        for class in classes.split_whitespace() {
            let _ = list.add_1(class);
        }
    }

    fn remove_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().remove_1(class);
    }

    fn toggle_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().toggle(class);
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn scroll_metrics(&self, element: &Element) -> ScrollMetrics {
        let offset_height = element
            .dyn_ref::<HtmlElement>()
            .map(|e| e.offset_height())
            .unwrap_or_else(|| element.client_height());
        ScrollMetrics {
            scroll_top: element.scroll_top() as f64,
            scroll_height: element.scroll_height() as f64,
            offset_height: offset_height as f64,
        }
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .or_else(|| {
                self.document
                    .document_element()
                    .map(|e| e.client_width() as f64)
            })
            .unwrap_or_default()
    }

    fn dispatch_window_event(&self, name: &str) {
        match web_sys::Event::new(name) {
            Ok(event) => {
                let _ = self.window.dispatch_event(&event);
            }
            Err(e) => warn!(event = name, error = ?e, "could not create window event"),
        }
    }

    fn listen(&self, listener: PageListener) {
        runtime::attach_listener(self, listener);
    }
}

/// `document.cookie` of the host page.
#[derive(Clone)]
pub struct BrowserCookies {
    document: HtmlDocument,
}

impl BrowserCookies {
    pub fn new(doc: &WebDocument) -> Option<Self> {
        let document = doc.document.clone().dyn_into::<HtmlDocument>().ok()?;
        Some(Self { document })
    }

    fn write(&self, assignment: &str) {
        if let Err(e) = self.document.set_cookie(assignment) {
            warn!(error = ?e, "cookie write rejected");
        }
    }
}

impl CookieJar for BrowserCookies {
    fn get(&self, name: &str) -> Option<String> {
        let header = self.document.cookie().ok()?;
        parse_cookie(&header, name)
    }

    fn set(&self, name: &str, value: &str, attributes: &CookieAttributes) {
        self.write(&format_set_cookie(name, value, attributes, chrono::Utc::now()));
    }

    fn remove(&self, name: &str, path: &str) {
        self.write(&format_expired_cookie(name, path));
    }
}

/// Posts relay strings into the widget frame's window.
#[derive(Clone)]
pub struct FramePort {
    document: web_sys::Document,
}

impl FramePort {
    pub fn new(doc: &WebDocument) -> Self {
        Self {
            document: doc.document.clone(),
        }
    }
}

impl FrameTransport for FramePort {
    fn post(&self, text: &str) -> Result<(), RelayError> {
        let frame = self
            .document
            .get_element_by_id(FRAME_ELEMENT_ID)
            .and_then(|e| e.dyn_into::<HtmlIFrameElement>().ok())
            .ok_or(RelayError::FrameMissing)?;
        let target = frame.content_window().ok_or(RelayError::FrameMissing)?;
        target
            .post_message(&wasm_bindgen::JsValue::from_str(text), "*")
            .map_err(|e| RelayError::Post(format!("{e:?}")))?;
        debug!(bytes = text.len(), "posted to widget frame");
        Ok(())
    }
}
