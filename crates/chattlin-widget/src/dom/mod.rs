//! Document port.
//!
//! The widget never touches the browser directly. Everything it needs from
//! the host page -- creating and wiring elements, reading the viewport,
//! registering listeners -- goes through [`Document`]. `chattlin-sdk`
//! implements it over `web-sys`; [`MemoryDocument`] implements it in memory.

pub mod memory;

pub use memory::{MemoryDocument, NodeId};

use crate::scroll::ScrollMetrics;

/// Page-level event sources the widget subscribes to.
///
/// The port only records the subscription. The adapter routes each event
/// back into the matching [`crate::WidgetController`] method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageListener {
    /// `message` on the window, routed to `handle_message`.
    WindowMessage,
    /// `resize` on the window, routed to `on_resize`.
    WindowResize,
    /// `wheel` on the widget holder, routed to `on_wheel`.
    HolderWheel,
    /// `click` on the bubble holder, routed to `on_bubble_click`.
    BubbleClick,
    /// Host URL changes, routed to `on_location_change`.
    LocationChange,
}

/// Minimal DOM surface used by the widget runtime.
///
/// Methods take `&self`: a browser document is a shared handle and mutation
/// goes through it. Elements are cheap handles.
pub trait Document {
    type Element: Clone;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// First attached element carrying `class`.
    fn first_by_class(&self, class: &str) -> Option<Self::Element>;

    fn create_element(&self, tag: &str) -> Option<Self::Element>;

    fn body(&self) -> Option<Self::Element>;

    fn head(&self) -> Option<Self::Element>;

    fn append_child(&self, parent: &Self::Element, child: &Self::Element);

    fn set_id(&self, element: &Self::Element, id: &str);

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    /// Set one inline style property. An empty value clears it.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);

    fn set_text(&self, element: &Self::Element, text: &str);

    /// Add every whitespace-separated class in `classes`.
    fn add_class(&self, element: &Self::Element, classes: &str);

    fn remove_class(&self, element: &Self::Element, class: &str);

    fn toggle_class(&self, element: &Self::Element, class: &str);

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn scroll_metrics(&self, element: &Self::Element) -> ScrollMetrics;

    /// Layout viewport width in CSS pixels.
    fn viewport_width(&self) -> f64;

    /// Dispatch a bare custom event on the window.
    fn dispatch_window_event(&self, name: &str);

    fn listen(&self, listener: PageListener);
}

/// Split a class list the way `classList` does.
pub(crate) fn split_classes(classes: &str) -> impl Iterator<Item = &str> {
    classes.split_whitespace()
}
