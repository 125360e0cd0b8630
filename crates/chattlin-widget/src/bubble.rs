//! Launcher bubble and widget holder DOM.
//!
//! [`BubbleController`] keeps handles to the elements it creates: the holder
//! wrapping the frame, the bubble holder, the chat and close bubbles and
//! their label. Visibility is driven entirely by toggling CSS classes on
//! those elements.

use chattlin_types::widget::{Position, WidgetConfig};
use tracing::debug;

use crate::dom::Document;

pub const WIDGET_HOLDER_CLASS: &str = "woot-widget-holder";
pub const BUBBLE_HOLDER_CLASS: &str = "woot--bubble-holder";
pub const BUBBLE_CLASS: &str = "woot-widget-bubble";
pub const CLOSE_CLASS: &str = "woot--close";
pub const HIDE_CLASS: &str = "woot--hide";
pub const NOTIFICATION_CLASS: &str = "woot--notification";
pub const BUBBLE_LABEL_CLASS: &str = "woot-widget-bubble__label";
pub const WITHOUT_BUBBLE_CLASS: &str = "woot-widget--without-bubble";
pub const UNREAD_VIEW_CLASS: &str = "has-unread-view";
pub const STYLESHEET_ID: &str = "chattlin-widget-styles";

const BUBBLE_ICON_SRC: &str = "data:image/svg+xml;utf8,\
<svg xmlns='http://www.w3.org/2000/svg' width='24' height='24' viewBox='0 0 24 24'>\
<path fill='%23fff' d='M12 3C6.5 3 2 6.6 2 11c0 2.4 1.3 4.6 3.5 6.1L4.6 21l4.3-2.4c1 .3 2 .4 3.1.4 \
5.5 0 10-3.6 10-8s-4.5-8-10-8z'/></svg>";

const STYLESHEET: &str = "\
.woot-widget-holder{position:fixed;bottom:104px;z-index:2147483000;width:400px;\
height:calc(85% - 64px - 20px);max-height:590px;min-height:250px;overflow:auto;\
border-radius:16px;box-shadow:0 5px 40px rgba(0,0,0,.16);transition:opacity .2s,transform .2s}\
.woot-widget-holder iframe{width:100%;height:100%;border:0}\
.woot-widget-holder.woot-widget--without-bubble{bottom:20px}\
.woot-widget-holder.has-unread-view{box-shadow:none;background:transparent}\
.woot-elements--left{left:20px}\
.woot-elements--right{right:20px}\
.woot-widget-bubble{position:fixed;bottom:20px;z-index:2147483000;width:64px;height:64px;\
border-radius:100px;cursor:pointer;display:flex;align-items:center;justify-content:center;\
box-shadow:0 8px 24px rgba(0,0,0,.16)}\
.woot-widget-bubble img{width:24px;height:24px}\
.woot-widget-bubble__label{color:#fff;margin-left:8px;font:500 14px sans-serif}\
.woot-widget-bubble__label:empty{display:none}\
.woot--notification{position:absolute;top:0;right:0;width:12px;height:12px;border-radius:50%;\
background:#ff4040;display:none}\
.woot--hide{visibility:hidden!important;opacity:0;transform:translateY(40px)}\
@media only screen and (max-width:667px){.woot-widget-holder{top:0;right:0;left:0;bottom:0;\
width:100%;height:100%;max-height:100%;border-radius:0}}";

/// Holder class list for a freshly created frame: hidden, anchored to the
/// configured side, and marked when the launcher is suppressed.
pub fn holder_class_name(config: &WidgetConfig) -> String {
    let mut class_name = format!(
        "{WIDGET_HOLDER_CLASS} {HIDE_CLASS} {}",
        position_class(config.position)
    );
    if config.hide_message_bubble {
        class_name.push(' ');
        class_name.push_str(WITHOUT_BUBBLE_CLASS);
    }
    class_name
}

pub fn position_class(position: Position) -> String {
    format!("woot-elements--{position}")
}

/// Handles to the widget chrome created on the host page.
#[derive(Debug)]
pub struct BubbleController<E> {
    widget_holder: Option<E>,
    bubble_holder: Option<E>,
    chat_bubble: Option<E>,
    close_bubble: Option<E>,
    label: Option<E>,
}

impl<E> Default for BubbleController<E> {
    fn default() -> Self {
        Self {
            widget_holder: None,
            bubble_holder: None,
            chat_bubble: None,
            close_bubble: None,
            label: None,
        }
    }
}

impl<E: Clone> BubbleController<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The holder wrapping the frame, created on first use.
    pub fn ensure_widget_holder<D>(&mut self, doc: &D) -> Option<E>
    where
        D: Document<Element = E>,
    {
        if self.widget_holder.is_none() {
            self.widget_holder = doc.create_element("div");
        }
        self.widget_holder.clone()
    }

    pub fn widget_holder(&self) -> Option<&E> {
        self.widget_holder.as_ref()
    }

    /// Inject the widget stylesheet into `<head>` once.
    pub fn load_stylesheet<D>(&self, doc: &D)
    where
        D: Document<Element = E>,
    {
        if doc.element_by_id(STYLESHEET_ID).is_some() {
            return;
        }
        let (Some(head), Some(style)) = (doc.head(), doc.create_element("style")) else {
            debug!("document has no head; widget stylesheet not loaded");
            return;
        };
        doc.set_id(&style, STYLESHEET_ID);
        doc.set_text(&style, STYLESHEET);
        doc.append_child(&head, &style);
    }

    /// Whether a bubble holder is already on the page, whoever created it.
    pub fn has_bubble_holder<D>(&self, doc: &D) -> bool
    where
        D: Document<Element = E>,
    {
        doc.first_by_class(BUBBLE_HOLDER_CLASS).is_some()
    }

    pub fn create_bubble_holder<D>(&mut self, doc: &D)
    where
        D: Document<Element = E>,
    {
        let (Some(body), Some(holder)) = (doc.body(), doc.create_element("div")) else {
            return;
        };
        doc.add_class(&holder, BUBBLE_HOLDER_CLASS);
        doc.append_child(&body, &holder);
        self.bubble_holder = Some(holder);
    }

    /// Build the chat bubble, close bubble and unread badge inside the bubble
    /// holder, painted in the channel's widget color.
    pub fn build_bubbles<D>(&mut self, doc: &D, position: Position, widget_color: Option<&str>)
    where
        D: Document<Element = E>,
    {
        let Some(holder) = self.bubble_holder.clone() else {
            debug!("bubble holder missing; launcher not built");
            return;
        };
        let (Some(chat), Some(icon), Some(label), Some(close), Some(badge)) = (
            doc.create_element("button"),
            doc.create_element("img"),
            doc.create_element("span"),
            doc.create_element("button"),
            doc.create_element("span"),
        ) else {
            return;
        };

        let side = position_class(position);
        doc.add_class(&chat, &format!("{BUBBLE_CLASS} {side}"));
        doc.set_attribute(&icon, "src", BUBBLE_ICON_SRC);
        doc.set_attribute(&icon, "alt", "");
        doc.add_class(&label, BUBBLE_LABEL_CLASS);
        doc.append_child(&chat, &icon);
        doc.append_child(&chat, &label);

        doc.add_class(&close, &format!("{side} {BUBBLE_CLASS} {CLOSE_CLASS} {HIDE_CLASS}"));
        doc.set_attribute(&close, "aria-label", "Close chat");

        if let Some(color) = widget_color {
            doc.set_style(&chat, "background", color);
            doc.set_style(&close, "background", color);
        }

        doc.add_class(&badge, NOTIFICATION_CLASS);

        doc.append_child(&holder, &chat);
        doc.append_child(&holder, &close);
        doc.append_child(&holder, &badge);

        self.chat_bubble = Some(chat);
        self.close_bubble = Some(close);
        self.label = Some(label);
    }

    /// Show `text` next to the chat bubble icon.
    pub fn set_text<D>(&self, doc: &D, text: &str)
    where
        D: Document<Element = E>,
    {
        let (Some(chat), Some(label)) = (&self.chat_bubble, &self.label) else {
            debug!("launcher not built; bubble label dropped");
            return;
        };
        doc.set_text(label, text);
        doc.set_attribute(chat, "title", text);
    }

    /// Move the launcher to `requested` (or flip it when `None`).
    ///
    /// Returns the new open state, or `None` when the widget is already in
    /// the requested state and nothing changed.
    pub fn toggle<D>(&self, doc: &D, is_open: bool, requested: Option<bool>) -> Option<bool>
    where
        D: Document<Element = E>,
    {
        let next = requested.unwrap_or(!is_open);
        if next == is_open {
            return None;
        }
        for element in [&self.chat_bubble, &self.close_bubble, &self.widget_holder]
            .into_iter()
            .flatten()
        {
            doc.toggle_class(element, HIDE_CLASS);
        }
        Some(next)
    }

    pub fn mark_unread<D>(&self, doc: &D)
    where
        D: Document<Element = E>,
    {
        if let Some(holder) = &self.widget_holder {
            doc.add_class(holder, UNREAD_VIEW_CLASS);
        }
    }

    pub fn clear_unread<D>(&self, doc: &D)
    where
        D: Document<Element = E>,
    {
        if let Some(holder) = &self.widget_holder {
            doc.remove_class(holder, UNREAD_VIEW_CLASS);
        }
    }

    pub fn is_built(&self) -> bool {
        self.chat_bubble.is_some()
    }
}
