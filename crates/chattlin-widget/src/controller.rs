//! Widget lifecycle controller.
//!
//! [`WidgetController`] is the top-level orchestrator on the host page. It
//! creates the frame, owns the runtime flags (`has_loaded`, `is_open`) and
//! dispatches every decoded inbound message with an exhaustive match.
//!
//! Lifecycle: `Uninitialized -> FrameCreated -> Loaded`. Frame creation is
//! idempotent; the `loaded` event from the frame completes the transition.

use chattlin_types::identity::DashboardUser;
use chattlin_types::relay::{BubbleState, InboundMessage, LoadedConfig, OutboundMessage};
use chattlin_types::session::SessionToken;
use chattlin_types::widget::{FRAME_ELEMENT_ID, READY_EVENT, TRIGGERED_EVENT, WidgetConfig, WidgetUser};
use serde::Serialize;
use tracing::{debug, info};

use crate::bubble::{BubbleController, holder_class_name};
use crate::dom::{Document, PageListener};
use crate::relay::{FrameTransport, Relay, RelayStats};
use crate::session::{CookieJar, SessionCookies};
use crate::viewport::shows_close_button;

/// Where the widget is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Uninitialized,
    FrameCreated,
    Loaded,
}

/// Runtime flags mutated only by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WidgetRuntime {
    pub has_loaded: bool,
    pub is_open: bool,
}

/// Widget source URL for `config`, resuming `session` when present.
pub fn widget_url(config: &WidgetConfig, session: Option<&SessionToken>) -> String {
    let mut url = format!(
        "{}/widget?website_token={}",
        config.base_url.trim_end_matches('/'),
        urlencoding::encode(&config.website_token)
    );
    if let Some(token) = session {
        url.push_str("&cw_conversation=");
        url.push_str(&urlencoding::encode(token.as_str()));
    }
    url
}

/// Orchestrates the widget on one host page.
pub struct WidgetController<D: Document, C, T> {
    config: WidgetConfig,
    doc: D,
    cookies: SessionCookies<C>,
    relay: Relay<T>,
    bubbles: BubbleController<D::Element>,
    runtime: WidgetRuntime,
    state: LifecycleState,
    user: Option<WidgetUser>,
    custom_attributes: serde_json::Map<String, serde_json::Value>,
}

impl<D, C, T> WidgetController<D, C, T>
where
    D: Document,
    C: CookieJar,
    T: FrameTransport,
{
    pub fn new(config: WidgetConfig, doc: D, jar: C, transport: T) -> Self {
        Self {
            config,
            doc,
            cookies: SessionCookies::new(jar),
            relay: Relay::new(transport),
            bubbles: BubbleController::new(),
            runtime: WidgetRuntime::default(),
            state: LifecycleState::Uninitialized,
            user: None,
            custom_attributes: serde_json::Map::new(),
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn runtime(&self) -> WidgetRuntime {
        self.runtime
    }

    pub fn relay_stats(&self) -> RelayStats {
        self.relay.stats()
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Create the hidden widget frame and wire the page listeners.
    ///
    /// Returns `false` without touching the page when a frame already
    /// exists.
    pub fn create_frame(&mut self) -> bool {
        if self.doc.element_by_id(FRAME_ELEMENT_ID).is_some() {
            debug!("widget frame already present");
            return false;
        }
        let Some(body) = self.doc.body() else {
            debug!("document has no body; widget frame not created");
            return false;
        };
        let (Some(iframe), Some(holder)) = (
            self.doc.create_element("iframe"),
            self.bubbles.ensure_widget_holder(&self.doc),
        ) else {
            return false;
        };

        self.bubbles.load_stylesheet(&self.doc);

        let session = self.cookies.read();
        let src = widget_url(&self.config, session.as_ref());
        self.doc.set_attribute(&iframe, "src", &src);
        self.doc.set_id(&iframe, FRAME_ELEMENT_ID);
        self.doc.set_style(&iframe, "visibility", "hidden");

        self.doc.add_class(&holder, &holder_class_name(&self.config));
        self.doc.append_child(&holder, &iframe);
        self.doc.append_child(&body, &holder);

        self.doc.listen(PageListener::WindowMessage);
        self.doc.listen(PageListener::WindowResize);
        self.doc.listen(PageListener::HolderWheel);

        self.state = LifecycleState::FrameCreated;
        info!(
            position = %self.config.position,
            resumed = session.is_some(),
            "widget frame created"
        );
        true
    }

    /// Entry point for window `message` events. Returns whether the data
    /// was a relay message that got dispatched.
    pub fn handle_message(&mut self, data: Option<&str>) -> bool {
        match self.relay.receive(data) {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Run the handler for one decoded inbound message.
    pub fn dispatch(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::Loaded { config } => self.on_loaded(config),
            InboundMessage::SetBubbleLabel { label } => self.set_bubble_label(&label),
            InboundMessage::ToggleBubble { state } => {
                let requested = state.map(|s| s == BubbleState::Open);
                self.toggle_bubble(requested);
            }
            InboundMessage::OnBubbleToggle { is_open } => self.on_bubble_toggle(is_open),
            InboundMessage::OnLocationChange {
                referrer_url,
                referrer_host,
            } => self.on_location_change(referrer_url, referrer_host),
            InboundMessage::SetUnreadMode {
                unread_message_count,
            } => self.set_unread_mode(unread_message_count),
            InboundMessage::SetCampaignMode => self.set_campaign_mode(),
            InboundMessage::UpdateIframeHeight {
                extra_height,
                is_fixed_height,
            } => self.update_frame_height(extra_height, is_fixed_height),
            InboundMessage::ResetUnreadMode => self.reset_unread_mode(),
            InboundMessage::RemoveUnreadClass => self.bubbles.clear_unread(&self.doc),
            InboundMessage::CloseChat => self.toggle_bubble(Some(false)),
        }
    }

    fn on_loaded(&mut self, config: LoadedConfig) {
        if let Some(token) = SessionToken::new(config.auth_token) {
            self.cookies.persist(&token);
        }
        self.runtime.has_loaded = true;
        self.state = LifecycleState::Loaded;

        self.relay.send(&OutboundMessage::ConfigSet {
            locale: self.config.locale.clone(),
            position: self.config.position,
            hide_message_bubble: self.config.hide_message_bubble,
            show_popout_button: self.config.show_popout_button,
        });
        self.reveal(config.channel_config.widget_color.as_deref());
        self.toggle_close_button();

        if let Some(user) = self.user.clone() {
            self.relay.send(&OutboundMessage::SetUser(user));
        }
        if !self.custom_attributes.is_empty() {
            self.relay.send(&OutboundMessage::SetCustomAttributes {
                custom_attributes: self.custom_attributes.clone(),
            });
        }

        self.doc.dispatch_window_event(READY_EVENT);
        info!("widget loaded");
    }

    /// Show the frame and build the launcher the first time round.
    fn reveal(&mut self, widget_color: Option<&str>) {
        if let Some(frame) = self.doc.element_by_id(FRAME_ELEMENT_ID) {
            self.doc.set_style(&frame, "visibility", "");
        }
        if self.bubbles.has_bubble_holder(&self.doc) {
            return;
        }
        self.bubbles.create_bubble_holder(&self.doc);
        self.doc.listen(PageListener::LocationChange);
        if !self.config.hide_message_bubble {
            self.bubbles
                .build_bubbles(&self.doc, self.config.position, widget_color);
            self.doc.listen(PageListener::BubbleClick);
        }
    }

    fn set_bubble_label(&mut self, label: &str) {
        if self.config.hide_message_bubble {
            return;
        }
        let text = self.config.launcher_title.as_deref().unwrap_or(label);
        self.bubbles.set_text(&self.doc, text);
    }

    /// Open, close (`Some`) or flip (`None`) the widget.
    pub fn toggle_bubble(&mut self, requested: Option<bool>) {
        let Some(is_open) = self
            .bubbles
            .toggle(&self.doc, self.runtime.is_open, requested)
        else {
            return;
        };
        self.runtime.is_open = is_open;
        self.on_bubble_toggle(is_open);
    }

    fn on_bubble_toggle(&mut self, is_open: bool) {
        self.relay.send(&OutboundMessage::ToggleOpen { is_open });
        if is_open {
            self.relay.send(&OutboundMessage::PushEvent {
                event_name: TRIGGERED_EVENT.to_string(),
            });
        } else {
            self.reset_unread_mode();
        }
    }

    fn set_unread_mode(&mut self, unread_message_count: u32) {
        if self.runtime.is_open || unread_message_count == 0 {
            return;
        }
        self.relay.send(&OutboundMessage::SetUnreadView);
        self.toggle_bubble(Some(true));
        self.bubbles.mark_unread(&self.doc);
    }

    fn set_campaign_mode(&mut self) {
        if self.runtime.is_open {
            return;
        }
        self.toggle_bubble(Some(true));
        self.bubbles.mark_unread(&self.doc);
    }

    fn reset_unread_mode(&mut self) {
        self.relay.send(&OutboundMessage::UnsetUnreadView);
        self.bubbles.clear_unread(&self.doc);
    }

    fn update_frame_height(&mut self, extra_height: Option<f64>, is_fixed_height: bool) {
        let Some(height) = extra_height.filter(|h| *h != 0.0 && !h.is_nan()) else {
            return;
        };
        let Some(frame) = self.doc.element_by_id(FRAME_ELEMENT_ID) else {
            return;
        };
        let value = if is_fixed_height {
            format!("{height}px")
        } else {
            "100%".to_string()
        };
        self.doc
            .set_attribute(&frame, "style", &format!("height: {value} !important"));
    }

    /// Tell the frame whether to draw its own close button for the current
    /// viewport width.
    pub fn toggle_close_button(&mut self) {
        let show_close = shows_close_button(self.doc.viewport_width());
        self.relay
            .send(&OutboundMessage::ToggleCloseButton { show_close });
    }

    pub fn on_resize(&mut self) {
        self.toggle_close_button();
    }

    /// Wheel event on the widget holder. Returns `true` when the event must
    /// be cancelled to keep the host page from scrolling.
    pub fn on_wheel(&self, delta_y: f64) -> bool {
        let Some(holder) = self.bubbles.widget_holder() else {
            return false;
        };
        self.doc.scroll_metrics(holder).should_contain(delta_y)
    }

    pub fn on_bubble_click(&mut self) {
        self.toggle_bubble(None);
    }

    /// The host page navigated; forward the new location to the frame.
    pub fn on_location_change(&mut self, referrer_url: String, referrer_host: String) {
        self.relay.send(&OutboundMessage::ChangeUrl {
            referrer_url,
            referrer_host,
        });
    }

    /// Identify the visitor. Sent now if the frame has loaded, otherwise as
    /// soon as it does.
    pub fn set_user(&mut self, user: WidgetUser) {
        if self.runtime.has_loaded {
            self.relay.send(&OutboundMessage::SetUser(user.clone()));
        }
        self.user = Some(user);
    }

    /// Merge contact attributes. Sent now if loaded, otherwise on load.
    pub fn set_custom_attributes(
        &mut self,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) {
        if self.runtime.has_loaded {
            self.relay.send(&OutboundMessage::SetCustomAttributes {
                custom_attributes: attributes.clone(),
            });
        }
        self.custom_attributes.extend(attributes);
    }

    /// Identify a signed-in dashboard user as the widget visitor.
    pub fn identify_dashboard_user(&mut self, user: &DashboardUser) {
        self.set_user(user.to_widget_user());
        self.set_custom_attributes(user.widget_attributes());
    }

    /// Forget the visitor: drop the conversation cookie and staged identity.
    pub fn reset(&mut self) {
        self.cookies.clear();
        self.user = None;
        self.custom_attributes.clear();
        info!("widget session reset");
    }
}
