//! Relay tooling: encode and decode host/frame messages, and replay a
//! scripted frame conversation against an in-memory host page.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use console::style;
use serde::Serialize;

use chattlin_types::relay::OutboundMessage;
use chattlin_types::widget::WidgetConfig;
use chattlin_widget::dom::MemoryDocument;
use chattlin_widget::relay::{RecordingTransport, RelayStats, encode};
use chattlin_widget::session::MemoryCookieJar;
use chattlin_widget::{LifecycleState, WidgetController, WidgetRuntime};

use crate::http::handlers::relay::DecodeReport;

#[derive(Subcommand)]
pub enum RelayCommand {
    /// Decode a raw cross-window message the way the host page would.
    Decode { raw: String },

    /// Encode a host-to-frame message.
    Encode {
        /// Wire tag, e.g. `toggle-open` or `set-user`.
        tag: String,

        /// JSON object with the message fields (camelCase).
        payload: Option<String>,
    },

    /// Create a widget on an in-memory page and feed it frame messages in
    /// order, printing what the host posts back.
    Simulate {
        #[arg(long, default_value = "https://app.chattlin.com")]
        base_url: String,

        #[arg(long, default_value = "demo-website-token")]
        website_token: String,

        #[arg(long, default_value_t = 1280.0)]
        viewport_width: f64,

        #[arg(long)]
        hide_message_bubble: bool,

        /// Raw inbound messages, e.g.
        /// `chattlin-widget:{"event":"loaded","config":{"authToken":"t"}}`.
        messages: Vec<String>,
    },
}

pub fn handle_relay_command(cmd: RelayCommand, json: bool) -> Result<()> {
    match cmd {
        RelayCommand::Decode { raw } => decode_message(&raw, json),
        RelayCommand::Encode { tag, payload } => encode_message(&tag, payload.as_deref(), json),
        RelayCommand::Simulate {
            base_url,
            website_token,
            viewport_width,
            hide_message_bubble,
            messages,
        } => {
            let mut config = WidgetConfig::new(base_url, website_token);
            config.hide_message_bubble = hide_message_bubble;
            let report = simulate(config, viewport_width, &messages);
            print_simulation(&report, json)
        }
    }
}

fn decode_message(raw: &str, json: bool) -> Result<()> {
    let report = DecodeReport::for_data(Some(raw));
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    match (&report.event, &report.ignored) {
        (Some(event), _) => {
            println!("  {} dispatches '{}'", style("ok").green(), style(event).cyan());
            println!("{}", serde_json::to_string_pretty(&report.message)?);
        }
        (None, Some(reason)) => println!(
            "  {} ignored: {}",
            style("i").blue().bold(),
            serde_json::to_string(reason)?,
        ),
        (None, None) => {}
    }
    println!();
    Ok(())
}

/// Build an outbound message from its tag and a JSON field object.
pub fn outbound_from_parts(tag: &str, payload: Option<&str>) -> Result<OutboundMessage> {
    let mut value: serde_json::Value = match payload {
        Some(raw) => serde_json::from_str(raw).context("payload is not valid JSON")?,
        None => serde_json::json!({}),
    };
    let Some(object) = value.as_object_mut() else {
        bail!("payload must be a JSON object");
    };
    object.insert("event".to_string(), serde_json::Value::String(tag.to_string()));
    serde_json::from_value(value).with_context(|| format!("not a valid '{tag}' message"))
}

fn encode_message(tag: &str, payload: Option<&str>, json: bool) -> Result<()> {
    let message = outbound_from_parts(tag, payload)?;
    let encoded = encode(&message)?;
    if json {
        let result = serde_json::json!({ "event": message.tag(), "encoded": encoded });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{encoded}");
    }
    Ok(())
}

/// One inbound message and the host's reaction.
#[derive(Debug, Serialize)]
pub struct SimulationStep {
    pub input: String,
    pub dispatched: bool,
    pub posted: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    /// Messages posted while the frame was created, before any input.
    pub on_create: Vec<serde_json::Value>,
    pub steps: Vec<SimulationStep>,
    pub state: LifecycleState,
    pub runtime: WidgetRuntime,
    pub stats: RelayStats,
    pub window_events: Vec<String>,
}

pub fn simulate(config: WidgetConfig, viewport_width: f64, messages: &[String]) -> SimulationReport {
    let transport = RecordingTransport::new();
    let mut controller = WidgetController::new(
        config,
        MemoryDocument::new(viewport_width),
        MemoryCookieJar::new(),
        transport.clone(),
    );

    controller.create_frame();
    let on_create = transport.sent_json();
    transport.clear();

    let steps = messages
        .iter()
        .map(|raw| {
            let dispatched = controller.handle_message(Some(raw));
            let posted = transport.sent_json();
            transport.clear();
            SimulationStep {
                input: raw.clone(),
                dispatched,
                posted,
            }
        })
        .collect();

    SimulationReport {
        on_create,
        steps,
        state: controller.state(),
        runtime: controller.runtime(),
        stats: controller.relay_stats(),
        window_events: controller.document().window_events(),
    }
}

fn print_simulation(report: &SimulationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    for (index, step) in report.steps.iter().enumerate() {
        let marker = if step.dispatched {
            style("->").green()
        } else {
            style("--").dim()
        };
        println!("  {} [{}] {}", marker, index + 1, style(&step.input).dim());
        for posted in &step.posted {
            println!("       {} {}", style("post").cyan(), posted);
        }
    }
    println!();
    println!(
        "  state {:?}  loaded {}  open {}",
        report.state, report.runtime.has_loaded, report.runtime.is_open
    );
    println!(
        "  dispatched {}  ignored {}  send failures {}",
        report.stats.dispatched,
        report.stats.ignored(),
        report.stats.send_failures
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_from_parts() {
        let message = outbound_from_parts("toggle-open", Some(r#"{"isOpen":true}"#)).unwrap();
        assert_eq!(message, OutboundMessage::ToggleOpen { is_open: true });

        let message = outbound_from_parts("set-unread-view", None).unwrap();
        assert_eq!(message, OutboundMessage::SetUnreadView);

        assert!(outbound_from_parts("toggle-open", Some("[1]")).is_err());
        assert!(outbound_from_parts("no-such-event", None).is_err());
        assert!(outbound_from_parts("toggle-open", Some("{}")).is_err());
    }

    #[test]
    fn test_simulate_loaded_then_unread() {
        let messages = vec![
            r#"chattlin-widget:{"event":"loaded","config":{"authToken":"tok-1"}}"#.to_string(),
            r#"chattlin-widget:{"event":"setUnreadMode","unreadMessageCount":2}"#.to_string(),
            r#"{"unrelated":true}"#.to_string(),
        ];
        let report = simulate(
            WidgetConfig::new("https://app.chattlin.com", "tok"),
            1280.0,
            &messages,
        );

        assert_eq!(report.state, LifecycleState::Loaded);
        assert!(report.runtime.has_loaded);
        assert!(report.steps[0].dispatched);
        assert!(
            report.steps[0]
                .posted
                .iter()
                .any(|m| m["event"] == "config-set")
        );
        let unread_views = report.steps[1]
            .posted
            .iter()
            .filter(|m| m["event"] == "set-unread-view")
            .count();
        assert_eq!(unread_views, 1);
        assert!(!report.steps[2].dispatched);
        assert_eq!(report.stats.dispatched, 2);
        assert_eq!(report.stats.missing_marker, 1);
        assert!(report.window_events.contains(&"chattlin:ready".to_string()));
    }
}
