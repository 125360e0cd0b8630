//! Key-value store CLI subcommands.
//!
//! The store is shared with the services: the version job writes
//! `LATEST_CHATTLIN_VERSION` and `LAST_VERSION_CHECK_AT` here. Values support
//! arbitrary JSON.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chattlin_core::storage::KvStore;

use crate::state::AppState;

/// Key-value store subcommands.
#[derive(Subcommand)]
pub enum KvCommand {
    /// Set a key-value pair (value is JSON).
    Set {
        key: String,

        /// JSON value (string, number, object, array, boolean, null).
        value: String,
    },

    /// Get a value by key.
    Get { key: String },

    /// Delete a key-value pair.
    Delete { key: String },

    /// List all keys with a value preview.
    List,
}

pub async fn handle_kv_command(cmd: KvCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        KvCommand::Set { key, value } => kv_set(state, &key, &value, json).await,
        KvCommand::Get { key } => kv_get(state, &key, json).await,
        KvCommand::Delete { key } => kv_delete(state, &key, json).await,
        KvCommand::List => kv_list(state, json).await,
    }
}

/// Parse a CLI value as JSON, falling back to a JSON string.
///
/// `chattlin kv set name Alice` stores `"Alice"`, while
/// `chattlin kv set limits '{"max":3}'` stores the object.
pub fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Single-line preview, cut at 60 characters.
pub fn preview(value: &serde_json::Value) -> String {
    let text = value.to_string();
    if text.chars().count() > 60 {
        let cut: String = text.chars().take(57).collect();
        format!("{cut}...")
    } else {
        text
    }
}

async fn kv_set(state: &AppState, key: &str, raw: &str, json: bool) -> Result<()> {
    let value = parse_value(raw);
    state.kv_store.set(key, &value).await?;

    if json {
        let result = serde_json::json!({ "key": key, "value": value });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!("  {} Set '{}'", style("ok").green(), style(key).cyan());
        println!();
    }
    Ok(())
}

async fn kv_get(state: &AppState, key: &str, json: bool) -> Result<()> {
    let value = state.kv_store.get(key).await?;

    if json {
        let result = serde_json::json!({ "key": key, "value": value });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    match value {
        Some(val) => println!(
            "  {} = {}",
            style(key).cyan().bold(),
            style(serde_json::to_string_pretty(&val)?).white(),
        ),
        None => println!(
            "  {} Key '{}' not found",
            style("i").blue().bold(),
            style(key).cyan(),
        ),
    }
    println!();
    Ok(())
}

async fn kv_delete(state: &AppState, key: &str, json: bool) -> Result<()> {
    state.kv_store.delete(key).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "deleted": key }))?);
    } else {
        println!();
        println!("  {} Deleted key '{}'", style("ok").green(), style(key).cyan());
        println!();
    }
    Ok(())
}

async fn kv_list(state: &AppState, json: bool) -> Result<()> {
    let keys = state.kv_store.list_keys().await?;

    if json {
        let result = serde_json::json!({ "keys": keys, "count": keys.len() });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if keys.is_empty() {
        println!();
        println!("  {} The store is empty.", style("i").blue().bold());
        println!("     Set a value with: chattlin kv set <key> <json-value>");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Value").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for key in &keys {
        let (value, updated) = match state.kv_store.get_entry(key).await {
            Ok(Some(entry)) => (
                preview(&entry.value),
                entry.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ),
            Ok(None) => ("(deleted)".to_string(), String::new()),
            Err(_) => ("(error)".to_string(), String::new()),
        };
        table.add_row(vec![
            Cell::new(key).fg(Color::Cyan),
            Cell::new(&value).fg(Color::DarkGrey),
            Cell::new(&updated).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("  Store keys ({} entries)", keys.len());
    println!();
    println!("{table}");
    println!();
    Ok(())
}
