// discord_notifier.rs - Discord Webhook Integration for Discoveries
// Purpose: Forward every Found / ValidPageUnparsed outcome to a webhook in real time
// Features:
//  - Rich embed with per-file detail (first 5 files)
//  - Aggregate size in MB
//  - Best-effort delivery: failures are logged and discarded

use anyhow::{Context, Result};
use colored::*;
use reqwest::Client;
use serde_json::{json, Value};

use crate::extractor::FileRecord;
use crate::probe::ProbeOutcome;

/// Embed color for discoveries
pub const COLOR_FOUND: u32 = 5814783;

pub const EMBED_TITLE: &str = "🔍 GoFile Scanner - FOUND!";

pub const DEFAULT_USERNAME: &str = "GoFile Scanner";

/// Icon shown as the webhook avatar and embed footer icon
pub const DEFAULT_AVATAR_URL: &str =
    "https://media.discordapp.net/attachments/1369051349106430004/1369054652213231687/RedTiger-Logo-1-Large.png";

/// Files listed individually before collapsing into a summary line
pub const MAX_LISTED_FILES: usize = 5;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Display identity of the webhook messages
#[derive(Debug, Clone)]
pub struct Branding {
    pub username: String,
    pub avatar_url: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            avatar_url: Some(DEFAULT_AVATAR_URL.to_string()),
        }
    }
}

fn to_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

fn field(name: String, value: String, inline: bool) -> Value {
    json!({
        "name": name,
        "value": value,
        "inline": inline
    })
}

fn file_field(file: &FileRecord) -> Value {
    let mut value = format!("Size: {}\n", to_mb(file.size));
    if !file.link.is_empty() {
        value.push_str(&format!("Link: {}\n", file.link));
    }
    value.push_str(&format!("Type: {}", file.mime_type));
    field(format!("📄 {}", file.name), value, false)
}

/// Embed fields describing an outcome
pub fn build_fields(outcome: &ProbeOutcome) -> Vec<Value> {
    match outcome {
        ProbeOutcome::Found {
            files,
            total_files,
            total_size,
            ..
        } => {
            let mut fields = vec![
                field("📁 Files Found".to_string(), total_files.to_string(), true),
                field("💾 Total Size".to_string(), to_mb(*total_size), true),
            ];
            fields.extend(files.iter().take(MAX_LISTED_FILES).map(file_field));
            if files.len() > MAX_LISTED_FILES {
                fields.push(field(
                    "📋 More Files".to_string(),
                    format!("And {} more files...", files.len() - MAX_LISTED_FILES),
                    false,
                ));
            }
            fields
        }
        ProbeOutcome::ValidPageUnparsed { message, .. } => {
            vec![field("📄 Status".to_string(), message.clone(), false)]
        }
        ProbeOutcome::NotFound { .. } => Vec::new(),
    }
}

/// Complete webhook payload for an outcome; `None` for outcomes never notified
pub fn build_payload(outcome: &ProbeOutcome, branding: &Branding) -> Option<Value> {
    if !outcome.is_hit() {
        return None;
    }

    let mut footer = json!({ "text": branding.username });
    if let Some(icon) = &branding.avatar_url {
        footer["icon_url"] = json!(icon);
    }

    let embed = json!({
        "title": EMBED_TITLE,
        "url": outcome.url(),
        "color": COLOR_FOUND,
        "fields": build_fields(outcome),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "footer": footer
    });

    let mut payload = json!({
        "username": branding.username,
        "embeds": [embed]
    });
    if let Some(avatar) = &branding.avatar_url {
        payload["avatar_url"] = json!(avatar);
    }

    Some(payload)
}

/// Send a prepared payload to a Discord webhook
pub async fn send_discord_notification(
    client: &Client,
    webhook_url: &str,
    payload: &Value,
) -> Result<()> {
    let response = client
        .post(webhook_url)
        .json(payload)
        .send()
        .await
        .context("Failed to send Discord notification")?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Discord webhook returned {}",
            response.status()
        ))
    }
}

/// Best-effort notifier bound to one (optional) webhook destination
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    webhook_url: Option<String>,
    branding: Branding,
}

impl Notifier {
    pub fn new(client: Client, webhook_url: Option<String>, branding: Branding) -> Self {
        Self {
            client,
            webhook_url,
            branding,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Deliver an outcome. Never fails; delivery errors are only logged.
    pub async fn notify(&self, outcome: &ProbeOutcome) {
        let Some(webhook_url) = &self.webhook_url else {
            return;
        };
        let Some(payload) = build_payload(outcome, &self.branding) else {
            return;
        };

        if let Err(e) = send_discord_notification(&self.client, webhook_url, &payload).await {
            eprintln!(
                "{}",
                format!("[!] Webhook delivery failed for {}: {}", outcome.url(), e).yellow()
            );
        }
    }
}
