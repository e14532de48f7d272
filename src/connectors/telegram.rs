// src/connectors/telegram.rs
use crate::connectors::messages::{
    KeyboardButton, ReplyKeyboardMarkup, SendMessageRequest, TelegramResponse, TelegramUpdate,
};
use crate::connectors::traits::{ChatChannel, MessageStream};
use crate::types::{InboundMessage, Keyboard, OutboundMessage};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

pub struct TelegramClient {
    http_client: Client,
    api_base: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Self {
        Self {
            http_client: Client::new(),
            api_base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            poll_timeout_secs,
        }
    }

    /// Calls getMe and returns the bot's username.
    pub async fn connect(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct Me {
            username: Option<String>,
        }

        let url = format!("{}/getMe", self.api_base);
        let resp: TelegramResponse<Me> = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Telegram API unreachable")?
            .json()
            .await
            .context("Failed to parse getMe response")?;

        let me = unwrap_result(resp, "getMe")?;
        Ok(me.username.unwrap_or_default())
    }
}

fn unwrap_result<T>(resp: TelegramResponse<T>, method: &str) -> Result<T> {
    if !resp.ok {
        bail!(
            "Telegram {} failed: {}",
            method,
            resp.description.unwrap_or_else(|| "no description".into())
        );
    }
    resp.result
        .ok_or_else(|| anyhow!("Telegram {} returned no result", method))
}

pub fn keyboard_markup(keyboard: &Keyboard) -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup {
        keyboard: keyboard
            .0
            .iter()
            .map(|row| {
                row.iter()
                    .map(|label| KeyboardButton {
                        text: label.clone(),
                    })
                    .collect()
            })
            .collect(),
        resize_keyboard: true,
    }
}

/// Only text messages with a sender become inbound messages.
pub fn into_inbound(update: TelegramUpdate) -> Option<InboundMessage> {
    let message = update.message?;
    let text = message.text?;
    let from = message.from?;

    Some(InboundMessage {
        chat_id: message.chat.id,
        user_id: from.id,
        username: from.username,
        text,
        received_at: DateTime::from_timestamp(message.date, 0).unwrap_or_else(Utc::now),
    })
}

async fn fetch_updates(
    client: &Client,
    url: &str,
    offset: i64,
    timeout_secs: u64,
) -> Result<Vec<TelegramUpdate>> {
    let resp: TelegramResponse<Vec<TelegramUpdate>> = client
        .get(url)
        .query(&[
            ("offset", offset.to_string()),
            ("timeout", timeout_secs.to_string()),
            ("allowed_updates", r#"["message"]"#.to_string()),
        ])
        .timeout(Duration::from_secs(timeout_secs + 10))
        .send()
        .await
        .context("getUpdates request failed")?
        .json()
        .await
        .context("Failed to parse getUpdates response")?;

    unwrap_result(resp, "getUpdates")
}

#[async_trait]
impl ChatChannel for TelegramClient {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        let url = format!("{}/sendMessage", self.api_base);
        let body = SendMessageRequest {
            chat_id: message.chat_id,
            text: &message.text,
            reply_markup: message.keyboard.as_ref().map(keyboard_markup),
        };

        let resp: TelegramResponse<serde_json::Value> = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Telegram API unreachable")?
            .json()
            .await
            .context("Failed to parse sendMessage response")?;

        unwrap_result(resp, "sendMessage")?;
        debug!(chat_id = message.chat_id, "Message sent");
        Ok(())
    }
}

#[async_trait]
impl MessageStream for TelegramClient {
    async fn subscribe_messages(&mut self, sender: mpsc::Sender<InboundMessage>) -> Result<()> {
        let client = self.http_client.clone();
        let url = format!("{}/getUpdates", self.api_base);
        let timeout_secs = self.poll_timeout_secs;

        info!("Starting Telegram long-poll task");

        tokio::spawn(async move {
            let mut offset: i64 = 0;
            loop {
                match fetch_updates(&client, &url, offset, timeout_secs).await {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            if let Some(msg) = into_inbound(update) {
                                if sender.send(msg).await.is_err() {
                                    info!("Engine channel closed, stopping Telegram poller");
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Telegram poll failed");
                        tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    }
                }
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_update_becomes_inbound_message() {
        let raw = r#"{
            "update_id": 42,
            "message": {
                "message_id": 7,
                "from": {"id": 1001, "is_bot": false, "first_name": "A", "username": "alice"},
                "chat": {"id": 5005, "type": "private"},
                "date": 1700000000,
                "text": "/price"
            }
        }"#;
        let update: TelegramUpdate = serde_json::from_str(raw).unwrap();
        let msg = into_inbound(update).unwrap();

        assert_eq!(msg.chat_id, 5005);
        assert_eq!(msg.user_id, 1001);
        assert_eq!(msg.username.as_deref(), Some("alice"));
        assert_eq!(msg.text, "/price");
        assert_eq!(msg.received_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn non_text_update_is_skipped() {
        let raw = r#"{
            "update_id": 43,
            "message": {
                "message_id": 8,
                "from": {"id": 1001},
                "chat": {"id": 5005},
                "date": 1700000000
            }
        }"#;
        let update: TelegramUpdate = serde_json::from_str(raw).unwrap();
        assert!(into_inbound(update).is_none());
    }

    #[test]
    fn keyboard_serializes_as_reply_markup() {
        let markup = keyboard_markup(&Keyboard::main_menu());
        let json = serde_json::to_value(&markup).unwrap();

        assert_eq!(json["resize_keyboard"], true);
        assert_eq!(json["keyboard"][0][0]["text"], "/trade");
        assert_eq!(json["keyboard"][0][1]["text"], "/assets");
        assert_eq!(json["keyboard"][1][0]["text"], "/price");
    }

    #[test]
    fn failed_response_is_an_error() {
        let resp: TelegramResponse<serde_json::Value> =
            serde_json::from_str(r#"{"ok":false,"description":"Unauthorized"}"#).unwrap();
        let err = unwrap_result(resp, "getMe").unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }
}
