// src/connectors/console.rs
use crate::connectors::traits::{ChatChannel, MessageStream};
use crate::types::{InboundMessage, OutboundMessage};
use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Local chat transport: stdin lines are messages from a single user, replies go to stdout.
pub struct ConsoleChannel {
    user_id: i64,
}

impl ConsoleChannel {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

pub fn render(message: &OutboundMessage) -> String {
    let mut out = message.text.clone();
    if let Some(keyboard) = &message.keyboard {
        for row in &keyboard.0 {
            let buttons: Vec<String> = row.iter().map(|b| format!("[{}]", b)).collect();
            out.push('\n');
            out.push_str(&buttons.join(" "));
        }
    }
    out
}

#[async_trait]
impl ChatChannel for ConsoleChannel {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        println!("{}\n", render(&message));
        Ok(())
    }
}

#[async_trait]
impl MessageStream for ConsoleChannel {
    async fn subscribe_messages(&mut self, sender: mpsc::Sender<InboundMessage>) -> Result<()> {
        let user_id = self.user_id;
        info!(user_id, "Reading chat messages from stdin");

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let text = line.trim();
                        if text.is_empty() {
                            continue;
                        }
                        let msg = InboundMessage::new(user_id, user_id, text);
                        if sender.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to read stdin");
                        break;
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
    use crate::types::Keyboard;

    #[test]
    fn renders_keyboard_rows_under_text() {
        let msg = OutboundMessage::with_keyboard(0, "Choose an action:", Keyboard::trade_menu());
        assert_eq!(
            render(&msg),
            "Choose an action:\n[/balance] [/buy]\n[/sell] [/grid_strategy]"
        );
    }
}
