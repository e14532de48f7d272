// src/core/engine.rs
use crate::connectors::traits::ChatChannel;
use crate::core::dispatcher::Dispatcher;
use crate::core::replies;
use crate::types::{ChatId, InboundMessage, Keyboard, OutboundMessage};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Drains the inbound queue one message at a time. Messages from the same user are
/// therefore handled strictly in arrival order.
pub struct ConversationEngine {
    dispatcher: Dispatcher,
    chat: Arc<dyn ChatChannel>,
    inbound: mpsc::Receiver<InboundMessage>,
}

impl ConversationEngine {
    pub fn new(
        dispatcher: Dispatcher,
        chat: Arc<dyn ChatChannel>,
        inbound: mpsc::Receiver<InboundMessage>,
    ) -> Self {
        Self {
            dispatcher,
            chat,
            inbound,
        }
    }

    pub async fn notify_admin(&self, admin_chat: ChatId) {
        let notice =
            OutboundMessage::with_keyboard(admin_chat, replies::ADMIN_NOTICE, Keyboard::main_menu());
        self.deliver(notice).await;
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Engine loop running");

        while let Some(msg) = self.inbound.recv().await {
            info!(
                user_id = msg.user_id,
                chat_id = msg.chat_id,
                username = msg.username.as_deref().unwrap_or("-"),
                text = %msg.text,
                received_at = %msg.received_at,
                "Message received"
            );

            let replies = self.dispatcher.handle(&msg).await;
            for reply in replies {
                self.deliver(reply).await;
            }
            debug!(sessions = self.dispatcher.sessions().len(), "Message handled");
        }

        info!("Inbound channel closed, engine stopping");
        Ok(())
    }

    async fn deliver(&self, reply: OutboundMessage) {
        let chat_id = reply.chat_id;
        if let Err(e) = self.chat.send(reply).await {
            error!(chat_id, error = %e, "Failed to send reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::stub::StubPrices;
    use crate::core::dispatcher::DispatcherSettings;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<OutboundMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatChannel for RecordingChannel {
        async fn send(&self, message: OutboundMessage) -> Result<()> {
            if self.fail {
                anyhow::bail!("network down");
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn engine(chat: Arc<RecordingChannel>) -> (ConversationEngine, mpsc::Sender<InboundMessage>) {
        let prices = Arc::new(StubPrices::new().with_price("BTC-USDT", 50));
        let dispatcher = Dispatcher::new(prices, DispatcherSettings::default());
        let (tx, rx) = mpsc::channel(16);
        (ConversationEngine::new(dispatcher, chat, rx), tx)
    }

    #[tokio::test]
    async fn replies_in_order_until_channel_closes() {
        let chat = Arc::new(RecordingChannel::default());
        let (mut engine, tx) = engine(chat.clone());

        for text in ["/price", "BTC-USDT", "/start"] {
            tx.send(InboundMessage::new(5, 5, text)).await.unwrap();
        }
        drop(tx);
        engine.run().await.unwrap();

        let sent = chat.sent.lock().unwrap();
        let texts: Vec<&str> = sent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                replies::ASK_PRICE_SYMBOL,
                "Current price for BTC-USDT: 50$",
                replies::STARTED
            ]
        );
        assert!(sent.iter().all(|m| m.chat_id == 5));
    }

    #[tokio::test]
    async fn send_failures_do_not_stop_the_loop() {
        let chat = Arc::new(RecordingChannel {
            fail: true,
            ..Default::default()
        });
        let (mut engine, tx) = engine(chat.clone());

        tx.send(InboundMessage::new(1, 1, "/start")).await.unwrap();
        tx.send(InboundMessage::new(1, 1, "/buy")).await.unwrap();
        drop(tx);

        engine.run().await.unwrap();
        assert!(chat.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_notice_carries_main_menu() {
        let chat = Arc::new(RecordingChannel::default());
        let (engine, _tx) = engine(chat.clone());

        engine.notify_admin(42).await;

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, 42);
        assert_eq!(sent[0].text, replies::ADMIN_NOTICE);
        assert_eq!(sent[0].keyboard, Some(Keyboard::main_menu()));
    }
}
