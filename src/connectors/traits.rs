use crate::error::PriceError;
use crate::types::{InboundMessage, OutboundMessage};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

/// Market data. Implementations make a single attempt; callers own the retry policy.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, PriceError>;
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<()>;
}

/// Inbound side of the chat transport. Spawns its own task and forwards
/// every text message into `sender` until the channel closes.
#[async_trait]
pub trait MessageStream: Send + Sync {
    async fn subscribe_messages(&mut self, sender: mpsc::Sender<InboundMessage>) -> Result<()>;
}
