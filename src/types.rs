// src/types.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbols the ledger accepts for trading.
pub const TRADABLE_SYMBOLS: [&str; 10] = [
    "BTC-USDT", "ETH-USDT", "XRP-USDT", "TON-USDT", "LTC-USDT", "BCH-USDT", "ADA-USDT",
    "DOT-USDT", "SOL-USDT", "DOGE-USDT",
];

/// Static "popular assets" list shown by /assets. Not the same set as TRADABLE_SYMBOLS.
pub const POPULAR_ASSETS: [&str; 10] = [
    "BTC-USDT", "ETH-USDT", "XRP-USDT", "LTC-USDT", "BCH-USDT", "TON-USDT", "DOT-USDT",
    "SOL-USDT", "DOGE-USDT", "LINK-USDT",
];

pub fn popular_assets() -> Vec<String> {
    POPULAR_ASSETS.iter().map(|s| s.to_string()).collect()
}

pub type UserId = i64;
pub type ChatId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Advice(Side, Decimal),
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub amount: Decimal,
    pub entry_price: Decimal,
}

impl Position {
    /// What selling the whole position at `price` would credit to capital.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.amount * price / self.entry_price
    }

    pub fn cost_value(&self) -> Decimal {
        self.amount * self.entry_price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub positions: Vec<Position>,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuedPosition {
    pub position: Position,
    /// None when the price lookup for this symbol failed.
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub capital: Decimal,
    pub positions: Vec<ValuedPosition>,
    pub total_value: Decimal,
}

// --- Chat transport ---

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(chat_id: ChatId, user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            user_id,
            username: None,
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// Reply keyboard: rows of button labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard(pub Vec<Vec<String>>);

impl Keyboard {
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self(
            rows.iter()
                .map(|row| row.iter().map(|b| b.to_string()).collect())
                .collect(),
        )
    }

    pub fn main_menu() -> Self {
        Self::from_rows(&[&["/trade", "/assets"], &["/price"]])
    }

    pub fn trade_menu() -> Self {
        Self::from_rows(&[&["/balance", "/buy"], &["/sell", "/grid_strategy"]])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(chat_id: ChatId, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}
