// src/error.rs
use rust_decimal::Decimal;
use thiserror::Error;

/// Bad user input. The conversation stays in the same state and re-prompts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("insufficient capital: requested {requested}, available {available}")]
    InsufficientCapital {
        requested: Decimal,
        available: Decimal,
    },

    #[error("insufficient quantity of {symbol}: requested {requested}, held {held}")]
    InsufficientQuantity {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("no position in {0}")]
    PositionNotFound(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    #[error("rate limited by market data provider")]
    RateLimited,

    #[error("market data provider returned HTTP {0}")]
    Status(u16),

    #[error("market data request failed: {0}")]
    Request(String),

    #[error("malformed price response: {0}")]
    Malformed(String),

    #[error("no price found for {0}")]
    NotFound(String),

    #[error("could not fetch price after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

impl PriceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PriceError::RateLimited)
    }
}

impl From<reqwest::Error> for PriceError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) if status.as_u16() == 429 => PriceError::RateLimited,
            Some(status) => PriceError::Status(status.as_u16()),
            None if e.is_decode() => PriceError::Malformed(e.to_string()),
            None => PriceError::Request(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Price(#[from] PriceError),
}
