// src/strategies/traits.rs
use crate::types::{Position, Signal};
use rust_decimal::Decimal;

pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Decide against the current price and the open position for the symbol, if any.
    fn evaluate(&self, price: Decimal, position: Option<&Position>) -> Signal;
}
