// src/connectors/stub.rs
use crate::connectors::traits::PriceSource;
use crate::error::PriceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Scripted price source for tests. Queued responses for a symbol are served first;
/// after that the fixed price (if any) is returned, otherwise NotFound.
#[derive(Default)]
pub struct StubPrices {
    fixed: Mutex<HashMap<String, Decimal>>,
    scripted: Mutex<HashMap<String, VecDeque<Result<Decimal, PriceError>>>>,
    calls: AtomicU32,
}

impl StubPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, symbol: &str, price: i64) -> Self {
        self.set_price(symbol, Decimal::from(price));
        self
    }

    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.fixed.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn push(&self, symbol: &str, response: Result<Decimal, PriceError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for StubPrices {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(queue) = self.scripted.lock().unwrap().get_mut(symbol) {
            if let Some(response) = queue.pop_front() {
                return response;
            }
        }
        self.fixed
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| PriceError::NotFound(symbol.to_string()))
    }
}
