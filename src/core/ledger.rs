// src/core/ledger.rs
use crate::connectors::traits::PriceSource;
use crate::error::{LedgerError, TradeError};
use crate::strategies::grid::GridStrategy;
use crate::strategies::traits::Strategy;
use crate::types::{BalanceSnapshot, Position, Side, Signal, Valuation, ValuedPosition};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Total reported by `balance()` for a flat book, whatever the capital is.
/// Live figures come from `mark_to_market`.
pub const EMPTY_BALANCE_PLACEHOLDER: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq)]
pub enum GridOutcome {
    NoPosition {
        price: Decimal,
    },
    Held {
        price: Decimal,
    },
    Bought {
        amount: Decimal,
        price: Decimal,
    },
    Sold {
        amount: Decimal,
        price: Decimal,
        proceeds: Decimal,
    },
}

/// Simulated cash plus at most one open lot per symbol.
#[derive(Debug, Clone)]
pub struct Ledger {
    capital: Decimal,
    positions: BTreeMap<String, Position>,
}

impl Ledger {
    pub fn new(capital: Decimal) -> Self {
        Self {
            capital,
            positions: BTreeMap::new(),
        }
    }

    pub fn capital(&self) -> Decimal {
        self.capital
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    /// Debits `amount` from capital and opens (or tops up) the lot for `symbol`.
    /// A top-up adds the amount and moves the entry price to `price`.
    pub fn buy_token(
        &mut self,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO || price <= Decimal::ZERO {
            return Err(LedgerError::InvalidOrder(format!(
                "buy {} of {} at {}",
                amount, symbol, price
            )));
        }
        if amount > self.capital {
            return Err(LedgerError::InsufficientCapital {
                requested: amount,
                available: self.capital,
            });
        }

        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position {
                symbol: symbol.to_string(),
                amount: Decimal::ZERO,
                entry_price: price,
            });
        position.amount += amount;
        position.entry_price = price;
        self.capital -= amount;

        info!(symbol, %amount, %price, capital = %self.capital, "Paper buy filled");
        Ok(())
    }

    /// Credits `amount * current_price / entry_price` to capital and returns it.
    pub fn sell_token(
        &mut self,
        symbol: &str,
        amount: Decimal,
        current_price: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO || current_price <= Decimal::ZERO {
            return Err(LedgerError::InvalidOrder(format!(
                "sell {} of {} at {}",
                amount, symbol, current_price
            )));
        }

        let position = self
            .positions
            .get_mut(symbol)
            .ok_or_else(|| LedgerError::PositionNotFound(symbol.to_string()))?;

        if amount > position.amount {
            return Err(LedgerError::InsufficientQuantity {
                symbol: symbol.to_string(),
                requested: amount,
                held: position.amount,
            });
        }

        let proceeds = amount * current_price / position.entry_price;
        position.amount -= amount;
        if position.amount.is_zero() {
            self.positions.remove(symbol);
        }
        self.capital += proceeds;

        info!(symbol, %amount, %current_price, %proceeds, capital = %self.capital, "Paper sell filled");
        Ok(proceeds)
    }

    /// Holdings with their value at cost basis (`amount * entry_price`), capital excluded.
    pub fn balance(&self) -> BalanceSnapshot {
        if self.positions.is_empty() {
            return BalanceSnapshot {
                positions: Vec::new(),
                total_value: EMPTY_BALANCE_PLACEHOLDER,
            };
        }

        let positions: Vec<Position> = self.positions.values().cloned().collect();
        let total_value = positions.iter().map(Position::cost_value).sum();
        BalanceSnapshot {
            positions,
            total_value,
        }
    }

    /// Capital plus every position valued at what selling it now would return.
    /// Positions missing from `prices` are listed without a value and left out of the total.
    pub fn mark_to_market(&self, prices: &HashMap<String, Decimal>) -> Valuation {
        let positions: Vec<ValuedPosition> = self
            .positions
            .values()
            .map(|p| ValuedPosition {
                position: p.clone(),
                value: prices.get(&p.symbol).map(|price| p.market_value(*price)),
            })
            .collect();

        let total_value = self.capital
            + positions
                .iter()
                .filter_map(|v| v.value)
                .sum::<Decimal>();

        Valuation {
            capital: self.capital,
            positions,
            total_value,
        }
    }

    /// One evaluation of the grid rule against the current price of `symbol`.
    /// A drop below the buy threshold wins over a rise; at most one trade is made.
    pub async fn execute_grid_strategy(
        &mut self,
        prices: &dyn PriceSource,
        symbol: &str,
        drop_pct: Decimal,
        rise_pct: Decimal,
        amount: Decimal,
    ) -> Result<GridOutcome, TradeError> {
        let price = prices.current_price(symbol).await?;
        let strategy = GridStrategy::new(drop_pct, rise_pct);

        let outcome = match strategy.evaluate(price, self.positions.get(symbol)) {
            Signal::Advice(Side::Buy, price) => {
                self.buy_token(symbol, amount, price)?;
                GridOutcome::Bought { amount, price }
            }
            Signal::Advice(Side::Sell, price) => {
                let proceeds = self.sell_token(symbol, amount, price)?;
                GridOutcome::Sold {
                    amount,
                    price,
                    proceeds,
                }
            }
            Signal::Hold if self.positions.contains_key(symbol) => GridOutcome::Held { price },
            Signal::Hold => GridOutcome::NoPosition { price },
        };

        info!(symbol, strategy = strategy.name(), ?outcome, "Grid evaluated");
        Ok(outcome)
    }
}
