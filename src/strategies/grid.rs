use crate::strategies::traits::Strategy;
use crate::types::{Position, Side, Signal};
use rust_decimal::Decimal;
use tracing::debug;

pub struct GridStrategy {
    drop_pct: Decimal,
    rise_pct: Decimal,
}

impl GridStrategy {
    /// Creates a one-shot grid rule.
    ///
    /// # Arguments
    /// * `drop_pct` - Percentage below the entry price that triggers a BUY (e.g., 5 for 5%).
    /// * `rise_pct` - Percentage above the entry price that triggers a SELL (e.g., 3 for 3%).
    pub fn new(drop_pct: Decimal, rise_pct: Decimal) -> Self {
        Self { drop_pct, rise_pct }
    }

    pub fn buy_target(&self, entry_price: Decimal) -> Decimal {
        entry_price * (Decimal::ONE - self.drop_pct / Decimal::ONE_HUNDRED)
    }

    pub fn sell_target(&self, entry_price: Decimal) -> Decimal {
        entry_price * (Decimal::ONE + self.rise_pct / Decimal::ONE_HUNDRED)
    }
}

impl Strategy for GridStrategy {
    fn name(&self) -> &str {
        "grid"
    }

    fn evaluate(&self, price: Decimal, position: Option<&Position>) -> Signal {
        // Thresholds are relative to an existing lot; nothing to do without one.
        let Some(position) = position else {
            return Signal::Hold;
        };

        let buy_target = self.buy_target(position.entry_price);
        if price <= buy_target {
            debug!(
                symbol = %position.symbol, %price, %buy_target,
                "Grid: price at or below drop target. Signal: BUY"
            );
            return Signal::Advice(Side::Buy, price);
        }

        let sell_target = self.sell_target(position.entry_price);
        if price >= sell_target {
            debug!(
                symbol = %position.symbol, %price, %sell_target,
                "Grid: price at or above rise target. Signal: SELL"
            );
            return Signal::Advice(Side::Sell, price);
        }

        Signal::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(entry: i64) -> Position {
        Position {
            symbol: "BTC-USDT".into(),
            amount: Decimal::from(10),
            entry_price: Decimal::from(entry),
        }
    }

    fn grid() -> GridStrategy {
        GridStrategy::new(Decimal::from(10), Decimal::from(20))
    }

    #[test]
    fn no_position_holds() {
        assert_eq!(grid().evaluate(Decimal::from(1), None), Signal::Hold);
    }

    #[test]
    fn drop_to_threshold_buys() {
        let pos = lot(100);
        assert_eq!(
            grid().evaluate(Decimal::from(90), Some(&pos)),
            Signal::Advice(Side::Buy, Decimal::from(90))
        );
        assert_eq!(
            grid().evaluate(Decimal::from(80), Some(&pos)),
            Signal::Advice(Side::Buy, Decimal::from(80))
        );
    }

    #[test]
    fn rise_to_threshold_sells() {
        let pos = lot(100);
        assert_eq!(
            grid().evaluate(Decimal::from(120), Some(&pos)),
            Signal::Advice(Side::Sell, Decimal::from(120))
        );
    }

    #[test]
    fn inside_band_holds() {
        let pos = lot(100);
        assert_eq!(grid().evaluate(Decimal::from(91), Some(&pos)), Signal::Hold);
        assert_eq!(grid().evaluate(Decimal::from(119), Some(&pos)), Signal::Hold);
    }
}
