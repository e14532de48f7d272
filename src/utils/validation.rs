// src/utils/validation.rs
use crate::error::InputError;
use crate::types::TRADABLE_SYMBOLS;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Matches user text against the tradable whitelist.
/// Example: " btc-usdt " -> "BTC-USDT"
pub fn parse_symbol(text: &str) -> Result<&'static str, InputError> {
    let candidate = text.trim().to_uppercase();
    TRADABLE_SYMBOLS
        .iter()
        .find(|s| **s == candidate)
        .copied()
        .ok_or_else(|| InputError::UnknownSymbol(text.trim().to_string()))
}

/// Parses a strictly positive decimal. A decimal comma is accepted.
/// Example: "12,5" -> 12.5, "0" -> error
pub fn parse_amount(text: &str) -> Result<Decimal, InputError> {
    let normalized = text.trim().replace(',', ".");
    match Decimal::from_str(&normalized) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(InputError::InvalidAmount(text.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelisted_symbols_are_accepted() {
        assert_eq!(parse_symbol("BTC-USDT"), Ok("BTC-USDT"));
        assert_eq!(parse_symbol("  doge-usdt\n"), Ok("DOGE-USDT"));
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        assert_eq!(
            parse_symbol("LINK-USDT"),
            Err(InputError::UnknownSymbol("LINK-USDT".into()))
        );
        assert!(parse_symbol("BTC").is_err());
        assert!(parse_symbol("").is_err());
    }

    #[test]
    fn amounts_must_be_positive_numbers() {
        assert_eq!(parse_amount("10"), Ok(Decimal::from(10)));
        assert_eq!(parse_amount(" 2.5 "), Ok(Decimal::new(25, 1)));
        assert_eq!(parse_amount("2,5"), Ok(Decimal::new(25, 1)));
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("ten").is_err());
        assert!(parse_amount("").is_err());
    }
}
