// src/core/replies.rs
//! User-facing text. Every error that reaches a user goes through `describe_error`.
use crate::core::ledger::GridOutcome;
use crate::error::{InputError, LedgerError, PriceError, TradeError};
use crate::types::{Position, Valuation, TRADABLE_SYMBOLS};
use rust_decimal::Decimal;
use std::fmt::Write;

pub const STARTED: &str = "Bot started! Choose a command.";
pub const CHOOSE_ACTION: &str = "Choose an action:";
pub const ADMIN_NOTICE: &str = "Bot is up and accepting commands.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /start to see the menu.";
pub const ASK_PRICE_SYMBOL: &str = "Enter an asset symbol (e.g. BTC-USDT):";
pub const ASK_BUY_SYMBOL: &str = "Enter the symbol of the token to buy (e.g. BTC-USDT):";
pub const ASK_SELL_SYMBOL: &str = "Enter the symbol of the token to sell (e.g. BTC-USDT):";
pub const ASK_GRID_SYMBOL: &str = "Enter an asset symbol for the grid strategy (e.g. BTC-USDT):";
pub const ASK_BUY_AMOUNT: &str = "Enter the amount to buy:";
pub const ASK_SELL_AMOUNT: &str = "Enter the amount to sell:";
pub const ASK_GRID_AMOUNT: &str = "Enter the amount for the grid strategy:";

pub fn asset_list(assets: &[String]) -> String {
    let mut out = String::from("Asset list:\n");
    for asset in assets {
        let _ = writeln!(out, "{}", asset);
    }
    out
}

pub fn buy_menu(capital: Decimal) -> String {
    let mut out = format!("Your USDT balance: {:.2}\nTokens available to buy:\n", capital);
    for symbol in TRADABLE_SYMBOLS {
        let _ = writeln!(out, "{}", symbol);
    }
    out.push_str(ASK_BUY_SYMBOL);
    out
}

/// `quotes` pairs each held position with its live price lookup.
pub fn sell_menu(quotes: &[(Position, Result<Decimal, PriceError>)]) -> String {
    if quotes.is_empty() {
        return format!("You have no open positions.\n{}", ASK_SELL_SYMBOL);
    }

    let mut out = String::from("Tokens available to sell:\n");
    for (position, quote) in quotes {
        match quote {
            Ok(price) => {
                let _ = writeln!(
                    out,
                    "Token: {}, Amount: {:.2}, Current price: ${:.2}",
                    position.symbol, position.amount, price
                );
            }
            Err(_) => {
                let _ = writeln!(out, "Could not fetch price for {}", position.symbol);
            }
        }
    }
    out.push_str(ASK_SELL_SYMBOL);
    out
}

pub fn current_price(symbol: &str, price: Decimal) -> String {
    format!("Current price for {}: {}$", symbol, price)
}

pub fn grid_amount_prompt(symbol: &str, price: Decimal) -> String {
    format!("{}\n{}", current_price(symbol, price), ASK_GRID_AMOUNT)
}

pub fn bought(symbol: &str, amount: Decimal, price: Decimal, capital: Decimal) -> String {
    format!(
        "Bought {} {} at ${:.2}. Remaining capital: ${:.2}",
        amount, symbol, price, capital
    )
}

pub fn sold(
    symbol: &str,
    amount: Decimal,
    price: Decimal,
    proceeds: Decimal,
    capital: Decimal,
) -> String {
    format!(
        "Sold {} {} at ${:.2}. Proceeds: ${:.2}. Capital: ${:.2}",
        amount, symbol, price, proceeds, capital
    )
}

pub fn grid_result(symbol: &str, outcome: &GridOutcome, capital: Decimal) -> String {
    match outcome {
        GridOutcome::NoPosition { price } => format!(
            "Grid strategy: no open {} position to trade around (price ${:.2}). Buy first.",
            symbol, price
        ),
        GridOutcome::Held { price } => format!(
            "Grid strategy: {} at ${:.2} is inside the band, no trade.",
            symbol, price
        ),
        GridOutcome::Bought { amount, price } => format!(
            "Grid strategy: price dropped, {}",
            bought(symbol, *amount, *price, capital)
        ),
        GridOutcome::Sold {
            amount,
            price,
            proceeds,
        } => format!(
            "Grid strategy: price rose, {}",
            sold(symbol, *amount, *price, *proceeds, capital)
        ),
    }
}

pub fn balance(valuation: &Valuation) -> String {
    let mut out = String::from("Current assets:\n");
    let _ = writeln!(
        out,
        "Token: USDT, Amount: {:.2}, Value: ${:.2}",
        valuation.capital, valuation.capital
    );
    for valued in &valuation.positions {
        match valued.value {
            Some(value) => {
                let _ = writeln!(
                    out,
                    "Token: {}, Amount: {:.2}, Value: ${:.2}",
                    valued.position.symbol, valued.position.amount, value
                );
            }
            None => {
                let _ = writeln!(out, "Could not fetch price for {}", valued.position.symbol);
            }
        }
    }
    let _ = write!(out, "Total value: ${:.2}", valuation.total_value);
    out
}

pub fn describe_input_error(err: &InputError) -> String {
    match err {
        InputError::UnknownSymbol(symbol) => {
            format!("Invalid asset \"{}\". Try again.", symbol)
        }
        InputError::InvalidAmount(_) => "Invalid amount. Enter a positive number.".to_string(),
    }
}

pub fn describe_ledger_error(err: &LedgerError) -> String {
    match err {
        LedgerError::InsufficientCapital {
            requested,
            available,
        } => format!(
            "Not enough capital: requested {}, available ${:.2}.",
            requested, available
        ),
        LedgerError::InsufficientQuantity {
            symbol,
            requested,
            held,
        } => format!(
            "Not enough {} to sell: requested {}, you hold {}.",
            symbol, requested, held
        ),
        LedgerError::PositionNotFound(symbol) => format!("You have no {} to sell.", symbol),
        LedgerError::InvalidOrder(detail) => format!("Order rejected: {}.", detail),
    }
}

pub fn describe_price_error(err: &PriceError) -> String {
    let reason = match err {
        PriceError::RateLimited => "the market data provider is rate limiting requests".to_string(),
        PriceError::Status(code) => format!("market data unavailable (HTTP {})", code),
        PriceError::Request(_) | PriceError::Malformed(_) => {
            "market data request failed".to_string()
        }
        PriceError::NotFound(symbol) => format!("no price available for {}", symbol),
        PriceError::Exhausted { attempts } => {
            format!("could not fetch price after {} attempts", attempts)
        }
    };
    format!("Failed to get price: {}.", reason)
}

pub fn describe_error(err: &TradeError) -> String {
    match err {
        TradeError::Input(e) => describe_input_error(e),
        TradeError::Ledger(e) => describe_ledger_error(e),
        TradeError::Price(e) => describe_price_error(e),
    }
}
