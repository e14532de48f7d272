// src/core/dispatcher.rs
use crate::connectors::traits::PriceSource;
use crate::core::command::Command;
use crate::core::ledger::Ledger;
use crate::core::replies;
use crate::core::retry::{get_price_with_retries, RetryPolicy};
use crate::core::session::{AmountPurpose, ConversationState, Session, SessionStore, SymbolPurpose};
use crate::error::{LedgerError, PriceError, TradeError};
use crate::types::{popular_assets, ChatId, InboundMessage, Keyboard, OutboundMessage, Position};
use crate::utils::validation::{parse_amount, parse_symbol};
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub starting_capital: Decimal,
    pub retry: RetryPolicy,
    pub grid_drop_pct: Decimal,
    pub grid_rise_pct: Decimal,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            starting_capital: Decimal::ONE_HUNDRED,
            retry: RetryPolicy::default(),
            grid_drop_pct: Decimal::from(5),
            grid_rise_pct: Decimal::from(5),
        }
    }
}

/// Turns one inbound message plus the sender's session into replies and the next state.
pub struct Dispatcher {
    prices: Arc<dyn PriceSource>,
    sessions: SessionStore,
    settings: DispatcherSettings,
}

impl Dispatcher {
    pub fn new(prices: Arc<dyn PriceSource>, settings: DispatcherSettings) -> Self {
        Self {
            prices,
            sessions: SessionStore::new(settings.starting_capital),
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn handle(&mut self, msg: &InboundMessage) -> Vec<OutboundMessage> {
        let mut session = self.sessions.checkout(msg.user_id);
        let replies = self.process(&mut session, msg.chat_id, &msg.text).await;
        debug!(user_id = msg.user_id, state = ?session.state, "Session updated");
        self.sessions.checkin(msg.user_id, session);
        replies
    }

    async fn process(
        &self,
        session: &mut Session,
        chat_id: ChatId,
        text: &str,
    ) -> Vec<OutboundMessage> {
        // A command always starts over, abandoning whatever flow was in progress.
        if let Some(command) = Command::parse(text) {
            return self.on_command(session, chat_id, command).await;
        }

        let reply = match session.state.clone() {
            ConversationState::Idle => replies::UNKNOWN_COMMAND.to_string(),
            ConversationState::AwaitingSymbol(purpose) => {
                self.on_symbol(session, purpose, text).await
            }
            ConversationState::AwaitingAmount { symbol, purpose } => {
                self.on_amount(session, &symbol, purpose, text).await
            }
        };
        vec![OutboundMessage::text(chat_id, reply)]
    }

    async fn on_command(
        &self,
        session: &mut Session,
        chat_id: ChatId,
        command: Command,
    ) -> Vec<OutboundMessage> {
        if session.state != ConversationState::Idle {
            debug!(?command, abandoned = ?session.state, "Command replaces pending flow");
        }
        session.state = ConversationState::Idle;

        let reply = match command {
            Command::Start => {
                return vec![OutboundMessage::with_keyboard(
                    chat_id,
                    replies::STARTED,
                    Keyboard::main_menu(),
                )]
            }
            Command::Trade => {
                return vec![OutboundMessage::with_keyboard(
                    chat_id,
                    replies::CHOOSE_ACTION,
                    Keyboard::trade_menu(),
                )]
            }
            Command::Assets => replies::asset_list(&popular_assets()),
            Command::Balance => self.balance(&session.ledger).await,
            Command::Price => {
                session.state = ConversationState::AwaitingSymbol(SymbolPurpose::Price);
                replies::ASK_PRICE_SYMBOL.to_string()
            }
            Command::Buy => {
                session.state = ConversationState::AwaitingSymbol(SymbolPurpose::Buy);
                replies::buy_menu(session.ledger.capital())
            }
            Command::Sell => {
                let quotes = self.quote(session.ledger.balance().positions).await;
                session.state = ConversationState::AwaitingSymbol(SymbolPurpose::Sell);
                replies::sell_menu(&quotes)
            }
            Command::GridStrategy => {
                session.state = ConversationState::AwaitingSymbol(SymbolPurpose::Grid);
                replies::ASK_GRID_SYMBOL.to_string()
            }
        };
        vec![OutboundMessage::text(chat_id, reply)]
    }

    async fn on_symbol(&self, session: &mut Session, purpose: SymbolPurpose, text: &str) -> String {
        let symbol = match parse_symbol(text) {
            Ok(symbol) => symbol,
            // Same state, same question again.
            Err(e) => return replies::describe_input_error(&e),
        };

        match purpose {
            SymbolPurpose::Price => {
                session.state = ConversationState::Idle;
                match self.fetch_price(symbol).await {
                    Ok(price) => replies::current_price(symbol, price),
                    Err(e) => replies::describe_price_error(&e),
                }
            }
            SymbolPurpose::Grid => match self.fetch_price(symbol).await {
                Ok(price) => {
                    session.state = ConversationState::AwaitingAmount {
                        symbol: symbol.to_string(),
                        purpose: AmountPurpose::Grid,
                    };
                    replies::grid_amount_prompt(symbol, price)
                }
                Err(e) => {
                    session.state = ConversationState::Idle;
                    replies::describe_price_error(&e)
                }
            },
            SymbolPurpose::Buy => {
                session.state = ConversationState::AwaitingAmount {
                    symbol: symbol.to_string(),
                    purpose: AmountPurpose::Buy,
                };
                replies::ASK_BUY_AMOUNT.to_string()
            }
            SymbolPurpose::Sell => {
                session.state = ConversationState::AwaitingAmount {
                    symbol: symbol.to_string(),
                    purpose: AmountPurpose::Sell,
                };
                replies::ASK_SELL_AMOUNT.to_string()
            }
        }
    }

    async fn on_amount(
        &self,
        session: &mut Session,
        symbol: &str,
        purpose: AmountPurpose,
        text: &str,
    ) -> String {
        let amount = match parse_amount(text) {
            Ok(amount) => amount,
            Err(e) => return replies::describe_input_error(&e),
        };

        // The flow ends here whether or not the trade goes through.
        session.state = ConversationState::Idle;

        let result = match purpose {
            AmountPurpose::Buy => self.complete_buy(&mut session.ledger, symbol, amount).await,
            AmountPurpose::Sell => self.complete_sell(&mut session.ledger, symbol, amount).await,
            AmountPurpose::Grid => self.complete_grid(&mut session.ledger, symbol, amount).await,
        };

        result.unwrap_or_else(|e| {
            warn!(symbol, %amount, ?purpose, error = %e, "Trade flow failed");
            replies::describe_error(&e)
        })
    }

    async fn complete_buy(
        &self,
        ledger: &mut Ledger,
        symbol: &str,
        amount: Decimal,
    ) -> Result<String, TradeError> {
        // Checked before the price request so a doomed order costs no API call.
        if amount > ledger.capital() {
            return Err(LedgerError::InsufficientCapital {
                requested: amount,
                available: ledger.capital(),
            }
            .into());
        }

        let price = self.fetch_price(symbol).await?;
        ledger.buy_token(symbol, amount, price)?;
        Ok(replies::bought(symbol, amount, price, ledger.capital()))
    }

    async fn complete_sell(
        &self,
        ledger: &mut Ledger,
        symbol: &str,
        amount: Decimal,
    ) -> Result<String, TradeError> {
        if ledger.position(symbol).is_none() {
            return Err(LedgerError::PositionNotFound(symbol.to_string()).into());
        }

        let price = self.fetch_price(symbol).await?;
        let proceeds = ledger.sell_token(symbol, amount, price)?;
        Ok(replies::sold(symbol, amount, price, proceeds, ledger.capital()))
    }

    async fn complete_grid(
        &self,
        ledger: &mut Ledger,
        symbol: &str,
        amount: Decimal,
    ) -> Result<String, TradeError> {
        let outcome = ledger
            .execute_grid_strategy(
                self.prices.as_ref(),
                symbol,
                self.settings.grid_drop_pct,
                self.settings.grid_rise_pct,
                amount,
            )
            .await?;
        Ok(replies::grid_result(symbol, &outcome, ledger.capital()))
    }

    async fn balance(&self, ledger: &Ledger) -> String {
        let positions: Vec<Position> = ledger.positions().cloned().collect();
        let prices: HashMap<String, Decimal> = self
            .quote(positions)
            .await
            .into_iter()
            .filter_map(|(p, quote)| quote.ok().map(|price| (p.symbol, price)))
            .collect();

        replies::balance(&ledger.mark_to_market(&prices))
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, PriceError> {
        let price =
            get_price_with_retries(self.prices.as_ref(), symbol, self.settings.retry).await;
        match &price {
            Ok(p) => info!(symbol, price = %p, "Price fetched"),
            Err(e) => warn!(symbol, error = %e, "Price unavailable"),
        }
        price
    }

    /// Single-attempt lookups for several positions at once. A failed lookup only
    /// affects its own entry.
    async fn quote(&self, positions: Vec<Position>) -> Vec<(Position, Result<Decimal, PriceError>)> {
        let results = join_all(
            positions
                .iter()
                .map(|p| self.prices.current_price(&p.symbol)),
        )
        .await;

        for (position, result) in positions.iter().zip(&results) {
            if let Err(e) = result {
                warn!(symbol = %position.symbol, error = %e, "Quote failed");
            }
        }
        positions.into_iter().zip(results).collect()
    }
}
