// src/core/session.rs
use crate::core::ledger::Ledger;
use crate::types::UserId;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Why a symbol is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPurpose {
    Price,
    Buy,
    Sell,
    Grid,
}

/// Which operation the pending amount completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountPurpose {
    Buy,
    Sell,
    Grid,
}

/// Exactly one of these holds per user at any time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingSymbol(SymbolPurpose),
    AwaitingAmount {
        symbol: String,
        purpose: AmountPurpose,
    },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub state: ConversationState,
    pub ledger: Ledger,
}

impl Session {
    pub fn new(starting_capital: Decimal) -> Self {
        Self {
            state: ConversationState::Idle,
            ledger: Ledger::new(starting_capital),
        }
    }
}

/// Sessions keyed by user. A session is checked out for the duration of one message
/// and checked back in afterwards, so two messages never mutate it at the same time.
pub struct SessionStore {
    sessions: HashMap<UserId, Session>,
    starting_capital: Decimal,
}

impl SessionStore {
    pub fn new(starting_capital: Decimal) -> Self {
        Self {
            sessions: HashMap::new(),
            starting_capital,
        }
    }

    pub fn checkout(&mut self, user_id: UserId) -> Session {
        self.sessions
            .remove(&user_id)
            .unwrap_or_else(|| Session::new(self.starting_capital))
    }

    pub fn checkin(&mut self, user_id: UserId, session: Session) {
        self.sessions.insert(user_id, session);
    }

    pub fn get(&self, user_id: UserId) -> Option<&Session> {
        self.sessions.get(&user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_gets_fresh_session() {
        let mut store = SessionStore::new(Decimal::ONE_HUNDRED);
        let session = store.checkout(7);
        assert_eq!(session.state, ConversationState::Idle);
        assert_eq!(session.ledger.capital(), Decimal::ONE_HUNDRED);
        assert!(store.get(7).is_none());
    }

    #[test]
    fn checked_in_session_is_returned_next_time() {
        let mut store = SessionStore::new(Decimal::ONE_HUNDRED);
        let mut session = store.checkout(7);
        session.state = ConversationState::AwaitingSymbol(SymbolPurpose::Buy);
        store.checkin(7, session);

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.checkout(7).state,
            ConversationState::AwaitingSymbol(SymbolPurpose::Buy)
        );
    }

    #[test]
    fn users_are_isolated() {
        let mut store = SessionStore::new(Decimal::ONE_HUNDRED);
        let mut a = store.checkout(1);
        a.ledger.buy_token("BTC-USDT", Decimal::TEN, Decimal::ONE).unwrap();
        store.checkin(1, a);

        let b = store.checkout(2);
        assert_eq!(b.ledger.capital(), Decimal::ONE_HUNDRED);
        assert_eq!(store.get(1).unwrap().ledger.capital(), Decimal::from(90));
    }
}
