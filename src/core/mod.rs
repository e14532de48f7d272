pub mod command;
pub mod dispatcher;
pub mod engine;
pub mod ledger;
pub mod replies;
pub mod retry;
pub mod session;
