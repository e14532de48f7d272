pub mod console;
pub mod messages;
pub mod okx;
pub mod telegram;
pub mod traits;

#[cfg(test)]
pub mod stub;
