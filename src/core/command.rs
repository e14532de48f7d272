// src/core/command.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Trade,
    Assets,
    Price,
    Buy,
    Sell,
    GridStrategy,
    Balance,
}

impl Command {
    /// Recognises "/buy" as well as the group-chat form "/buy@SomeBot".
    /// Anything after the first whitespace is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "trade" => Some(Command::Trade),
            "assets" => Some(Command::Assets),
            "price" => Some(Command::Price),
            "buy" => Some(Command::Buy),
            "sell" => Some(Command::Sell),
            "grid_strategy" => Some(Command::GridStrategy),
            "balance" => Some(Command::Balance),
            _ => None,
        }
    }
}
