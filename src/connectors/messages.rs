// src/connectors/messages.rs
use serde::{Deserialize, Serialize};

/// Response of GET /api/v5/market/ticker?instId=<symbol>.
/// `code` is "0" on success; `data` holds one ticker.
#[derive(Debug, Deserialize)]
pub struct OkxTickerResponse {
    pub code: String,

    #[serde(default)]
    pub msg: String,

    #[serde(default)]
    pub data: Vec<OkxTicker>,
}

#[derive(Debug, Deserialize)]
pub struct OkxTicker {
    #[serde(rename = "instId")]
    pub inst_id: String,

    /// Last traded price, as a string.
    pub last: String,
}

// --- Telegram Bot API ---

#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,

    #[serde(default)]
    pub description: Option<String>,

    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,

    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,

    #[serde(default)]
    pub from: Option<TelegramUser>,

    pub chat: TelegramChat,

    /// Unix seconds.
    pub date: i64,

    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,

    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct KeyboardButton {
    pub text: String,
}
