// src/config.rs

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Telegram,
    Console,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
    #[serde(default)]
    pub admin_id: Option<i64>,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OkxConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TradingConfig {
    pub starting_capital: f64,
    pub grid_drop_pct: f64,
    pub grid_rise_pct: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub transport: Transport,
    pub telegram: TelegramConfig,
    pub okx: OkxConfig,
    pub trading: TradingConfig,
    pub retry: RetryConfig,
    pub log_dir: String,
}

impl AppConfig {
    /// Defaults, then an optional `Settings.{toml,yaml,json}`, then `APP_*` variables
    /// (`APP_TELEGRAM__TOKEN`, `APP_RETRY__DELAY_SECS`, ...). `TELEGRAM_BOT_TOKEN` and
    /// `ADMIN_ID` are honoured on top of that.
    pub fn new() -> Result<Self, ConfigError> {
        let admin_id = match env::var("ADMIN_ID") {
            Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|e| {
                ConfigError::Message(format!("ADMIN_ID must be an integer: {}", e))
            })?),
            Err(_) => None,
        };

        let builder = Self::defaults()?
            .add_source(File::with_name("Settings").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("telegram.token", env::var("TELEGRAM_BOT_TOKEN").ok())?
            .set_override_option("telegram.admin_id", admin_id)?;

        Self::from_builder(builder)
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("transport", "telegram")?
            .set_default("telegram.token", "")?
            .set_default("telegram.api_url", "https://api.telegram.org")?
            .set_default("telegram.poll_timeout_secs", 60_i64)?
            .set_default("okx.base_url", "https://www.okx.com")?
            .set_default("okx.request_timeout_secs", 10_i64)?
            .set_default("trading.starting_capital", 100.0)?
            .set_default("trading.grid_drop_pct", 5.0)?
            .set_default("trading.grid_rise_pct", 5.0)?
            .set_default("retry.max_attempts", 3_i64)?
            .set_default("retry.delay_secs", 5_i64)?
            .set_default("log_dir", "logs")
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport == Transport::Telegram && self.telegram.token.trim().is_empty() {
            return Err(ConfigError::Message(
                "telegram.token (or TELEGRAM_BOT_TOKEN) is required for the telegram transport"
                    .into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Message("retry.max_attempts must be at least 1".into()));
        }
        if self.trading.starting_capital <= 0.0 {
            return Err(ConfigError::Message("trading.starting_capital must be positive".into()));
        }
        if self.trading.grid_drop_pct <= 0.0 || self.trading.grid_rise_pct <= 0.0 {
            return Err(ConfigError::Message("grid percentages must be positive".into()));
        }
        Ok(())
    }

    pub fn starting_capital(&self) -> Decimal {
        Decimal::from_f64(self.trading.starting_capital).unwrap_or(Decimal::ONE_HUNDRED)
    }

    pub fn grid_drop_pct(&self) -> Decimal {
        Decimal::from_f64(self.trading.grid_drop_pct).unwrap_or(Decimal::from(5))
    }

    pub fn grid_rise_pct(&self) -> Decimal {
        Decimal::from_f64(self.trading.grid_rise_pct).unwrap_or(Decimal::from(5))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry.delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_bot_constants() {
        let builder = AppConfig::defaults()
            .unwrap()
            .set_override("telegram.token", "123:abc")
            .unwrap();
        let cfg = AppConfig::from_builder(builder).unwrap();

        assert_eq!(cfg.transport, Transport::Telegram);
        assert_eq!(cfg.starting_capital(), Decimal::ONE_HUNDRED);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry_delay(), Duration::from_secs(5));
        assert_eq!(cfg.okx.base_url, "https://www.okx.com");
        assert!(cfg.telegram.admin_id.is_none());
    }

    #[test]
    fn telegram_transport_requires_a_token() {
        let err = AppConfig::from_builder(AppConfig::defaults().unwrap()).unwrap_err();
        assert!(err.to_string().contains("telegram.token"));
    }

    #[test]
    fn console_transport_runs_without_a_token() {
        let builder = AppConfig::defaults()
            .unwrap()
            .set_override("transport", "console")
            .unwrap();
        let cfg = AppConfig::from_builder(builder).unwrap();
        assert_eq!(cfg.transport, Transport::Console);
    }

    #[test]
    fn zero_retry_attempts_is_rejected() {
        let builder = AppConfig::defaults()
            .unwrap()
            .set_override("transport", "console")
            .unwrap()
            .set_override("retry.max_attempts", 0_i64)
            .unwrap();
        assert!(AppConfig::from_builder(builder).is_err());
    }
}
