// src/connectors/okx.rs
use crate::connectors::messages::OkxTickerResponse;
use crate::connectors::traits::PriceSource;
use crate::error::PriceError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// OKX answers "Too Many Requests" with this body code as well as HTTP 429.
const OKX_RATE_LIMIT_CODE: &str = "50011";

pub struct OkxClient {
    http_client: Client,
    base_rest_url: String,
}

impl OkxClient {
    pub fn new(base_rest_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OKX HTTP client")?;

        Ok(Self {
            http_client,
            base_rest_url: base_rest_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for OkxClient {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, PriceError> {
        let url = format!("{}/api/v5/market/ticker", self.base_rest_url);
        debug!(symbol, url = %url, "Requesting ticker");

        let resp = self
            .http_client
            .get(&url)
            .query(&[("instId", symbol)])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(symbol, "OKX rate limit hit");
            return Err(PriceError::RateLimited);
        }
        if !status.is_success() {
            warn!(symbol, status = status.as_u16(), "OKX returned an error status");
            return Err(PriceError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let price = parse_ticker(symbol, &body)?;
        debug!(symbol, %price, "Ticker received");
        Ok(price)
    }
}

pub fn parse_ticker(symbol: &str, body: &str) -> Result<Decimal, PriceError> {
    let resp: OkxTickerResponse =
        serde_json::from_str(body).map_err(|e| PriceError::Malformed(e.to_string()))?;

    if resp.code == OKX_RATE_LIMIT_CODE {
        return Err(PriceError::RateLimited);
    }
    if resp.code != "0" {
        debug!(symbol, code = %resp.code, msg = %resp.msg, "OKX rejected ticker request");
        return Err(PriceError::NotFound(symbol.to_string()));
    }

    let ticker = resp
        .data
        .first()
        .ok_or_else(|| PriceError::NotFound(symbol.to_string()))?;

    Decimal::from_str(ticker.last.trim())
        .map_err(|e| PriceError::Malformed(format!("{} for {}: {}", ticker.last, symbol, e)))
}
