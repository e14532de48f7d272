// src/core/retry.rs
use crate::connectors::traits::PriceSource;
use crate::error::PriceError;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// Only rate limiting is retried (after `policy.delay`); any other failure is returned
/// immediately. Running out of attempts yields `PriceError::Exhausted`.
pub async fn get_price_with_retries(
    source: &dyn PriceSource,
    symbol: &str,
    policy: RetryPolicy,
) -> Result<Decimal, PriceError> {
    for attempt in 1..=policy.max_attempts {
        match source.current_price(symbol).await {
            Ok(price) => return Ok(price),
            Err(e) if e.is_rate_limited() => {
                warn!(
                    symbol,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay = ?policy.delay,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(PriceError::Exhausted {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::stub::StubPrices;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_two_rate_limits() {
        let prices = StubPrices::new().with_price("BTC-USDT", 50);
        prices.push("BTC-USDT", Err(PriceError::RateLimited));
        prices.push("BTC-USDT", Err(PriceError::RateLimited));

        let started = Instant::now();
        let price = get_price_with_retries(&prices, "BTC-USDT", RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(price, Decimal::from(50));
        assert_eq!(prices.calls(), 3);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn always_rate_limited_gives_up_after_three_attempts() {
        let prices = StubPrices::new();
        for _ in 0..5 {
            prices.push("ETH-USDT", Err(PriceError::RateLimited));
        }

        let err = get_price_with_retries(&prices, "ETH-USDT", RetryPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(err, PriceError::Exhausted { attempts: 3 });
        assert_eq!(prices.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_fail_fast() {
        let prices = StubPrices::new().with_price("SOL-USDT", 20);
        prices.push("SOL-USDT", Err(PriceError::Status(500)));

        let started = Instant::now();
        let err = get_price_with_retries(&prices, "SOL-USDT", RetryPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(err, PriceError::Status(500));
        assert_eq!(prices.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn first_success_needs_no_wait() {
        let prices = StubPrices::new().with_price("TON-USDT", 7);
        let policy = RetryPolicy {
            max_attempts: 1,
            delay: Duration::from_secs(60),
        };
        assert_eq!(
            get_price_with_retries(&prices, "TON-USDT", policy).await,
            Ok(Decimal::from(7))
        );
    }
}
