pub mod finnhub;
pub mod rate_limit;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::quote::Quote;

/// Anything that can produce a fresh quote for a symbol. Implementations own
/// their own pacing and retries; caching happens above them.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}
