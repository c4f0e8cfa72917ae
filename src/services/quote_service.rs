use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::info;

use crate::api::QuoteSource;
use crate::error::{Error, Result};
use crate::models::cache::TtlCache;
use crate::models::quote::Quote;

/// Quotes by ticker, read through a cache so repeated lookups within the
/// freshness window never reach the provider.
pub struct QuoteService {
    source: Arc<dyn QuoteSource>,
    cache: TtlCache<Quote>,
}

/// Trims and upper-cases a ticker; empty input is rejected.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(Error::InvalidKey(symbol.to_string()));
    }
    Ok(symbol.to_uppercase())
}

impl QuoteService {
    pub fn new(source: Arc<dyn QuoteSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new("quotes", ttl),
        }
    }

    pub async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = normalize_symbol(symbol)?;
        self.cache
            .get_or_fetch(&symbol, || self.source.fetch_quote(&symbol))
            .await
    }

    /// Looks up several tickers at once. Each result stands alone: one
    /// failing symbol does not fail the others.
    pub async fn get_quotes(&self, symbols: &[String]) -> Vec<(String, Result<Quote>)> {
        info!("Fetching quotes for {} symbols", symbols.len());
        let lookups = symbols.iter().map(|symbol| async move {
            (symbol.clone(), self.get_quote(symbol).await)
        });
        join_all(lookups).await
    }

    pub fn cache(&self) -> &TtlCache<Quote> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::{advance, sleep};

    #[derive(Default)]
    struct StubSource {
        prices: Mutex<HashMap<String, f64>>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn with(prices: &[(&str, f64)]) -> Arc<Self> {
            let source = Self::default();
            for (symbol, price) in prices {
                source.set(symbol, *price);
            }
            Arc::new(source)
        }

        fn set(&self, symbol: &str, price: f64) {
            self.prices.lock().unwrap().insert(symbol.to_string(), price);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteSource for StubSource {
        async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(100)).await;
            let price = self.prices.lock().unwrap().get(symbol).copied();
            match price {
                Some(price) => Ok(Quote {
                    symbol: symbol.to_string(),
                    price,
                    change: 1.0,
                    percent_change: 0.5,
                    is_positive: true,
                    logo_url: None,
                }),
                None => Err(Error::NoData(symbol.to_string())),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn normalizes_symbol_before_caching() {
        let source = StubSource::with(&[("AAPL", 150.0)]);
        let service = QuoteService::new(source.clone(), Duration::from_secs(60));

        assert_eq!(service.get_quote(" aapl ").await.unwrap().price, 150.0);
        assert_eq!(service.get_quote("AAPL").await.unwrap().price, 150.0);
        assert_eq!(source.calls(), 1);
        assert!(service.cache().peek("AAPL").is_some());
    }

    #[tokio::test]
    async fn empty_symbol_is_rejected_without_fetching() {
        let source = StubSource::with(&[]);
        let service = QuoteService::new(source.clone(), Duration::from_secs(60));

        assert!(matches!(service.get_quote("   ").await, Err(Error::InvalidKey(_))));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refetches_after_window() {
        let source = StubSource::with(&[("AAPL", 150.0)]);
        let service = QuoteService::new(source.clone(), Duration::from_secs(60));
        service.get_quote("AAPL").await.unwrap();

        source.set("AAPL", 151.25);
        advance(Duration::from_secs(30)).await;
        assert_eq!(service.get_quote("AAPL").await.unwrap().price, 150.0);

        advance(Duration::from_secs(31)).await;
        assert_eq!(service.get_quote("AAPL").await.unwrap().price, 151.25);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_lookup_isolates_failures() {
        let source = StubSource::with(&[("AAPL", 150.0), ("MSFT", 410.0)]);
        let service = QuoteService::new(source.clone(), Duration::from_secs(60));
        let symbols: Vec<String> = ["AAPL", "NOPE", "MSFT"].iter().map(|s| s.to_string()).collect();

        let results = service.get_quotes(&symbols).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1.as_ref().unwrap().price, 150.0);
        assert_eq!(results[1].1, Err(Error::NoData("NOPE".into())));
        assert_eq!(results[2].1.as_ref().unwrap().price, 410.0);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_symbols_in_a_batch_fetch_once() {
        let source = StubSource::with(&[("AAPL", 150.0)]);
        let service = QuoteService::new(source.clone(), Duration::from_secs(60));
        let symbols = vec!["AAPL".to_string(); 4];

        let results = service.get_quotes(&symbols).await;

        assert!(results.iter().all(|(_, quote)| quote.is_ok()));
        assert_eq!(source.calls(), 1);
    }
}
