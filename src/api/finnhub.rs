use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::api::rate_limit::{Attempt, RetryPolicy};
use crate::api::QuoteSource;
use crate::config::Config;
use crate::error::Result;
use crate::models::quote::{logo_url, FinnhubQuote, Quote};

pub struct FinnhubApi {
    client: Client,
    base_url: String,
    api_key: String,
    logo_api_key: Option<String>,
    retry: RetryPolicy,
}

impl FinnhubApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.finnhub_base_url.trim_end_matches('/').to_string(),
            api_key: config.finnhub_api_key.clone(),
            logo_api_key: config.logo_api_key.clone(),
            retry: config.retry_policy(),
        })
    }

    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let endpoint = format!("{}/quote", self.base_url);
        let (client, url, token) = (&self.client, endpoint.as_str(), self.api_key.as_str());

        let raw = self
            .retry
            .run(symbol, move || request_quote(client, url, symbol, token))
            .await?;

        let logo = self.logo_api_key.as_deref().map(|token| logo_url(symbol, token));
        Quote::from_finnhub(symbol, raw, logo)
    }
}

async fn request_quote(
    client: &Client,
    url: &str,
    symbol: &str,
    token: &str,
) -> Result<Attempt<FinnhubQuote>> {
    debug!("Sending request to {} for {}", url, symbol);
    let response = client
        .get(url)
        .query(&[("symbol", symbol), ("token", token)])
        .send()
        .await?;

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Ok(Attempt::RateLimited);
    }

    let body = response.error_for_status()?.text().await?;
    Ok(Attempt::Done(serde_json::from_str(&body)?))
}

#[async_trait]
impl QuoteSource for FinnhubApi {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        FinnhubApi::fetch_quote(self, symbol).await
    }
}
