use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const LOGO_BASE_URL: &str = "https://img.logo.dev/ticker";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub percent_change: f64,
    pub is_positive: bool,
    pub logo_url: Option<String>,
}

/// Raw `/quote` payload. Finnhub answers unknown symbols with zeros and
/// nulls rather than an error status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinnhubQuote {
    #[serde(rename = "c")]
    pub current: Option<f64>,
    #[serde(rename = "d")]
    pub change: Option<f64>,
    #[serde(rename = "dp")]
    pub percent_change: Option<f64>,
    #[serde(rename = "h")]
    pub high: Option<f64>,
    #[serde(rename = "l")]
    pub low: Option<f64>,
    #[serde(rename = "o")]
    pub open: Option<f64>,
    #[serde(rename = "pc")]
    pub previous_close: Option<f64>,
    #[serde(rename = "t")]
    pub timestamp: Option<i64>,
}

impl Quote {
    pub fn from_finnhub(symbol: &str, raw: FinnhubQuote, logo_url: Option<String>) -> Result<Self> {
        let price = match raw.current {
            Some(price) if price != 0.0 => price,
            _ => return Err(Error::NoData(symbol.to_string())),
        };
        let change = raw.change.unwrap_or(0.0);

        Ok(Self {
            symbol: symbol.to_string(),
            price,
            change,
            percent_change: raw.percent_change.unwrap_or(0.0),
            is_positive: change >= 0.0,
            logo_url,
        })
    }
}

pub fn logo_url(symbol: &str, token: &str) -> String {
    format!(
        "{}/{}?token={}&size=64&format=png&theme=dark&retina=true",
        LOGO_BASE_URL, symbol, token
    )
}
