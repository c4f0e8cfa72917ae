use serde::{Deserialize, Serialize};

use crate::models::quote::Quote;

pub const DEFAULT_WATCHLIST_NAME: &str = "My Watchlist";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Upper-case tickers, unique, in display order.
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// One row of an assembled watchlist. `quote` is `None` when no data could
/// be fetched for the symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistItem {
    pub symbol: String,
    pub quote: Option<Quote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistView {
    pub watchlist: Watchlist,
    pub items: Vec<WatchlistItem>,
}
