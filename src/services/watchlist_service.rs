use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::cache::TtlCache;
use crate::models::watchlist::{Watchlist, WatchlistItem, WatchlistView};
use crate::services::quote_service::{normalize_symbol, QuoteService};
use crate::services::watchlist_store::WatchlistStore;

/// Watchlists with their quotes attached. Assembled views are cached per
/// watchlist id; any change to a watchlist drops its cached view.
pub struct WatchlistService {
    store: Arc<dyn WatchlistStore>,
    quotes: Arc<QuoteService>,
    cache: TtlCache<WatchlistView>,
}

impl WatchlistService {
    pub fn new(store: Arc<dyn WatchlistStore>, quotes: Arc<QuoteService>, ttl: Duration) -> Self {
        Self {
            store,
            quotes,
            cache: TtlCache::new("watchlists", ttl),
        }
    }

    pub async fn get_items(&self, watchlist_id: &str) -> Result<WatchlistView> {
        let id = watchlist_id.trim();
        if id.is_empty() {
            return Err(Error::InvalidKey(watchlist_id.to_string()));
        }
        self.cache.get_or_fetch(id, || self.assemble(id)).await
    }

    async fn assemble(&self, id: &str) -> Result<WatchlistView> {
        let watchlist = self.store.get(id)?;
        let items = self
            .quotes
            .get_quotes(&watchlist.symbols)
            .await
            .into_iter()
            .map(|(symbol, quote)| {
                let quote = match quote {
                    Ok(quote) => Some(quote),
                    Err(e) => {
                        warn!("No data for {} in watchlist {}: {}", symbol, id, e);
                        None
                    }
                };
                WatchlistItem { symbol, quote }
            })
            .collect();

        Ok(WatchlistView { watchlist, items })
    }

    pub fn list(&self, user_id: &str) -> Result<Vec<Watchlist>> {
        self.store.ensure_default(user_id)?;
        self.store.list_for_user(user_id)
    }

    pub fn create(&self, user_id: &str, name: &str) -> Result<Watchlist> {
        let watchlist = self.store.create(user_id, name)?;
        info!("Created watchlist {} ({}) for {}", watchlist.name, watchlist.id, user_id);
        Ok(watchlist)
    }

    pub fn add_symbol(&self, watchlist_id: &str, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol)?;
        let added = self.store.add_symbol(watchlist_id, &symbol)?;
        self.cache.invalidate(watchlist_id);
        Ok(added)
    }

    pub fn remove_symbol(&self, watchlist_id: &str, symbol: &str) -> Result<bool> {
        let symbol = normalize_symbol(symbol)?;
        let removed = self.store.remove_symbol(watchlist_id, &symbol)?;
        self.cache.invalidate(watchlist_id);
        Ok(removed)
    }

    pub fn reorder(&self, watchlist_id: &str, symbols: &[String]) -> Result<()> {
        let symbols = symbols
            .iter()
            .map(|s| normalize_symbol(s))
            .collect::<Result<Vec<_>>>()?;
        self.store.reorder(watchlist_id, &symbols)?;
        self.cache.invalidate(watchlist_id);
        Ok(())
    }

    pub fn delete(&self, watchlist_id: &str) -> Result<()> {
        self.store.delete(watchlist_id)?;
        self.cache.invalidate(watchlist_id);
        info!("Deleted watchlist {}", watchlist_id);
        Ok(())
    }
}
