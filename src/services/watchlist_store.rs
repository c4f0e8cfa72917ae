//! Watchlist persistence.
//!
//! The services only see [`WatchlistStore`]; the in-memory implementation
//! below can be seeded from and saved to a JSON file.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::watchlist::{Watchlist, DEFAULT_WATCHLIST_NAME};

pub trait WatchlistStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Watchlist>;

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Watchlist>>;

    fn create(&self, user_id: &str, name: &str) -> Result<Watchlist>;

    /// Adds `symbol` at the end of the list. Returns `false` if it was
    /// already there.
    fn add_symbol(&self, id: &str, symbol: &str) -> Result<bool>;

    fn remove_symbol(&self, id: &str, symbol: &str) -> Result<bool>;

    /// Replaces the order of the list. `symbols` must hold exactly the
    /// symbols already in it.
    fn reorder(&self, id: &str, symbols: &[String]) -> Result<()>;

    fn delete(&self, id: &str) -> Result<()>;

    /// Every user owns a "My Watchlist"; create it on first use.
    fn ensure_default(&self, user_id: &str) -> Result<Watchlist> {
        let existing = self
            .list_for_user(user_id)?
            .into_iter()
            .find(|w| w.name == DEFAULT_WATCHLIST_NAME);
        match existing {
            Some(watchlist) => Ok(watchlist),
            None => self.create(user_id, DEFAULT_WATCHLIST_NAME),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryWatchlistStore {
    watchlists: RwLock<Vec<Watchlist>>,
}

impl InMemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_watchlists(watchlists: Vec<Watchlist>) -> Self {
        Self {
            watchlists: RwLock::new(watchlists),
        }
    }

    /// Loads watchlists from a JSON array. A missing file yields an empty
    /// store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No watchlist file at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path)?;
        let watchlists: Vec<Watchlist> = serde_json::from_str(&contents)?;
        info!("Loaded {} watchlists from {}", watchlists.len(), path.display());
        Ok(Self::with_watchlists(watchlists))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(&*self.read())?;
        std::fs::write(path, contents)?;
        debug!("Saved watchlists to {}", path.display());
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Watchlist>> {
        self.watchlists.read().unwrap_or_else(|poison| poison.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Watchlist>> {
        self.watchlists.write().unwrap_or_else(|poison| poison.into_inner())
    }

    fn update<T>(&self, id: &str, f: impl FnOnce(&mut Watchlist) -> Result<T>) -> Result<T> {
        let mut watchlists = self.write();
        let watchlist = watchlists
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| Error::WatchlistNotFound(id.to_string()))?;
        f(watchlist)
    }
}

impl WatchlistStore for InMemoryWatchlistStore {
    fn get(&self, id: &str) -> Result<Watchlist> {
        self.read()
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| Error::WatchlistNotFound(id.to_string()))
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Watchlist>> {
        Ok(self.read().iter().filter(|w| w.user_id == user_id).cloned().collect())
    }

    fn create(&self, user_id: &str, name: &str) -> Result<Watchlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Invalid("watchlist name must not be empty".into()));
        }
        let watchlist = Watchlist {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            symbols: Vec::new(),
        };
        self.write().push(watchlist.clone());
        Ok(watchlist)
    }

    fn add_symbol(&self, id: &str, symbol: &str) -> Result<bool> {
        self.update(id, |w| {
            if w.symbols.iter().any(|s| s == symbol) {
                return Ok(false);
            }
            w.symbols.push(symbol.to_string());
            Ok(true)
        })
    }

    fn remove_symbol(&self, id: &str, symbol: &str) -> Result<bool> {
        self.update(id, |w| {
            let before = w.symbols.len();
            w.symbols.retain(|s| s != symbol);
            Ok(w.symbols.len() != before)
        })
    }

    fn reorder(&self, id: &str, symbols: &[String]) -> Result<()> {
        self.update(id, |w| {
            let mut current = w.symbols.clone();
            let mut requested = symbols.to_vec();
            current.sort();
            requested.sort();
            if current != requested {
                return Err(Error::Invalid(format!(
                    "reorder must list exactly the symbols of watchlist {}",
                    w.id
                )));
            }
            w.symbols = symbols.to_vec();
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut watchlists = self.write();
        let before = watchlists.len();
        watchlists.retain(|w| w.id != id);
        if watchlists.len() == before {
            return Err(Error::WatchlistNotFound(id.to_string()));
        }
        Ok(())
    }
}
