//! Read-through cache with a fixed freshness window.
//!
//! Entries are served while `now - timestamp < ttl`; a stale or missing
//! entry is repopulated through the fetch function handed to
//! [`TtlCache::get_or_fetch`]. Concurrent misses on the same key share one
//! in-flight fetch, so a burst of requests for a stale ticker costs a single
//! upstream call.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub timestamp: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.timestamp.elapsed() < ttl
    }
}

/// One outstanding population for a key. Every caller that joins it gets
/// the same outcome.
struct Flight<V> {
    id: u64,
    outcome: OnceCell<Result<V>>,
}

pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    flights: Mutex<HashMap<String, Arc<Flight<V>>>>,
    next_flight: AtomicU64,
}

// A panic while holding one of these locks cannot leave a half-written
// entry behind, so a poisoned map is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

impl<V: Clone> TtlCache<V> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: Mutex::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
            next_flight: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key` if it is still fresh, otherwise
    /// runs `fetch`, stores a successful result and returns it.
    ///
    /// A failed fetch leaves any previous entry untouched and the error is
    /// returned as is; stale data is never substituted. If another caller is
    /// already fetching `key`, this call waits for that fetch instead of
    /// starting its own and `fetch` is dropped unused.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(data) = self.get_fresh(key) {
            debug!(cache = self.name, key, "cache hit");
            return Ok(data);
        }

        let flight = self.join_flight(key);
        let outcome = flight
            .outcome
            .get_or_init(|| async {
                // The previous flight may have landed between the freshness
                // check above and joining this one.
                let (outcome, fetched) = match self.get_fresh(key) {
                    Some(data) => (Ok(data), None),
                    None => {
                        debug!(cache = self.name, key, "cache miss, fetching");
                        let outcome = fetch().await;
                        let fetched = outcome.as_ref().ok().cloned();
                        (outcome, fetched)
                    }
                };
                if let Err(e) = &outcome {
                    warn!(
                        cache = self.name,
                        key,
                        error = %e,
                        "fetch failed, entry left as is"
                    );
                }
                self.land(key, flight.id, fetched);
                outcome
            })
            .await;

        outcome.clone()
    }

    /// Drops the entry for `key`; the next read refetches. A fetch already in
    /// flight for `key` is detached: its callers still get its result, but it
    /// is not stored and later readers start a new fetch.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut flights = lock(&self.flights);
        let detached = flights.remove(key).is_some();
        let removed = lock(&self.entries).remove(key).is_some() || detached;
        drop(flights);
        if removed {
            debug!(cache = self.name, key, "entry invalidated");
        }
        removed
    }

    /// Time of the last successful population of `key`.
    pub fn fetched_at(&self, key: &str) -> Option<Instant> {
        lock(&self.entries).get(key).map(|entry| entry.timestamp)
    }

    /// Current value for `key`, fresh or not. Never fetches.
    pub fn peek(&self, key: &str) -> Option<V> {
        lock(&self.entries).get(key).map(|entry| entry.data.clone())
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_fresh(&self, key: &str) -> Option<V> {
        let entries = lock(&self.entries);
        entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.data.clone())
    }

    fn store(&self, key: &str, data: V) {
        lock(&self.entries).insert(
            key.to_string(),
            CacheEntry {
                data,
                timestamp: Instant::now(),
            },
        );
    }

    fn join_flight(&self, key: &str) -> Arc<Flight<V>> {
        let mut flights = lock(&self.flights);
        flights
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(Flight {
                    id: self.next_flight.fetch_add(1, Ordering::Relaxed),
                    outcome: OnceCell::new(),
                })
            })
            .clone()
    }

    /// Ends flight `id` for `key`, storing `data` only if the flight is
    /// still the registered one. The flights lock is held across the store
    /// so `invalidate` cannot slip in between.
    fn land(&self, key: &str, id: u64, data: Option<V>) {
        let mut flights = lock(&self.flights);
        if !flights.get(key).is_some_and(|flight| flight.id == id) {
            debug!(cache = self.name, key, "flight detached, result not stored");
            return;
        }
        flights.remove(key);
        if let Some(data) = data {
            self.store(key, data);
        }
    }
}
