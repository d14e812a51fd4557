//! Process-wide query cache.
//!
//! One keyed store backs every query accessor. Entries live for `cache.stale_time` after they are
//! written and are otherwise dropped only by explicit invalidation. Failed loads are never stored,
//! and concurrent loads of the same key share a single request.
//!
//! Entries are stored under the query key plus the generation it had when the load started.
//! Invalidating a key bumps its generation, so a load already running for it finishes into an
//! entry no later read looks up, and the next read starts a fresh request.

use crate::config::CacheConfig;
use crate::errors::{Error, Result};
use crate::query::key::QueryKey;
use moka::future::Cache;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

type CachedValue = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StoredKey {
    key: QueryKey,
    generation: (u64, u64),
}

#[derive(Debug, Default)]
struct Generations {
    /// Bumped by `invalidate_all`
    global: u64,
    /// Only keys invalidated since the last `invalidate_all` have an entry
    per_key: HashMap<QueryKey, u64>,
    /// Keys with a load running, with the number of callers waiting on it
    in_flight: HashMap<QueryKey, usize>,
}

impl Generations {
    fn current(&self, key: &QueryKey) -> (u64, u64) {
        (self.global, self.per_key.get(key).copied().unwrap_or(0))
    }

    fn stored(&self, key: &QueryKey) -> StoredKey {
        StoredKey {
            key: key.clone(),
            generation: self.current(key),
        }
    }

    /// Move `key` to a new generation, returning the key its current entry is stored under.
    fn bump(&mut self, key: &QueryKey) -> StoredKey {
        let previous = self.stored(key);
        *self.per_key.entry(key.clone()).or_insert(0) += 1;
        previous
    }
}

/// Marks a key as loading for as long as it lives, so invalidation can see loads not yet cached.
struct InFlight<'a> {
    generations: &'a Mutex<Generations>,
    key: QueryKey,
}

impl<'a> InFlight<'a> {
    fn enter(generations: &'a Mutex<Generations>, key: &QueryKey) -> Self {
        *lock(generations).in_flight.entry(key.clone()).or_insert(0) += 1;
        Self {
            generations,
            key: key.clone(),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut generations = lock(self.generations);
        if let Some(count) = generations.in_flight.get_mut(&self.key) {
            *count -= 1;
            if *count == 0 {
                generations.in_flight.remove(&self.key);
            }
        }
    }
}

fn lock(generations: &Mutex<Generations>) -> MutexGuard<'_, Generations> {
    // the map stays consistent even if a holder panicked
    generations.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to the query cache. Clones share the same store.
#[derive(Clone)]
pub struct QueryClient {
    cache: Cache<StoredKey, CachedValue>,
    generations: Arc<Mutex<Generations>>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient").field("entries", &self.cache.entry_count()).finish()
    }
}

impl QueryClient {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(config.stale_time)
                .build(),
            generations: Arc::new(Mutex::new(Generations::default())),
        }
    }

    fn stored_key(&self, key: &QueryKey) -> StoredKey {
        lock(&self.generations).stored(key)
    }

    /// Return the cached value for `key`, or run `load` and cache its result.
    ///
    /// Callers racing on the same key wait for the first caller's load and receive its outcome;
    /// an error is handed to every waiter but not kept. A caller arriving after the key was
    /// invalidated never joins a load started before the invalidation.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, load: F) -> std::result::Result<Arc<T>, Arc<Error>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let stored = self.stored_key(key);
        if let Some(value) = self.cache.get(&stored).await {
            debug!("Cache hit");
            metrics::counter!("dentctl_query_cache_total", "entity" => key.entity(), "result" => "hit").increment(1);
            return downcast(key, value).map_err(Arc::new);
        }

        debug!("Cache miss, loading");
        metrics::counter!("dentctl_query_cache_total", "entity" => key.entity(), "result" => "miss").increment(1);
        let _loading = InFlight::enter(&self.generations, key);
        let value = self
            .cache
            .try_get_with(stored, async move { load().await.map(|v| Arc::new(v) as CachedValue) })
            .await?;
        downcast(key, value).map_err(Arc::new)
    }

    /// The cached value for `key`, without loading.
    pub async fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.cache.get(&self.stored_key(key)).await?;
        downcast(key, value).ok()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.cache.contains_key(&self.stored_key(key))
    }

    pub async fn invalidate_key(&self, key: &QueryKey) {
        debug!(%key, "Invalidating query");
        let previous = lock(&self.generations).bump(key);
        self.cache.invalidate(&previous).await;
    }

    /// Invalidate every key matching `predicate`, cached or still loading.
    ///
    /// Returns how many keys were invalidated.
    pub async fn invalidate_matching(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let cached: Vec<StoredKey> = self.cache.iter().map(|(stored, _)| StoredKey::clone(&stored)).collect();

        let previous: Vec<StoredKey> = {
            let mut generations = lock(&self.generations);
            let live = cached
                .iter()
                .filter(|stored| stored.generation == generations.current(&stored.key))
                .map(|stored| stored.key.clone());
            let candidates: HashSet<QueryKey> = live.chain(generations.in_flight.keys().cloned()).collect();
            candidates
                .into_iter()
                .filter(|key| predicate(key))
                .map(|key| generations.bump(&key))
                .collect()
        };

        for stored in &previous {
            self.cache.invalidate(stored).await;
        }
        previous.len()
    }

    /// Drop every cached entry of one entity (lists and details).
    #[instrument(skip(self))]
    pub async fn invalidate_entity(&self, entity: &str) -> usize {
        let dropped = self.invalidate_matching(|key| key.entity() == entity).await;
        debug!(dropped, "Invalidated entity queries");
        dropped
    }

    pub fn invalidate_all(&self) {
        debug!("Invalidating all queries");
        {
            let mut generations = lock(&self.generations);
            generations.global += 1;
            generations.per_key.clear();
        }
        self.cache.invalidate_all();
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: CachedValue) -> Result<Arc<T>> {
    value.downcast::<T>().map_err(|_| Error::CacheType { key: key.to_string() })
}
