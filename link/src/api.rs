//! Caching executor for endpoint descriptors.
//!
//! [`Api`] runs [`QueryEndpoint`]s and [`MutationEndpoint`]s against an
//! [`ApiClient`]. Query results are cached per `(endpoint, args)` and tagged;
//! a successful mutation invalidates tags, which refetches mounted queries
//! and evicts unmounted ones. Identical concurrent queries share one request.

use crate::cache::tags::{QueryKey, Tag};
use crate::cache::{CacheState, QueryState, Waiter};
use crate::client::ApiClient;
use crate::endpoint::{MutationEndpoint, QueryEndpoint};
use crate::error::{LinkError, Result};
use crate::models::{ApiResponse, Paginated};
use crate::timeouts::CacheConfig;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{oneshot, watch};

/// Shared handle to the client and its query cache.
///
/// Cloning is cheap; clones share one cache.
#[derive(Clone)]
pub struct Api {
    inner: Arc<ApiInner>,
}

struct ApiInner {
    client: ApiClient,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self::with_config(client, CacheConfig::default())
    }

    pub fn with_config(client: ApiClient, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(ApiInner {
                client,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn cache_config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Return the cached response for `args`, fetching it when absent or stale.
    ///
    /// Must be called from within a Tokio runtime; fetches run on spawned
    /// tasks so a dropped caller never strands other waiters.
    pub async fn query<A>(&self, endpoint: &QueryEndpoint<A>, args: &A) -> Result<Arc<ApiResponse>>
    where
        A: Serialize + Clone + Send + Sync + 'static,
    {
        let key = QueryKey::new(endpoint.name(), args)?;
        let receiver = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            let now = Instant::now();
            state.evict_expired(now, &self.inner.config);
            let entry = state.get_or_insert(&key, || endpoint.recipe(args), now);
            if entry.subscribers == 0 {
                entry.unused_since = Some(now);
            }
            if entry.is_fresh(now, &self.inner.config) {
                if let Some(data) = entry.data() {
                    log::trace!("[CACHE] Hit {}", key);
                    return Ok(data);
                }
            }
            let (tx, rx) = oneshot::channel();
            self.inner.start_fetch(state, &key, Some(tx));
            rx
        };
        receiver.await.unwrap_or(Err(LinkError::Cancelled))
    }

    /// [`query`](Self::query) and decode `data` as `T`.
    pub async fn query_as<T, A>(&self, endpoint: &QueryEndpoint<A>, args: &A) -> Result<T>
    where
        T: DeserializeOwned,
        A: Serialize + Clone + Send + Sync + 'static,
    {
        self.query(endpoint, args).await?.decode_data()
    }

    /// [`query`](Self::query) and decode a paginated list of `T`.
    pub async fn query_page<T, A>(
        &self,
        endpoint: &QueryEndpoint<A>,
        args: &A,
    ) -> Result<Paginated<T>>
    where
        T: DeserializeOwned,
        A: Serialize + Clone + Send + Sync + 'static,
    {
        self.query(endpoint, args).await?.decode_page()
    }

    /// Mount a query. It stays cached while the subscription lives and is
    /// refetched when one of its tags is invalidated.
    ///
    /// A fetch is started immediately when no fresh data is cached; use
    /// [`QuerySubscription::loaded`] to wait for it.
    pub fn subscribe<A>(&self, endpoint: &QueryEndpoint<A>, args: &A) -> Result<QuerySubscription>
    where
        A: Serialize + Clone + Send + Sync + 'static,
    {
        let key = QueryKey::new(endpoint.name(), args)?;
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        let now = Instant::now();
        state.evict_expired(now, &self.inner.config);

        let entry = state.get_or_insert(&key, || endpoint.recipe(args), now);
        entry.subscribers += 1;
        entry.unused_since = None;
        let receiver = entry.state_tx.subscribe();
        let origin = entry.origin;
        let needs_fetch = !entry.is_fresh(now, &self.inner.config);
        log::debug!("[CACHE] Mounted {} (subscribers={})", key, entry.subscribers);

        if needs_fetch {
            self.inner.start_fetch(state, &key, None);
        }

        Ok(QuerySubscription {
            inner: self.inner.clone(),
            key,
            origin,
            receiver,
        })
    }

    /// Execute a mutation and invalidate the tags it reports.
    ///
    /// Refetches of mounted queries are awaited before this returns, so a
    /// subscriber reading right afterwards sees post-mutation data.
    pub async fn mutate<A>(&self, endpoint: &MutationEndpoint<A>, args: &A) -> Result<ApiResponse>
    where
        A: 'static,
    {
        let request = endpoint.build_request(args)?;
        log::debug!("[CACHE] Mutation {}", endpoint.name());
        let response = self.inner.client.execute(&request).await?;
        let tags = endpoint.invalidated_tags(args, &response);
        self.invalidate(&tags).await;
        Ok(response)
    }

    /// [`mutate`](Self::mutate) and decode `data` as `T`.
    pub async fn mutate_as<T, A>(&self, endpoint: &MutationEndpoint<A>, args: &A) -> Result<T>
    where
        T: DeserializeOwned,
        A: 'static,
    {
        self.mutate(endpoint, args).await?.decode_data()
    }

    /// Invalidate every cached query providing one of `tags`.
    ///
    /// Mounted queries are refetched and awaited; unmounted ones are dropped
    /// and fetched again on next use. Refetch failures are recorded on the
    /// query's state rather than returned here.
    ///
    /// Queries still waiting on their first response have no tags yet and
    /// are handled as if they matched.
    pub async fn invalidate(&self, tags: &[Tag]) {
        if tags.is_empty() {
            return;
        }
        let receivers = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            let mut keys = state.graph.keys_for(tags);
            keys.extend(state.untagged_in_flight());
            let mut receivers = Vec::new();
            for key in keys {
                let mounted = state
                    .entries
                    .get(&key)
                    .map_or(false, |entry| entry.subscribers > 0);
                if mounted {
                    let generation = state.next_generation();
                    if let Some(entry) = state.entries.get_mut(&key) {
                        entry.mark_stale(generation);
                    }
                    let (tx, rx) = oneshot::channel();
                    self.inner.start_fetch(state, &key, Some(tx));
                    receivers.push(rx);
                } else {
                    log::debug!("[CACHE] Evicting unmounted {}", key);
                    state.remove(&key);
                }
            }
            receivers
        };

        if receivers.is_empty() {
            return;
        }
        log::debug!("[CACHE] Refetching {} mounted queries", receivers.len());
        for outcome in join_all(receivers).await {
            match outcome {
                Ok(Err(e)) => log::warn!("[CACHE] Refetch after invalidation failed: {}", e),
                Err(_) => log::debug!("[CACHE] Refetch abandoned"),
                Ok(Ok(_)) => {}
            }
        }
    }

    /// Drop every cached query. Mounted subscriptions are closed.
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        log::debug!("[CACHE] Reset ({} entries)", state.entries.len());
        state.clear();
    }

    /// Current state of a query, if cached.
    pub fn cached<A>(&self, endpoint: &QueryEndpoint<A>, args: &A) -> Option<QueryState>
    where
        A: Serialize + 'static,
    {
        let key = QueryKey::new(endpoint.name(), args).ok()?;
        let state = self.inner.lock();
        state
            .entries
            .get(&key)
            .map(|entry| entry.state_tx.borrow().clone())
    }

    pub fn cached_len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

impl ApiInner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the in-flight fetch for the entry's current generation, or start
    /// one on a spawned task.
    fn start_fetch(self: &Arc<Self>, state: &mut CacheState, key: &QueryKey, waiter: Option<Waiter>) {
        let Some(entry) = state.entries.get(key) else {
            return;
        };
        let generation = entry.generation;
        let slot = (key.clone(), generation);

        if let Some(waiters) = state.in_flight.get_mut(&slot) {
            log::trace!("[CACHE] Joining in-flight fetch for {}", key);
            waiters.extend(waiter);
            return;
        }

        let recipe = entry.recipe.clone();
        entry.state_tx.send_modify(|s| s.is_fetching = true);
        state.in_flight.insert(slot, waiter.into_iter().collect());

        let inner = Arc::clone(self);
        let key = key.clone();
        log::debug!("[CACHE] Fetching {} (generation {})", key, generation);
        tokio::spawn(async move {
            let outcome = inner
                .client
                .execute(&recipe.request)
                .await
                .map(|response| Arc::new(recipe.finish(response)));
            let waiters = {
                let mut state = inner.lock();
                state.complete(&key, generation, &outcome, Instant::now());
                state
                    .in_flight
                    .remove(&(key.clone(), generation))
                    .unwrap_or_default()
            };
            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }
        });
    }
}

/// A mounted query.
///
/// Dropping the last subscription for a key starts its keep-unused window.
pub struct QuerySubscription {
    inner: Arc<ApiInner>,
    key: QueryKey,
    origin: u64,
    receiver: watch::Receiver<QueryState>,
}

impl QuerySubscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn current(&self) -> QueryState {
        self.receiver.borrow().clone()
    }

    /// Decode the current data, if any has been loaded.
    pub fn data<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.current()
            .data
            .map(|response| response.decode_data())
            .transpose()
    }

    pub fn page<T: DeserializeOwned>(&self) -> Result<Option<Paginated<T>>> {
        self.current()
            .data
            .map(|response| response.decode_page())
            .transpose()
    }

    /// Wait for the next state change.
    pub async fn changed(&mut self) -> Result<QueryState> {
        self.receiver
            .changed()
            .await
            .map_err(|_| LinkError::Cancelled)?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Wait until no fetch is running and return the outcome.
    pub async fn loaded(&mut self) -> Result<Arc<ApiResponse>> {
        let state = self
            .receiver
            .wait_for(|s| !s.is_fetching && (s.data.is_some() || s.error.is_some()))
            .await
            .map_err(|_| LinkError::Cancelled)?
            .clone();
        match (state.error, state.data) {
            (Some(e), _) => Err(e),
            (None, Some(data)) => Ok(data),
            (None, None) => Err(LinkError::Cancelled),
        }
    }
}

impl Drop for QuerySubscription {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        if let Some(entry) = state.entries.get_mut(&self.key) {
            if entry.origin != self.origin {
                return;
            }
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                entry.unused_since = Some(Instant::now());
                log::debug!("[CACHE] Unmounted {}", self.key);
            }
        }
    }
}

impl std::fmt::Debug for QuerySubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySubscription")
            .field("key", &self.key)
            .finish()
    }
}
