//! Query cache state.
//!
//! Holds one [`CacheEntry`] per [`QueryKey`], the tag graph, and the table of
//! in-flight fetches used for de-duplication. Everything here is synchronous
//! and lives behind a single mutex owned by [`Api`](crate::Api); the lock is
//! never held across an `.await`.

pub mod tags;

use crate::endpoint::QueryRecipe;
use crate::error::{LinkError, Result};
use crate::models::ApiResponse;
use crate::timeouts::CacheConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tags::{QueryKey, TagGraph};
use tokio::sync::{oneshot, watch};

/// Snapshot of a query as seen by its subscribers.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    /// Last successfully fetched response. Kept across failed refetches.
    pub data: Option<Arc<ApiResponse>>,
    /// Error of the most recent fetch, cleared by the next success.
    pub error: Option<LinkError>,
    pub is_fetching: bool,
}

impl QueryState {
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}

pub(crate) type Waiter = oneshot::Sender<Result<Arc<ApiResponse>>>;

pub(crate) struct CacheEntry {
    pub(crate) recipe: Arc<QueryRecipe>,
    /// Generation the entry was created in. Identifies this incarnation of
    /// the key so handles from before a reset leave the new entry alone.
    pub(crate) origin: u64,
    pub(crate) fetched_at: Option<Instant>,
    /// Raised by every invalidation; fetches are tagged with the generation
    /// they started in.
    pub(crate) generation: u64,
    /// Generation of the response currently held in `state.data`.
    pub(crate) data_generation: u64,
    pub(crate) stale: bool,
    pub(crate) subscribers: usize,
    pub(crate) unused_since: Option<Instant>,
    pub(crate) state_tx: watch::Sender<QueryState>,
}

impl CacheEntry {
    pub(crate) fn new(recipe: Arc<QueryRecipe>, now: Instant, generation: u64) -> Self {
        let (state_tx, _) = watch::channel(QueryState::default());
        Self {
            recipe,
            origin: generation,
            fetched_at: None,
            generation,
            data_generation: generation,
            stale: false,
            subscribers: 0,
            unused_since: Some(now),
            state_tx,
        }
    }

    pub(crate) fn data(&self) -> Option<Arc<ApiResponse>> {
        self.state_tx.borrow().data.clone()
    }

    pub(crate) fn is_fresh(&self, now: Instant, config: &CacheConfig) -> bool {
        if self.stale || self.state_tx.borrow().data.is_none() {
            return false;
        }
        match (config.refetch_after, self.fetched_at) {
            (Some(max_age), Some(fetched_at)) => now.duration_since(fetched_at) < max_age,
            _ => true,
        }
    }

    /// Unmounted for longer than the keep-unused window and not fetching.
    pub(crate) fn is_expired(&self, now: Instant, config: &CacheConfig) -> bool {
        self.subscribers == 0
            && !self.state_tx.borrow().is_fetching
            && self
                .unused_since
                .map_or(false, |since| now.duration_since(since) >= config.keep_unused_data_for)
    }

    /// Invalidate the held data; readers from now on need a new fetch.
    pub(crate) fn mark_stale(&mut self, generation: u64) {
        self.stale = true;
        self.generation = generation;
    }
}

#[derive(Default)]
pub(crate) struct CacheState {
    pub(crate) entries: HashMap<QueryKey, CacheEntry>,
    pub(crate) graph: TagGraph,
    pub(crate) in_flight: HashMap<(QueryKey, u64), Vec<Waiter>>,
    generation_seq: u64,
}

impl CacheState {
    /// Generations are unique across the whole cache, including entries
    /// recreated after a reset.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.generation_seq += 1;
        self.generation_seq
    }

    pub(crate) fn get_or_insert(
        &mut self,
        key: &QueryKey,
        recipe: impl FnOnce() -> QueryRecipe,
        now: Instant,
    ) -> &mut CacheEntry {
        let seq = &mut self.generation_seq;
        self.entries.entry(key.clone()).or_insert_with(|| {
            *seq += 1;
            CacheEntry::new(Arc::new(recipe()), now, *seq)
        })
    }

    /// Drop entries whose keep-unused window has elapsed.
    pub(crate) fn evict_expired(&mut self, now: Instant, config: &CacheConfig) {
        let expired: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, config))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            log::debug!("[CACHE] Evicting unused entry {}", key);
            self.remove(&key);
        }
    }

    /// Keys whose first fetch is still running, so their tags are not yet in
    /// the graph. An invalidation has to treat them as matching: the response
    /// on its way may predate the mutation.
    pub(crate) fn untagged_in_flight(&self) -> Vec<QueryKey> {
        self.entries
            .iter()
            .filter(|(key, entry)| {
                self.graph.tags_of(key).is_none()
                    && self
                        .in_flight
                        .contains_key(&((*key).clone(), entry.generation))
            })
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub(crate) fn remove(&mut self, key: &QueryKey) {
        self.entries.remove(key);
        self.graph.detach(key);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.graph.clear();
    }

    /// Record the outcome of a fetch started in `generation`.
    ///
    /// A response never overwrites data from a newer generation. The watch
    /// value is replaced in one step, so subscribers see either the old or
    /// the new response, never a mix.
    pub(crate) fn complete(
        &mut self,
        key: &QueryKey,
        generation: u64,
        outcome: &Result<Arc<ApiResponse>>,
        now: Instant,
    ) {
        let still_fetching = self
            .in_flight
            .keys()
            .any(|(k, g)| k == key && *g != generation);
        let Some(entry) = self.entries.get_mut(key) else {
            log::debug!("[CACHE] Entry {} evicted while fetching; result not stored", key);
            return;
        };

        match outcome {
            Ok(data) => {
                if generation < entry.data_generation {
                    log::debug!(
                        "[CACHE] Discarding response of generation {} for {} (holding {})",
                        generation,
                        key,
                        entry.data_generation
                    );
                    if !still_fetching {
                        entry.state_tx.send_if_modified(|state| {
                            std::mem::replace(&mut state.is_fetching, false)
                        });
                    }
                    return;
                }
                entry.data_generation = generation;
                entry.fetched_at = Some(now);
                entry.stale = entry.generation != generation;
                let tags = entry.recipe.provided_tags(data);
                entry.state_tx.send_replace(QueryState {
                    data: Some(data.clone()),
                    error: None,
                    is_fetching: still_fetching,
                });
                self.graph.attach(key, tags);
            }
            Err(e) => {
                entry.state_tx.send_modify(|state| {
                    state.error = Some(e.clone());
                    state.is_fetching = still_fetching;
                });
            }
        }
    }
}
