//! Query cache storage.
//!
//! Holds the latest successful read per [`QueryKey`]. Fetches are
//! single-flight: concurrent callers for a key that is already loading await
//! the same shared future. Invalidation detaches the in-flight fetch, so a
//! result that started before a mutation is never stored after it.

use std::{
    any::Any,
    collections::HashMap,
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::{counter, histogram};
use tracing::debug;

use crate::{application::repos::StoreError, domain::types::Collection};

use super::{config::CacheConfig, keys::QueryKey, lock::mutex_lock};

const SOURCE: &str = "cache::store";

const METRIC_HIT: &str = "knoxs_query_cache_hit_total";
const METRIC_MISS: &str = "knoxs_query_cache_miss_total";
const METRIC_SHARED: &str = "knoxs_query_cache_shared_total";
const METRIC_INVALIDATE: &str = "knoxs_query_cache_invalidate_total";
const METRIC_FETCH_MS: &str = "knoxs_query_cache_fetch_ms";

type Erased = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<Erased, StoreError>>>;

struct InFlight {
    ticket: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Slot {
    value: Option<Erased>,
    fresh: bool,
    in_flight: Option<InFlight>,
    last_error: Option<StoreError>,
}

/// Non-blocking view of one cache entry.
#[derive(Debug)]
pub enum QueryState<T> {
    /// Never fetched, or cleared.
    Idle,
    /// A fetch is running. `previous` is the last good value, if any.
    Pending { previous: Option<Arc<T>> },
    Ready(Arc<T>),
    /// Invalidated and not yet refetched.
    Stale(Arc<T>),
    Failed {
        error: StoreError,
        previous: Option<Arc<T>>,
    },
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Idle => QueryState::Idle,
            QueryState::Pending { previous } => QueryState::Pending {
                previous: previous.clone(),
            },
            QueryState::Ready(value) => QueryState::Ready(Arc::clone(value)),
            QueryState::Stale(value) => QueryState::Stale(Arc::clone(value)),
            QueryState::Failed { error, previous } => QueryState::Failed {
                error: error.clone(),
                previous: previous.clone(),
            },
        }
    }
}

/// Key-addressed cache of collection reads shared by every consumer.
pub struct QueryCache {
    config: CacheConfig,
    slots: Mutex<HashMap<QueryKey, Slot>>,
    next_ticket: AtomicU64,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Return the fresh value for `key`, or run `fetch` once for every
    /// concurrent caller and cache its result.
    ///
    /// A failed fetch keeps the previous value and is reported to every
    /// waiting caller.
    pub async fn get<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Arc<T>, StoreError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
    {
        let (ticket, shared) = {
            let mut slots = mutex_lock(&self.slots, SOURCE, "get");
            let slot = slots.entry(key).or_default();

            if slot.fresh
                && let Some(value) = slot.value.clone().and_then(downcast::<T>)
            {
                counter!(METRIC_HIT, "key" => key.name()).increment(1);
                debug!(key = key.name(), "query cache hit");
                return Ok(value);
            }

            match slot.in_flight.as_ref() {
                Some(in_flight) => {
                    counter!(METRIC_SHARED, "key" => key.name()).increment(1);
                    debug!(key = key.name(), "joining in-flight fetch");
                    (in_flight.ticket, in_flight.fetch.clone())
                }
                None => {
                    counter!(METRIC_MISS, "key" => key.name()).increment(1);
                    debug!(key = key.name(), "query cache miss");
                    let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                    let fetch = start_fetch(key, fetch());
                    slot.in_flight = Some(InFlight {
                        ticket,
                        fetch: fetch.clone(),
                    });
                    (ticket, fetch)
                }
            }
        };

        let result = shared.await;
        self.settle(key, ticket, &result);

        let value = result?;
        downcast::<T>(value).ok_or_else(|| {
            StoreError::Decode(format!("cached value for `{key}` has an unexpected type"))
        })
    }

    /// Mark `key` stale and detach any in-flight fetch.
    pub fn invalidate(&self, key: QueryKey) {
        let mut slots = mutex_lock(&self.slots, SOURCE, "invalidate");
        invalidate_slot(&mut slots, key);
    }

    /// Invalidate every cached view of `collection` under one lock.
    pub fn invalidate_collection(&self, collection: Collection) {
        let mut slots = mutex_lock(&self.slots, SOURCE, "invalidate_collection");
        for key in QueryKey::for_collection(collection) {
            invalidate_slot(&mut slots, key);
        }
    }

    pub fn clear(&self) {
        mutex_lock(&self.slots, SOURCE, "clear").clear();
    }

    pub fn state<T>(&self, key: QueryKey) -> QueryState<T>
    where
        T: Send + Sync + 'static,
    {
        let slots = mutex_lock(&self.slots, SOURCE, "state");
        let Some(slot) = slots.get(&key) else {
            return QueryState::Idle;
        };

        let previous = slot.value.clone().and_then(downcast::<T>);
        if slot.in_flight.is_some() {
            return QueryState::Pending { previous };
        }
        if let Some(error) = slot.last_error.clone() {
            return QueryState::Failed { error, previous };
        }
        match previous {
            Some(value) if slot.fresh => QueryState::Ready(value),
            Some(value) => QueryState::Stale(value),
            None => QueryState::Idle,
        }
    }

    fn settle(&self, key: QueryKey, ticket: u64, result: &Result<Erased, StoreError>) {
        let mut slots = mutex_lock(&self.slots, SOURCE, "settle");
        let Some(slot) = slots.get_mut(&key) else {
            return;
        };
        // Detached by invalidation or already settled by another waiter.
        if slot.in_flight.as_ref().is_none_or(|f| f.ticket != ticket) {
            return;
        }
        slot.in_flight = None;

        match result {
            Ok(value) => {
                slot.last_error = None;
                if self.config.enabled {
                    slot.value = Some(Arc::clone(value));
                    slot.fresh = true;
                }
            }
            Err(error) => {
                slot.last_error = Some(error.clone());
            }
        }
    }
}

fn start_fetch<T, Fut>(key: QueryKey, fut: Fut) -> SharedFetch
where
    T: Send + Sync + 'static,
    Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
{
    async move {
        let started = Instant::now();
        let result = fut.await.map(|value| Arc::new(value) as Erased);
        histogram!(
            METRIC_FETCH_MS,
            "key" => key.name(),
            "outcome" => if result.is_ok() { "ok" } else { "error" }
        )
        .record(started.elapsed().as_secs_f64() * 1000.0);
        result
    }
    .boxed()
    .shared()
}

fn invalidate_slot(slots: &mut HashMap<QueryKey, Slot>, key: QueryKey) {
    if let Some(slot) = slots.get_mut(&key) {
        slot.fresh = false;
        slot.in_flight = None;
        slot.last_error = None;
        counter!(METRIC_INVALIDATE, "key" => key.name()).increment(1);
        debug!(key = key.name(), "query cache invalidated");
    }
}

fn downcast<T: Send + Sync + 'static>(value: Erased) -> Option<Arc<T>> {
    value.downcast::<T>().ok()
}
