//! Keyed, single-flight query cache binding fetches to view state.
//!
//! Each key maps to one slot that is either in flight, settled with a value,
//! or settled with a failure. Concurrent callers for the same key share one
//! in-flight load instead of issuing duplicates, and every waiter observes the
//! same outcome. Loads run outside the slot lock; the lock only serializes
//! slot transitions.
//!
//! Retention is bounded by a capacity (least recently used settled entries go
//! first) and an optional time-to-live for successful values. Failures are
//! recorded so observers can render them, but they are never retried on their
//! own: the next explicit [`QueryCache::fetch`] for the key starts a new load.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use mockable::Clock;
use tracing::debug;

/// Default number of entries retained per cache.
pub const DEFAULT_CAPACITY: usize = 256;

/// Default lifetime of a successful entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Bounds on how long and how many results a cache keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Maximum number of entries; in-flight loads are never evicted.
    pub capacity: usize,
    /// Lifetime of successful entries; `None` keeps them until evicted.
    pub ttl: Option<Duration>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: Some(DEFAULT_TTL),
        }
    }
}

impl RetentionPolicy {
    fn is_expired(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.ttl
            .and_then(|ttl| TimeDelta::from_std(ttl).ok())
            .is_some_and(|ttl| now - stored_at >= ttl)
    }
}

/// Observable state of one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<V, E> {
    /// Nothing is known about the key.
    Idle,
    /// A load is in flight.
    Pending,
    /// The most recent load failed.
    Failed(E),
    /// A value is available.
    Ready(V),
}

impl<V, E> QueryState<V, E> {
    /// The ready value, if any.
    pub const fn ready(&self) -> Option<&V> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure, if any.
    pub const fn failure(&self) -> Option<&E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl<V, E> From<Result<V, E>> for QueryState<V, E> {
    fn from(outcome: Result<V, E>) -> Self {
        match outcome {
            Ok(value) => Self::Ready(value),
            Err(error) => Self::Failed(error),
        }
    }
}

type SharedLoad<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
    InFlight {
        generation: u64,
        load: SharedLoad<V, E>,
    },
    Ready {
        value: V,
        stored_at: DateTime<Utc>,
    },
    Failed(E),
}

struct Entry<V, E> {
    slot: Slot<V, E>,
    last_used: u64,
}

struct Slots<K, V, E> {
    entries: HashMap<K, Entry<V, E>>,
    tick: u64,
    generation: u64,
}

impl<K: Eq + Hash + Clone, V, E> Slots<K, V, E> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn evict_to(&mut self, capacity: usize, keep: &K) {
        while self.entries.len() > capacity.max(1) {
            let victim = self
                .entries
                .iter()
                .filter(|(key, entry)| {
                    *key != keep && !matches!(entry.slot, Slot::InFlight { .. })
                })
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            match victim {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

enum Lookup<V, E> {
    Hit(V),
    Wait {
        generation: u64,
        load: SharedLoad<V, E>,
    },
}

/// Single-flight cache of query results keyed by `K`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use character_viewer::domain::query_cache::{QueryCache, QueryState, RetentionPolicy};
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let cache: QueryCache<u32, String, String> =
///     QueryCache::new(RetentionPolicy::default(), Arc::new(mockable::DefaultClock));
/// let value = cache
///     .fetch(7, || async { Ok::<_, String>("seven".to_owned()) })
///     .await;
/// assert_eq!(value.as_deref(), Ok("seven"));
/// assert_eq!(cache.peek(&7), QueryState::Ready("seven".to_owned()));
/// # });
/// ```
pub struct QueryCache<K, V, E> {
    slots: Mutex<Slots<K, V, E>>,
    policy: RetentionPolicy,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<K, V, E> QueryCache<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
{
    /// Create an empty cache.
    pub fn new(policy: RetentionPolicy, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                tick: 0,
                generation: 0,
            }),
            policy,
            clock,
        }
    }

    /// Return the cached value for `key`, join its in-flight load, or start
    /// `load` as the single load for the key.
    ///
    /// # Errors
    ///
    /// Returns the load's error; every caller waiting on the same load
    /// receives a clone of it.
    pub async fn fetch<F, Fut>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (generation, pending) = match self.begin(&key, load) {
            Lookup::Hit(value) => return Ok(value),
            Lookup::Wait { generation, load } => (generation, load),
        };
        let outcome = pending.await;
        self.settle(&key, generation, &outcome);
        outcome
    }

    /// Observe the current state of `key` without starting a load.
    pub fn peek(&self, key: &K) -> QueryState<V, E> {
        let now = self.clock.utc();
        let slots = self.lock();
        match slots.entries.get(key).map(|entry| &entry.slot) {
            None => QueryState::Idle,
            Some(Slot::InFlight { .. }) => QueryState::Pending,
            Some(Slot::Failed(error)) => QueryState::Failed(error.clone()),
            Some(Slot::Ready { value, stored_at }) => {
                if self.policy.is_expired(*stored_at, now) {
                    QueryState::Idle
                } else {
                    QueryState::Ready(value.clone())
                }
            }
        }
    }

    /// Drop whatever is known about `key`.
    ///
    /// A load still in flight for the key completes for its current waiters
    /// but its outcome is not stored.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self.lock().entries.remove(key).is_some();
        if removed {
            debug!(?key, "query invalidated");
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of entries, including in-flight loads.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin<F, Fut>(&self, key: &K, load: F) -> Lookup<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let now = self.clock.utc();
        let mut slots = self.lock();
        let tick = slots.next_tick();
        if let Some(entry) = slots.entries.get_mut(key) {
            entry.last_used = tick;
            match &entry.slot {
                Slot::Ready { value, stored_at } if !self.policy.is_expired(*stored_at, now) => {
                    debug!(?key, "query cache hit");
                    return Lookup::Hit(value.clone());
                }
                Slot::InFlight { generation, load } => {
                    debug!(?key, generation, "joining in-flight query");
                    return Lookup::Wait {
                        generation: *generation,
                        load: load.clone(),
                    };
                }
                Slot::Ready { .. } | Slot::Failed(_) => {}
            }
        }

        let generation = slots.next_generation();
        let shared = load().boxed().shared();
        debug!(?key, generation, "starting query");
        slots.entries.insert(
            key.clone(),
            Entry {
                slot: Slot::InFlight {
                    generation,
                    load: shared.clone(),
                },
                last_used: tick,
            },
        );
        slots.evict_to(self.policy.capacity, key);
        Lookup::Wait {
            generation,
            load: shared,
        }
    }

    fn settle(&self, key: &K, generation: u64, outcome: &Result<V, E>) {
        let now = self.clock.utc();
        let mut slots = self.lock();
        let Some(entry) = slots.entries.get_mut(key) else {
            debug!(?key, generation, "discarding outcome for invalidated query");
            return;
        };
        if !matches!(entry.slot, Slot::InFlight { generation: current, .. } if current == generation)
        {
            return;
        }
        entry.slot = match outcome {
            Ok(value) => Slot::Ready {
                value: value.clone(),
                stored_at: now,
            },
            Err(error) => {
                debug!(?key, %error, "query failed");
                Slot::Failed(error.clone())
            }
        };
    }

    fn lock(&self) -> MutexGuard<'_, Slots<K, V, E>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
