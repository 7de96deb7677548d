use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, error, warn};

use super::entry::{CacheEntry, EntryStatus};
use crate::api::FetchError;
use crate::notify::{ErrorNotice, ErrorNotifier};
use crate::query::QueryKey;

/// Completion signal of one in-flight request, shared by every waiter.
type Pending = Shared<BoxFuture<'static, ()>>;

/// The request currently allowed to write a slot.
struct InFlight {
    id: u64,
    done: Pending,
}

struct Slot<T> {
    entry: CacheEntry<T>,
    pending: Option<InFlight>,
}

struct Inner<T> {
    slots: Mutex<HashMap<QueryKey, Slot<T>>>,
    next_request: AtomicU64,
    notifier: Arc<dyn ErrorNotifier>,
    stale_after: Option<Duration>,
}

impl<T> Inner<T> {
    // The lock is never held across an await, and no code under it can
    // panic halfway through a write, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot<T>>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_servable(&self, entry: &CacheEntry<T>) -> bool {
        match entry.status {
            EntryStatus::Success => match self.stale_after {
                Some(window) => !entry.is_stale(window),
                None => true,
            },
            // Failures stay cached until an explicit refetch
            EntryStatus::Error => true,
            EntryStatus::Idle | EntryStatus::Loading => false,
        }
    }

    /// Sole writer of a resolved entry. Runs once per in-flight request and
    /// writes only if `request` still owns the slot; a slot recreated after
    /// `clear` belongs to a newer request.
    fn resolve(&self, key: &QueryKey, request: u64, outcome: Result<T, FetchError>) {
        let failure = {
            let mut slots = self.lock();
            let slot = match slots.get_mut(key) {
                Some(slot) if slot.pending.as_ref().map(|p| p.id) == Some(request) => slot,
                _ => {
                    debug!(key = %key, request, "Cache cleared before resolution, dropping result");
                    return;
                }
            };
            slot.pending = None;
            slot.entry.last_updated = Some(Utc::now());
            match outcome {
                Ok(data) => {
                    slot.entry.status = EntryStatus::Success;
                    slot.entry.data = Some(Arc::new(data));
                    slot.entry.error = None;
                    None
                }
                Err(err) => {
                    let err = Arc::new(err);
                    slot.entry.status = EntryStatus::Error;
                    slot.entry.error = Some(Arc::clone(&err));
                    Some(err)
                }
            }
        };

        match failure {
            None => debug!(key = %key, "Query resolved"),
            Some(err) => {
                warn!(key = %key, error = %err, "Query failed");
                self.notify(key, &err);
            }
        }
    }

    fn notify(&self, key: &QueryKey, err: &FetchError) {
        let notice = ErrorNotice::from_error(err);
        let delivered = panic::catch_unwind(AssertUnwindSafe(|| self.notifier.notify(&notice)));
        if delivered.is_err() {
            error!(key = %key, "Error notifier panicked");
        }
    }
}

/// Keyed result cache with in-flight deduplication.
///
/// Each key has at most one request in flight; callers asking for a key
/// that is loading wait on that request instead of starting another.
/// Results are written by a spawned resolution task, so a request runs to
/// completion even if every caller stops waiting. A result is always stored
/// under the key it was requested for, including keys no consumer observes
/// any more.
///
/// Must be used from within a tokio runtime. Clone is cheap and shares state.
pub struct QueryCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(notifier: Arc<dyn ErrorNotifier>) -> Self {
        Self::with_stale_after(notifier, None)
    }

    /// With a staleness window, successful entries older than the window
    /// are fetched again on the next request for their key.
    pub fn with_stale_after(notifier: Arc<dyn ErrorNotifier>, stale_after: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                next_request: AtomicU64::new(0),
                notifier,
                stale_after,
            }),
        }
    }

    /// Current state for `key`, without fetching.
    pub fn peek(&self, key: &QueryKey) -> CacheEntry<T> {
        self.inner
            .lock()
            .get(key)
            .map(|slot| slot.entry.clone())
            .unwrap_or_else(|| CacheEntry::idle(key.clone()))
    }

    /// Return the cached entry for `key`, running `loader` only if there is
    /// nothing servable cached and no request already in flight.
    pub async fn get_or_fetch<F>(&self, key: QueryKey, loader: F) -> CacheEntry<T>
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        if let Some(pending) = self.begin(&key, loader, false) {
            pending.await;
        }
        self.peek(&key)
    }

    /// Fetch `key` again even if a result is cached. Joins a request that is
    /// already in flight rather than starting a second one.
    pub async fn refetch<F>(&self, key: QueryKey, loader: F) -> CacheEntry<T>
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        if let Some(pending) = self.begin(&key, loader, true) {
            pending.await;
        }
        self.peek(&key)
    }

    /// Start fetching `key` if needed, without waiting for the result.
    pub fn start<F>(&self, key: QueryKey, loader: F)
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let _ = self.begin(&key, loader, false);
    }

    /// Wait for the in-flight request of `key`, if any, then return its entry.
    pub async fn settled(&self, key: &QueryKey) -> CacheEntry<T> {
        let pending = self
            .inner
            .lock()
            .get(key)
            .and_then(|slot| slot.pending.as_ref().map(|p| p.done.clone()));
        if let Some(pending) = pending {
            pending.await;
        }
        self.peek(key)
    }

    /// Drop every entry. Requests still in flight complete but their results
    /// are discarded, even if the same key has been fetched again since.
    pub fn clear(&self) {
        let mut slots = self.inner.lock();
        debug!(entries = slots.len(), "Clearing query cache");
        slots.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin<F>(&self, key: &QueryKey, loader: F, force: bool) -> Option<Pending>
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let mut slots = self.inner.lock();
        let slot = slots.entry(key.clone()).or_insert_with(|| Slot {
            entry: CacheEntry::idle(key.clone()),
            pending: None,
        });

        if let Some(pending) = &slot.pending {
            debug!(key = %key, request = pending.id, "Joining in-flight request");
            return Some(pending.done.clone());
        }
        if !force && self.inner.is_servable(&slot.entry) {
            debug!(key = %key, "Cache hit");
            return None;
        }

        let request = self.inner.next_request.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, request, forced = force, "Fetching");
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = async move {
            let outcome = AssertUnwindSafe(loader)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(FetchError::Aborted("loader panicked".to_string())));
            inner.resolve(&task_key, request, outcome);
        };

        // Spawned while the map is locked: the task cannot resolve before
        // its pending handle is registered below.
        let join_key = key.clone();
        let pending = tokio::spawn(task)
            .map(move |joined| {
                if let Err(e) = joined {
                    error!(key = %join_key, error = %e, "Resolution task failed");
                }
            })
            .boxed()
            .shared();

        slot.entry.status = EntryStatus::Loading;
        slot.pending = Some(InFlight {
            id: request,
            done: pending.clone(),
        });
        Some(pending)
    }
}
