//! Per-dataset query functions used by the presentation layer.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use super::{FetchGuard, QueryKey};
use crate::api::{endpoints, Dataset, FetchError, HttpTransport, Transport};
use crate::cache::{CacheEntry, EntryStatus, QueryCache};
use crate::config::Config;
use crate::models::{
    CalendarPoint, DatasetItem, FilterSelection, HeatMapSerie, HistoryRow, Payload, Serie,
};
use crate::notify::ErrorNotifier;

/// What a consumer sees for one query: status, data (empty until loaded)
/// and the failure, if any.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: EntryStatus,
    pub data: Arc<T>,
    pub error: Option<Arc<FetchError>>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: Arc::clone(&self.data),
            error: self.error.clone(),
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == EntryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == EntryStatus::Error
    }
}

impl<I: DatasetItem> QueryState<Vec<I>> {
    /// Empty result for a selection the guard rejected.
    pub fn idle() -> Self {
        Self {
            status: EntryStatus::Idle,
            data: Arc::new(Vec::new()),
            error: None,
        }
    }

    pub(crate) fn from_entry(entry: CacheEntry<Payload>) -> Self {
        let data = entry
            .data
            .as_deref()
            .and_then(I::from_payload)
            .unwrap_or_default();
        Self {
            status: entry.status,
            data,
            error: entry.error,
        }
    }
}

type Loader = BoxFuture<'static, Result<Payload, FetchError>>;

/// Session-scoped entry point: one transport, one cache.
/// Clone is cheap and clones share the cache.
#[derive(Clone)]
pub struct DashboardClient {
    transport: Arc<dyn Transport>,
    cache: QueryCache<Payload>,
}

impl DashboardClient {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn ErrorNotifier>) -> Self {
        Self::with_cache(transport, QueryCache::new(notifier))
    }

    pub fn with_cache(transport: Arc<dyn Transport>, cache: QueryCache<Payload>) -> Self {
        Self { transport, cache }
    }

    /// HTTP-backed client for the configured backend.
    pub fn from_config(config: &Config, notifier: Arc<dyn ErrorNotifier>) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config.base_url.as_str(), config.request_timeout())?;
        let cache = QueryCache::with_stale_after(notifier, config.stale_after());
        Ok(Self::with_cache(Arc::new(transport), cache))
    }

    pub fn cache(&self) -> &QueryCache<Payload> {
        &self.cache
    }

    /// Key and loader for `dataset`, or `None` when the selection is not
    /// fetchable. The loader is the only place the transport is called.
    fn plan<I: DatasetItem>(
        &self,
        dataset: Dataset,
        selection: &FilterSelection,
    ) -> Option<(QueryKey, Loader)> {
        let request = if dataset.needs_selection() {
            let valid = FetchGuard::admit(selection)?;
            endpoints::request_for(dataset, Some(&valid))
        } else {
            endpoints::request_for(dataset, None)
        };

        let key = QueryKey::new(dataset, selection);
        let transport = Arc::clone(&self.transport);
        let loader = async move {
            let request = request?;
            let body = transport.send(request).await?;
            let items: Vec<I> = endpoints::decode(dataset, body)?;
            Ok::<Payload, FetchError>(I::into_payload(items))
        }
        .boxed();
        Some((key, loader))
    }

    async fn query<I: DatasetItem>(
        &self,
        dataset: Dataset,
        selection: &FilterSelection,
        force: bool,
    ) -> QueryState<Vec<I>> {
        let (key, loader) = match self.plan::<I>(dataset, selection) {
            Some(plan) => plan,
            None => return QueryState::idle(),
        };
        let entry = if force {
            self.cache.refetch(key, loader).await
        } else {
            self.cache.get_or_fetch(key, loader).await
        };
        QueryState::from_entry(entry)
    }

    /// Start a query in the background. Returns the key to observe, or
    /// `None` if the selection is not fetchable.
    pub(crate) fn prefetch<I: DatasetItem>(
        &self,
        dataset: Dataset,
        selection: &FilterSelection,
    ) -> Option<QueryKey> {
        let (key, loader) = self.plan::<I>(dataset, selection)?;
        self.cache.start(key.clone(), loader);
        Some(key)
    }

    // ===== Unfiltered datasets =====

    pub async fn get_count_day(&self) -> QueryState<Vec<CalendarPoint>> {
        self.query(Dataset::CountDay, &FilterSelection::default(), false).await
    }

    pub async fn get_count_day_per_sport(&self) -> QueryState<Vec<Serie>> {
        self.query(Dataset::CountDayPerSport, &FilterSelection::default(), false).await
    }

    pub async fn get_sports(&self) -> QueryState<Vec<String>> {
        self.query(Dataset::Sports, &FilterSelection::default(), false).await
    }

    pub async fn get_locations(&self) -> QueryState<Vec<String>> {
        self.query(Dataset::Locations, &FilterSelection::default(), false).await
    }

    // ===== Selection-driven datasets =====

    pub async fn get_history(&self, selection: &FilterSelection) -> QueryState<Vec<HistoryRow>> {
        self.query(Dataset::History, selection, false).await
    }

    pub async fn get_history_line(&self, selection: &FilterSelection) -> QueryState<Vec<Serie>> {
        self.query(Dataset::HistoryLine, selection, false).await
    }

    pub async fn get_weekly(&self, selection: &FilterSelection) -> QueryState<Vec<HeatMapSerie>> {
        self.query(Dataset::Weekly, selection, false).await
    }

    // ===== Explicit refetches =====

    pub async fn refetch_count_day(&self) -> QueryState<Vec<CalendarPoint>> {
        self.query(Dataset::CountDay, &FilterSelection::default(), true).await
    }

    pub async fn refetch_count_day_per_sport(&self) -> QueryState<Vec<Serie>> {
        self.query(Dataset::CountDayPerSport, &FilterSelection::default(), true).await
    }

    pub async fn refetch_sports(&self) -> QueryState<Vec<String>> {
        self.query(Dataset::Sports, &FilterSelection::default(), true).await
    }

    pub async fn refetch_locations(&self) -> QueryState<Vec<String>> {
        self.query(Dataset::Locations, &FilterSelection::default(), true).await
    }

    pub async fn refetch_history(&self, selection: &FilterSelection) -> QueryState<Vec<HistoryRow>> {
        self.query(Dataset::History, selection, true).await
    }

    pub async fn refetch_history_line(&self, selection: &FilterSelection) -> QueryState<Vec<Serie>> {
        self.query(Dataset::HistoryLine, selection, true).await
    }

    pub async fn refetch_weekly(&self, selection: &FilterSelection) -> QueryState<Vec<HeatMapSerie>> {
        self.query(Dataset::Weekly, selection, true).await
    }
}
