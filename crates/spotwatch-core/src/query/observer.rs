use std::marker::PhantomData;

use tracing::debug;

use super::client::{DashboardClient, QueryState};
use super::QueryKey;
use crate::api::Dataset;
use crate::models::{DatasetItem, FilterSelection, HeatMapSerie, HistoryRow, Serie};

/// Follows one dataset for a consumer whose selection changes over time.
///
/// State is always read through the key of the most recent selection, so
/// a request for an older selection that resolves late is stored in the
/// cache but never shown here.
pub struct QueryObserver<I> {
    client: DashboardClient,
    dataset: Dataset,
    key: Option<QueryKey>,
    _item: PhantomData<fn() -> I>,
}

impl QueryObserver<HistoryRow> {
    pub fn history(client: DashboardClient) -> Self {
        Self::new(client, Dataset::History)
    }
}

impl QueryObserver<Serie> {
    pub fn history_line(client: DashboardClient) -> Self {
        Self::new(client, Dataset::HistoryLine)
    }
}

impl QueryObserver<HeatMapSerie> {
    pub fn weekly(client: DashboardClient) -> Self {
        Self::new(client, Dataset::Weekly)
    }
}

impl<I: DatasetItem> QueryObserver<I> {
    fn new(client: DashboardClient, dataset: Dataset) -> Self {
        Self {
            client,
            dataset,
            key: None,
            _item: PhantomData,
        }
    }

    /// Switch to `selection` and start loading it in the background.
    pub fn observe(&mut self, selection: &FilterSelection) {
        let key = self.client.prefetch::<I>(self.dataset, selection);
        if key != self.key {
            debug!(dataset = %self.dataset, key = ?key.as_ref().map(|k| k.to_string()), "Observed key changed");
        }
        self.key = key;
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    /// Current state of the observed key. Idle and empty when the last
    /// selection was not fetchable.
    pub fn state(&self) -> QueryState<Vec<I>> {
        match &self.key {
            Some(key) => QueryState::from_entry(self.client.cache().peek(key)),
            None => QueryState::idle(),
        }
    }

    /// Wait until the observed key's request, if any, has resolved.
    pub async fn settled(&self) -> QueryState<Vec<I>> {
        match &self.key {
            Some(key) => QueryState::from_entry(self.client.cache().settled(key).await),
            None => QueryState::idle(),
        }
    }
}
