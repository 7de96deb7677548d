use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::api::FetchError;
use crate::query::QueryKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of the cached state for one key.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub key: QueryKey,
    pub status: EntryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<Arc<FetchError>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            last_updated: self.last_updated,
        }
    }
}

impl<T> CacheEntry<T> {
    pub fn idle(key: QueryKey) -> Self {
        Self {
            key,
            status: EntryStatus::Idle,
            data: None,
            error: None,
            last_updated: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == EntryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == EntryStatus::Error
    }

    pub fn is_success(&self) -> bool {
        self.status == EntryStatus::Success
    }

    /// True when the entry resolved longer ago than `window`.
    pub fn is_stale(&self, window: Duration) -> bool {
        match self.last_updated {
            Some(at) => Utc::now() - at > window,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Dataset;

    fn resolved_at(at: DateTime<Utc>) -> CacheEntry<u32> {
        CacheEntry {
            key: QueryKey::bare(Dataset::Sports),
            status: EntryStatus::Success,
            data: Some(Arc::new(1)),
            error: None,
            last_updated: Some(at),
        }
    }

    #[test]
    fn test_idle_entry() {
        let entry: CacheEntry<u32> = CacheEntry::idle(QueryKey::bare(Dataset::Sports));
        assert_eq!(entry.status, EntryStatus::Idle);
        assert!(entry.last_updated.is_none());
        assert!(entry.is_stale(Duration::minutes(60)));
    }

    #[test]
    fn test_is_stale() {
        assert!(!resolved_at(Utc::now()).is_stale(Duration::minutes(60)));
        assert!(resolved_at(Utc::now() - Duration::minutes(61)).is_stale(Duration::minutes(60)));
    }

    #[test]
    fn test_clone_shares_data() {
        let entry = resolved_at(Utc::now());
        let copy = entry.clone();
        assert!(Arc::ptr_eq(
            entry.data.as_ref().unwrap(),
            copy.data.as_ref().unwrap()
        ));
    }
}
