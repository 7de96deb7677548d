use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::api::endpoints::iso_instant;
use crate::api::Dataset;
use crate::models::FilterSelection;

/// Cache identity of one query: the dataset plus a canonical rendering
/// of the selection fields that dataset's request depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    dataset: Dataset,
    params: String,
}

fn names(set: &BTreeSet<String>) -> Value {
    Value::Array(set.iter().cloned().map(Value::String).collect())
}

impl QueryKey {
    /// Key for a dataset whose request takes no parameters.
    pub fn bare(dataset: Dataset) -> Self {
        Self {
            dataset,
            params: String::new(),
        }
    }

    /// Key for `dataset` under `selection`. Fields the dataset ignores do
    /// not contribute, so e.g. changing the sort order keeps the weekly key.
    pub fn new(dataset: Dataset, selection: &FilterSelection) -> Self {
        if !dataset.needs_selection() {
            return Self::bare(dataset);
        }

        // serde_json's default Map is ordered, and sets iterate sorted.
        let mut params = Map::new();
        params.insert("activities".to_string(), names(&selection.activities));
        params.insert("locations".to_string(), names(&selection.locations));
        params.insert(
            "from".to_string(),
            selection.from.as_ref().map(iso_instant).map(Value::String).unwrap_or(Value::Null),
        );
        params.insert(
            "to".to_string(),
            selection.to.as_ref().map(iso_instant).map(Value::String).unwrap_or(Value::Null),
        );
        if dataset.is_ordered() {
            params.insert(
                "orderBy".to_string(),
                Value::String(selection.order_by.as_str().to_string()),
            );
            params.insert("desc".to_string(), Value::Bool(selection.desc));
        }

        Self {
            dataset,
            params: Value::Object(params).to_string(),
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.dataset)
        } else {
            write!(f, "{}:{}", self.dataset, self.params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryOrder;
    use chrono::{TimeZone, Utc};

    fn base() -> FilterSelection {
        FilterSelection::new().with_range(
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 1, 31, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn test_key_ignores_insertion_order() {
        let a = base()
            .with_activity("Volleyball")
            .with_activity("Badminton")
            .with_location("Irchel")
            .with_location("Fluntern");
        let b = base()
            .with_activity("Badminton")
            .with_activity("Volleyball")
            .with_location("Fluntern")
            .with_location("Irchel");
        for dataset in Dataset::ALL {
            assert_eq!(QueryKey::new(dataset, &a), QueryKey::new(dataset, &b));
        }
    }

    #[test]
    fn test_key_changes_with_parameters() {
        let sel = base().with_activity("Volleyball");
        let other = base().with_activity("Yoga");
        assert_ne!(
            QueryKey::new(Dataset::History, &sel),
            QueryKey::new(Dataset::History, &other)
        );

        let desc = sel.clone().ordered_by(HistoryOrder::Date, true);
        assert_ne!(
            QueryKey::new(Dataset::History, &sel),
            QueryKey::new(Dataset::History, &desc)
        );
    }

    #[test]
    fn test_unordered_datasets_ignore_sort() {
        let sel = base().with_activity("Volleyball");
        let sorted = sel.clone().ordered_by(HistoryOrder::SpotsFree, true);
        assert_eq!(
            QueryKey::new(Dataset::Weekly, &sel),
            QueryKey::new(Dataset::Weekly, &sorted)
        );
        assert_eq!(
            QueryKey::new(Dataset::HistoryLine, &sel),
            QueryKey::new(Dataset::HistoryLine, &sorted)
        );
    }

    #[test]
    fn test_datasets_do_not_share_keys() {
        let sel = base().with_activity("Volleyball");
        assert_ne!(
            QueryKey::new(Dataset::Weekly, &sel),
            QueryKey::new(Dataset::HistoryLine, &sel)
        );
    }

    #[test]
    fn test_bare_datasets_ignore_selection() {
        let key = QueryKey::new(Dataset::Sports, &base().with_activity("Yoga"));
        assert_eq!(key, QueryKey::bare(Dataset::Sports));
        assert_eq!(key.to_string(), "sports");
    }

    #[test]
    fn test_display_includes_params() {
        let key = QueryKey::new(Dataset::Weekly, &base().with_activity("Yoga"));
        let shown = key.to_string();
        assert!(shown.starts_with("weekly:{"));
        assert!(shown.contains("\"activities\":[\"Yoga\"]"));
        assert!(shown.contains("2023-01-01T00:00:00.000Z"));
    }
}
