use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HistoryOrder;

/// The user's current filter choices, shared by every dashboard query.
///
/// Sets are ordered so that two selections with the same members compare
/// and serialize identically regardless of insertion order. An empty
/// `locations` set means "all locations".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(default)]
    pub activities: BTreeSet<String>,
    #[serde(default)]
    pub locations: BTreeSet<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_by: HistoryOrder,
    #[serde(default)]
    pub desc: bool,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activities.insert(activity.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.insert(location.into());
        self
    }

    pub fn with_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn ordered_by(mut self, order_by: HistoryOrder, desc: bool) -> Self {
        self.order_by = order_by;
        self.desc = desc;
        self
    }
}
