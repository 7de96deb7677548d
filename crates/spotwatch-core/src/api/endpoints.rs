//! Fixed request/response contracts of the analytics backend.
//!
//! Each dataset maps to one method and path. Selection-driven datasets
//! carry a JSON body built from a guarded selection; the adapters do no
//! validation of their own.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::FetchError;
use crate::models::map_order;
use crate::query::ValidSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    CountDay,
    CountDayPerSport,
    Sports,
    Locations,
    History,
    HistoryLine,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

impl Dataset {
    pub const ALL: [Dataset; 7] = [
        Dataset::CountDay,
        Dataset::CountDayPerSport,
        Dataset::Sports,
        Dataset::Locations,
        Dataset::History,
        Dataset::HistoryLine,
        Dataset::Weekly,
    ];

    /// Stable identifier, used as the first component of cache keys.
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::CountDay => "countday",
            Dataset::CountDayPerSport => "countdaysport",
            Dataset::Sports => "sports",
            Dataset::Locations => "locations",
            Dataset::History => "history",
            Dataset::HistoryLine => "historyline",
            Dataset::Weekly => "weekly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == s)
    }

    pub fn method(&self) -> Method {
        if self.needs_selection() {
            Method::Post
        } else {
            Method::Get
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Dataset::CountDay => "/api/countday",
            Dataset::CountDayPerSport => "/api/countdaybar",
            Dataset::Sports => "/api/sports",
            Dataset::Locations => "/api/locations",
            Dataset::History => "/api/history",
            Dataset::HistoryLine => "/api/historyline",
            Dataset::Weekly => "/api/weekly",
        }
    }

    /// Datasets whose request depends on the filter selection.
    pub fn needs_selection(&self) -> bool {
        matches!(self, Dataset::History | Dataset::HistoryLine | Dataset::Weekly)
    }

    /// Whether the sort order is part of the request.
    pub fn is_ordered(&self) -> bool {
        matches!(self, Dataset::History)
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully-formed backend request, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: &'static str,
    pub body: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryBody<'a> {
    activities: &'a BTreeSet<String>,
    locations: &'a BTreeSet<String>,
    from: String,
    to: String,
    order_by: &'static str,
    desc: bool,
}

#[derive(Debug, Serialize)]
struct RangeBody<'a> {
    activities: &'a BTreeSet<String>,
    locations: &'a BTreeSet<String>,
    from: String,
    to: String,
}

/// ISO-8601 UTC instant with millisecond precision, e.g. `2023-01-01T00:00:00.000Z`.
pub fn iso_instant(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn bare(dataset: Dataset) -> Request {
    Request {
        method: dataset.method(),
        path: dataset.path(),
        body: None,
    }
}

pub fn count_day() -> Request {
    bare(Dataset::CountDay)
}

pub fn count_day_per_sport() -> Request {
    bare(Dataset::CountDayPerSport)
}

pub fn sports() -> Request {
    bare(Dataset::Sports)
}

pub fn locations() -> Request {
    bare(Dataset::Locations)
}

pub fn history(selection: &ValidSelection<'_>) -> Result<Request, FetchError> {
    let body = HistoryBody {
        activities: selection.activities,
        locations: selection.locations,
        from: iso_instant(&selection.from),
        to: iso_instant(&selection.to),
        order_by: map_order(selection.order_by),
        desc: selection.desc,
    };
    Ok(Request {
        method: Method::Post,
        path: Dataset::History.path(),
        body: Some(serde_json::to_value(body)?),
    })
}

fn ranged(dataset: Dataset, selection: &ValidSelection<'_>) -> Result<Request, FetchError> {
    let body = RangeBody {
        activities: selection.activities,
        locations: selection.locations,
        from: iso_instant(&selection.from),
        to: iso_instant(&selection.to),
    };
    Ok(Request {
        method: Method::Post,
        path: dataset.path(),
        body: Some(serde_json::to_value(body)?),
    })
}

pub fn history_line(selection: &ValidSelection<'_>) -> Result<Request, FetchError> {
    ranged(Dataset::HistoryLine, selection)
}

pub fn weekly(selection: &ValidSelection<'_>) -> Result<Request, FetchError> {
    ranged(Dataset::Weekly, selection)
}

/// Build the request for any dataset. Selection-driven datasets require
/// a guarded selection; without one this is an encode error.
pub fn request_for(
    dataset: Dataset,
    selection: Option<&ValidSelection<'_>>,
) -> Result<Request, FetchError> {
    match (dataset, selection) {
        (Dataset::CountDay, _) => Ok(count_day()),
        (Dataset::CountDayPerSport, _) => Ok(count_day_per_sport()),
        (Dataset::Sports, _) => Ok(sports()),
        (Dataset::Locations, _) => Ok(locations()),
        (Dataset::History, Some(sel)) => history(sel),
        (Dataset::HistoryLine, Some(sel)) => history_line(sel),
        (Dataset::Weekly, Some(sel)) => weekly(sel),
        (dataset, None) => Err(FetchError::Aborted(format!(
            "{} requires a filter selection",
            dataset
        ))),
    }
}

/// Decode a response body into the dataset's item type.
pub fn decode<T: DeserializeOwned>(dataset: Dataset, body: Value) -> Result<Vec<T>, FetchError> {
    serde_json::from_value(body).map_err(|e| {
        FetchError::InvalidResponse(format!("Failed to parse {} response: {}", dataset, e))
    })
}
