use serde::{Deserialize, Serialize};

/// Sort order for the history table.
///
/// Unknown names deserialize (and parse) as `Date`, so a stale or
/// hand-edited value never produces an invalid backend sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    Activity,
    Location,
    SpotsTotal,
    SpotsFree,
    #[default]
    #[serde(other)]
    Date,
}

/// Backend field used when an order has no entry in the mapping table.
pub const DEFAULT_ORDER_FIELD: &str = "date";

const ORDER_FIELDS: [(HistoryOrder, &str); 5] = [
    (HistoryOrder::Date, "date"),
    (HistoryOrder::Activity, "sport"),
    (HistoryOrder::Location, "location"),
    (HistoryOrder::SpotsTotal, "places_max"),
    (HistoryOrder::SpotsFree, "places_max-places_taken"),
];

/// Translate a sort order into the backend field expression it sorts by.
pub fn map_order(order: HistoryOrder) -> &'static str {
    ORDER_FIELDS
        .iter()
        .find(|(candidate, _)| *candidate == order)
        .map(|(_, field)| *field)
        .unwrap_or(DEFAULT_ORDER_FIELD)
}

impl HistoryOrder {
    pub const ALL: [HistoryOrder; 5] = [
        HistoryOrder::Date,
        HistoryOrder::Activity,
        HistoryOrder::Location,
        HistoryOrder::SpotsTotal,
        HistoryOrder::SpotsFree,
    ];

    /// Parse a user-supplied order name, falling back to `Date`.
    /// Accepts the snake_case names plus a few common spellings.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "activity" | "sport" => HistoryOrder::Activity,
            "location" => HistoryOrder::Location,
            "spots_total" | "total" => HistoryOrder::SpotsTotal,
            "spots_free" | "free" => HistoryOrder::SpotsFree,
            _ => HistoryOrder::Date,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryOrder::Date => "date",
            HistoryOrder::Activity => "activity",
            HistoryOrder::Location => "location",
            HistoryOrder::SpotsTotal => "spots_total",
            HistoryOrder::SpotsFree => "spots_free",
        }
    }
}

impl std::fmt::Display for HistoryOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
