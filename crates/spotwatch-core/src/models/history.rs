use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One tracked lesson in the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub sport: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(deserialize_with = "instant")]
    pub from_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_instant")]
    pub to_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub places_max: i64,
    #[serde(default)]
    pub places_taken: i64,
    #[serde(default)]
    pub niveau_name: Option<String>,
}

impl HistoryRow {
    /// Places left, never negative.
    pub fn places_free(&self) -> i64 {
        (self.places_max - self.places_taken).max(0)
    }
}

/// Lesson times arrive either as RFC 3339 strings or as unix seconds.
fn parse_instant<E: serde::de::Error>(value: Value) -> Result<DateTime<Utc>, E> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| E::custom(format!("invalid timestamp {:?}: {}", s, e))),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| E::custom(format!("epoch seconds out of range: {}", n))),
        other => Err(E::custom(format!(
            "expected timestamp string or epoch seconds, got {}",
            other
        ))),
    }
}

fn instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    parse_instant(Value::deserialize(deserializer)?)
}

fn optional_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => parse_instant(value).map(Some),
    }
}
