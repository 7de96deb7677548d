use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One day in the calendar chart: total tracked lessons for `day` (YYYY-MM-DD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarPoint {
    pub day: String,
    pub value: f64,
}

/// A named line/bar series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serie {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub data: Vec<SeriePoint>,
}

/// A point in a series. `x` is a date string or a number depending on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriePoint {
    pub x: Value,
    pub y: Option<f64>,
}

/// One row (weekday) of the weekly heat map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMapSerie {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub data: Vec<HeatMapCell>,
}

/// One hour cell of the weekly heat map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatMapCell {
    pub x: String,
    pub y: Option<f64>,
    #[serde(default)]
    pub details: Vec<WeeklyDetail>,
}

/// Average occupancy of one lesson slot inside an hour cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyDetail {
    pub time_from: String,
    pub time_to: String,
    pub avg_free: f64,
    pub avg_max: f64,
}

/// Chart libraries accept both string and numeric ids.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_with_numeric_id() {
        let json = r#"[{"id": 2023, "data": [{"x": "2023-01-02", "y": 14}, {"x": 3, "y": null}]}]"#;
        let series: Vec<Serie> = serde_json::from_str(json).unwrap();
        assert_eq!(series[0].id, "2023");
        assert_eq!(series[0].data.len(), 2);
        assert_eq!(series[0].data[0].y, Some(14.0));
        assert_eq!(series[0].data[1].y, None);
    }

    #[test]
    fn test_parse_heat_map_with_details() {
        let json = r#"[{"id": "monday", "data": [{"x": "18", "y": 4.5, "details": [
            {"timeFrom": "18:15", "timeTo": "19:45", "avgFree": 4.5, "avgMax": 18}
        ]}, {"x": "19", "y": null}]}]"#;
        let map: Vec<HeatMapSerie> = serde_json::from_str(json).unwrap();
        assert_eq!(map[0].id, "monday");
        assert_eq!(map[0].data[0].details[0].time_from, "18:15");
        assert!(map[0].data[1].details.is_empty());
        assert_eq!(map[0].data[0].details[0].avg_max, 18.0);
    }

    #[test]
    fn test_serie_rejects_object_id() {
        let json = r#"{"id": {"name": "x"}, "data": []}"#;
        assert!(serde_json::from_str::<Serie>(json).is_err());
    }
}
