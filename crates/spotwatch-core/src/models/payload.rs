use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::{CalendarPoint, HeatMapSerie, HistoryRow, Serie};

/// Decoded response of any dataset, as stored in the query cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Calendar(Arc<Vec<CalendarPoint>>),
    Series(Arc<Vec<Serie>>),
    Names(Arc<Vec<String>>),
    History(Arc<Vec<HistoryRow>>),
    HeatMap(Arc<Vec<HeatMapSerie>>),
}

/// An element type a dataset response is an array of.
pub trait DatasetItem: DeserializeOwned + Send + Sync + 'static {
    fn into_payload(items: Vec<Self>) -> Payload;

    /// `None` when the payload holds a different item type.
    fn from_payload(payload: &Payload) -> Option<Arc<Vec<Self>>>;
}

macro_rules! dataset_item {
    ($item:ty, $variant:ident) => {
        impl DatasetItem for $item {
            fn into_payload(items: Vec<Self>) -> Payload {
                Payload::$variant(Arc::new(items))
            }

            fn from_payload(payload: &Payload) -> Option<Arc<Vec<Self>>> {
                match payload {
                    Payload::$variant(items) => Some(Arc::clone(items)),
                    _ => None,
                }
            }
        }
    };
}

dataset_item!(CalendarPoint, Calendar);
dataset_item!(Serie, Series);
dataset_item!(String, Names);
dataset_item!(HistoryRow, History);
dataset_item!(HeatMapSerie, HeatMap);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_extraction_matches_variant() {
        let payload = String::into_payload(vec!["Yoga".to_string()]);
        assert_eq!(String::from_payload(&payload).unwrap().len(), 1);
        assert_eq!(String::from_payload(&payload).unwrap()[0], "Yoga");
        assert!(HistoryRow::from_payload(&payload).is_none());
    }

    #[test]
    fn test_empty_payload() {
        let payload = Serie::into_payload(Vec::new());
        assert!(Serie::from_payload(&payload).unwrap().is_empty());
    }
}
