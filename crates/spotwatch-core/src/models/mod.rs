//! Data models for dashboard queries.
//!
//! - `FilterSelection`, `HistoryOrder`: user filter choices and the sort mapping
//! - `CalendarPoint`, `Serie`, `HeatMapSerie`: chart response shapes
//! - `HistoryRow`: history table rows
//! - `Payload`, `DatasetItem`: type-erased cache payloads

pub mod charts;
pub mod history;
pub mod order;
pub mod payload;
pub mod selection;

pub use charts::{CalendarPoint, HeatMapCell, HeatMapSerie, Serie, SeriePoint, WeeklyDetail};
pub use history::HistoryRow;
pub use order::{map_order, HistoryOrder, DEFAULT_ORDER_FIELD};
pub use payload::{DatasetItem, Payload};
pub use selection::FilterSelection;
