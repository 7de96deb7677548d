//! Query orchestration: selection guard, cache keys, the per-dataset
//! client and key-tracking observers.

pub mod client;
pub mod guard;
pub mod key;
pub mod observer;

pub use client::{DashboardClient, QueryState};
pub use guard::{is_fetchable, FetchGuard, ValidSelection, ValidationError};
pub use key::QueryKey;
pub use observer::QueryObserver;
