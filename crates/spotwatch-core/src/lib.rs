//! Data-access layer for the spotwatch occupancy dashboard.
//!
//! Turns the user's filter selection into validated backend requests,
//! caches results per query key, deduplicates concurrent identical
//! requests and reports failures through a side channel.
//!
//! The usual entry point is [`DashboardClient`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use spotwatch_core::{Config, DashboardClient, FilterSelection, TracingNotifier};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = DashboardClient::from_config(&Config::load()?, Arc::new(TracingNotifier))?;
//! let sports = client.get_sports().await;
//! let selection = FilterSelection::new().with_activity("Volleyball");
//! let history = client.get_history(&selection).await; // empty: no date range yet
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod notify;
pub mod query;

#[cfg(test)]
mod test_support;

pub use api::{Dataset, FetchError, HttpTransport, Transport};
pub use cache::{CacheEntry, EntryStatus, QueryCache};
pub use config::Config;
pub use models::{map_order, FilterSelection, HistoryOrder};
pub use notify::{ChannelNotifier, ErrorNotice, ErrorNotifier, TracingNotifier};
pub use query::{is_fetchable, DashboardClient, QueryKey, QueryObserver, QueryState};
