//! In-memory query cache.
//!
//! This module provides the `QueryCache` for storing dataset results by
//! query key. Entries live for the application session only and are
//! never written to disk.

pub mod entry;
pub mod query_cache;

pub use entry::{CacheEntry, EntryStatus};
pub use query_cache::QueryCache;
