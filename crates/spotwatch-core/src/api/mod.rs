//! Backend access for the dashboard datasets.
//!
//! `endpoints` encodes the fixed request/response contract of each dataset;
//! `transport` carries requests over HTTP. Nothing here caches or validates.

pub mod endpoints;
pub mod error;
pub mod transport;

pub use endpoints::{Dataset, Method, Request};
pub use error::FetchError;
pub use transport::{HttpTransport, Transport};
