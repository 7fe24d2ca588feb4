#![forbid(unsafe_code)]

//! Remote data sources and a threaded effect executor for `arbor-core`.
//!
//! - [`HttpSource`]: the real tree and search endpoints over blocking HTTP.
//! - [`MockSource`]: an endless generated hierarchy for offline use.
//! - [`Executor`]: runs effects on worker threads and hands completions back.

pub mod error;
pub mod executor;
pub mod http;
pub mod mock;

pub use error::RemoteError;
pub use executor::Executor;
pub use http::HttpSource;
pub use mock::MockSource;
