//! Resource download for rime-mate.
//!
//! Provides:
//! - `http`: agent construction and source URL validation
//! - `fetcher`: streaming download with ordered mirror fallback
//! - `test_support`: local HTTP server for tests (`test-support` feature)

pub mod fetcher;
pub mod http;
#[cfg(feature = "test-support")]
pub mod test_support;

pub use fetcher::{AttemptError, FetchError, Fetched, Fetcher};
