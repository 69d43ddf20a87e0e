//! Searchlight: a search request builder for Elasticsearch-compatible APIs
//!
//! Build a [`Search`] over one or more indices, attach a [`Query`] and
//! engine options, then run it as a search, a count or a scroll. Responses
//! come back as [`ResultSet`]s.

pub mod config;
pub mod error;
pub mod network;
pub mod query;
pub mod results;
pub mod search;
pub mod util;

pub use config::Settings;
pub use error::{Error, Result};
pub use network::{HttpClient, HttpMethod, Transport};
pub use query::{Query, QueryInput};
pub use results::{Hit, ResultSet, ResultSetBuilder};
pub use search::{CountResult, OptionValue, Scroll, Search, SearchOption};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 30;
