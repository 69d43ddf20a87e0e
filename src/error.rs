//! Error types for query building and request dispatch

use crate::network::TransportError;

/// Errors raised while building or dispatching a search request.
///
/// Local precondition failures (`InvalidArgument`, `InvalidOption`,
/// `OptionNotFound`, `AggregationNotFound`) are raised before any state is
/// touched. Transport failures are passed through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value passed to a builder operation was rejected
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Option key outside the allowed set
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Read of an option that was never set
    #[error("option not found: {0}")]
    OptionNotFound(String),

    /// Aggregation name absent from the response
    #[error("aggregation not found: {0}")]
    AggregationNotFound(String),

    /// Failure reported by the transport layer
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed JSON in a response body
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
