//! Transport abstraction and wire-level request/response types

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request handed to the transport
///
/// `path` is relative to the cluster root (`logs,metrics/_search`,
/// `_search/scroll`). `index` mirrors the comma-joined target list for
/// transports that build their own endpoint paths.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Request path relative to the cluster root
    pub path: String,
    /// Comma-joined index list, if any indices were targeted
    pub index: Option<String>,
    /// Flat query-string parameters
    pub params: BTreeMap<String, String>,
    /// JSON body
    pub body: Option<Value>,
}

impl TransportRequest {
    /// Create a request for the given method and path
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            index: None,
            params: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the target index list
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace all query parameters
    pub fn params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Set the JSON body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A decoded response from the engine
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded JSON body (`Null` when the body was empty)
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Check if response is successful (2xx)
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Scroll id returned by a scrolling search, if any
    pub fn scroll_id(&self) -> Option<&str> {
        self.body.get("_scroll_id").and_then(Value::as_str)
    }

    /// Deserialize the body into a typed value
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}

/// Errors raised by a transport
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// No node could be reached
    #[error("no reachable endpoint: {0}")]
    NoReachableEndpoint(String),

    /// The engine answered with a 4xx status
    #[error("client error {status}: {body}")]
    ClientResponse { status: u16, body: Value },

    /// The engine answered with a 5xx status
    #[error("server error {status}: {body}")]
    ServerResponse { status: u16, body: Value },

    /// The request could not be sent or timed out
    #[error("request failed: {0}")]
    Request(String),

    /// The response body was not valid JSON
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Classify a non-2xx response by status code
    pub fn from_status(status: u16, body: Value) -> Option<Self> {
        match status {
            400..=499 => Some(Self::ClientResponse { status, body }),
            500..=599 => Some(Self::ServerResponse { status, body }),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if the engine answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ClientResponse { status, .. } | Self::ServerResponse { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Sends search requests to the engine
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a search against `<indices>/_search`
    async fn search(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Continue a scroll through `_search/scroll`
    async fn scroll(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Release a server-side scroll context
    async fn clear_scroll(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError>;
}
