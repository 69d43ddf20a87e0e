//! Search options and related data models

use crate::error::Error;
use crate::results::ResultSet;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Options accepted by the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchOption {
    SearchType,
    Routing,
    Preference,
    Version,
    Timeout,
    From,
    Size,
    Scroll,
    ScrollId,
    QueryCache,
    TerminateAfter,
    RequestCache,
    FilterPath,
    TypedKeys,
}

impl SearchOption {
    /// Every accepted option
    pub const ALL: [SearchOption; 14] = [
        Self::SearchType,
        Self::Routing,
        Self::Preference,
        Self::Version,
        Self::Timeout,
        Self::From,
        Self::Size,
        Self::Scroll,
        Self::ScrollId,
        Self::QueryCache,
        Self::TerminateAfter,
        Self::RequestCache,
        Self::FilterPath,
        Self::TypedKeys,
    ];

    /// Wire name of the option
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchType => "search_type",
            Self::Routing => "routing",
            Self::Preference => "preference",
            Self::Version => "version",
            Self::Timeout => "timeout",
            Self::From => "from",
            Self::Size => "size",
            Self::Scroll => "scroll",
            Self::ScrollId => "scroll_id",
            Self::QueryCache => "query_cache",
            Self::TerminateAfter => "terminate_after",
            Self::RequestCache => "request_cache",
            Self::FilterPath => "filter_path",
            Self::TypedKeys => "typed_keys",
        }
    }
}

impl FromStr for SearchOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| Error::InvalidOption(s.to_string()))
    }
}

impl std::fmt::Display for SearchOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `search_type` option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    QueryThenFetch,
    DfsQueryThenFetch,
    Suggest,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryThenFetch => "query_then_fetch",
            Self::DfsQueryThenFetch => "dfs_query_then_fetch",
            Self::Suggest => "suggest",
        }
    }
}

/// Value stored for an option
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    String(String),
    /// Values accumulated through `add_option`
    List(Vec<OptionValue>),
}

impl OptionValue {
    /// Render as a query-string parameter; lists are comma-joined
    pub fn to_param(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::String(s) => s.clone(),
            Self::List(values) => values
                .iter()
                .map(OptionValue::to_param)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Non-negative integer, also accepted in string form
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(i) => u64::try_from(*i).ok(),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean, also accepted as `"true"`/`"false"`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<SearchType> for OptionValue {
    fn from(value: SearchType) -> Self {
        Self::String(value.as_str().to_string())
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Options passed alongside a search call.
///
/// Besides the engine's own option names this accepts `limit` (hit count)
/// and `explain` (score explanations), which are applied to the query.
pub type RequestOptions = BTreeMap<String, OptionValue>;

/// Outcome of a count request
#[derive(Debug, Clone)]
pub enum CountResult {
    /// Number of matching documents
    Total(u64),
    /// The complete (hit-less) result set
    Full(ResultSet),
}

impl CountResult {
    /// Number of matching documents, whichever variant this is
    pub fn total(&self) -> u64 {
        match self {
            Self::Total(total) => *total,
            Self::Full(result_set) => result_set.total_hits(),
        }
    }
}
