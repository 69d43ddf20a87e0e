//! Query model
//!
//! A [`Query`] is the body of a search request: a query clause plus the
//! top-level search parameters (`from`, `size`, `sort`, `aggs`, ...).
//! [`QueryInput`] lists every shape a caller may hand to the search builder
//! and [`Query::create`] normalizes them.

mod clause;
mod collapse;
mod suggest;

pub use clause::{Operator, QueryClause, QueryString};
pub use collapse::Collapse;
pub use suggest::{Suggest, Suggester, SuggesterKind};

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Anything that can be turned into a [`Query`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    /// No query given; leaves an existing query in place
    Empty,
    /// Query-string syntax
    Text(String),
    /// A complete raw search body
    Structured(Value),
    /// A single query clause
    Clause(QueryClause),
    /// A pre-built query
    Query(Query),
    /// A collapse definition on an otherwise match-all query
    Collapse(Collapse),
    /// Suggesters only
    Suggest(Suggest),
}

impl QueryInput {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for QueryInput {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<String> for QueryInput {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

impl From<Value> for QueryInput {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<QueryClause> for QueryInput {
    fn from(value: QueryClause) -> Self {
        Self::Clause(value)
    }
}

impl From<QueryString> for QueryInput {
    fn from(value: QueryString) -> Self {
        Self::Clause(value.into())
    }
}

impl From<Query> for QueryInput {
    fn from(value: Query) -> Self {
        Self::Query(value)
    }
}

impl From<Collapse> for QueryInput {
    fn from(value: Collapse) -> Self {
        Self::Collapse(value)
    }
}

impl From<Suggest> for QueryInput {
    fn from(value: Suggest) -> Self {
        Self::Suggest(value)
    }
}

impl From<Suggester> for QueryInput {
    fn from(value: Suggester) -> Self {
        Self::Suggest(Suggest::from_suggester(value))
    }
}

/// Body of a search request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    clause: Option<QueryClause>,
    params: Map<String, Value>,
    suggest: Option<Suggest>,
    collapse: Option<Collapse>,
}

impl Query {
    /// An empty query; serializes as match-all
    pub fn new() -> Self {
        Self::default()
    }

    /// A query holding the given clause
    pub fn with_clause(clause: QueryClause) -> Self {
        Self {
            clause: Some(clause),
            ..Default::default()
        }
    }

    /// Normalize any accepted input into a query
    pub fn create(input: impl Into<QueryInput>) -> Result<Self> {
        match input.into() {
            QueryInput::Empty => Ok(Self::with_clause(QueryClause::MatchAll)),
            QueryInput::Text(text) => Ok(Self::with_clause(QueryClause::query_string(text))),
            QueryInput::Structured(value) => Self::from_raw(value),
            QueryInput::Clause(clause) => Ok(Self::with_clause(clause)),
            QueryInput::Query(query) => Ok(query),
            QueryInput::Collapse(collapse) => {
                let mut query = Self::new();
                query.set_collapse(collapse);
                Ok(query)
            }
            QueryInput::Suggest(suggest) => {
                let mut query = Self::new();
                query.set_suggest(suggest);
                Ok(query)
            }
        }
    }

    /// Build a query from a complete raw search body
    pub fn from_raw(value: Value) -> Result<Self> {
        match value {
            Value::Object(params) => Ok(Self {
                params,
                ..Default::default()
            }),
            other => Err(Error::InvalidArgument(format!(
                "raw query must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn set_query(&mut self, clause: QueryClause) -> &mut Self {
        self.clause = Some(clause);
        self
    }

    pub fn clause(&self) -> Option<&QueryClause> {
        self.clause.as_ref()
    }

    /// Set a top-level body parameter
    pub fn set_param(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn get_param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn set_from(&mut self, from: u64) -> &mut Self {
        self.set_param("from", Value::from(from))
    }

    /// Limit the number of hits returned
    pub fn set_size(&mut self, size: u64) -> &mut Self {
        self.set_param("size", Value::from(size))
    }

    pub fn size(&self) -> Option<u64> {
        self.params.get("size").and_then(Value::as_u64)
    }

    pub fn set_sort(&mut self, sort: Value) -> &mut Self {
        self.set_param("sort", sort)
    }

    /// Append a sort criterion (`"_score"`, `{"date": "desc"}`)
    pub fn add_sort(&mut self, sort: Value) -> &mut Self {
        match self.params.get_mut("sort") {
            Some(Value::Array(sorts)) => sorts.push(sort),
            Some(existing) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, sort]);
            }
            None => {
                self.params.insert("sort".to_string(), Value::Array(vec![sort]));
            }
        }
        self
    }

    pub fn set_highlight(&mut self, highlight: Value) -> &mut Self {
        self.set_param("highlight", highlight)
    }

    pub fn set_explain(&mut self, explain: bool) -> &mut Self {
        self.set_param("explain", Value::Bool(explain))
    }

    pub fn explain(&self) -> bool {
        self.params
            .get("explain")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_version(&mut self, version: bool) -> &mut Self {
        self.set_param("version", Value::Bool(version))
    }

    pub fn set_stored_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|f| Value::String(f.into()))
            .collect();
        self.set_param("stored_fields", Value::Array(fields))
    }

    /// Source filtering: `false`, a field list, or `{"includes": ..., "excludes": ...}`
    pub fn set_source(&mut self, source: Value) -> &mut Self {
        self.set_param("_source", source)
    }

    pub fn add_script_field(&mut self, name: impl Into<String>, script: Value) -> &mut Self {
        self.insert_named("script_fields", name.into(), script);
        self
    }

    pub fn add_aggregation(&mut self, name: impl Into<String>, aggregation: Value) -> &mut Self {
        self.insert_named("aggs", name.into(), aggregation);
        self
    }

    pub fn has_aggregations(&self) -> bool {
        self.params
            .get("aggs")
            .and_then(Value::as_object)
            .is_some_and(|aggs| !aggs.is_empty())
    }

    pub fn set_suggest(&mut self, suggest: Suggest) -> &mut Self {
        self.suggest = Some(suggest);
        self
    }

    pub fn suggest(&self) -> Option<&Suggest> {
        self.suggest.as_ref()
    }

    pub fn set_post_filter(&mut self, filter: Value) -> &mut Self {
        self.set_param("post_filter", filter)
    }

    pub fn set_min_score(&mut self, min_score: f64) -> &mut Self {
        self.set_param("min_score", Value::from(min_score))
    }

    /// Count all matching hits accurately (`true`) or stop at the default
    pub fn set_track_total_hits(&mut self, track: bool) -> &mut Self {
        self.set_param("track_total_hits", Value::Bool(track))
    }

    /// Count matching hits accurately up to `limit`
    pub fn set_track_total_hits_up_to(&mut self, limit: u64) -> &mut Self {
        self.set_param("track_total_hits", Value::from(limit))
    }

    pub fn set_collapse(&mut self, collapse: Collapse) -> &mut Self {
        self.collapse = Some(collapse);
        self
    }

    pub fn collapse(&self) -> Option<&Collapse> {
        self.collapse.as_ref()
    }

    pub fn add_rescore(&mut self, rescore: Value) -> &mut Self {
        match self.params.get_mut("rescore") {
            Some(Value::Array(rescores)) => rescores.push(rescore),
            _ => {
                self.params
                    .insert("rescore".to_string(), Value::Array(vec![rescore]));
            }
        }
        self
    }

    /// Serialize into the engine's JSON body.
    ///
    /// Without a clause, a raw `query` or suggesters, the body matches all
    /// documents.
    pub fn to_value(&self) -> Value {
        let mut body = self.params.clone();

        if let Some(ref clause) = self.clause {
            body.insert("query".to_string(), clause.to_value());
        } else if !body.contains_key("query") && self.suggest.is_none() {
            body.insert("query".to_string(), QueryClause::MatchAll.to_value());
        }
        if let Some(ref suggest) = self.suggest {
            body.insert("suggest".to_string(), suggest.to_value());
        }
        if let Some(ref collapse) = self.collapse {
            body.insert("collapse".to_string(), collapse.to_value());
        }

        Value::Object(body)
    }

    fn insert_named(&mut self, key: &str, name: String, value: Value) {
        let entry = self
            .params
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = entry {
            map.insert(name, value);
        } else {
            let mut map = Map::new();
            map.insert(name, value);
            *entry = Value::Object(map);
        }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
