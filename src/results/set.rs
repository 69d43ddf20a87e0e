//! Result set built from a search response

use super::types::{Hit, HitsEnvelope, Shards, TotalHitsRelation};
use crate::error::{Error, Result};
use crate::network::TransportResponse;
use crate::query::Query;
use serde_json::{Map, Value};

/// Deserialized search response
#[derive(Debug, Clone)]
pub struct ResultSet {
    response: TransportResponse,
    query: Query,
    hits: Vec<Hit>,
    total_hits: u64,
    total_hits_relation: TotalHitsRelation,
    max_score: Option<f64>,
}

impl ResultSet {
    /// Parse a response, keeping the query it answers
    pub fn from_response(response: TransportResponse, query: Query) -> Result<Self> {
        let envelope: HitsEnvelope = match response.body.get("hits") {
            Some(hits) => serde_json::from_value(hits.clone())?,
            None => HitsEnvelope::default(),
        };
        let total = envelope.total.unwrap_or_default();

        Ok(Self {
            response,
            query,
            hits: envelope.hits,
            total_hits: total.value,
            total_hits_relation: total.relation,
            max_score: envelope.max_score,
        })
    }

    /// The raw response
    pub fn response(&self) -> &TransportResponse {
        &self.response
    }

    /// The query that produced this result set
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn hits_mut(&mut self) -> &mut Vec<Hit> {
        &mut self.hits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }

    /// Number of hits in this page
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Total number of matching documents
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn total_hits_relation(&self) -> TotalHitsRelation {
        self.total_hits_relation
    }

    pub fn max_score(&self) -> Option<f64> {
        self.max_score
    }

    /// Time the engine spent on the search, in milliseconds
    pub fn took(&self) -> u64 {
        self.response
            .body
            .get("took")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    pub fn timed_out(&self) -> bool {
        self.response
            .body
            .get("timed_out")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn shards(&self) -> Option<Shards> {
        self.response
            .body
            .get("_shards")
            .and_then(|s| serde_json::from_value(s.clone()).ok())
    }

    pub fn has_aggregations(&self) -> bool {
        self.aggregations().is_some_and(|aggs| !aggs.is_empty())
    }

    pub fn aggregations(&self) -> Option<&Map<String, Value>> {
        self.response
            .body
            .get("aggregations")
            .and_then(Value::as_object)
    }

    /// A single aggregation by name
    pub fn aggregation(&self, name: &str) -> Result<&Value> {
        self.aggregations()
            .and_then(|aggs| aggs.get(name))
            .ok_or_else(|| Error::AggregationNotFound(name.to_string()))
    }

    pub fn has_suggests(&self) -> bool {
        self.suggests().is_some_and(|s| !s.is_empty())
    }

    pub fn suggests(&self) -> Option<&Map<String, Value>> {
        self.response.body.get("suggest").and_then(Value::as_object)
    }

    /// Scroll id for fetching the next page, if scrolling
    pub fn scroll_id(&self) -> Option<&str> {
        self.response.scroll_id()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Hit;
    type IntoIter = std::vec::IntoIter<Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}
