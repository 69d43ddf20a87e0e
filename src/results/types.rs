//! Result type definitions

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single search hit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Hit {
    /// Index the document lives in
    #[serde(rename = "_index", default)]
    pub index: String,
    /// Document id
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Relevance score (absent when sorting on other fields)
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Document source
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
    /// Document version, when requested
    #[serde(rename = "_version", default)]
    pub version: Option<u64>,
    /// Highlighted fragments per field
    #[serde(default)]
    pub highlight: BTreeMap<String, Vec<String>>,
    /// Stored and script fields
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Sort values
    #[serde(default)]
    pub sort: Vec<Value>,
    /// Score explanation, when requested
    #[serde(rename = "_explanation", default)]
    pub explanation: Option<Value>,
    /// Inner hits per name (collapse, nested)
    #[serde(default)]
    pub inner_hits: Map<String, Value>,
}

impl Hit {
    /// Deserialize the document source into a typed value
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.source {
            Some(ref source) => Ok(Some(serde_json::from_value(source.clone())?)),
            None => Ok(None),
        }
    }

    /// Look up a top-level source field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.source.as_ref().and_then(|s| s.get(field))
    }
}

/// Whether the reported total is exact or a lower bound
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TotalHitsRelation {
    #[default]
    Eq,
    Gte,
}

/// Total hits as reported by the engine
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TotalHits {
    pub value: u64,
    pub relation: TotalHitsRelation,
}

impl<'de> Deserialize<'de> for TotalHits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Older engines report a bare integer
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u64),
            Object {
                value: u64,
                #[serde(default)]
                relation: TotalHitsRelation,
            },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Count(value) => Self {
                value,
                relation: TotalHitsRelation::Eq,
            },
            Raw::Object { value, relation } => Self { value, relation },
        })
    }
}

/// Shard statistics for a search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Shards {
    pub total: u32,
    pub successful: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// The `hits` section of a search response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HitsEnvelope {
    pub total: Option<TotalHits>,
    pub max_score: Option<f64>,
    pub hits: Vec<Hit>,
}
