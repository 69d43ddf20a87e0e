//! Field collapsing

use serde_json::{json, Map, Value};

/// Collapse search hits on a field value
#[derive(Debug, Clone, PartialEq)]
pub struct Collapse {
    pub field: String,
    pub inner_hits: Vec<Value>,
    pub max_concurrent_group_searches: Option<u32>,
}

impl Collapse {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            inner_hits: vec![],
            max_concurrent_group_searches: None,
        }
    }

    /// Add an inner hits definition (`{"name": ..., "size": ...}`)
    pub fn add_inner_hits(mut self, inner_hits: Value) -> Self {
        self.inner_hits.push(inner_hits);
        self
    }

    pub fn with_max_concurrent_group_searches(mut self, searches: u32) -> Self {
        self.max_concurrent_group_searches = Some(searches);
        self
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::String(self.field.clone()));
        match self.inner_hits.as_slice() {
            [] => {}
            [single] => {
                body.insert("inner_hits".to_string(), single.clone());
            }
            many => {
                body.insert("inner_hits".to_string(), json!(many));
            }
        }
        if let Some(searches) = self.max_concurrent_group_searches {
            body.insert(
                "max_concurrent_group_searches".to_string(),
                Value::from(searches),
            );
        }
        Value::Object(body)
    }
}
