//! Query clauses placed under the `query` key of a search body

use serde_json::{json, Map, Value};

/// Default operator for query-string queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A `query_string` query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryString {
    pub query: String,
    pub default_field: Option<String>,
    pub default_operator: Option<Operator>,
    pub fields: Vec<String>,
}

impl QueryString {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            default_field: None,
            default_operator: None,
            fields: vec![],
        }
    }

    pub fn with_default_field(mut self, field: impl Into<String>) -> Self {
        self.default_field = Some(field.into());
        self
    }

    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = Some(operator);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), Value::String(self.query.clone()));
        if let Some(ref field) = self.default_field {
            body.insert("default_field".to_string(), Value::String(field.clone()));
        }
        if let Some(operator) = self.default_operator {
            body.insert(
                "default_operator".to_string(),
                Value::String(operator.as_str().to_string()),
            );
        }
        if !self.fields.is_empty() {
            body.insert("fields".to_string(), json!(self.fields));
        }
        json!({ "query_string": body })
    }
}

/// The expression placed under `query`
#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// Matches every document
    MatchAll,
    /// Lucene query-string syntax
    QueryString(QueryString),
    /// Any other query DSL expression, passed through as-is
    Raw(Value),
}

impl QueryClause {
    /// A query-string clause for the given text
    pub fn query_string(text: impl Into<String>) -> Self {
        Self::QueryString(QueryString::new(text))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::MatchAll => json!({ "match_all": {} }),
            Self::QueryString(query_string) => query_string.to_value(),
            Self::Raw(value) => value.clone(),
        }
    }
}

impl From<QueryString> for QueryClause {
    fn from(value: QueryString) -> Self {
        Self::QueryString(value)
    }
}
