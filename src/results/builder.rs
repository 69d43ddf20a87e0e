//! Pluggable construction of result sets

use super::set::ResultSet;
use crate::error::Result;
use crate::network::TransportResponse;
use crate::query::Query;

/// Turns a raw response into a [`ResultSet`]
pub trait ResultSetBuilder: Send + Sync {
    fn build_result_set(&self, response: TransportResponse, query: &Query) -> Result<ResultSet>;
}

/// Builds result sets as they come from the engine
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBuilder;

impl ResultSetBuilder for DefaultBuilder {
    fn build_result_set(&self, response: TransportResponse, query: &Query) -> Result<ResultSet> {
        ResultSet::from_response(response, query.clone())
    }
}

/// Post-processes every result set built by a [`ProcessingBuilder`]
pub trait ResultSetProcessor: Send + Sync {
    fn process(&self, result_set: &mut ResultSet) -> Result<()>;
}

/// Wraps another builder and runs a processor over its output
pub struct ProcessingBuilder {
    inner: Box<dyn ResultSetBuilder>,
    processor: Box<dyn ResultSetProcessor>,
}

impl ProcessingBuilder {
    pub fn new(inner: Box<dyn ResultSetBuilder>, processor: Box<dyn ResultSetProcessor>) -> Self {
        Self { inner, processor }
    }

    /// Process the output of the [`DefaultBuilder`]
    pub fn with_processor(processor: Box<dyn ResultSetProcessor>) -> Self {
        Self::new(Box::new(DefaultBuilder), processor)
    }
}

impl ResultSetBuilder for ProcessingBuilder {
    fn build_result_set(&self, response: TransportResponse, query: &Query) -> Result<ResultSet> {
        let mut result_set = self.inner.build_result_set(response, query)?;
        self.processor.process(&mut result_set)?;
        Ok(result_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct DropUnscored;

    impl ResultSetProcessor for DropUnscored {
        fn process(&self, result_set: &mut ResultSet) -> Result<()> {
            result_set.hits_mut().retain(|hit| hit.score.is_some());
            Ok(())
        }
    }

    fn response() -> TransportResponse {
        TransportResponse::new(
            200,
            json!({"hits": {"total": 2, "hits": [
                {"_id": "1", "_score": 1.0},
                {"_id": "2", "_score": null}
            ]}}),
        )
    }

    #[test]
    fn test_default_builder_keeps_query() {
        let mut query = Query::create("rust").unwrap();
        query.set_size(3);

        let set = DefaultBuilder.build_result_set(response(), &query).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.query().size(), Some(3));
    }

    #[test]
    fn test_processing_builder() {
        let builder = ProcessingBuilder::with_processor(Box::new(DropUnscored));
        let set = builder.build_result_set(response(), &Query::new()).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.hits()[0].id, "1");
        assert_eq!(set.total_hits(), 2);
    }
}
