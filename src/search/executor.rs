//! Search request builder and dispatch

use super::models::{CountResult, OptionValue, RequestOptions, SearchOption, SearchType};
use super::scroll::Scroll;
use crate::error::{Error, Result};
use crate::network::{HttpMethod, Transport, TransportRequest};
use crate::query::{Query, QueryInput, Suggest};
use crate::results::{DefaultBuilder, ResultSet, ResultSetBuilder};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Path used to continue a scroll
pub const SCROLL_PATH: &str = "_search/scroll";

/// Builds a search request and dispatches it through a [`Transport`]
#[derive(Clone)]
pub struct Search {
    /// Transport requests are sent through
    client: Arc<dyn Transport>,
    /// Turns responses into result sets
    builder: Arc<dyn ResultSetBuilder>,
    /// Target indices, in insertion order
    indices: Vec<String>,
    /// Request body
    query: Query,
    /// Engine options sent as query parameters
    options: BTreeMap<SearchOption, OptionValue>,
}

impl Search {
    /// Create a search using the default result set builder
    pub fn new(client: Arc<dyn Transport>) -> Self {
        Self::with_builder(client, Arc::new(DefaultBuilder))
    }

    /// Create a search with a custom result set builder
    pub fn with_builder(client: Arc<dyn Transport>, builder: Arc<dyn ResultSetBuilder>) -> Self {
        Self {
            client,
            builder,
            indices: vec![],
            query: Query::new(),
            options: BTreeMap::new(),
        }
    }

    pub fn client(&self) -> &Arc<dyn Transport> {
        &self.client
    }

    pub fn set_result_set_builder(&mut self, builder: Arc<dyn ResultSetBuilder>) -> &mut Self {
        self.builder = builder;
        self
    }

    /// Append an index name. Duplicates are kept.
    pub fn add_index(&mut self, name: impl AsRef<str>) -> Result<&mut Self> {
        let name = name.as_ref();
        validate_index_name(name)?;
        self.indices.push(name.to_string());
        Ok(self)
    }

    /// Append several index names.
    ///
    /// Every name is validated first; on error none are added.
    pub fn add_indices<I, S>(&mut self, names: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                validate_index_name(name).map(|_| name.to_string())
            })
            .collect::<Result<Vec<_>>>()?;
        self.indices.extend(names);
        Ok(self)
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indices.iter().any(|index| index == name)
    }

    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    /// Replace the query. Empty input leaves the current query in place.
    pub fn set_query(&mut self, query: impl Into<QueryInput>) -> Result<&mut Self> {
        let input = query.into();
        if !input.is_empty() {
            self.query = Query::create(input)?;
        }
        Ok(self)
    }

    /// Current query; match-all unless one was set
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    /// Set an option, replacing any previous value
    pub fn set_option(&mut self, key: SearchOption, value: impl Into<OptionValue>) -> &mut Self {
        self.options.insert(key, value.into());
        self
    }

    /// Set an option by its wire name
    pub fn set_option_str(
        &mut self,
        key: &str,
        value: impl Into<OptionValue>,
    ) -> Result<&mut Self> {
        let key = key.parse()?;
        Ok(self.set_option(key, value))
    }

    /// Append a value to an option's list
    pub fn add_option(&mut self, key: SearchOption, value: impl Into<OptionValue>) -> &mut Self {
        let value = value.into();
        match self.options.remove(&key) {
            Some(OptionValue::List(mut values)) => {
                values.push(value);
                self.options.insert(key, OptionValue::List(values));
            }
            Some(previous) => {
                self.options.insert(key, OptionValue::List(vec![previous, value]));
            }
            None => {
                self.options.insert(key, OptionValue::List(vec![value]));
            }
        }
        self
    }

    /// Append to an option's list by its wire name
    pub fn add_option_str(
        &mut self,
        key: &str,
        value: impl Into<OptionValue>,
    ) -> Result<&mut Self> {
        let key = key.parse()?;
        Ok(self.add_option(key, value))
    }

    pub fn get_option(&self, key: SearchOption) -> Result<&OptionValue> {
        self.options
            .get(&key)
            .ok_or_else(|| Error::OptionNotFound(key.as_str().to_string()))
    }

    pub fn has_option(&self, key: SearchOption) -> bool {
        self.options.contains_key(&key)
    }

    pub fn remove_option(&mut self, key: SearchOption) -> Option<OptionValue> {
        self.options.remove(&key)
    }

    pub fn options(&self) -> &BTreeMap<SearchOption, OptionValue> {
        &self.options
    }

    pub fn clear_options(&mut self) -> &mut Self {
        self.options.clear();
        self
    }

    /// Replace all options from a map keyed by wire name.
    ///
    /// Keys are validated before anything changes.
    pub fn set_options(&mut self, options: RequestOptions) -> Result<&mut Self> {
        let parsed = parse_options(options)?;
        self.options = parsed;
        Ok(self)
    }

    /// Apply a query and an options map in one step.
    ///
    /// The query is applied unless empty. `limit` and `explain` are taken
    /// out of the options and set on the query; the remaining keys replace
    /// the current options. Nothing changes if any part is invalid.
    pub fn set_options_and_query(
        &mut self,
        options: Option<RequestOptions>,
        query: impl Into<QueryInput>,
    ) -> Result<&mut Self> {
        let input = query.into();
        let query = if input.is_empty() {
            None
        } else {
            Some(Query::create(input)?)
        };

        let mut limit = None;
        let mut explain = None;
        let mut parsed = None;
        if let Some(mut options) = options {
            if let Some(value) = options.remove("limit") {
                limit = Some(value.as_u64().ok_or_else(|| {
                    Error::InvalidArgument(format!("limit must be a non-negative integer: {:?}", value))
                })?);
            }
            if let Some(value) = options.remove("explain") {
                explain = Some(value.as_bool().ok_or_else(|| {
                    Error::InvalidArgument(format!("explain must be a boolean: {:?}", value))
                })?);
            }
            parsed = Some(parse_options(options)?);
        }

        if let Some(query) = query {
            self.query = query;
        }
        if let Some(limit) = limit {
            self.query.set_size(limit);
        }
        if let Some(explain) = explain {
            self.query.set_explain(explain);
        }
        if let Some(parsed) = parsed {
            self.options = parsed;
        }

        Ok(self)
    }

    /// Run only the given suggesters
    pub fn set_suggest(&mut self, suggest: Suggest) -> &mut Self {
        let mut query = Query::new();
        query.set_suggest(suggest);
        self.set_option(SearchOption::SearchType, SearchType::Suggest);
        self.query = query;
        self
    }

    /// Request path: the scroll endpoint when a scroll id is set, else the
    /// search endpoint of the target indices
    pub fn path(&self) -> String {
        if self.has_option(SearchOption::ScrollId) {
            SCROLL_PATH.to_string()
        } else {
            self.search_path()
        }
    }

    fn search_path(&self) -> String {
        format!("{}/_search", self.indices.join(","))
    }

    fn params(&self) -> BTreeMap<String, String> {
        self.options
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value.to_param()))
            .collect()
    }

    /// Run the search.
    ///
    /// With a scroll id set, the id is sent in the request body of a scroll
    /// continuation (ids can outgrow URL length limits).
    pub async fn search(
        &mut self,
        query: impl Into<QueryInput>,
        options: Option<RequestOptions>,
        method: HttpMethod,
    ) -> Result<ResultSet> {
        self.set_options_and_query(options, query)?;

        let path = self.path();
        let mut params = self.params();

        let response = if path == SCROLL_PATH {
            let scroll_id = params
                .remove(SearchOption::ScrollId.as_str())
                .unwrap_or_default();
            let request = TransportRequest::new(method, path)
                .params(params)
                .body(json!({ "scroll_id": scroll_id }));
            debug!("Continuing scroll");
            self.client.scroll(request).await?
        } else {
            let mut request = TransportRequest::new(method, path)
                .params(params)
                .body(self.query.to_value());
            if !self.indices.is_empty() {
                request = request.index(self.indices.join(","));
            }
            debug!("Searching {}", request.path);
            self.client.search(request).await?
        };

        self.builder.build_result_set(response, &self.query)
    }

    /// Count matching documents.
    ///
    /// Runs on a copy of the query with `size` 0 and exact total-hit
    /// tracking; the stored query is not modified.
    pub async fn count(
        &mut self,
        query: impl Into<QueryInput>,
        full_result: bool,
        method: HttpMethod,
    ) -> Result<CountResult> {
        self.set_options_and_query(None, query)?;

        let mut query = self.query.clone();
        query.set_size(0).set_track_total_hits(true);

        let mut params = self.params();
        params.remove(SearchOption::Scroll.as_str());
        params.remove(SearchOption::ScrollId.as_str());
        params.insert(
            SearchOption::SearchType.as_str().to_string(),
            SearchType::QueryThenFetch.as_str().to_string(),
        );

        let mut request = TransportRequest::new(method, self.search_path())
            .params(params)
            .body(query.to_value());
        if !self.indices.is_empty() {
            request = request.index(self.indices.join(","));
        }
        debug!("Counting {}", request.path);

        let response = self.client.search(request).await?;
        let result_set = self.builder.build_result_set(response, &query)?;

        Ok(if full_result {
            CountResult::Full(result_set)
        } else {
            CountResult::Total(result_set.total_hits())
        })
    }

    /// Iterate over all hits with the scroll API, keeping each context
    /// alive for `expiry` (`"1m"`)
    pub fn scroll(&self, expiry: impl Into<String>) -> Scroll {
        Scroll::new(self.clone(), expiry.into())
    }
}

fn parse_options(options: RequestOptions) -> Result<BTreeMap<SearchOption, OptionValue>> {
    options
        .into_iter()
        .map(|(key, value)| Ok((key.parse::<SearchOption>()?, value)))
        .collect()
}

/// Index names end up in the URL path. `/`, `|`, `<` and `>` are only
/// allowed inside a `<...>` date-math expression.
fn validate_index_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("index name is empty".to_string()));
    }

    let invalid = |c: char| {
        Error::InvalidArgument(format!(
            "index name '{}' contains invalid character {:?}",
            name, c
        ))
    };
    let mut in_expression = false;
    for c in name.chars() {
        match c {
            c if c.is_whitespace() => return Err(invalid(c)),
            ',' | '#' | '"' | '\\' | '?' => return Err(invalid(c)),
            '<' if !in_expression => in_expression = true,
            '>' if in_expression => in_expression = false,
            '<' | '>' => return Err(invalid(c)),
            '/' | '|' if !in_expression => return Err(invalid(c)),
            _ => {}
        }
    }
    if in_expression {
        return Err(Error::InvalidArgument(format!(
            "index name '{}' has an unterminated date math expression",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TransportResponse;
    use crate::search::testing::{Call, RecordingTransport};
    use serde_json::{json, Value};

    fn hits_response(total: u64, ids: &[&str]) -> TransportResponse {
        let hits: Vec<Value> = ids.iter().map(|id| json!({"_id": id, "_score": 1.0})).collect();
        TransportResponse::new(
            200,
            json!({"took": 1, "hits": {"total": {"value": total, "relation": "eq"}, "hits": hits}}),
        )
    }

    fn search_with(transport: &Arc<RecordingTransport>) -> Search {
        Search::new(transport.clone())
    }

    #[test]
    fn test_add_indices() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        search.add_index("logs").unwrap();
        search.add_indices(["metrics", "logs"]).unwrap();

        assert_eq!(search.indices(), ["logs", "metrics", "logs"]);
        assert!(search.has_index("metrics"));
        assert!(!search.has_index("traces"));
    }

    #[test]
    fn test_add_indices_is_all_or_nothing() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);
        search.add_index("logs").unwrap();

        let result = search.add_indices(["metrics", "bad,name", "traces"]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(search.indices(), ["logs"]);

        assert!(search.add_index("").is_err());
        assert!(search.add_index("with space").is_err());
        assert!(search.add_index("<logs-{now/d}>").is_ok());
    }

    #[test]
    fn test_index_names_cannot_change_the_url() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        for name in ["logs?pretty", "a/b", "logs|other", "logs>", "<logs", "<a<b>>"] {
            assert!(
                matches!(search.add_index(name), Err(Error::InvalidArgument(_))),
                "accepted {}",
                name
            );
        }
        assert!(search.indices().is_empty());

        search
            .add_indices(["<logstash-{now/d{YYYY.MM.dd|+12:00}}>", "app-<{now/M}>"])
            .unwrap();
        assert_eq!(search.indices().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_index_sends_nothing() {
        let transport = RecordingTransport::with_responses(vec![hits_response(0, &[])]);
        let mut search = search_with(&transport);

        assert!(search.add_indices(["logs", "logs?pretty"]).is_err());
        search.search("", None, HttpMethod::Post).await.unwrap();

        let (_, request) = &transport.calls()[0];
        assert_eq!(request.path, "/_search");
        assert!(request.index.is_none());
    }

    #[test]
    fn test_allowed_options() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        for option in SearchOption::ALL {
            search.set_option_str(option.as_str(), "x").unwrap();
            search.add_option_str(option.as_str(), "y").unwrap();
            assert_eq!(
                search.get_option(option).unwrap(),
                &OptionValue::List(vec!["x".into(), "y".into()])
            );
        }
    }

    #[test]
    fn test_invalid_options() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        for name in ["limit", "query", "index", "unknown"] {
            assert!(matches!(
                search.set_option_str(name, 1),
                Err(Error::InvalidOption(_))
            ));
            assert!(matches!(
                search.add_option_str(name, 1),
                Err(Error::InvalidOption(_))
            ));
        }
        assert!(search.options().is_empty());
    }

    #[test]
    fn test_option_not_found() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        assert!(matches!(
            search.get_option(SearchOption::Routing),
            Err(Error::OptionNotFound(name)) if name == "routing"
        ));

        search.set_option(SearchOption::Routing, "user1");
        assert_eq!(search.get_option(SearchOption::Routing).unwrap().as_str(), Some("user1"));

        search.clear_options();
        assert!(!search.has_option(SearchOption::Routing));
    }

    #[test]
    fn test_add_option_accumulates() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        search
            .add_option(SearchOption::FilterPath, "hits.hits._id")
            .add_option(SearchOption::FilterPath, "hits.total");

        assert_eq!(
            search.get_option(SearchOption::FilterPath).unwrap().to_param(),
            "hits.hits._id,hits.total"
        );
    }

    #[test]
    fn test_set_options_validates_before_replacing() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);
        search.set_option(SearchOption::Routing, "user1");

        let options: RequestOptions = [
            ("preference".to_string(), OptionValue::from("_local")),
            ("bogus".to_string(), OptionValue::from(1)),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            search.set_options(options),
            Err(Error::InvalidOption(name)) if name == "bogus"
        ));
        assert!(search.has_option(SearchOption::Routing));
        assert!(!search.has_option(SearchOption::Preference));

        let options: RequestOptions = [("preference".to_string(), OptionValue::from("_local"))]
            .into_iter()
            .collect();
        search.set_options(options).unwrap();
        assert!(!search.has_option(SearchOption::Routing));
        assert!(search.has_option(SearchOption::Preference));
    }

    #[test]
    fn test_set_options_and_query_maps_convenience_keys() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        let options: RequestOptions = [
            ("limit".to_string(), OptionValue::from(5)),
            ("explain".to_string(), OptionValue::from(true)),
            ("routing".to_string(), OptionValue::from("user1")),
        ]
        .into_iter()
        .collect();
        search.set_options_and_query(Some(options), "rust").unwrap();

        assert_eq!(search.query().size(), Some(5));
        assert!(search.query().explain());
        assert!(search.has_option(SearchOption::Routing));
        assert_eq!(search.options().len(), 1);
        assert_eq!(
            search.query().to_value()["query"]["query_string"]["query"],
            "rust"
        );
    }

    #[test]
    fn test_set_options_and_query_leaves_state_on_error() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);
        search.set_query("original").unwrap();

        let options: RequestOptions = [
            ("limit".to_string(), OptionValue::from(5)),
            ("nope".to_string(), OptionValue::from(true)),
        ]
        .into_iter()
        .collect();
        assert!(search.set_options_and_query(Some(options), "replacement").is_err());

        assert_eq!(search.query().size(), None);
        assert_eq!(
            search.query().to_value()["query"]["query_string"]["query"],
            "original"
        );
    }

    #[test]
    fn test_path() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        assert_eq!(search.path(), "/_search");

        search.add_indices(["logs", "metrics"]).unwrap();
        assert_eq!(search.path(), "logs,metrics/_search");

        search.set_option(SearchOption::ScrollId, "abc");
        assert_eq!(search.path(), SCROLL_PATH);
    }

    #[test]
    fn test_set_suggest() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        search.set_suggest(Suggest::from_suggester(
            crate::query::Suggester::term("spell", "title").with_text("rsut"),
        ));

        assert_eq!(
            search.get_option(SearchOption::SearchType).unwrap().as_str(),
            Some("suggest")
        );
        let body = search.query().to_value();
        assert!(body.get("query").is_none());
        assert_eq!(body["suggest"]["spell"]["term"]["field"], "title");
    }

    #[tokio::test]
    async fn test_search_all_indices() {
        let transport = RecordingTransport::with_responses(vec![hits_response(2, &["1", "2"])]);
        let mut search = search_with(&transport);

        let result = search.search("", None, HttpMethod::Post).await.unwrap();
        assert_eq!(result.len(), 2);

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (kind, request) = &calls[0];
        assert_eq!(*kind, Call::Search);
        assert_eq!(request.path, "/_search");
        assert!(request.index.is_none());
        assert_eq!(request.body, Some(json!({"query": {"match_all": {}}})));
    }

    #[tokio::test]
    async fn test_search_request_shape() {
        let transport = RecordingTransport::with_responses(vec![hits_response(1, &["1"])]);
        let mut search = search_with(&transport);
        search.add_indices(["logs", "metrics"]).unwrap();
        search.set_option(SearchOption::Routing, "user1");

        let options: RequestOptions = [
            ("limit".to_string(), OptionValue::from(10)),
            ("timeout".to_string(), OptionValue::from("2s")),
        ]
        .into_iter()
        .collect();
        let result = search
            .search("level:error", Some(options), HttpMethod::Get)
            .await
            .unwrap();

        let (_, request) = &transport.calls()[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.path, "logs,metrics/_search");
        assert_eq!(request.index.as_deref(), Some("logs,metrics"));
        // Passing options replaces the ones set before
        assert!(!request.params.contains_key("routing"));
        assert_eq!(request.params.get("timeout").map(String::as_str), Some("2s"));
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["size"], 10);
        assert_eq!(body["query"]["query_string"]["query"], "level:error");

        assert_eq!(result.query().size(), Some(10));
    }

    #[tokio::test]
    async fn test_search_moves_scroll_id_into_body() {
        let transport = RecordingTransport::with_responses(vec![hits_response(1, &["1"])]);
        let mut search = search_with(&transport);
        search.add_index("logs").unwrap();
        search
            .set_option(SearchOption::Scroll, "1m")
            .set_option(SearchOption::ScrollId, "very-long-scroll-id");

        search.search("", None, HttpMethod::Post).await.unwrap();

        let (kind, request) = &transport.calls()[0];
        assert_eq!(*kind, Call::Scroll);
        assert_eq!(request.path, SCROLL_PATH);
        assert!(!request.params.contains_key("scroll_id"));
        assert_eq!(request.params.get("scroll").map(String::as_str), Some("1m"));
        assert_eq!(
            request.body,
            Some(json!({"scroll_id": "very-long-scroll-id"}))
        );
    }

    #[tokio::test]
    async fn test_count_does_not_mutate_query() {
        let transport = RecordingTransport::with_responses(vec![
            hits_response(42, &[]),
            hits_response(42, &[]),
        ]);
        let mut search = search_with(&transport);
        search.add_index("logs").unwrap();
        search.set_query("level:error").unwrap();
        search.query_mut().set_size(25);
        search.set_option(SearchOption::SearchType, SearchType::DfsQueryThenFetch);

        let count = search.count("", false, HttpMethod::Post).await.unwrap();
        assert!(matches!(count, CountResult::Total(42)));

        assert_eq!(search.query().size(), Some(25));
        assert!(!search.query().has_param("track_total_hits"));
        assert_eq!(
            search.get_option(SearchOption::SearchType).unwrap().as_str(),
            Some("dfs_query_then_fetch")
        );

        let (_, request) = &transport.calls()[0];
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["size"], 0);
        assert_eq!(body["track_total_hits"], true);
        assert_eq!(
            request.params.get("search_type").map(String::as_str),
            Some("query_then_fetch")
        );

        let full = search.count("", true, HttpMethod::Post).await.unwrap();
        match full {
            CountResult::Full(set) => {
                assert_eq!(set.total_hits(), 42);
                assert_eq!(set.query().size(), Some(0));
            }
            CountResult::Total(_) => panic!("expected a full result set"),
        }
    }

    #[test]
    fn test_search_blocking() {
        let transport = RecordingTransport::with_responses(vec![hits_response(3, &["a"])]);
        let mut search = search_with(&transport);
        search.add_index("books").unwrap();

        let result =
            tokio_test::block_on(search.search("title:rust", None, HttpMethod::Get)).unwrap();

        assert_eq!(result.total_hits(), 3);
        assert_eq!(result.hits()[0].id, "a");
        assert_eq!(transport.calls()[0].1.index.as_deref(), Some("books"));
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let transport = RecordingTransport::new();
        let mut search = search_with(&transport);

        let err = search.search("", None, HttpMethod::Post).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
