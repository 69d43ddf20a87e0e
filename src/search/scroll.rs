//! Cursor over the scroll API

use super::executor::{Search, SCROLL_PATH};
use super::models::SearchOption;
use crate::error::Result;
use crate::network::{HttpMethod, TransportRequest};
use crate::query::QueryInput;
use crate::results::ResultSet;
use futures::stream::{self, Stream};
use serde_json::json;
use tracing::{debug, info, warn};

/// Pages through every hit of a search.
///
/// Works on its own copy of the search, so the search it was created from
/// keeps its options. The first call runs the search with a `scroll`
/// keep-alive; later calls continue with the returned scroll id. Iteration
/// ends at the first empty page, when no scroll id is returned or when a
/// page request fails, and the server-side context is cleared at that point.
pub struct Scroll {
    search: Search,
    expiry: String,
    scroll_id: Option<String>,
    started: bool,
    finished: bool,
    current_page: u64,
    total_pages: u64,
}

impl Scroll {
    pub(crate) fn new(search: Search, expiry: String) -> Self {
        Self {
            search,
            expiry,
            scroll_id: None,
            started: false,
            finished: false,
            current_page: 0,
            total_pages: 0,
        }
    }

    /// Keep-alive sent with every page request
    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// Id of the live scroll context
    pub fn scroll_id(&self) -> Option<&str> {
        self.scroll_id.as_deref()
    }

    /// Number of pages fetched so far
    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    /// Expected number of pages, from the first page's size and total
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetch the next non-empty page
    pub async fn next_page(&mut self) -> Option<Result<ResultSet>> {
        if self.finished {
            return None;
        }

        self.search.set_option(SearchOption::Scroll, self.expiry.clone());
        match self.scroll_id.clone() {
            Some(id) => {
                self.search.set_option(SearchOption::ScrollId, id);
            }
            None if !self.started => {
                self.search.remove_option(SearchOption::ScrollId);
            }
            None => {
                self.finished = true;
                return None;
            }
        }

        let result = self
            .search
            .search(QueryInput::Empty, None, HttpMethod::Post)
            .await;
        let first = !self.started;
        self.started = true;

        let result_set = match result {
            Ok(result_set) => result_set,
            Err(e) => {
                self.finished = true;
                if let Err(clear_err) = self.clear().await {
                    warn!("Failed to clear scroll context: {}", clear_err);
                }
                return Some(Err(e));
            }
        };

        self.scroll_id = result_set.scroll_id().map(str::to_string);
        if result_set.is_empty() {
            debug!("Scroll exhausted after {} pages", self.current_page);
            self.finished = true;
            return match self.clear().await {
                Ok(()) => None,
                Err(e) => Some(Err(e)),
            };
        }

        if first {
            let page_size = result_set.len() as u64;
            self.total_pages = result_set.total_hits().div_ceil(page_size);
            info!(
                "Scrolling {} hits in {} pages",
                result_set.total_hits(),
                self.total_pages
            );
        }
        self.current_page += 1;
        if self.scroll_id.is_none() {
            self.finished = true;
        }

        Some(Ok(result_set))
    }

    /// Release the server-side scroll context, if any
    pub async fn clear(&mut self) -> Result<()> {
        let Some(id) = self.scroll_id.take() else {
            return Ok(());
        };

        let request = TransportRequest::new(HttpMethod::Delete, SCROLL_PATH)
            .body(json!({ "scroll_id": [id] }));
        debug!("Clearing scroll context");
        self.search.client().clear_scroll(request).await?;
        Ok(())
    }

    /// Clear the current context and start over from the first page
    pub async fn rewind(&mut self) -> Result<()> {
        self.clear().await?;
        self.search.remove_option(SearchOption::ScrollId);
        self.started = false;
        self.finished = false;
        self.current_page = 0;
        self.total_pages = 0;
        Ok(())
    }

    /// Consume the cursor as a stream of pages
    pub fn into_stream(self) -> impl Stream<Item = Result<ResultSet>> {
        stream::unfold(self, |mut scroll| async move {
            scroll.next_page().await.map(|page| (page, scroll))
        })
    }
}
