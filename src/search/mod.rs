//! Search building and dispatch
//!
//! A [`Search`] collects target indices, a query and engine options, then
//! sends them through a transport. [`Scroll`] pages through large result
//! sets with the scroll API.

mod executor;
mod models;
mod scroll;

pub use executor::{Search, SCROLL_PATH};
pub use models::*;
pub use scroll::Scroll;

#[cfg(test)]
pub(crate) mod testing {
    use crate::network::{Transport, TransportError, TransportRequest, TransportResponse};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Transport entry point a request went through
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        Search,
        Scroll,
        ClearScroll,
    }

    pub type Reply = Result<TransportResponse, TransportError>;

    /// Records requests and answers with canned replies in order.
    /// Fails once the replies run out.
    #[derive(Default)]
    pub struct RecordingTransport {
        calls: Mutex<Vec<(Call, TransportRequest)>>,
        replies: Mutex<VecDeque<Reply>>,
    }

    impl RecordingTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn with_responses(responses: Vec<TransportResponse>) -> Arc<Self> {
            Self::with_replies(responses.into_iter().map(Ok).collect())
        }

        pub fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(vec![]),
                replies: Mutex::new(replies.into()),
            })
        }

        pub fn calls(&self) -> Vec<(Call, TransportRequest)> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            call: Call,
            request: TransportRequest,
        ) -> Reply {
            self.calls.lock().unwrap().push((call, request));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::NoReachableEndpoint("no canned reply".into())))
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn search(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.record(Call::Search, request)
        }

        async fn scroll(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.record(Call::Scroll, request)
        }

        async fn clear_scroll(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.record(Call::ClearScroll, request)
        }
    }
}
