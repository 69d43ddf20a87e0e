//! HTTP networking module
//!
//! Defines the transport abstraction the search builder dispatches through
//! and a reqwest-backed implementation of it.

mod client;
mod transport;
mod user_agent;

pub use client::HttpClient;
pub use transport::*;
pub use user_agent::{accept_json, user_agent};
