//! Result sets and their construction
//!
//! Responses are turned into [`ResultSet`]s by a [`ResultSetBuilder`], which
//! can be swapped out on a search to post-process hits.

mod builder;
mod set;
mod types;

pub use builder::{DefaultBuilder, ProcessingBuilder, ResultSetBuilder, ResultSetProcessor};
pub use set::ResultSet;
pub use types::{Hit, Shards, TotalHits, TotalHitsRelation};
