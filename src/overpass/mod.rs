//! Overpass query building and fetching.

mod client;
mod query;

pub use client::{merge_responses, parse_response, OverpassClient};
pub use query::{Mode, QueryBuilder};
