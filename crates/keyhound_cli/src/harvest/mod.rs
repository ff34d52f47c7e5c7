//! Paginated code-search harvesting.
//!
//! The harvester walks a code-search API one page at a time, respecting the
//! per-query page cap and backing off once when rate-limited. A second
//! consecutive rate limit abandons the query rather than hammering the API.

mod client;
mod session;

pub use client::{CodeSearchClient, HarvestError, PageFetch, SearchClient, SearchHit, SearchPage};
pub use session::{HarvestSession, Harvester};
