//! Social network clients and extractors used by gleaner.
//!
//! Currently only the Twitter/X keyword pipeline is implemented: a thin
//! search API client, a paginated fetch engine with a stop-on-rate-limit
//! policy, and the flat record shape persisted to `tweets.json`.

pub mod twitter;
