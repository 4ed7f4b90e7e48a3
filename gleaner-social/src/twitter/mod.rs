//! Twitter/X search API integration.
//!
//! Submodules provide the HTTP client wrapper, the paginated fetch
//! engine (recent + full-archive), record extraction, and strongly
//! typed response models.

pub mod client;
pub mod fetch;
pub mod record;
pub mod types;

pub use client::{SearchEndpoint, SearchPages, TwitterApi};
pub use fetch::{mode_for_days, SearchMode, SearchRunner};
pub use record::PostRecord;
