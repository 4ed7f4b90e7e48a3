//! YouTube Data API v3 integration.
//!
//! Submodules provide the keyed HTTP client, the windowed playlist
//! fetch, caption (timedtext) parsing, and typed response models.

pub mod client;
pub mod fetch;
pub mod transcript;
pub mod types;

pub use client::{CaptionClient, PlaylistPages, YouTubeApi};
pub use fetch::{fetch_channel_videos, VideoRecord, VideoWindow};
pub use transcript::{transcript_text, TranscriptSegment};

use gleaner_http::HttpError;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("no channel found for '{0}'")]
    ChannelNotFound(String),

    #[error("channel '{0}' has no uploads playlist")]
    MissingUploads(String),

    #[error("bad publishedAt timestamp: {0}")]
    BadTimestamp(String),
}
