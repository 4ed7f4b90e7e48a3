//! Windowed collection of a channel's upload playlist.

use crate::youtube::client::PlaylistPages;
use crate::youtube::VideoError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MAX_VIDEOS: usize = 20;

/// Publication window for collected videos, exclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct VideoWindow {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl VideoWindow {
    /// The trailing window used by the channel job: strictly between
    /// 150 and 30 days ago.
    pub fn trailing(now: DateTime<Utc>) -> Self {
        Self {
            min: now - Duration::days(150),
            max: now - Duration::days(30),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t > self.min && t < self.max
    }
}

/// One collected video, keyed by video id in the output map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    pub url: String,
    pub published_at: String,
}

/// Walk playlist pages and keep videos published inside `window`, up
/// to `cap` entries.
///
/// Upload playlists are reverse-chronological, so the first item at or
/// below the window's lower bound ends the entire walk; every later
/// item, and every later page, can only be older.
pub async fn fetch_channel_videos<P: PlaylistPages>(
    source: &P,
    playlist_id: &str,
    window: VideoWindow,
    cap: usize,
) -> Result<BTreeMap<String, VideoRecord>, VideoError> {
    let mut videos: BTreeMap<String, VideoRecord> = BTreeMap::new();
    let mut page_token: Option<String> = None;

    'pages: loop {
        let page = source
            .playlist_page(playlist_id, page_token.as_deref())
            .await?;

        for item in &page.items {
            let snippet = &item.snippet;
            let published = DateTime::parse_from_rfc3339(&snippet.published_at)
                .map_err(|e| VideoError::BadTimestamp(format!("{}: {e}", snippet.published_at)))?
                .with_timezone(&Utc);

            if published <= window.min {
                break 'pages;
            }
            if !window.contains(published) {
                continue;
            }

            let video_id = snippet.resource_id.video_id.clone();
            videos.insert(
                video_id.clone(),
                VideoRecord {
                    title: snippet.title.clone(),
                    url: format!("https://www.youtube.com/watch?v={video_id}"),
                    published_at: snippet.published_at.clone(),
                },
            );
            if videos.len() >= cap {
                break 'pages;
            }
        }

        page_token = page.next_page_token;
        if page_token.is_none() {
            break;
        }
    }

    tracing::info!(playlist_id, count = videos.len(), "videos.collected");
    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_bounds() {
        let now = DateTime::parse_from_rfc3339("2026-08-29T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let window = VideoWindow::trailing(now);
        assert_eq!(window.min, now - Duration::days(150));
        assert_eq!(window.max, now - Duration::days(30));
        assert!(window.contains(now - Duration::days(90)));
        assert!(!window.contains(now - Duration::days(10)));
        assert!(!window.contains(now - Duration::days(200)));
        // exclusive bounds
        assert!(!window.contains(window.min));
        assert!(!window.contains(window.max));
    }
}
