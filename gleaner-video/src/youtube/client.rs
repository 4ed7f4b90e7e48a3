//! Keyed client for the YouTube Data API v3 and the timedtext caption
//! endpoint. The API key rides along as a query param (`Auth::Query`);
//! captions need no credential at all.

use crate::youtube::transcript::{segments_from_track, Json3Track, TranscriptSegment};
use crate::youtube::types::{ChannelListResponse, PlaylistItemsResponse, SearchListResponse};
use crate::youtube::VideoError;
use async_trait::async_trait;
use gleaner_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;

/// Page size for playlistItems/list.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;

/// One-page-at-a-time playlist seam; the fetch loop is generic over it.
#[async_trait]
pub trait PlaylistPages: Send + Sync {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsResponse, HttpError>;
}

pub struct YouTubeApi {
    http: HttpClient,
    key: String,
}

impl YouTubeApi {
    pub fn new(api_key: String) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new("https://www.googleapis.com")?,
            key: api_key,
        })
    }

    fn key_auth(&self) -> Auth<'_> {
        Auth::Query {
            name: "key",
            value: Cow::Borrowed(self.key.as_str()),
        }
    }

    /// Resolve a searchable username to a channel id (first search hit,
    /// mirroring the manual workflow this job replaces).
    pub async fn resolve_channel(&self, username: &str) -> Result<String, VideoError> {
        let resp: SearchListResponse = self
            .http
            .get_json(
                "youtube/v3/search",
                RequestOpts {
                    auth: Some(self.key_auth()),
                    query: Some(vec![
                        ("part", "snippet".into()),
                        ("type", "channel".into()),
                        ("maxResults", "5".into()),
                        ("q", Cow::Borrowed(username)),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        let hit = resp
            .items
            .into_iter()
            .next()
            .ok_or_else(|| VideoError::ChannelNotFound(username.to_string()))?;
        tracing::debug!(
            channel_id = %hit.snippet.channel_id,
            channel_title = ?hit.snippet.title,
            "channel.resolved"
        );
        Ok(hit.snippet.channel_id)
    }

    /// Look up the channel's uploads playlist id.
    pub async fn uploads_playlist(&self, channel_id: &str) -> Result<String, VideoError> {
        let resp: ChannelListResponse = self
            .http
            .get_json(
                "youtube/v3/channels",
                RequestOpts {
                    auth: Some(self.key_auth()),
                    query: Some(vec![
                        ("part", "contentDetails".into()),
                        ("id", Cow::Borrowed(channel_id)),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        resp.items
            .into_iter()
            .next()
            .map(|c| c.content_details.related_playlists.uploads)
            .ok_or_else(|| VideoError::MissingUploads(channel_id.to_string()))
    }

}

/// Caption (timedtext) client. Unlike the Data API this endpoint takes
/// no credential, so the legacy transcript job works without a key.
pub struct CaptionClient {
    http: HttpClient,
}

impl CaptionClient {
    pub fn new() -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new("https://www.youtube.com")?,
        })
    }

    /// Fetch the caption track for a single video as ordered segments.
    pub async fn fetch_captions(
        &self,
        video_id: &str,
        lang: &str,
    ) -> Result<Vec<TranscriptSegment>, VideoError> {
        let track: Json3Track = self
            .http
            .get_json(
                "api/timedtext",
                RequestOpts {
                    query: Some(vec![
                        ("v", Cow::Borrowed(video_id)),
                        ("lang", Cow::Borrowed(lang)),
                        ("fmt", "json3".into()),
                    ]),
                    ..Default::default()
                },
            )
            .await?;
        Ok(segments_from_track(track))
    }
}

#[async_trait]
impl PlaylistPages for YouTubeApi {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemsResponse, HttpError> {
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("part", "snippet".into()),
            ("playlistId", Cow::Borrowed(playlist_id)),
            ("maxResults", PLAYLIST_PAGE_SIZE.to_string().into()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", Cow::Borrowed(token)));
        }

        let page: PlaylistItemsResponse = self
            .http
            .get_json(
                "youtube/v3/playlistItems",
                RequestOpts {
                    auth: Some(self.key_auth()),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            playlist_id,
            item_count = page.items.len(),
            has_next = page.next_page_token.is_some(),
            "playlist.page"
        );
        Ok(page)
    }
}
