//! Minimal wrapper around the Twitter/X search API.
//!
//! Handles auth, request parameter shaping, and safe time windows
//! before delegating to the shared HTTP client. Pagination lives in
//! [`crate::twitter::fetch`]; this layer only fetches one page per call
//! so the engine can be driven through [`SearchPages`] in tests.

use crate::twitter::types::SearchResponse;
use async_trait::async_trait;
use gleaner_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

/// Max results per page accepted by both search endpoints.
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEndpoint {
    /// `/2/tweets/search/recent`, limited to a 7-day lookback.
    Recent,
    /// `/2/tweets/search/all`, access-gated full archive.
    Archive,
}

impl SearchEndpoint {
    fn path(self) -> &'static str {
        match self {
            SearchEndpoint::Recent => "2/tweets/search/recent",
            SearchEndpoint::Archive => "2/tweets/search/all",
        }
    }
}

/// Parameters for a single search page request.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub query: String,
    pub start_time: OffsetDateTime,
    pub max_results: u32,
    pub next_token: Option<String>,
}

/// One-page-at-a-time search seam; the fetch engine is generic over it.
#[async_trait]
pub trait SearchPages: Send + Sync {
    async fn search_page(
        &self,
        endpoint: SearchEndpoint,
        req: &PageRequest,
    ) -> Result<SearchResponse, HttpError>;
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    pub fn new(bearer_token: String) -> Result<Self, HttpError> {
        let http = HttpClient::new("https://api.twitter.com")?;
        Ok(Self {
            http,
            bearer: bearer_token,
        })
    }
}

#[async_trait]
impl SearchPages for TwitterApi {
    async fn search_page(
        &self,
        endpoint: SearchEndpoint,
        req: &PageRequest,
    ) -> Result<SearchResponse, HttpError> {
        let max_results = req.max_results.clamp(10, PAGE_SIZE);

        // Recent search rejects windows older than 7 days; clamp with a
        // little slack so the request stays inside the boundary even
        // after network latency.
        let start = match endpoint {
            SearchEndpoint::Recent => {
                let earliest =
                    OffsetDateTime::now_utc() - Duration::days(7) + Duration::seconds(30);
                req.start_time.max(earliest)
            }
            SearchEndpoint::Archive => req.start_time,
        };
        let start_time = start
            .format(&Rfc3339)
            .map_err(|e| HttpError::Build(format!("start_time format: {e}")))?;

        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("query", Cow::Borrowed(req.query.as_str())),
            ("max_results", max_results.to_string().into()),
            ("start_time", start_time.into()),
            ("tweet.fields", "created_at,author_id".into()),
            ("expansions", "author_id".into()),
            ("user.fields", "username".into()),
        ];
        if let Some(token) = &req.next_token {
            params.push(("next_token", Cow::Borrowed(token.as_str())));
        }

        let resp: SearchResponse = self
            .http
            .get_json(
                endpoint.path(),
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            endpoint = ?endpoint,
            result_count = ?resp.meta.as_ref().and_then(|m| m.result_count),
            has_next = resp
                .meta
                .as_ref()
                .and_then(|m| m.next_token.as_ref())
                .is_some(),
            "search.page"
        );
        Ok(resp)
    }
}
