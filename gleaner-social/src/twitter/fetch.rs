//! Paginated keyword fetch with a stop-on-rate-limit policy.
//!
//! Two fetch paths share one page loop: recent search (≤ 7-day
//! lookback, with a single-request shortcut for small caps) and
//! full-archive search (months back, always paginated). A rate limit
//! never escapes as an error; the engine logs a warning and returns
//! whatever was collected so far. Partial success is success.

use crate::twitter::client::{PageRequest, SearchEndpoint, SearchPages, PAGE_SIZE};
use crate::twitter::record::{records_from_page, PostRecord};
use gleaner_http::HttpError;
use std::time::Duration;
use time::{Duration as Lookback, OffsetDateTime};

/// Recent search only reaches back this many days.
pub const RECENT_WINDOW_DAYS: u32 = 7;
const DAYS_PER_MONTH: u32 = 30;

/// Which search endpoint a requested lookback maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Recent { days_back: u32 },
    Archive { months_back: u32 },
}

/// `days_back ≤ 7` stays on recent search; anything longer converts to
/// whole months for the archive endpoint. The division truncates, so
/// 8..=29 days collapse to zero months; [`SearchRunner::run`] warns
/// when that produces a degenerate window.
pub fn mode_for_days(days_back: u32) -> SearchMode {
    if days_back <= RECENT_WINDOW_DAYS {
        SearchMode::Recent { days_back }
    } else {
        SearchMode::Archive {
            months_back: days_back / DAYS_PER_MONTH,
        }
    }
}

pub struct SearchRunner<A> {
    api: A,
    page_delay: Duration,
}

impl<A: SearchPages> SearchRunner<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            page_delay: Duration::from_secs(1),
        }
    }

    /// Override the inter-page self-throttle (tests use zero).
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    fn query_for(keyword: &str) -> String {
        format!("{keyword} lang:en -is:retweet")
    }

    /// Dispatch on the requested lookback and run the matching fetch.
    pub async fn run(
        &self,
        keyword: &str,
        days_back: u32,
        cap: usize,
    ) -> Result<Vec<PostRecord>, HttpError> {
        match mode_for_days(days_back) {
            SearchMode::Recent { days_back } => {
                tracing::info!(keyword, days_back, cap, "search.mode.recent");
                self.fetch_recent(keyword, days_back, cap).await
            }
            SearchMode::Archive { months_back } => {
                if months_back == 0 {
                    tracing::warn!(
                        days_back,
                        "lookback truncates to zero months; archive window is degenerate"
                    );
                }
                tracing::info!(keyword, months_back, cap, "search.mode.archive");
                self.fetch_archive(keyword, months_back, cap).await
            }
        }
    }

    /// Recent search. Issues exactly one request when the cap fits in a
    /// single page; a rate limit on that call returns an empty result.
    pub async fn fetch_recent(
        &self,
        keyword: &str,
        days_back: u32,
        cap: usize,
    ) -> Result<Vec<PostRecord>, HttpError> {
        let now = OffsetDateTime::now_utc();
        let requested = now - Lookback::days(i64::from(days_back));
        let cutoff = now - Lookback::days(i64::from(RECENT_WINDOW_DAYS));
        let start_time = requested.max(cutoff);

        if cap <= PAGE_SIZE as usize {
            let req = PageRequest {
                query: Self::query_for(keyword),
                start_time,
                max_results: cap as u32,
                next_token: None,
            };
            return match self.api.search_page(SearchEndpoint::Recent, &req).await {
                Ok(page) => {
                    let mut records = records_from_page(&page);
                    records.truncate(cap);
                    Ok(records)
                }
                Err(HttpError::RateLimited { message, .. }) => {
                    tracing::warn!(%message, "rate limit hit on single call; returning no results");
                    Ok(Vec::new())
                }
                Err(e) => Err(e),
            };
        }

        self.paginate(
            SearchEndpoint::Recent,
            Self::query_for(keyword),
            start_time,
            cap,
        )
        .await
    }

    /// Full-archive search: always paginated, no single-request shortcut.
    pub async fn fetch_archive(
        &self,
        keyword: &str,
        months_back: u32,
        cap: usize,
    ) -> Result<Vec<PostRecord>, HttpError> {
        let start_time = OffsetDateTime::now_utc()
            - Lookback::days(i64::from(months_back) * i64::from(DAYS_PER_MONTH));
        self.paginate(
            SearchEndpoint::Archive,
            Self::query_for(keyword),
            start_time,
            cap,
        )
        .await
    }

    /// Cursor-following page loop shared by both endpoints.
    async fn paginate(
        &self,
        endpoint: SearchEndpoint,
        query: String,
        start_time: OffsetDateTime,
        cap: usize,
    ) -> Result<Vec<PostRecord>, HttpError> {
        let mut collected: Vec<PostRecord> = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let req = PageRequest {
                query: query.clone(),
                start_time,
                max_results: PAGE_SIZE,
                next_token: next_token.clone(),
            };
            let page = match self.api.search_page(endpoint, &req).await {
                Ok(page) => page,
                Err(HttpError::RateLimited { message, .. }) => {
                    tracing::warn!(
                        collected = collected.len(),
                        %message,
                        "rate limit hit; returning partial results"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            let records = records_from_page(&page);
            if records.is_empty() {
                break;
            }
            for record in records {
                collected.push(record);
                if collected.len() >= cap {
                    return Ok(collected);
                }
            }

            next_token = page.meta.and_then(|m| m.next_token);
            if next_token.is_none() {
                break;
            }

            // Self-throttle between pages to stretch the quota.
            tokio::time::sleep(self.page_delay).await;
        }

        Ok(collected)
    }
}
