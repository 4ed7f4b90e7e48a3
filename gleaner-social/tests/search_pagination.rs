//! Pagination behaviour of the search engine, driven through a
//! scripted `SearchPages` implementation instead of the network.

use async_trait::async_trait;
use gleaner_http::HttpError;
use gleaner_social::twitter::client::{PageRequest, SearchEndpoint, SearchPages};
use gleaner_social::twitter::types::{Includes, Meta, SearchResponse, Tweet, User};
use gleaner_social::twitter::SearchRunner;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays a queue of page results and counts upstream requests.
#[derive(Clone, Default)]
struct ScriptedApi {
    pages: Arc<Mutex<VecDeque<Result<SearchResponse, HttpError>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedApi {
    fn with_pages(pages: Vec<Result<SearchResponse, HttpError>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchPages for ScriptedApi {
    async fn search_page(
        &self,
        _endpoint: SearchEndpoint,
        _req: &PageRequest,
    ) -> Result<SearchResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("engine requested a page past the scripted end")
    }
}

fn page(count: usize, next_token: Option<&str>) -> SearchResponse {
    let tweets = (0..count)
        .map(|i| Tweet {
            id: format!("{i}"),
            text: format!("post {i}"),
            author_id: Some("42".into()),
            created_at: Some("2026-08-20T12:00:00Z".into()),
        })
        .collect();
    SearchResponse {
        data: Some(tweets),
        includes: Some(Includes {
            users: Some(vec![User {
                id: "42".into(),
                username: "alice".into(),
            }]),
        }),
        meta: Some(Meta {
            result_count: Some(count as u64),
            next_token: next_token.map(Into::into),
        }),
    }
}

fn rate_limited() -> HttpError {
    HttpError::RateLimited {
        message: "Too Many Requests".into(),
        reset: Some(1_767_225_600),
    }
}

fn runner(api: ScriptedApi) -> SearchRunner<ScriptedApi> {
    SearchRunner::new(api).with_page_delay(Duration::ZERO)
}

#[tokio::test]
async fn small_cap_issues_exactly_one_request() {
    let api = ScriptedApi::with_pages(vec![Ok(page(5, Some("ignored")))]);
    let records = runner(api.clone())
        .fetch_recent("rustlang", 3, 50)
        .await
        .unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(api.calls(), 1);
    assert_eq!(records[0].username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn small_cap_rate_limit_returns_empty() {
    let api = ScriptedApi::with_pages(vec![Err(rate_limited())]);
    let records = runner(api.clone())
        .fetch_recent("rustlang", 3, 50)
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn large_cap_paginates_within_request_budget() {
    let api = ScriptedApi::with_pages(vec![
        Ok(page(100, Some("t1"))),
        Ok(page(100, Some("t2"))),
        Ok(page(100, Some("t3"))),
    ]);
    let records = runner(api.clone())
        .fetch_recent("rustlang", 5, 250)
        .await
        .unwrap();

    // cap honoured, and no more than ceil(cap / 100) page requests.
    assert_eq!(records.len(), 250);
    assert_eq!(api.calls(), 3);
}

#[tokio::test]
async fn rate_limit_mid_pagination_keeps_prior_pages() {
    let api = ScriptedApi::with_pages(vec![Ok(page(100, Some("t1"))), Err(rate_limited())]);
    let records = runner(api.clone())
        .fetch_recent("rustlang", 5, 500)
        .await
        .unwrap();

    assert_eq!(records.len(), 100);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn exhausted_cursor_ends_the_walk() {
    let api = ScriptedApi::with_pages(vec![Ok(page(100, Some("t1"))), Ok(page(40, None))]);
    let records = runner(api.clone())
        .fetch_recent("rustlang", 5, 500)
        .await
        .unwrap();

    assert_eq!(records.len(), 140);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn empty_page_ends_the_walk() {
    let api = ScriptedApi::with_pages(vec![Ok(page(100, Some("t1"))), Ok(page(0, Some("t2")))]);
    let records = runner(api.clone())
        .fetch_recent("rustlang", 5, 500)
        .await
        .unwrap();

    assert_eq!(records.len(), 100);
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn archive_mode_always_paginates() {
    let api = ScriptedApi::with_pages(vec![Ok(page(30, None))]);
    // 60 days -> archive with 2 months; a small cap still goes through
    // the page loop rather than the single-request shortcut.
    let records = runner(api.clone()).run("rustlang", 60, 30).await.unwrap();

    assert_eq!(records.len(), 30);
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn non_rate_limit_errors_propagate() {
    let api = ScriptedApi::with_pages(vec![Err(HttpError::Network("connection reset".into()))]);
    let err = runner(api.clone())
        .fetch_recent("rustlang", 5, 500)
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Network(_)));
}
