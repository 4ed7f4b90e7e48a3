//! Minimal HTTP client with safe logging and flexible auth.
//!
//! - Request options: `Auth`, query params, timeout
//! - Redacts sensitive query params and never logs secret values
//! - Surfaces HTTP 429 as a dedicated [`HttpError::RateLimited`] so
//!   callers can stop paginating and keep partial results
//!
//! ```no_run
//! # async fn demo() -> Result<(), gleaner_http::HttpError> {
//! let client = gleaner_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", gleaner_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! There is deliberately no retry/backoff machinery here: gleaner jobs
//! are one-shot, and the only transient condition they react to is the
//! rate limit, by stopping.
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs
//! only ever include the auth kind (bearer/query/none), not the secret.

use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("rate limited: {message}, reset={reset:?}")]
    RateLimited {
        message: String,
        /// Epoch seconds from `x-rate-limit-reset`, when the server sent it.
        reset: Option<u64>,
    },
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, HttpError::RateLimited { .. })
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use gleaner_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Auth via query param (e.g. the YouTube Data API `key`)
    Query { name: &'a str, value: Cow<'a, str> },
    None,
}

/// Per-request tuning knobs for the HTTP client.
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("q", "term".into())]
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use gleaner_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// GET JSON with per-request options (query/auth/timeout).
    pub async fn get_json<T>(&self, path: &str, mut opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut rb = self.inner.get(url.clone());

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        rb = rb.timeout(timeout);

        let auth_kind = match &opts.auth {
            Some(Auth::Bearer(_)) => "bearer",
            Some(Auth::Query { .. }) => "query",
            Some(Auth::None) | None => "none",
        };
        match opts.auth.take() {
            Some(Auth::Bearer(tok)) => {
                let tok = sanitize_token(tok)?;
                rb = rb.bearer_auth(tok);
            }
            Some(Auth::Query { name, value }) => {
                let mut q = opts.query.take().unwrap_or_default();
                q.push((name, value));
                opts.query = Some(q);
            }
            Some(Auth::None) | None => {}
        }

        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        tracing::debug!(
            host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            query = ?redact_query_pairs(opts.query.as_deref().unwrap_or_default()),
            timeout_ms = timeout.as_millis() as u64,
            auth_kind,
            "http.request.start"
        );

        let t0 = std::time::Instant::now();
        let resp = rb
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let request_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        let rate_remaining = headers
            .get("x-rate-limit-remaining")
            .and_then(|v| v.to_str().ok());
        let rate_reset: Option<u64> = headers
            .get("x-rate-limit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());

        tracing::debug!(
            %status,
            duration_ms = dur_ms,
            body_len = bytes.len(),
            x_request_id = %request_id,
            rate_limit.remaining = ?rate_remaining,
            rate_limit.reset = ?rate_reset,
            "http.response"
        );

        let snippet = snip_body(&bytes);

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    serde_err = %e,
                    body_snippet = %snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(
                %status,
                message = %message,
                rate_limit.reset = ?rate_reset,
                "http.rate_limited"
            );
            return Err(HttpError::RateLimited {
                message,
                reset: rate_reset,
            });
        }

        tracing::warn!(
            %status,
            message = %message,
            x_request_id = %request_id,
            body_snippet = %snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

/// Redact sensitive query params for logging.
fn redact_query_pairs(pairs: &[(&str, Cow<'_, str>)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| {
            let value = if is_secret_param(k) {
                "<redacted>".to_string()
            } else {
                v.as_ref().to_string()
            };
            ((*k).to_string(), value)
        })
        .collect()
}

/// Extract a human-readable message from an error body.
///
/// Understands the Twitter `{"errors":[...]}` envelope and the generic
/// `{"message"|"detail"|"error": "..."}` shapes; falls back to a body
/// snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrList {
        errors: Vec<ErrItem>,
    }
    #[derive(Deserialize)]
    struct ErrItem {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }
    #[derive(Deserialize)]
    struct Flat {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(list) = serde_json::from_slice::<ErrList>(body) {
        if let Some(first) = list.errors.into_iter().next() {
            for candidate in [first.message, first.detail, first.title] {
                if !candidate.is_empty() {
                    return candidate;
                }
            }
        }
    }
    if let Ok(flat) = serde_json::from_slice::<Flat>(body) {
        for candidate in [flat.message, flat.detail, flat.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}

fn sanitize_token(raw: &str) -> Result<String, HttpError> {
    // Trim outer spaces/quotes, then drop all ASCII whitespace.
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("token contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build("token contains control characters".into()));
    }

    // Validate the header value upfront for clear errors.
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
