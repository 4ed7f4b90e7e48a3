//! Job dispatch and flat-file sinks.
//!
//! Each configured job runs to completion before the next; a failing
//! job aborts the run with its context attached. The only swallowed
//! failure mode is the rate limit inside the posts fetch engine, which
//! yields a partial (possibly empty) result by design.

use anyhow::{Context, Result};
use chrono::Utc;
use gleaner_config::{GleanerConfig, JobDetails, PostJob, TranscriptJob, VideoJob};
use gleaner_social::twitter::{PostRecord, SearchRunner, TwitterApi};
use gleaner_video::youtube::{
    fetch_channel_videos, transcript_text, CaptionClient, VideoRecord, VideoWindow, YouTubeApi,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Per-run CLI overrides applied to posts jobs.
#[derive(Debug, Default)]
pub struct PostOverrides {
    pub keyword: Option<String>,
    pub days_back: Option<u32>,
    pub max_posts: Option<usize>,
}

pub async fn run_all(
    cfg: &GleanerConfig,
    only: Option<&str>,
    overrides: &PostOverrides,
    out: Option<&Path>,
) -> Result<()> {
    for job in &cfg.jobs {
        if let Some(id) = only {
            if job.id != id {
                continue;
            }
        }
        if !job.is_enabled() {
            tracing::info!(job = %job.id, "job.skipped");
            continue;
        }

        tracing::info!(job = %job.id, "job.start");
        match &job.details {
            JobDetails::Posts { config } => run_posts(config, overrides, out)
                .await
                .with_context(|| format!("posts job '{}'", job.id))?,
            JobDetails::Videos { config } => run_videos(config, out)
                .await
                .with_context(|| format!("videos job '{}'", job.id))?,
            JobDetails::Transcript { config } => run_transcript(config, out)
                .await
                .with_context(|| format!("transcript job '{}'", job.id))?,
        }
        tracing::info!(job = %job.id, "job.done");
    }
    Ok(())
}

async fn run_posts(job: &PostJob, overrides: &PostOverrides, out: Option<&Path>) -> Result<()> {
    let keyword = overrides.keyword.as_deref().unwrap_or(&job.keyword);
    let days_back = overrides.days_back.unwrap_or(job.days_back);
    let cap = overrides.max_posts.unwrap_or(job.max_posts);
    let out = out.unwrap_or(&job.out);

    let api = TwitterApi::new(job.bearer_token.clone())?;
    let records = SearchRunner::new(api).run(keyword, days_back, cap).await?;

    tracing::info!(
        collected = records.len(),
        out = %out.display(),
        "posts.collected"
    );
    write_posts(out, &records)
}

async fn run_videos(job: &VideoJob, out: Option<&Path>) -> Result<()> {
    let api = YouTubeApi::new(job.api_key.clone())?;
    let channel_id = api.resolve_channel(&job.channel).await?;
    let playlist_id = api.uploads_playlist(&channel_id).await?;

    let window = VideoWindow::trailing(Utc::now());
    let videos = fetch_channel_videos(&api, &playlist_id, window, job.max_videos).await?;

    let out = out.unwrap_or(&job.out);
    tracing::info!(
        collected = videos.len(),
        out = %out.display(),
        "videos.collected"
    );
    write_videos(out, &videos)
}

async fn run_transcript(job: &TranscriptJob, out: Option<&Path>) -> Result<()> {
    let client = CaptionClient::new()?;
    let segments = client.fetch_captions(&job.video_id, &job.lang).await?;
    let text = transcript_text(&segments);

    let out = out.unwrap_or(&job.out);
    tracing::info!(
        segments = segments.len(),
        chars = text.len(),
        out = %out.display(),
        "transcript.collected"
    );
    fs::write(out, text).with_context(|| format!("write {}", out.display()))
}

/// Pretty-printed JSON array; `serde_json` leaves non-ASCII intact.
fn write_posts(path: &Path, records: &[PostRecord]) -> Result<()> {
    let body = serde_json::to_string_pretty(records)?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

/// Pretty-printed id → record map.
fn write_videos(path: &Path, videos: &BTreeMap<String, VideoRecord>) -> Result<()> {
    let body = serde_json::to_string_pretty(videos)?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}
