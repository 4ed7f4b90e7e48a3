use anyhow::Result;
use clap::Parser;
use gleaner_common::observability::{init_logging, LogConfig};
use gleaner_config::{GleanerConfig, GleanerConfigLoader};
use jobs::PostOverrides;
use std::path::PathBuf;

mod jobs;

/// One-shot social/video data collection jobs.
#[derive(Debug, Parser)]
#[command(name = "gleaner", version, about)]
struct Cli {
    /// Path to the job configuration file.
    #[arg(long, default_value = "gleaner.yaml")]
    config: PathBuf,

    /// Run only the job with this id.
    #[arg(long)]
    job: Option<String>,

    /// Override the keyword of posts jobs for this run.
    #[arg(long)]
    keyword: Option<String>,

    /// Override the lookback (days) of posts jobs for this run.
    #[arg(long)]
    days: Option<u32>,

    /// Override the result cap of posts jobs for this run.
    #[arg(long)]
    max_posts: Option<usize>,

    /// Override the output path; intended for use with --job.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config first: a bad credential should fail before we touch
    // the network or the log directory.
    let cfg: GleanerConfig = GleanerConfigLoader::new().with_file(&cli.config).load()?;

    init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    let overrides = PostOverrides {
        keyword: cli.keyword,
        days_back: cli.days,
        max_posts: cli.max_posts,
    };

    jobs::run_all(&cfg, cli.job.as_deref(), &overrides, cli.out.as_deref()).await
}
