//! Loader for gleaner job configuration with YAML + environment overlays.
//!
//! A `gleaner.yaml` file declares a list of one-shot collection jobs
//! (`videos`, `posts`, `transcript`). Secrets are referenced as
//! `${VAR}` placeholders and expanded from the environment at load
//! time; a credential that is missing or still unresolved after
//! expansion fails validation up front instead of surfacing as an auth
//! error mid-run.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct GleanerConfig {
    pub version: Option<String>,
    pub jobs: Vec<JobSpec>,
}

/// Shared fields + the per-kind “details”
#[derive(Debug, Deserialize)]
pub struct JobSpec {
    pub id: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub details: JobDetails,
}

impl JobSpec {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// The tag is `kind`; the payload lives in `config`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
pub enum JobDetails {
    #[serde(rename = "videos")]
    Videos { config: VideoJob },

    #[serde(rename = "posts")]
    Posts { config: PostJob },

    #[serde(rename = "transcript")]
    Transcript { config: TranscriptJob },
}

/// Channel video metadata collection (YouTube Data API v3).
#[derive(Debug, Deserialize)]
pub struct VideoJob {
    pub api_key: String,
    /// Searchable channel username, resolved to a channel id at run time.
    pub channel: String,
    #[serde(default = "default_max_videos")]
    pub max_videos: usize,
    #[serde(default = "default_videos_out")]
    pub out: PathBuf,
}

/// Keyword post collection (Twitter/X search API v2).
#[derive(Debug, Deserialize)]
pub struct PostJob {
    pub bearer_token: String,
    pub keyword: String,
    /// Lookback in days; ≤ 7 uses recent search, otherwise full-archive.
    pub days_back: u32,
    pub max_posts: usize,
    #[serde(default = "default_posts_out")]
    pub out: PathBuf,
}

/// Legacy single-video caption dump.
#[derive(Debug, Deserialize)]
pub struct TranscriptJob {
    pub video_id: String,
    #[serde(default = "default_caption_lang")]
    pub lang: String,
    #[serde(default = "default_transcript_out")]
    pub out: PathBuf,
}

fn default_max_videos() -> usize {
    20
}
fn default_videos_out() -> PathBuf {
    PathBuf::from("videos.json")
}
fn default_posts_out() -> PathBuf {
    PathBuf::from("tweets.json")
}
fn default_transcript_out() -> PathBuf {
    PathBuf::from("transcript.txt")
}
fn default_caption_lang() -> String {
    "en".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Reject credentials that are empty or still hold an unexpanded
/// `${VAR}` placeholder. Jobs fail here, at startup, not mid-fetch.
fn validate(cfg: &GleanerConfig) -> Result<(), ConfigError> {
    fn check(job_id: &str, field: &str, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!(
                "job '{job_id}': {field} is empty"
            )));
        }
        if value.contains("${") {
            return Err(ConfigError::Message(format!(
                "job '{job_id}': {field} references an unset environment variable ({value})"
            )));
        }
        Ok(())
    }

    for job in &cfg.jobs {
        match &job.details {
            JobDetails::Videos { config } => {
                check(&job.id, "api_key", &config.api_key)?;
                check(&job.id, "channel", &config.channel)?;
            }
            JobDetails::Posts { config } => {
                check(&job.id, "bearer_token", &config.bearer_token)?;
                check(&job.id, "keyword", &config.keyword)?;
            }
            JobDetails::Transcript { config } => {
                check(&job.id, "video_id", &config.video_id)?;
            }
        }
    }
    Ok(())
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct GleanerConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for GleanerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GleanerConfigLoader {
    /// Start with sensible defaults: YAML file + `GLEANER_` env overrides.
    ///
    /// ```
    /// use gleaner_config::GleanerConfigLoader;
    ///
    /// let config = GleanerConfigLoader::new()
    ///     .with_yaml_str("version: '1'\njobs: []")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert!(config.jobs.is_empty());
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("GLEANER").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use gleaner_config::{GleanerConfigLoader, JobDetails};
    ///
    /// let cfg = GleanerConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "test"
    /// jobs:
    ///   - id: "aapl-posts"
    ///     kind: "posts"
    ///     config:
    ///       bearer_token: "example"
    ///       keyword: "$AAPL"
    ///       days_back: 5
    ///       max_posts: 250
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.jobs.len(), 1);
    /// assert!(matches!(cfg.jobs[0].details, JobDetails::Posts { .. }));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into
    /// strongly typed config.
    ///
    /// Merges YAML snippets with `GLEANER_`-prefixed environment
    /// variables, expands `${VAR}` placeholders, then validates that
    /// every job carries a usable credential.
    pub fn load(self) -> Result<GleanerConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first so placeholders can be
        // expanded recursively before the typed deserialize.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: GleanerConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        validate(&typed)?;
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                // BAR references BAZ; FOO references BAR, two hops.
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn empty_credential_fails_validation() {
        let err = GleanerConfigLoader::new()
            .with_yaml_str(
                r#"
jobs:
  - id: "posts"
    kind: "posts"
    config:
      bearer_token: ""
      keyword: "rustlang"
      days_back: 3
      max_posts: 50
"#,
            )
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("bearer_token is empty"));
    }

    #[test]
    fn unresolved_credential_fails_validation() {
        let err = GleanerConfigLoader::new()
            .with_yaml_str(
                r#"
jobs:
  - id: "videos"
    kind: "videos"
    config:
      api_key: "${GLEANER_TEST_NO_SUCH_KEY}"
      channel: "some-channel"
"#,
            )
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("unset environment variable"));
    }

    #[test]
    fn job_defaults_apply() {
        let cfg = GleanerConfigLoader::new()
            .with_yaml_str(
                r#"
jobs:
  - id: "videos"
    kind: "videos"
    config:
      api_key: "k"
      channel: "c"
"#,
            )
            .load()
            .unwrap();
        match &cfg.jobs[0].details {
            JobDetails::Videos { config } => {
                assert_eq!(config.max_videos, 20);
                assert_eq!(config.out, PathBuf::from("videos.json"));
            }
            _ => panic!("expected videos job"),
        }
        assert!(cfg.jobs[0].is_enabled());
    }
}
