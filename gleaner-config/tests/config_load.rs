use gleaner_config::{GleanerConfigLoader, JobDetails};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
jobs:
  - id: aapl-posts
    kind: posts
    enabled: true
    config:
      bearer_token: "${GLEANER_TEST_BEARER}"
      keyword: "$AAPL"
      days_back: 5
      max_posts: 250
  - id: channel-videos
    kind: videos
    enabled: true
    config:
      api_key: "${GLEANER_TEST_API_KEY}"
      channel: "veritasium"
      max_videos: 20
  - id: caption-dump
    kind: transcript
    config:
      video_id: "dQw4w9WgXcQ"
  "#;
    let p = write_yaml(&tmp, "gleaner.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("GLEANER_TEST_BEARER", Some("bearer-from-env")),
            ("GLEANER_TEST_API_KEY", Some("key-from-env")),
        ],
        || {
            let config = GleanerConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load job config");

            assert_eq!(config.jobs.len(), 3);

            match &config.jobs[0].details {
                JobDetails::Posts { config } => {
                    assert_eq!(config.bearer_token, "bearer-from-env");
                    assert_eq!(config.keyword, "$AAPL");
                    assert_eq!(config.days_back, 5);
                }
                other => panic!("expected posts job, got {other:?}"),
            }

            match &config.jobs[1].details {
                JobDetails::Videos { config } => {
                    assert_eq!(config.api_key, "key-from-env");
                    assert_eq!(config.channel, "veritasium");
                }
                other => panic!("expected videos job, got {other:?}"),
            }
        },
    );
}

#[test]
#[serial]
fn test_missing_credential_rejected_at_startup() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "gleaner.yaml",
        r#"
jobs:
  - id: posts
    kind: posts
    config:
      bearer_token: "${GLEANER_TEST_BEARER_UNSET}"
      keyword: "rustlang"
      days_back: 3
      max_posts: 50
"#,
    );

    temp_env::with_var_unset("GLEANER_TEST_BEARER_UNSET", || {
        let err = GleanerConfigLoader::new().with_file(&p).load().unwrap_err();
        assert!(err.to_string().contains("unset environment variable"));
    });
}
