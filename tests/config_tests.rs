use std::path::Path;
use std::time::Duration;
use taskrun::Config;
use taskrun::models::ConfigError;

#[test]
fn empty_document_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.runner.tasks, 3);
    assert_eq!(config.runner.concurrency, None);
    assert!(!config.runner.progress);
    assert_eq!(config.task.label, "Worker");
    assert_eq!(config.task.delay_for(0), Duration::ZERO);
    assert!(config.output.echo);
    assert!(config.output.events.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn full_document_parses() {
    let config = Config::from_toml_str(
        r#"
[runner]
tasks = 2
concurrency = 1
progress = true

[task]
label = "Greeter"
delays_ms = [2000, 1000]

[output]
echo = false
events = "out/events.jsonl"
"#,
    )
    .unwrap();

    assert_eq!(config.runner.tasks, 2);
    assert_eq!(config.runner.concurrency, Some(1));
    assert!(config.runner.progress);
    assert_eq!(config.task.label, "Greeter");
    assert_eq!(config.task.delay_for(1), Duration::from_secs(1));
    assert!(!config.output.echo);
    assert_eq!(
        config.output.events.as_deref(),
        Some(Path::new("out/events.jsonl"))
    );
}

#[test]
fn malformed_toml_is_parse_error() {
    let err = Config::from_toml_str("[runner\ntasks = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn blank_label_is_invalid() {
    let config = Config::from_toml_str("[task]\nlabel = \"  \"").unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileRead { .. }));
}

#[test]
fn from_file_reports_path_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "tasks = [").unwrap();

    match Config::from_file(&path).unwrap_err() {
        ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Unexpected error: {other}"),
    }
}
