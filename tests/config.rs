use std::path::PathBuf;

use update_deploy::config::{
    ConfigError, DeployConfig, Overrides, ProjectFile, UploadMode, PROJECT_FILE_NAME,
};

fn resolve(
    overrides: Overrides,
    env_host: Option<&str>,
    project: ProjectFile,
) -> Result<DeployConfig, ConfigError> {
    DeployConfig::resolve(
        PathBuf::from("."),
        overrides,
        env_host.map(str::to_string),
        project,
    )
}

#[test]
fn test_parse_project_file() {
    let toml_str = r#"
host = "updates.example.com:8443"
mode = "per-file"
respect_gitignore = true
exclude = ["dist/", "*.min.js"]
"#;
    let project: ProjectFile = toml::from_str(toml_str).unwrap();
    assert_eq!(project.host.as_deref(), Some("updates.example.com:8443"));
    assert_eq!(project.mode, Some(UploadMode::PerFile));
    assert!(project.respect_gitignore);
    assert_eq!(project.exclude, vec!["dist/", "*.min.js"]);
}

#[test]
fn test_empty_project_file_defaults() {
    let project: ProjectFile = toml::from_str("").unwrap();
    assert_eq!(project, ProjectFile::default());
}

#[test]
fn test_unknown_key_rejected() {
    assert!(toml::from_str::<ProjectFile>("hots = \"typo\"").is_err());
}

#[test]
fn test_missing_host_is_an_error() {
    let err = resolve(Overrides::default(), None, ProjectFile::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingHost));
    assert!(err.to_string().contains("UPDATE_HOST"));
}

#[test]
fn test_empty_env_host_counts_as_unset() {
    let err = resolve(Overrides::default(), Some(""), ProjectFile::default()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingHost));
}

#[test]
fn test_env_host_used_with_batch_default() {
    let config = resolve(
        Overrides::default(),
        Some("updates.example.com"),
        ProjectFile::default(),
    )
    .unwrap();
    assert_eq!(config.host.to_string(), "updates.example.com");
    assert_eq!(config.mode, UploadMode::Batch);
    assert_eq!(config.patterns.len(), 11);
    assert!(!config.respect_gitignore);
}

#[test]
fn test_host_precedence() {
    let project = ProjectFile {
        host: Some("from-file".into()),
        ..ProjectFile::default()
    };

    let config = resolve(Overrides::default(), None, project.clone()).unwrap();
    assert_eq!(config.host.host, "from-file");

    let config = resolve(Overrides::default(), Some("from-env"), project.clone()).unwrap();
    assert_eq!(config.host.host, "from-env");

    let overrides = Overrides {
        host: Some("from-flag:9000".into()),
        ..Overrides::default()
    };
    let config = resolve(overrides, Some("from-env"), project).unwrap();
    assert_eq!(config.host.host, "from-flag");
    assert_eq!(config.host.port, Some(9000));
}

#[test]
fn test_invalid_host_reported() {
    let err = resolve(
        Overrides::default(),
        Some("https://updates.example.com"),
        ProjectFile::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidHost { .. }));
}

#[test]
fn test_mode_and_exclude_merge() {
    let project = ProjectFile {
        host: Some("h".into()),
        mode: Some(UploadMode::PerFile),
        respect_gitignore: true,
        exclude: vec!["dist/".into()],
    };
    let overrides = Overrides {
        exclude: vec!["*.map".into()],
        ..Overrides::default()
    };
    let config = resolve(overrides, None, project.clone()).unwrap();
    assert_eq!(config.mode, UploadMode::PerFile);
    assert!(config.respect_gitignore);
    assert_eq!(config.exclude, vec!["dist/", "*.map"]);

    let overrides = Overrides {
        mode: Some(UploadMode::Batch),
        ..Overrides::default()
    };
    let config = resolve(overrides, None, project).unwrap();
    assert_eq!(config.mode, UploadMode::Batch);
}

#[test]
fn test_load_project_file_from_root() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ProjectFile::load(dir.path()).unwrap(), ProjectFile::default());

    std::fs::write(dir.path().join(PROJECT_FILE_NAME), "mode = \"batch\"\n").unwrap();
    let project = ProjectFile::load(dir.path()).unwrap();
    assert_eq!(project.mode, Some(UploadMode::Batch));

    std::fs::write(dir.path().join(PROJECT_FILE_NAME), "mode = [").unwrap();
    assert!(matches!(
        ProjectFile::load(dir.path()),
        Err(ConfigError::ParseProjectFile { .. })
    ));
}

#[test]
fn test_bad_project_file_without_host_reports_missing_host() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(PROJECT_FILE_NAME), "mode = [").unwrap();

    let err = DeployConfig::load(dir.path().to_path_buf(), Overrides::default(), Some("  ".into()))
        .unwrap_err();

    assert!(matches!(err, ConfigError::MissingHostWithBadProjectFile(_)));
    let message = err.to_string();
    assert!(message.starts_with("no update host configured"), "{message}");
    assert!(message.contains(PROJECT_FILE_NAME), "{message}");
}

#[test]
fn test_bad_project_file_with_host_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(PROJECT_FILE_NAME), "mode = [").unwrap();

    let err = DeployConfig::load(
        dir.path().to_path_buf(),
        Overrides::default(),
        Some("updates.example.com".into()),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::ParseProjectFile { .. }));
}

#[test]
fn test_load_reads_host_from_project_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(PROJECT_FILE_NAME), "host = \"localhost:8443\"\n").unwrap();

    let config = DeployConfig::load(dir.path().to_path_buf(), Overrides::default(), None).unwrap();

    assert_eq!(config.host.to_string(), "localhost:8443");
    assert_eq!(config.root, dir.path());
}
