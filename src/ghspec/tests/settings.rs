use std::path::PathBuf;
use std::time::Duration;

use ghspec::config::{load_settings_file, ConfigError};
use ghspec::{RepositoryScope, RunnerConfig, TemplateRenderer};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn load_settings_from_fixture() {
    let settings = load_settings_file(&fixture("ghspec.toml")).unwrap();

    assert_eq!(settings.author(), "Acme Inc");
    assert_eq!(
        settings.scope().unwrap(),
        RepositoryScope::Organization("acme".to_string())
    );
    assert_eq!(
        settings.github.api_base_url.as_deref(),
        Some("https://github.example.com/api/v3")
    );

    let wait = settings.fork.fork_wait();
    assert_eq!(wait.timeout(), Duration::from_secs(120));
    assert_eq!(wait.initial_backoff(), Duration::from_secs(2));
}

#[test]
fn command_line_scope_replaces_configured_scope() {
    let mut settings = load_settings_file(&fixture("ghspec.toml")).unwrap();

    settings.override_scope(None, Some("jane".to_string()));
    assert_eq!(
        settings.scope().unwrap(),
        RepositoryScope::User("jane".to_string())
    );
}

#[test]
fn runner_config_takes_settings_values() {
    let settings = load_settings_file(&fixture("ghspec.toml")).unwrap();
    let config = RunnerConfig::from_settings(&settings, Some("token".to_string()));

    assert_eq!(config.token(), Some("token"));
    assert_eq!(config.author(), "Acme Inc");
    assert_eq!(config.api_base_url(), Some("https://github.example.com/api/v3"));
    assert!(config.scope().is_none());
    assert_eq!(config.fork_wait().timeout(), Duration::from_secs(120));
}

#[test]
fn configured_formats_render_pull_request() {
    let settings = load_settings_file(&fixture("ghspec.toml")).unwrap();
    let formats = settings.pull_request.unwrap();
    let renderer = TemplateRenderer::new();

    let params = renderer
        .render_pr_params(&formats, "mit", "acme/widget")
        .unwrap();
    assert_eq!(params.branch, "license/mit");
    assert_eq!(params.title, "Update LICENSE");
    assert_eq!(
        params.body,
        "Fix license for acme/widget to match specification."
    );

    assert!(renderer
        .render_pr_params(&formats, "Apache License 2.0", "acme/widget")
        .is_err());
}

#[test]
fn invalid_template_is_rejected() {
    let err = load_settings_file(&fixture("invalid.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { ref message, .. } if message.contains("pull-request.title")));
}

#[test]
fn missing_file_is_reported() {
    let err = load_settings_file(&fixture("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingFile { .. }));
}
