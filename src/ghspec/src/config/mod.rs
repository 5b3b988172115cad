//! Settings file loading.
//!
//! Settings live in a TOML file, `ghspec.toml` in the working directory by
//! default. The path can be changed with `GHSPEC_CONFIG` or passed explicitly.
//! A missing default file is not an error.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{ForkSettings, GitHubSettings, Settings};

use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ghspec.toml";

/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "GHSPEC_CONFIG";

/// Resolves the settings file path.
///
/// Returns the path and whether it was chosen explicitly, by argument or
/// environment variable.
#[must_use]
pub fn config_path(explicit: Option<&Path>) -> (PathBuf, bool) {
    if let Some(path) = explicit {
        return (path.to_path_buf(), true);
    }
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => (PathBuf::from(path), true),
        _ => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    }
}

/// Loads settings from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is invalid.
pub fn load_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    debug!(path = %path.display(), "Loading settings");

    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    Settings::parse(&content, &path.display().to_string())
}

/// Loads settings from the resolved path.
///
/// Falls back to default settings when no path was chosen explicitly and
/// `ghspec.toml` does not exist.
///
/// # Arguments
///
/// * `explicit` - Path given on the command line
///
/// # Errors
///
/// Returns an error if the settings file cannot be read or is invalid, or if an
/// explicitly chosen file does not exist.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let (path, required) = config_path(explicit);
    if !required && !path.exists() {
        debug!("No settings file, using defaults");
        return Ok(Settings::default());
    }
    load_settings_file(&path)
}
