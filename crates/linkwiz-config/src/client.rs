//! Client configuration for talking to the backend.
//!
//! Read from `{data_dir}/config.json`:
//!
//! ```json
//! {
//!   "baseUrl": "https://bpm.example.com",
//!   "token": "eyJhbGciOi...",
//!   "locale": "nl",
//!   "timeoutMs": 10000
//! }
//! ```
//!
//! Every field is optional; a missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Errors that can occur while loading a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
  /// Root URL of the backend, without the `/api` prefix.
  pub base_url: String,
  /// Bearer token sent with every request.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token: Option<String>,
  /// Locale used to render step labels.
  pub locale: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      token: None,
      locale: DEFAULT_LOCALE.to_string(),
      timeout_ms: None,
    }
  }
}

impl ClientConfig {
  /// Load configuration from a JSON file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load configuration, falling back to defaults when the file does not exist.
  pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Ok(Self::default());
    }
    Self::load(path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::load_or_default(&dir.path().join("config.json")).unwrap();
    assert_eq!(config, ClientConfig::default());
  }

  #[test]
  fn test_partial_file_keeps_defaults_for_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "baseUrl": "https://bpm.example.com", "locale": "nl" }"#).unwrap();

    let config = ClientConfig::load(&path).unwrap();
    assert_eq!(config.base_url, "https://bpm.example.com");
    assert_eq!(config.locale, "nl");
    assert_eq!(config.token, None);
  }

  #[test]
  fn test_invalid_json_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ClientConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.json"));
  }
}
