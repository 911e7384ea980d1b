//! Client configuration: optional JSON file plus environment overrides.

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::client::DEFAULT_DOWNLOAD_NAME;
use crate::core::NormalizationPolicy;
use crate::utils::{AppError, AppResult, ValidationError, DEFAULT_MAX_UPLOAD_BYTES};

pub const ENV_ENDPOINT: &str = "BG_REMOVER_ENDPOINT";
pub const ENV_MAX_UPLOAD_BYTES: &str = "BG_REMOVER_MAX_UPLOAD_BYTES";
pub const ENV_TIMEOUT_SECS: &str = "BG_REMOVER_TIMEOUT_SECS";
pub const ENV_MAX_DIMENSION: &str = "BG_REMOVER_MAX_DIMENSION";
pub const ENV_SIZE_THRESHOLD: &str = "BG_REMOVER_SIZE_THRESHOLD";

/// Settings for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Base URL of the removal service
    pub endpoint: String,
    /// Largest selection accepted for upload
    pub max_upload_bytes: u64,
    /// Timeout for the single upload attempt
    pub request_timeout_secs: u64,
    /// Name used when saving results the service did not name
    pub download_name: String,
    /// Pre-upload normalization settings
    pub policy: NormalizationPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: 120,
            download_name: DEFAULT_DOWNLOAD_NAME.to_string(),
            policy: NormalizationPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Loads config from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Cannot read {}: {e}", path.display())))?;
        let config = serde_json::from_str(&raw)
            .map_err(|e| AppError::config(format!("Invalid config {}: {e}", path.display())))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Applies overrides from `lookup` (normally the environment), then validates.
    pub fn with_overrides<F>(mut self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(v) = parse_var(&lookup, ENV_MAX_UPLOAD_BYTES)? {
            self.max_upload_bytes = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_TIMEOUT_SECS)? {
            self.request_timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_MAX_DIMENSION)? {
            self.policy.max_dimension_pixels = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_SIZE_THRESHOLD)? {
            self.policy.size_threshold_bytes = v;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.trim().is_empty() {
            return Err(ValidationError::settings("endpoint cannot be empty"));
        }
        if self.max_upload_bytes == 0 {
            return Err(ValidationError::settings("maxUploadBytes cannot be 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::settings("requestTimeoutSecs cannot be 0"));
        }
        if self.download_name.trim().is_empty() {
            return Err(ValidationError::settings("downloadName cannot be empty"));
        }
        self.policy.validate()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::utils::ImageFormat;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_service_limits() {
        let config = AppConfig::default();
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.policy.max_dimension_pixels, 2048);
        assert_eq!(config.download_name, "removed_bg.png");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let config = AppConfig::default()
            .with_overrides(lookup(&[
                (ENV_ENDPOINT, "https://bg.example.com"),
                (ENV_MAX_DIMENSION, "1024"),
                (ENV_SIZE_THRESHOLD, " 1000 "),
            ]))
            .unwrap();
        assert_eq!(config.endpoint, "https://bg.example.com");
        assert_eq!(config.policy.max_dimension_pixels, 1024);
        assert_eq!(config.policy.size_threshold_bytes, 1000);
    }

    #[test]
    fn unparsable_override_is_a_config_error() {
        let err = AppConfig::default()
            .with_overrides(lookup(&[(ENV_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn invalid_override_fails_validation() {
        let err = AppConfig::default()
            .with_overrides(lookup(&[(ENV_MAX_DIMENSION, "0")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn partial_json_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "endpoint": "http://10.0.0.2:8080", "policy": { "outputMimeType": "image/webp" } }"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.endpoint, "http://10.0.0.2:8080");
        assert_eq!(config.policy.output_format, ImageFormat::WebP);
        assert_eq!(config.policy.max_dimension_pixels, 2048);
        assert_eq!(config.request_timeout_secs, 120);
    }
}
