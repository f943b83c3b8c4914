//! Configuration management for simple-http
//!
//! Handles loading, validating, and persisting client settings: timeouts,
//! connection pooling, the `User-Agent` header, and the timestamp formats used
//! by the payload codec.

use crate::codec::timestamp::TimestampFormats;
use crate::error::{HttpError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub mod defaults;

pub use defaults::*;

/// Timestamp settings for the payload codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Formats tried in order when decoding a timestamp field
    #[serde(default = "defaults::default_accepted_formats")]
    pub accepted_formats: Vec<String>,

    /// Format used when encoding a timestamp field
    #[serde(default = "defaults::default_output_format")]
    pub output_format: String,
}

impl CodecConfig {
    /// Build the validated format list
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidConfig`] if the list is empty or a pattern
    /// is not a valid strftime format.
    pub fn timestamp_formats(&self) -> Result<TimestampFormats> {
        TimestampFormats::new(self.accepted_formats.clone(), self.output_format.clone())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            accepted_formats: default_accepted_formats(),
            output_format: default_output_format(),
        }
    }
}

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Default per-request timeout in seconds
    #[serde(default = "defaults::default_timeout")]
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds
    #[serde(default = "defaults::default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle pooled connections are closed after this many seconds
    #[serde(default = "defaults::default_pool_idle_timeout")]
    pub pool_idle_timeout_secs: u64,

    /// `User-Agent` sent with every request
    #[serde(default = "defaults::default_user_agent")]
    pub user_agent: String,

    /// Payload codec settings
    #[serde(default)]
    pub codec: CodecConfig,
}

impl ClientConfig {
    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ConfigRead`] if the file cannot be read and
    /// [`HttpError::InvalidConfig`] if it is not valid TOML or fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| HttpError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidConfig`] on a parse or validation failure.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| HttpError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| HttpError::InvalidConfig(e.to_string()))
    }

    /// Save configuration to a specific path
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::ConfigWrite`] if the file or its parent directory
    /// cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HttpError::ConfigWrite {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let contents = self.to_toml_string()?;

        fs::write(path, contents).map_err(|e| HttpError::ConfigWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Default per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// TCP connect timeout
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Idle timeout for pooled connections
    #[must_use]
    pub const fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    /// Merge another config into this one, with other taking precedence
    pub fn merge(&mut self, other: &Self) {
        if other.timeout_secs != default_timeout() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.connect_timeout_secs != default_connect_timeout() {
            self.connect_timeout_secs = other.connect_timeout_secs;
        }
        if other.pool_idle_timeout_secs != default_pool_idle_timeout() {
            self.pool_idle_timeout_secs = other.pool_idle_timeout_secs;
        }
        if other.user_agent != default_user_agent() {
            self.user_agent.clone_from(&other.user_agent);
        }
        if other.codec.accepted_formats != default_accepted_formats() {
            self.codec
                .accepted_formats
                .clone_from(&other.codec.accepted_formats);
        }
        if other.codec.output_format != default_output_format() {
            self.codec
                .output_format
                .clone_from(&other.codec.output_format);
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(HttpError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(HttpError::InvalidConfig(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(HttpError::InvalidConfig(
                "user_agent cannot be empty".to_string(),
            ));
        }

        let _ = self.codec.timestamp_formats()?;

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            pool_idle_timeout_secs: default_pool_idle_timeout(),
            user_agent: default_user_agent(),
            codec: CodecConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.user_agent.starts_with("simple-http/"));
        assert_eq!(config.codec.accepted_formats.len(), 2);
    }

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HttpError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_format_list_rejected() {
        let mut config = ClientConfig::default();
        config.codec.accepted_formats.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("timeout_secs = 5\n").unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.codec, CodecConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");
        let config = ClientConfig {
            connect_timeout_secs: 3,
            codec: CodecConfig {
                accepted_formats: vec!["%Y-%m-%dT%H:%M:%S%:z".to_string()],
                output_format: "%Y-%m-%dT%H:%M:%S%:z".to_string(),
            },
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, HttpError::ConfigRead { .. }));
    }

    #[test]
    fn test_merge_prefers_non_default_values() {
        let mut base = ClientConfig {
            timeout_secs: 30,
            ..Default::default()
        };
        let other = ClientConfig {
            user_agent: "integration-suite/1.0".to_string(),
            ..Default::default()
        };
        base.merge(&other);
        assert_eq!(base.timeout_secs, 30);
        assert_eq!(base.user_agent, "integration-suite/1.0");
    }
}
