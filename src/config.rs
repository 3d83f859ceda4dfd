//! Configuration management with serde serialization/deserialization
//!
//! Every field has a default matching the tool's zero-argument behavior:
//! read `./input.txt`, append to `./output.txt`, ten workers, top three colors.

use crate::PaletteError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the color pipeline
///
/// # Examples
///
/// ```rust
/// use dominant_colors::Config;
///
/// // Use default configuration
/// let config = Config::default();
/// assert_eq!(config.concurrency, 10);
///
/// // Single worker, custom files
/// let config = Config {
///     concurrency: 1,
///     input_path: "urls.txt".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Number of concurrent image workers (default: 10)
    pub concurrency: usize,

    /// File containing one URL per line (default: ./input.txt)
    pub input_path: PathBuf,

    /// File results are appended to, created if absent (default: ./output.txt)
    pub output_path: PathBuf,

    /// Number of ranked colors per record (default: 3)
    pub top_k: usize,

    /// What to do with images that have fewer than `top_k` distinct colors
    pub shortfall_policy: ShortfallPolicy,

    /// Per-request timeout for image downloads, in seconds (default: none)
    ///
    /// When unset a fetch may wait indefinitely.
    pub request_timeout_secs: Option<u64>,

    /// Custom User-Agent header for downloads (default: reqwest default)
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: 10,
            input_path: PathBuf::from("./input.txt"),
            output_path: PathBuf::from("./output.txt"),
            top_k: 3,
            shortfall_policy: ShortfallPolicy::default(),
            request_timeout_secs: None,
            user_agent: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), PaletteError> {
        if self.concurrency == 0 {
            return Err(PaletteError::Configuration(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        if self.top_k == 0 {
            return Err(PaletteError::Configuration(
                "Number of ranked colors must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(PaletteError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Handling of images whose palette is smaller than the requested rank count
///
/// A zero-pixel image has no colors at all and is always skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Repeat the least frequent color found until the record is full
    #[default]
    PadLast,
    /// Emit no record for the image
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.input_path, PathBuf::from("./input.txt"));
        assert_eq!(config.output_path, PathBuf::from("./output.txt"));
        assert_eq!(config.shortfall_policy, ShortfallPolicy::PadLast);
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = Config {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PaletteError::Configuration(_))));

        let config = Config {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "concurrency": 4, "shortfall_policy": "skip" }"#).unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.shortfall_policy, ShortfallPolicy::Skip);
    }

    #[test]
    fn test_timeout_is_plain_seconds() {
        let config: Config = serde_json::from_str(r#"{ "request_timeout_secs": 30 }"#).unwrap();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["request_timeout_secs"], serde_json::json!(30));
    }
}
