use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Clone, Error)]
pub enum PaletteError {
    #[error("Fetch failed for {url}: {cause}")]
    Fetch { url: String, cause: String },

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Cannot open {}: {cause}", .path.display())]
    FileOpen { path: PathBuf, cause: String },

    #[error("Cannot write {}: {cause}", .path.display())]
    FileWrite { path: PathBuf, cause: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl PaletteError {
    pub fn fetch(url: impl Into<String>, cause: impl ToString) -> Self {
        PaletteError::Fetch {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    pub fn file_open(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        PaletteError::FileOpen {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    pub fn file_write(path: impl Into<PathBuf>, cause: impl ToString) -> Self {
        PaletteError::FileWrite {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    /// Errors scoped to a single URL. The worker logs these and moves on.
    pub fn is_per_url(&self) -> bool {
        matches!(self, PaletteError::Fetch { .. } | PaletteError::Decode(_))
    }
}

impl From<JoinError> for PaletteError {
    fn from(err: JoinError) -> Self {
        PaletteError::TaskFailed(err.to_string())
    }
}

impl From<image::ImageError> for PaletteError {
    fn from(err: image::ImageError) -> Self {
        PaletteError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for PaletteError {
    fn from(err: serde_json::Error) -> Self {
        PaletteError::Configuration(err.to_string())
    }
}
