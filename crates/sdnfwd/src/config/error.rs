//! Configuration error types.

use sdnfwd_types::ParseError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading or validating configuration documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field failed validation.
    #[error("Invalid {app} config for {field}: {message}")]
    InvalidField {
        app: String,
        field: String,
        message: String,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_field(
        app: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            app: app.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
