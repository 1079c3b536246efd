//! CLI error type: configuration, validation, and gateway failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config loading failed: {0}")]
    Config(Box<figment::Error>),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(transparent)]
    Gateway(#[from] rosgate_core::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
