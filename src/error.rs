//! Errors raised while loading a form definition.
//!
//! Runtime failures (expressions, web services, host anomalies) are recovered
//! locally and logged; they never surface through these types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("duplicate field id '{0}'")]
    DuplicateFieldId(String),

    #[error("duplicate step key '{0}'")]
    DuplicateStepKey(String),

    #[error("field '{field}' references unknown step '{step}'")]
    UnknownStep { field: String, step: String },
}

pub type Result<T> = std::result::Result<T, FormError>;
