use std::path::PathBuf;

use tensorlab_core::TensorError;
use thiserror::Error;

/// Errors raised while configuring or running exercises.
#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error(transparent)]
    Tensor(#[from] TensorError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExerciseResult<T> = Result<T, ExerciseError>;
