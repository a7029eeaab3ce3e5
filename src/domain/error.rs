//! Error types shared by every pipeline stage.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification handed to callers for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Storage,
    Probe,
    Encode,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("storage error ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("probe failed for {path}: {reason}")]
    Probe { path: String, reason: String },
    #[error("{step} failed: {output}")]
    Encode { step: &'static str, output: String },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::Storage { .. } => ErrorKind::Storage,
            PipelineError::Probe { .. } => ErrorKind::Probe,
            PipelineError::Encode { .. } => ErrorKind::Encode,
        }
    }

    pub(crate) fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Storage {
            context: context.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
