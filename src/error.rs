use std::path::PathBuf;

use crate::models::FailureKind;

/// Errors raised while analysing a single image.
///
/// These never cross the per-image boundary; the pipeline turns them into a
/// failed [`crate::models::ImageOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{operation} failed: {reason}")]
    VisionOp {
        operation: &'static str,
        reason: String,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl AnalysisError {
    pub fn vision(operation: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::VisionOp {
            operation,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::Decode { .. } => FailureKind::Decode,
            AnalysisError::VisionOp { .. } => FailureKind::VisionOp,
            AnalysisError::Write { .. } => FailureKind::Write,
        }
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
