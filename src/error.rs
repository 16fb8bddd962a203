use std::{fmt, path::PathBuf};

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Model,
    Labels,
    Sample,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Model => "model",
            ResourceKind::Labels => "model labels",
            ResourceKind::Sample => "sample image",
        };
        f.write_str(label)
    }
}

/// Failures a scan can end in. Every variant is shown to the user and leaves
/// the scanner ready for another capture.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("Could not find {kind} at {}", path.display())]
    ResourceMissing { kind: ResourceKind, path: PathBuf },

    #[error("Could not load image data: {reason}")]
    DecodeFailure { reason: String },

    #[error("Classification failed: {reason}")]
    InferenceFailure { reason: String },

    #[error("Could not capture from {device}: {reason}")]
    CaptureFailure { device: String, reason: String },
}

impl ClassificationError {
    pub fn missing(kind: ResourceKind, path: impl Into<PathBuf>) -> Self {
        ClassificationError::ResourceMissing {
            kind,
            path: path.into(),
        }
    }

    pub fn decode(reason: impl fmt::Display) -> Self {
        ClassificationError::DecodeFailure {
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl fmt::Display) -> Self {
        ClassificationError::InferenceFailure {
            reason: reason.to_string(),
        }
    }

    pub fn capture(device: impl Into<String>, reason: impl fmt::Display) -> Self {
        ClassificationError::CaptureFailure {
            device: device.into(),
            reason: reason.to_string(),
        }
    }
}
