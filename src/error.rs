use thiserror::Error;

use crate::types::LandmarkFeature;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("no face detected")]
    NoFaceDetected,

    #[error("degenerate landmarks: {feature} needs {required} points, got {found}")]
    DegenerateLandmarks {
        feature: LandmarkFeature,
        required: usize,
        found: usize,
    },

    #[error("zero-length direction vector")]
    ZeroLengthDirection,

    #[error("line does not intersect circle")]
    NoIntersection,

    #[error("tilt axis is degenerate (nose bridge has no vertical extent)")]
    DivideByTiltDegeneracy,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("font error: {0}")]
    Font(String),
}

impl OverlayError {
    /// Per-frame geometry misses that only skip the dependent stage.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OverlayError::NoFaceDetected
                | OverlayError::DegenerateLandmarks { .. }
                | OverlayError::ZeroLengthDirection
                | OverlayError::NoIntersection
                | OverlayError::DivideByTiltDegeneracy
        )
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
