//! Error types for comparison sessions.
//!
//! Every session-level failure is returned as a [`CompareError`]. Each variant
//! maps to a stable reason tag (see [`CompareError::reason`]) so hosts can
//! branch on the failure without matching display strings.

use thiserror::Error;

/// Result type for comparison operations.
pub type CompareResult<T> = Result<T, CompareError>;

/// Errors that can occur while starting or running a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    /// The reference model is missing or is not a tiled (leaflet) dataset.
    #[error("no model loaded to compare to or model is not leaflet")]
    UnsupportedModelKind,

    /// The comparison model resolved to a loader other than the tile loader.
    #[error("file extension not supported: {}", extension.as_deref().unwrap_or("<none>"))]
    UnsupportedFileExtension { extension: Option<String> },

    /// The tile loader failed to load the comparison model.
    #[error("error loading second model for compare: {reason}")]
    ModelLoadFailure { reason: String },

    /// The model loaded but was rejected by post-load validation.
    #[error("loaded model was rejected by post-load validation")]
    ModelCallbackFailure,

    /// The document manifest for a location could not be resolved.
    #[error("failed to load document {location}: {reason}")]
    DocumentLoadFailure { location: String, reason: String },

    /// The manifest resolved but contains no loadable 2D geometry.
    #[error("can not load geometries from {location}")]
    NoGeometry { location: String },

    /// A load completed after the comparison it belonged to was ended or replaced.
    #[error("comparison was ended before the model finished loading")]
    Superseded,
}

impl CompareError {
    /// Stable, machine-readable reason tag for this error.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnsupportedModelKind => "no-suitable-first-model",
            Self::UnsupportedFileExtension { .. } => "no-suitable-second-model",
            Self::ModelLoadFailure { .. } => "error-loading-second-model",
            Self::ModelCallbackFailure => "error-in-model-cb",
            Self::DocumentLoadFailure { .. } => "error-loading-document",
            Self::NoGeometry { .. } => "no-geometry",
            Self::Superseded => "superseded",
        }
    }
}
