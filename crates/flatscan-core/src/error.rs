// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Flatscan.

use thiserror::Error;

/// Top-level error type for all Flatscan operations.
///
/// Only the first three variants (plus storage and I/O) ever reach a caller of
/// the automatic pipeline; stage failures are converted into the fallback
/// result at the pipeline boundary.
#[derive(Debug, Error)]
pub enum FlatscanError {
    // -- Input / environment errors (always propagated) --
    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("no rendering surface available: {0}")]
    RenderContext(String),

    #[error("processing engine unavailable: {0}")]
    PipelineUnavailable(String),

    // -- Stage errors (caught by the automatic pipeline) --
    #[error("document detection failed: {0}")]
    Detection(String),

    #[error("degenerate document geometry: {0}")]
    Geometry(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Storage / persistence --
    #[error("scan storage error: {0}")]
    Storage(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FlatscanError {
    /// Whether the automatic pipeline absorbs this error into its fallback
    /// result instead of returning it.
    pub fn is_stage_failure(&self) -> bool {
        matches!(
            self,
            Self::Detection(_) | Self::Geometry(_) | Self::Encode(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FlatscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_failures_are_classified() {
        assert!(FlatscanError::Detection("x".into()).is_stage_failure());
        assert!(FlatscanError::Geometry("x".into()).is_stage_failure());
        assert!(FlatscanError::Encode("x".into()).is_stage_failure());
        assert!(!FlatscanError::ImageDecode("x".into()).is_stage_failure());
        assert!(!FlatscanError::RenderContext("x".into()).is_stage_failure());
        assert!(!FlatscanError::PipelineUnavailable("x".into()).is_stage_failure());
    }

    #[test]
    fn display_includes_detail() {
        let err = FlatscanError::ImageDecode("truncated JPEG".into());
        assert_eq!(err.to_string(), "image could not be decoded: truncated JPEG");
    }
}
