// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Automatic rectification pipeline — prepare, detect, order, rectify, enhance,
// score, with the pass-through fallback on any stage failure.

use std::panic::{AssertUnwindSafe, catch_unwind};

use flatscan_core::error::{FlatscanError, Result};
use flatscan_core::types::{ImageKind, ScanResult};
use image::RgbImage;
use tracing::{info, instrument, warn};

use super::corners::order_corners;
use super::detect::Detection;
use super::engine::{ScanEngine, shared_engine};
use super::prepare::{PreparedImage, prepare};
use super::rectify::rectify;
use super::score::area_confidence;

impl ScanEngine {
    /// Run the automatic pipeline on an encoded photograph.
    ///
    /// Returns the rectified, binarized JPEG with corners in original
    /// resolution when a document is found, and the untouched input bytes
    /// with confidence 0.2 otherwise.
    ///
    /// # Errors
    ///
    /// Only input and environment failures: `ImageDecode` and
    /// `RenderContext`. Detection, geometry, and encoding failures become the
    /// fallback result.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn scan(&self, data: &[u8], declared: Option<ImageKind>) -> Result<ScanResult> {
        self.scan_with(data, declared, |raster| self.detector().detect(raster))
    }

    /// [`scan`](Self::scan) with the outline search supplied by the caller.
    pub(crate) fn scan_with(
        &self,
        data: &[u8],
        declared: Option<ImageKind>,
        locate: impl FnOnce(&RgbImage) -> Option<Detection>,
    ) -> Result<ScanResult> {
        let prepared = prepare(data, declared, self.config().max_dimension)?;

        match guard_stage(|| self.rectify_detected(&prepared, locate)) {
            Ok(Some(result)) => {
                info!(confidence = result.confidence, "Document rectified");
                Ok(result)
            }
            Ok(None) => {
                info!("No document outline; passing original through");
                Ok(ScanResult::fallback(data))
            }
            Err(err) if err.is_stage_failure() => {
                warn!(error = %err, "Pipeline stage failed; passing original through");
                Ok(ScanResult::fallback(data))
            }
            Err(err) => Err(err),
        }
    }

    fn rectify_detected(
        &self,
        prepared: &PreparedImage,
        locate: impl FnOnce(&RgbImage) -> Option<Detection>,
    ) -> Result<Option<ScanResult>> {
        let Some(found) = locate(&prepared.raster) else {
            return Ok(None);
        };

        let quad = order_corners(found.corners);
        let rectified = rectify(&prepared.raster, &quad)?;
        let encoded = self.enhance_and_encode(rectified)?;
        let confidence = area_confidence(found.area, &prepared.resolution);

        Ok(Some(ScanResult::detected(
            encoded,
            prepared.resolution.quad_to_original(&quad),
            confidence,
        )))
    }
}

/// Run a processing stage, turning a panic inside it into a `Detection`
/// error. Every buffer the stage allocated is dropped during unwinding.
pub(crate) fn guard_stage<T>(stage: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(stage)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(FlatscanError::Detection(format!("stage panicked: {}", reason)))
    })
}

/// Scan with the shared engine, off the async runtime's worker threads.
///
/// # Errors
///
/// `PipelineUnavailable` if the engine cannot be loaded, plus everything
/// [`ScanEngine::scan`] propagates.
pub async fn scan_document(data: Vec<u8>, declared: Option<ImageKind>) -> Result<ScanResult> {
    let engine = shared_engine().await?;
    tokio::task::spawn_blocking(move || engine.scan(&data, declared))
        .await
        .map_err(|err| FlatscanError::PipelineUnavailable(format!("scan task failed: {}", err)))?
}
