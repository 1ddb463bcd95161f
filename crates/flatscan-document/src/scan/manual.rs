// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Manual correction — user-placed corner handles in normalized image space,
// applied through the same rectify and enhance stages as the automatic path.

use flatscan_core::error::Result;
use flatscan_core::types::{Corner, ImageKind, NormalizedPoint, Point, Quad, ScanResult, WorkingResolution};
use tracing::{debug, info, instrument};

use super::corners::order_corners;
use super::engine::ScanEngine;
use super::pipeline::guard_stage;
use super::prepare::{PreparedImage, prepare};
use super::rectify::rectify;

/// Distance of the default handles from each image edge, as a fraction of
/// the image size.
pub const DEFAULT_INSET: f64 = 0.05;

/// Four draggable handles, each clamped to `[0, 1] x [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerHandles {
    points: [NormalizedPoint; 4],
}

impl CornerHandles {
    /// Handles inset by [`DEFAULT_INSET`] from every edge.
    pub fn inset() -> Self {
        let (lo, hi) = (DEFAULT_INSET, 1.0 - DEFAULT_INSET);
        Self {
            points: [
                NormalizedPoint::clamped(lo, lo),
                NormalizedPoint::clamped(hi, lo),
                NormalizedPoint::clamped(hi, hi),
                NormalizedPoint::clamped(lo, hi),
            ],
        }
    }

    /// Handles placed on a quad given in pixels of a `width` x `height` image.
    pub fn from_quad(quad: &Quad, width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        let points = quad.points().map(|p| NormalizedPoint::clamped(p.x / w, p.y / h));
        Self { points }
    }

    pub fn get(&self, corner: Corner) -> NormalizedPoint {
        self.points[corner.index()]
    }

    /// Move one handle. Positions outside the image are clamped to its edge.
    pub fn drag(&mut self, corner: Corner, x: f64, y: f64) -> NormalizedPoint {
        let moved = NormalizedPoint::clamped(x, y);
        self.points[corner.index()] = moved;
        moved
    }

    /// Handle positions in pixels of a `width` x `height` raster, in handle
    /// order (not yet re-labelled).
    pub fn to_pixels(&self, width: u32, height: u32) -> [Point; 4] {
        self.points.map(|p| p.to_pixels(width, height))
    }
}

impl Default for CornerHandles {
    fn default() -> Self {
        Self::inset()
    }
}

/// What a manual session ends with.
#[derive(Debug, Clone, PartialEq)]
pub enum ManualOutcome {
    Applied(ScanResult),
    Cancelled,
}

/// One manual-correction interaction over a single photograph.
///
/// The photograph is decoded once when the session opens; every `apply`
/// works from that raster.
pub struct ManualSession {
    prepared: PreparedImage,
    handles: CornerHandles,
}

impl ManualSession {
    /// Decode `data` and place the handles on `initial` (original-resolution
    /// pixels) or, without it, at the default inset.
    ///
    /// # Errors
    ///
    /// `ImageDecode` or `RenderContext` if the photograph cannot be prepared.
    #[instrument(skip(engine, data, initial), fields(data_len = data.len(), has_initial = initial.is_some()))]
    pub fn open(
        engine: &ScanEngine,
        data: &[u8],
        declared: Option<ImageKind>,
        initial: Option<&Quad>,
    ) -> Result<Self> {
        let prepared = prepare(data, declared, engine.config().max_dimension)?;
        let res = prepared.resolution;
        let handles = match initial {
            Some(quad) => CornerHandles::from_quad(quad, res.original_width, res.original_height),
            None => CornerHandles::inset(),
        };
        debug!(?handles, "Manual session opened");
        Ok(Self { prepared, handles })
    }

    pub fn resolution(&self) -> &WorkingResolution {
        &self.prepared.resolution
    }

    pub fn handles(&self) -> &CornerHandles {
        &self.handles
    }

    pub fn drag(&mut self, corner: Corner, x: f64, y: f64) -> NormalizedPoint {
        self.handles.drag(corner, x, y)
    }

    /// Rectify and enhance the region under the current handles.
    ///
    /// # Errors
    ///
    /// `Geometry` if the handles enclose no area, `Encode` if the output
    /// cannot be written. The user's correction is never silently replaced by
    /// a fallback.
    #[instrument(skip_all)]
    pub fn render(&self, engine: &ScanEngine) -> Result<ScanResult> {
        let res = self.prepared.resolution;
        let handle_pixels = self.handles.to_pixels(res.canvas_width, res.canvas_height);

        let result = guard_stage(|| {
            let quad = order_corners(handle_pixels);
            let rectified = rectify(&self.prepared.raster, &quad)?;
            let encoded = engine.enhance_and_encode(rectified)?;
            Ok(ScanResult::manual(encoded, res.quad_to_original(&quad)))
        })?;

        info!(bytes = result.encoded_image.len(), "Manual correction applied");
        Ok(result)
    }

    /// [`render`](Self::render), reported as the session's apply event.
    pub fn apply(&self, engine: &ScanEngine) -> Result<ManualOutcome> {
        self.render(engine).map(ManualOutcome::Applied)
    }

    pub fn cancel(self) -> ManualOutcome {
        debug!("Manual session cancelled");
        ManualOutcome::Cancelled
    }
}
