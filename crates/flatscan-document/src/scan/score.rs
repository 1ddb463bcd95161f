// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Confidence scoring for automatic detections.

use flatscan_core::types::{FALLBACK_CONFIDENCE, WorkingResolution};

/// Confidence of a detection: the fraction of the working canvas the
/// detected outline covers, clamped to `[0, 1]`.
///
/// A score exactly equal to the fallback confidence is nudged up by one ULP
/// so that a real detection never reads as a fallback.
pub fn area_confidence(area: f64, resolution: &WorkingResolution) -> f32 {
    let canvas = resolution.canvas_area();
    let ratio = if canvas > 0.0 { area / canvas } else { 0.0 };
    let score = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0) as f32
    } else {
        0.0
    };

    if score == FALLBACK_CONFIDENCE {
        f32::from_bits(score.to_bits() + 1)
    } else {
        score
    }
}
