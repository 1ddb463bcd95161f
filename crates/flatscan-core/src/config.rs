// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlatscanError, Result};

/// Tunable constants of the rectification pipeline.
///
/// The defaults are the reference behaviour; changing them is supported for
/// experimentation but the confidence sentinels are not configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Longest side of the working-resolution canvas, in pixels.
    pub max_dimension: u32,
    /// Side of the square Gaussian kernel applied before edge detection.
    pub blur_kernel_size: u32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Neighbourhood side for adaptive Gaussian thresholding.
    pub threshold_block_size: u32,
    /// Constant subtracted from the local Gaussian mean.
    pub threshold_offset: i32,
    /// JPEG quality (1-100) of the encoded output.
    pub jpeg_quality: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
            blur_kernel_size: 5,
            canny_low: 75.0,
            canny_high: 200.0,
            approx_epsilon_ratio: 0.02,
            threshold_block_size: 21,
            threshold_offset: 10,
            jpeg_quality: 85,
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Check that every parameter is usable by the pipeline.
    ///
    /// Returns `PipelineUnavailable` describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(FlatscanError::PipelineUnavailable(msg));

        if self.max_dimension == 0 {
            return fail("max_dimension must be positive".into());
        }
        if self.blur_kernel_size < 3 || self.blur_kernel_size % 2 == 0 {
            return fail(format!(
                "blur_kernel_size must be odd and >= 3, got {}",
                self.blur_kernel_size
            ));
        }
        if self.threshold_block_size < 3 || self.threshold_block_size % 2 == 0 {
            return fail(format!(
                "threshold_block_size must be odd and >= 3, got {}",
                self.threshold_block_size
            ));
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return fail(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.canny_low, self.canny_high
            ));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio < 1.0) {
            return fail(format!(
                "approx_epsilon_ratio must be in (0, 1), got {}",
                self.approx_epsilon_ratio
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return fail(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            ));
        }
        Ok(())
    }
}
