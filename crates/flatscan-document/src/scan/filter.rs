// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gaussian kernels for the pre-edge-detection blur and the adaptive
// threshold's local mean, applied through imageproc's separable filter.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_colors;

/// Fixed binomial weights used for small kernels when no sigma is given.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// A normalized 1-D Gaussian kernel applied along both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// Build a kernel of odd `size` with sigma derived from the size:
    /// `0.3 * ((size - 1) / 2 - 1) + 0.8`. Sizes up to 7 use the binomial
    /// tables.
    pub fn new(size: u32) -> Self {
        let size = size.max(1) | 1;
        if size <= 7 {
            return Self {
                weights: SMALL_KERNELS[(size / 2) as usize].to_vec(),
            };
        }

        let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
        let center = (size / 2) as f64;
        let raw: Vec<f64> = (0..size)
            .map(|i| {
                let d = i as f64 - center;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f64 = raw.iter().sum();
        Self {
            weights: raw.into_iter().map(|w| (w / sum) as f32).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Convolve `image` horizontally then vertically. Samples outside the
    /// image repeat the nearest edge pixel.
    ///
    /// Both passes run in `f32` and the result is rounded once, so a flat
    /// region keeps its exact value.
    pub fn apply(&self, image: &GrayImage) -> GrayImage {
        if image.width() == 0 || image.height() == 0 {
            return image.clone();
        }
        let widened: Image<Luma<f32>> = map_colors(image, |p| Luma([p.0[0] as f32]));
        let smoothed = separable_filter_equal(&widened, &self.weights);
        map_colors(&smoothed, |p| Luma([(p.0[0] + 0.5).clamp(0.0, 255.0) as u8]))
    }
}
