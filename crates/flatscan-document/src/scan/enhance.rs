// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement pipeline — grayscale conversion, contrast stretching, and
// adaptive binarization of rectified document images.

use image::{DynamicImage, GrayImage, Luma};
use tracing::{debug, info, instrument};

use super::filter::GaussianKernel;
use crate::image::processor::ImageProcessor;

/// Enhances rectified document images into a clean black-on-white scan.
///
/// Operations consume and return `Self` so they chain:
///
/// ```ignore
/// let scan = ScanEnhancer::from_dynamic(img)
///     .grayscale()
///     .normalize()
///     .binarize(&GaussianKernel::new(21), 10);
/// ```
pub struct ScanEnhancer {
    /// The working image (kept as `DynamicImage` for flexibility).
    image: DynamicImage,
}

impl ScanEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Create an enhancer wrapping an existing `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Borrow the current working image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the enhancer and return the underlying image.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Tone -----------------------------------------------------------------

    pub fn grayscale(self) -> Self {
        Self {
            image: ImageProcessor::from_dynamic(self.image).grayscale().into_dynamic(),
        }
    }

    /// Stretch intensities linearly so the darkest pixel becomes 0 and the
    /// brightest 255. A constant image maps entirely to 0.
    #[instrument(skip(self))]
    pub fn normalize(self) -> Self {
        let mut gray = self.image.to_luma8();
        let (lo, hi) = gray
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));

        let span = hi.saturating_sub(lo);
        let scale = if span > 0 { 255.0 / span as f32 } else { 0.0 };
        debug!(lo, hi, scale, "Normalizing contrast");

        for p in gray.pixels_mut() {
            let stretched = (p.0[0].saturating_sub(lo)) as f32 * scale;
            p.0[0] = (stretched + 0.5).clamp(0.0, 255.0) as u8;
        }
        Self {
            image: DynamicImage::ImageLuma8(gray),
        }
    }

    // -- Binarization ---------------------------------------------------------

    /// Apply adaptive thresholding to produce a black-and-white image.
    ///
    /// For each pixel the threshold is the Gaussian-weighted local mean
    /// (weights from `kernel`) minus `offset`. Pixels strictly brighter than
    /// the threshold become white; all others become black.
    #[instrument(skip(self, kernel), fields(block = kernel.size()))]
    pub fn binarize(self, kernel: &GaussianKernel, offset: i32) -> Self {
        info!(offset, "Applying adaptive binarization");

        let gray = self.image.to_luma8();
        let local_mean = kernel.apply(&gray);

        let (width, height) = gray.dimensions();
        let output = GrayImage::from_fn(width, height, |x, y| {
            let value = gray.get_pixel(x, y).0[0] as i32;
            let threshold = local_mean.get_pixel(x, y).0[0] as i32 - offset;
            Luma([if value > threshold { 255u8 } else { 0u8 }])
        });

        debug!("Binarization complete");
        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }

    // -- Enhancement pipeline -------------------------------------------------

    /// Run the full scan enhancement pipeline:
    ///
    /// 1. Convert to grayscale
    /// 2. Min-max contrast normalization
    /// 3. Adaptive Gaussian binarization
    #[instrument(skip_all)]
    pub fn enhance_scan(self, kernel: &GaussianKernel, offset: i32) -> Self {
        info!("Running full scan enhancement pipeline");
        self.grayscale().normalize().binarize(kernel, offset)
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn luma(enhancer: &ScanEnhancer) -> GrayImage {
        enhancer.as_dynamic().to_luma8()
    }

    #[test]
    fn normalize_stretches_to_full_range() {
        let img = GrayImage::from_fn(10, 1, |x, _| Luma([100 + x as u8 * 10]));
        let out = luma(&ScanEnhancer::from_dynamic(DynamicImage::ImageLuma8(img)).normalize());
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(9, 0).0[0], 255);
    }

    #[test]
    fn normalize_constant_image_is_zero() {
        let img = GrayImage::from_pixel(8, 8, Luma([140u8]));
        let out = luma(&ScanEnhancer::from_dynamic(DynamicImage::ImageLuma8(img)).normalize());
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn binarize_output_is_two_level() {
        let img = GrayImage::from_fn(40, 40, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let out = luma(
            &ScanEnhancer::from_dynamic(DynamicImage::ImageLuma8(img))
                .binarize(&GaussianKernel::new(21), 10),
        );
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn flat_regions_become_white() {
        // value > mean - 10 holds everywhere on a flat field.
        let img = GrayImage::from_pixel(30, 30, Luma([0u8]));
        let out = luma(
            &ScanEnhancer::from_dynamic(DynamicImage::ImageLuma8(img))
                .binarize(&GaussianKernel::new(21), 10),
        );
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn dark_text_on_paper_stays_dark() {
        let mut img = RgbImage::from_pixel(60, 60, Rgb([220, 215, 205]));
        for x in 20..40 {
            for y in 28..32 {
                img.put_pixel(x, y, Rgb([30, 30, 30]));
            }
        }
        let out = luma(
            &ScanEnhancer::from_dynamic(DynamicImage::ImageRgb8(img))
                .enhance_scan(&GaussianKernel::new(21), 10),
        );
        assert_eq!(out.dimensions(), (60, 60));
        assert_eq!(out.get_pixel(30, 30).0[0], 0, "stroke should be black");
        assert_eq!(out.get_pixel(5, 5).0[0], 255, "paper should be white");
    }
}
