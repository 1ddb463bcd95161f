// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image preparation — decode the input and bring it down to the working
// resolution that detection runs at.

use flatscan_core::error::{FlatscanError, Result};
use flatscan_core::types::{ImageKind, WorkingResolution};
use image::RgbImage;
use tracing::{info, instrument};

use crate::image::processor::ImageProcessor;

/// A decoded photograph at working resolution.
pub struct PreparedImage {
    /// RGB raster of `resolution.canvas_width` x `resolution.canvas_height`.
    pub raster: RgbImage,
    pub resolution: WorkingResolution,
}

/// Decode `data` and downscale it so that its longest side is at most
/// `max_dimension`.
///
/// # Errors
///
/// - `ImageDecode` if the bytes cannot be decoded.
/// - `RenderContext` if the decoded image has no pixels to draw.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn prepare(data: &[u8], declared: Option<ImageKind>, max_dimension: u32) -> Result<PreparedImage> {
    let processor = ImageProcessor::from_bytes(data, declared)?;
    let (width, height) = (processor.width(), processor.height());

    if width == 0 || height == 0 {
        return Err(FlatscanError::RenderContext(format!(
            "decoded image is {}x{}",
            width, height
        )));
    }

    let resolution = WorkingResolution::for_dimensions(width, height, max_dimension);
    let raster = processor
        .resize_exact(resolution.canvas_width, resolution.canvas_height)
        .into_dynamic()
        .to_rgb8();

    info!(
        original_w = width,
        original_h = height,
        canvas_w = resolution.canvas_width,
        canvas_h = resolution.canvas_height,
        scale = resolution.scale_factor,
        "Prepared working canvas"
    );
    Ok(PreparedImage { raster, resolution })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb};

    fn png(width: u32, height: u32) -> Vec<u8> {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([90, 90, 90]),
        )))
        .to_png_bytes()
        .expect("encode fixture")
    }

    #[test]
    fn small_images_keep_their_size() {
        let prepared = prepare(&png(120, 80), Some(ImageKind::Png), 2000).expect("prepare");
        assert_eq!(prepared.raster.dimensions(), (120, 80));
        assert_eq!(prepared.resolution.scale_factor, 1.0);
    }

    #[test]
    fn large_images_are_scaled_uniformly() {
        let prepared = prepare(&png(300, 400), Some(ImageKind::Png), 200).expect("prepare");
        assert_eq!(prepared.raster.dimensions(), (150, 200));
        assert_eq!(prepared.resolution.scale_factor, 0.5);
        assert_eq!(prepared.resolution.original_width, 300);
        assert_eq!(prepared.resolution.original_height, 400);
    }

    #[test]
    fn corrupt_input_propagates_decode_error() {
        let mut bytes = png(10, 10);
        bytes.truncate(20);
        assert!(matches!(
            prepare(&bytes, Some(ImageKind::Png), 2000),
            Err(FlatscanError::ImageDecode(_))
        ));
    }
}
