// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, uniform resize, grayscale, and encode. Operates
// on in-memory images using the `image` crate.

use image::{DynamicImage, ImageFormat};
use flatscan_core::error::FlatscanError;
use flatscan_core::types::ImageKind;
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// All operations consume `self` and return a new `ImageProcessor` wrapping
/// the transformed image, enabling method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&bytes, Some(ImageKind::Png))?
///     .resize_exact(1500, 2000)
///     .grayscale()
///     .to_jpeg_bytes(85)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, TIFF, BMP, WebP).
    ///
    /// The declared kind is tried first; if it is missing, unknown to the
    /// decoder, or wrong, the format is sniffed from the bytes the way a
    /// browser would.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8], declared: Option<ImageKind>) -> Result<Self, FlatscanError> {
        if let Some(format) = declared.and_then(decoder_format) {
            match image::load_from_memory_with_format(data, format) {
                Ok(img) => return Ok(Self::decoded(img)),
                Err(err) => debug!(?format, %err, "declared format failed; sniffing"),
            }
        }

        let img = image::load_from_memory(data).map_err(|err| {
            if declared == Some(ImageKind::Heic) {
                FlatscanError::ImageDecode(format!("HEIC images are not supported: {}", err))
            } else {
                FlatscanError::ImageDecode(format!("failed to decode image: {}", err))
            }
        })?;
        Ok(Self::decoded(img))
    }

    fn decoded(image: DynamicImage) -> Self {
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Self { image }
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Resize the image to exactly `width` x `height`. Callers are expected to
    /// have derived both sides from one uniform scale factor.
    #[instrument(skip(self))]
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        if (width, height) == (self.image.width(), self.image.height()) {
            return self;
        }
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            "Resizing image"
        );
        let resized =
            self.image
                .resize_exact(width, height, image::imageops::FilterType::Triangle);
        Self { image: resized }
    }

    /// Convert the image to grayscale (luma).
    pub fn grayscale(self) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, FlatscanError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| FlatscanError::Encode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// Single-channel images are written as grayscale JPEG; everything else is
    /// flattened to RGB first since JPEG has no alpha.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, FlatscanError> {
        let mut buffer = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        let written = match &self.image {
            DynamicImage::ImageLuma8(gray) => gray.write_with_encoder(encoder),
            other => other.to_rgb8().write_with_encoder(encoder),
        };
        written.map_err(|err| FlatscanError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Decoder format for a declared kind, if the image stack has one.
fn decoder_format(kind: ImageKind) -> Option<ImageFormat> {
    match kind {
        ImageKind::Jpeg => Some(ImageFormat::Jpeg),
        ImageKind::Png => Some(ImageFormat::Png),
        ImageKind::Tiff => Some(ImageFormat::Tiff),
        ImageKind::Bmp => Some(ImageFormat::Bmp),
        ImageKind::WebP => Some(ImageFormat::WebP),
        ImageKind::Heic => None,
    }
}
