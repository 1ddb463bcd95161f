// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Flatscan rectification pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Confidence reported when automatic detection finds no document.
pub const FALLBACK_CONFIDENCE: f32 = 0.2;

/// Confidence reported for every manually corrected scan.
pub const MANUAL_CONFIDENCE: f32 = 0.6;

/// Unique identifier for a stored scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(pub Uuid);

impl ScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an input photograph came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOrigin {
    /// Captured with the device camera.
    Camera,
    /// Chosen by the user from storage.
    File { path: String },
}

/// Raster formats accepted as pipeline input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Jpeg,
    Png,
    /// Declared by phone cameras; there is no decoder for it in the image
    /// stack, so it always fails with `ImageDecode`.
    Heic,
    Tiff,
    Bmp,
    WebP,
}

impl ImageKind {
    /// MIME type string for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Heic => "image/heic",
            Self::Tiff => "image/tiff",
            Self::Bmp => "image/bmp",
            Self::WebP => "image/webp",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "heic" | "heif" => Some(Self::Heic),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Parse a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/heic" | "image/heif" => Some(Self::Heic),
            "image/tiff" => Some(Self::Tiff),
            "image/bmp" | "image/x-bmp" => Some(Self::Bmp),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }
}

/// A pixel coordinate. Which resolution space it lives in is tracked by the
/// owner, never by the point itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A coordinate relative to the image bounds, each axis in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Build a normalized point, clamping both axes into `[0, 1]`.
    pub fn clamped(x: f64, y: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    /// Scale onto a raster of the given size.
    pub fn to_pixels(&self, width: u32, height: u32) -> Point {
        Point::new(self.x * width as f64, self.y * height as f64)
    }
}

/// The four corner slots of an ordered quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners in quadrilateral index order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    /// Index of this corner in `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn index(&self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }
}

/// An ordered document quadrilateral.
///
/// The slot order `[top_left, top_right, bottom_right, bottom_left]` is
/// fixed once built; nothing downstream re-permutes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quad {
    /// Build from points already in slot order.
    pub fn from_ordered(points: [Point; 4]) -> Self {
        Self {
            top_left: points[0],
            top_right: points[1],
            bottom_right: points[2],
            bottom_left: points[3],
        }
    }

    /// Points in slot order.
    pub fn points(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.points()[corner.index()]
    }

    /// Apply `f` to every corner, keeping slot order.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            top_left: f(self.top_left),
            top_right: f(self.top_right),
            bottom_right: f(self.bottom_right),
            bottom_left: f(self.bottom_left),
        }
    }
}

/// Size bookkeeping between the original photograph and the downscaled
/// canvas detection runs on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingResolution {
    pub original_width: u32,
    pub original_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// `min(1, max_dimension / max(original_width, original_height))`.
    pub scale_factor: f64,
}

impl WorkingResolution {
    /// Compute the working canvas for an original of the given size. One
    /// uniform factor is applied to both axes; images are never upscaled.
    pub fn for_dimensions(original_width: u32, original_height: u32, max_dimension: u32) -> Self {
        let longest = original_width.max(original_height).max(1) as f64;
        let scale_factor = (max_dimension as f64 / longest).min(1.0);
        let scaled = |side: u32| ((side as f64 * scale_factor).round() as u32).max(1);
        Self {
            original_width,
            original_height,
            canvas_width: scaled(original_width),
            canvas_height: scaled(original_height),
            scale_factor,
        }
    }

    /// Whether the canvas differs from the original.
    pub fn is_downscaled(&self) -> bool {
        self.scale_factor < 1.0
    }

    /// Working-space point to original-space point.
    pub fn to_original(&self, p: Point) -> Point {
        Point::new(p.x / self.scale_factor, p.y / self.scale_factor)
    }

    /// Original-space point to working-space point.
    pub fn to_working(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_factor, p.y * self.scale_factor)
    }

    pub fn quad_to_original(&self, quad: &Quad) -> Quad {
        quad.map(|p| self.to_original(p))
    }

    /// Working-canvas area in pixels.
    pub fn canvas_area(&self) -> f64 {
        self.canvas_width as f64 * self.canvas_height as f64
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// JPEG bytes of the rectified scan, or the untouched input on fallback.
    #[serde(skip)]
    pub encoded_image: Vec<u8>,
    /// Document corners in original-resolution space.
    pub corners: Option<Quad>,
    /// Heuristic confidence in `[0, 1]`.
    pub confidence: f32,
}

impl ScanResult {
    /// Pass-through result used whenever automatic detection cannot produce
    /// a rectified image.
    pub fn fallback(original: &[u8]) -> Self {
        Self {
            encoded_image: original.to_vec(),
            corners: None,
            confidence: FALLBACK_CONFIDENCE,
        }
    }

    /// Result of a successful automatic detection.
    pub fn detected(encoded_image: Vec<u8>, corners: Quad, confidence: f32) -> Self {
        Self {
            encoded_image,
            corners: Some(corners),
            confidence,
        }
    }

    /// Result of a user-adjusted rectification.
    pub fn manual(encoded_image: Vec<u8>, corners: Quad) -> Self {
        Self {
            encoded_image,
            corners: Some(corners),
            confidence: MANUAL_CONFIDENCE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.corners.is_none()
    }
}

/// Record kept by the persistence collaborator for a stored scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScan {
    pub id: ScanId,
    /// Name of the stored image file, relative to the store.
    pub file_name: String,
    /// SHA-256 of the stored bytes, lowercase hex.
    pub sha256: String,
    pub byte_len: u64,
    pub corners: Option<Quad>,
    pub confidence: f32,
    pub stored_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_resolution_halves_tall_photo() {
        let res = WorkingResolution::for_dimensions(3000, 4000, 2000);
        assert_eq!(res.canvas_width, 1500);
        assert_eq!(res.canvas_height, 2000);
        assert_eq!(res.scale_factor, 0.5);
        assert!(res.is_downscaled());
    }

    #[test]
    fn working_resolution_never_upscales() {
        let res = WorkingResolution::for_dimensions(640, 480, 2000);
        assert_eq!(res.scale_factor, 1.0);
        assert_eq!((res.canvas_width, res.canvas_height), (640, 480));
        assert!(!res.is_downscaled());
    }

    #[test]
    fn quad_is_rescaled_into_original_space() {
        let res = WorkingResolution::for_dimensions(3000, 4000, 2000);
        let working = Quad::from_ordered([
            Point::new(100.0, 100.0),
            Point::new(1400.0, 100.0),
            Point::new(1400.0, 1900.0),
            Point::new(100.0, 1900.0),
        ]);
        let original = res.quad_to_original(&working);
        assert_eq!(original.top_left, Point::new(200.0, 200.0));
        assert_eq!(original.top_right, Point::new(2800.0, 200.0));
        assert_eq!(original.bottom_right, Point::new(2800.0, 3800.0));
        assert_eq!(original.bottom_left, Point::new(200.0, 3800.0));
    }

    #[test]
    fn round_trip_stays_within_a_pixel() {
        let res = WorkingResolution::for_dimensions(4032, 3024, 2000);
        for p in [Point::new(13.0, 977.0), Point::new(1999.5, 0.25)] {
            let back = res.to_working(res.to_original(p));
            assert!(back.distance_to(p) < 1.0);
        }
    }

    #[test]
    fn normalized_points_are_clamped() {
        let p = NormalizedPoint::clamped(-0.4, 1.7);
        assert_eq!(p, NormalizedPoint { x: 0.0, y: 1.0 });
        assert_eq!(NormalizedPoint::clamped(f64::NAN, 0.5).x, 0.0);
    }

    #[test]
    fn fallback_result_carries_sentinel() {
        let result = ScanResult::fallback(b"raw");
        assert!(result.is_fallback());
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(result.encoded_image, b"raw");
    }

    #[test]
    fn mime_and_extension_inference() {
        assert_eq!(ImageKind::from_mime_type("image/JPEG"), Some(ImageKind::Jpeg));
        assert_eq!(
            ImageKind::from_mime_type("image/png; q=1"),
            Some(ImageKind::Png)
        );
        assert_eq!(ImageKind::from_extension("HEIC"), Some(ImageKind::Heic));
        assert_eq!(ImageKind::from_extension("pdf"), None);
        assert_eq!(ImageKind::Heic.mime_type(), "image/heic");
    }

    #[test]
    fn corner_indices_follow_slot_order() {
        let quad = Quad::from_ordered([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        for (i, corner) in Corner::ALL.iter().enumerate() {
            assert_eq!(corner.index(), i);
            assert_eq!(quad.corner(*corner), quad.points()[i]);
        }
    }
}
