// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document outline detection — edge map, external contours, and selection of
// the largest convex quadrilateral.

use flatscan_core::ScanConfig;
use flatscan_core::types::Point;
use image::imageops::grayscale;
use image::{GrayImage, RgbImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point as PixelPoint;
use tracing::{debug, instrument};

use super::edges::canny_presmoothed;
use super::filter::GaussianKernel;
use super::geometry::{approximate_closed_polygon, is_convex};

/// A document candidate in working-resolution space.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Corners in the order the contour visited them (not yet labelled).
    pub corners: [Point; 4],
    /// Enclosed area in square pixels.
    pub area: f64,
}

/// Finds the document outline in a working-resolution raster.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Gaussian blur (5x5) for noise reduction
/// 3. Canny edge detection with fixed thresholds (no further smoothing)
/// 4. External contour extraction (holes and nested outlines ignored)
/// 5. Douglas-Peucker simplification at a fraction of each perimeter,
///    keeping only convex four-vertex polygons
/// 6. Largest remaining polygon wins
#[derive(Debug, Clone)]
pub struct DocumentDetector {
    blur: GaussianKernel,
    canny_low: f32,
    canny_high: f32,
    epsilon_ratio: f64,
}

impl DocumentDetector {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            blur: GaussianKernel::new(config.blur_kernel_size),
            canny_low: config.canny_low,
            canny_high: config.canny_high,
            epsilon_ratio: config.approx_epsilon_ratio,
        }
    }

    /// Run the full detection pipeline. `None` means no document-like outline
    /// was found, which is an expected outcome.
    #[instrument(skip_all, fields(width = raster.width(), height = raster.height()))]
    pub fn detect(&self, raster: &RgbImage) -> Option<Detection> {
        let edges = self.edge_map(raster);
        let best = self
            .candidates(&edges)
            .into_iter()
            .fold(None::<Detection>, |best, candidate| match best {
                Some(current) if current.area >= candidate.area => Some(current),
                _ => Some(candidate),
            });

        match &best {
            Some(found) => debug!(area = found.area, corners = ?found.corners, "Document outline found"),
            None => debug!("No quadrilateral candidate"),
        }
        best
    }

    /// Steps 1-3: grayscale, blur, Canny.
    pub fn edge_map(&self, raster: &RgbImage) -> GrayImage {
        let gray = grayscale(raster);
        let blurred = self.blur.apply(&gray);
        canny_presmoothed(&blurred, self.canny_low, self.canny_high)
    }

    /// Steps 4-5: every convex four-vertex outline in the edge map.
    pub fn candidates(&self, edges: &GrayImage) -> Vec<Detection> {
        let contours: Vec<Contour<i32>> = find_contours(edges);
        let external = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter(|c| c.points.len() >= 4);

        let mut found = Vec::new();
        let mut examined = 0usize;
        for contour in external {
            examined += 1;
            let perimeter = arc_length(&contour.points, true);
            if perimeter <= 0.0 {
                continue;
            }
            let points: Vec<Point> = contour
                .points
                .iter()
                .map(|p| Point::new(p.x as f64, p.y as f64))
                .collect();

            let polygon = approximate_closed_polygon(&points, self.epsilon_ratio * perimeter);
            if polygon.len() != 4 || !is_convex(&polygon) {
                continue;
            }
            let corners = [polygon[0], polygon[1], polygon[2], polygon[3]];
            found.push(Detection {
                area: quad_area(&corners),
                corners,
            });
        }
        debug!(contours = contours.len(), examined, quads = found.len(), "Contours scanned");
        found
    }
}

fn quad_area(corners: &[Point; 4]) -> f64 {
    let vertices = corners.map(|p| PixelPoint::new(p.x, p.y));
    contour_area(&vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};

    fn detector() -> DocumentDetector {
        DocumentDetector::from_config(&ScanConfig::default())
    }

    fn page_on_desk(width: u32, height: u32, corners: &[(i32, i32)]) -> RgbImage {
        page_with_tones(width, height, corners, 30, 232)
    }

    fn page_with_tones(width: u32, height: u32, corners: &[(i32, i32)], desk: u8, paper: u8) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([desk; 3]));
        let poly: Vec<PixelPoint<i32>> = corners.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect();
        draw_polygon_mut(&mut img, &poly, Rgb([paper; 3]));
        img
    }

    fn assert_has_corner(found: &Detection, x: f64, y: f64) {
        let target = Point::new(x, y);
        assert!(
            found.corners.iter().any(|c| c.distance_to(target) < 6.0),
            "no corner near ({x}, {y}) in {:?}",
            found.corners
        );
    }

    #[test]
    fn uniform_image_has_no_candidate() {
        let img = RgbImage::from_pixel(200, 300, Rgb([200, 200, 200]));
        assert!(detector().detect(&img).is_none());
    }

    #[test]
    fn finds_tilted_page() {
        let corners = [(60, 40), (260, 55), (250, 205), (70, 190)];
        let img = page_on_desk(320, 240, &corners);

        let found = detector().detect(&img).expect("page should be detected");
        for &(x, y) in &corners {
            assert_has_corner(&found, x as f64, y as f64);
        }

        let expected = quad_area(&corners.map(|(x, y)| Point::new(x as f64, y as f64)));
        let rel = (found.area - expected).abs() / expected;
        assert!(rel < 0.08, "area {} vs expected {}", found.area, expected);
    }

    #[test]
    fn moderate_contrast_page_is_found() {
        // Gray paper on a lighter desk, one hundred levels apart.
        let corners = [(70, 50), (330, 65), (320, 250), (80, 235)];
        let img = page_with_tones(400, 300, &corners, 220, 120);

        let edges = detector().edge_map(&img);
        assert!(edges.pixels().filter(|p| p.0[0] == 255).count() > 500);

        let found = detector().detect(&img).expect("page should be detected");
        for &(x, y) in &corners {
            assert_has_corner(&found, x as f64, y as f64);
        }
    }

    #[test]
    fn largest_quad_wins() {
        let mut img = page_on_desk(400, 300, &[(150, 40), (370, 40), (370, 270), (150, 270)]);
        draw_polygon_mut(
            &mut img,
            &[
                PixelPoint::new(20, 20),
                PixelPoint::new(80, 20),
                PixelPoint::new(80, 70),
                PixelPoint::new(20, 70),
            ],
            Rgb([240, 240, 240]),
        );

        let found = detector().detect(&img).expect("page should be detected");
        assert_has_corner(&found, 150.0, 40.0);
        assert_has_corner(&found, 370.0, 270.0);
    }

    #[test]
    fn round_and_triangular_shapes_are_rejected() {
        let mut img = RgbImage::from_pixel(300, 200, Rgb([20, 20, 20]));
        draw_filled_circle_mut(&mut img, (80, 100), 60, Rgb([230, 230, 230]));
        draw_polygon_mut(
            &mut img,
            &[
                PixelPoint::new(170, 170),
                PixelPoint::new(280, 170),
                PixelPoint::new(225, 40),
            ],
            Rgb([230, 230, 230]),
        );
        assert!(detector().detect(&img).is_none());
    }

    #[test]
    fn edge_map_is_binary() {
        let img = page_on_desk(120, 100, &[(20, 20), (100, 20), (100, 80), (20, 80)]);
        let edges = detector().edge_map(&img);
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(edges.pixels().any(|p| p.0[0] == 255));
    }
}
