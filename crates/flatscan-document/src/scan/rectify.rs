// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — warp an ordered quadrilateral onto an upright
// rectangle.

use flatscan_core::error::{FlatscanError, Result};
use flatscan_core::types::{Point, Quad};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into_with};
use tracing::{debug, instrument};

use super::geometry::has_collinear_triple;

/// Largest distance, in output pixels, between a mapped corner and its
/// rectangle corner before the solved transform is rejected.
const MAX_CORNER_RESIDUAL: f64 = 0.5;

fn as_f32(p: Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

/// Output size for a quadrilateral: the longer of each pair of opposite
/// edges, rounded, never below one pixel.
pub fn target_size(quad: &Quad) -> (u32, u32) {
    let top = quad.top_left.distance_to(quad.top_right);
    let bottom = quad.bottom_left.distance_to(quad.bottom_right);
    let left = quad.top_left.distance_to(quad.bottom_left);
    let right = quad.top_right.distance_to(quad.bottom_right);

    let side = |a: f64, b: f64| {
        let v = a.max(b).round();
        if v.is_finite() && v >= 1.0 { v as u32 } else { 1 }
    };
    (side(top, bottom), side(left, right))
}

/// Warp the region bounded by `quad` into a `target_size(quad)` rectangle.
///
/// Sampling is bilinear. Source coordinates falling outside the raster are
/// clamped to its edge so the border pixels repeat.
///
/// # Errors
///
/// `Geometry` when the quad does not define an invertible transform or the
/// raster is too small to sample.
#[instrument(skip(raster), fields(width = raster.width(), height = raster.height()))]
pub fn rectify(raster: &RgbImage, quad: &Quad) -> Result<RgbImage> {
    let (src_w, src_h) = raster.dimensions();
    if src_w < 2 || src_h < 2 {
        return Err(FlatscanError::Geometry(format!(
            "cannot sample a {}x{} raster",
            src_w, src_h
        )));
    }

    let (out_w, out_h) = target_size(quad);
    let dest = [
        Point::new(0.0, 0.0),
        Point::new(out_w as f64 - 1.0, 0.0),
        Point::new(out_w as f64 - 1.0, out_h as f64 - 1.0),
        Point::new(0.0, out_h as f64 - 1.0),
    ];
    let corners = quad.points();
    if has_collinear_triple(&corners) || has_collinear_triple(&dest) {
        return Err(FlatscanError::Geometry("quadrilateral is degenerate".into()));
    }

    let forward = Projection::from_control_points(corners.map(as_f32), dest.map(as_f32))
        .ok_or_else(|| FlatscanError::Geometry("perspective transform is singular".into()))?;
    let residual = corners
        .iter()
        .zip(&dest)
        .map(|(src, dst)| {
            let (x, y) = forward * as_f32(*src);
            Point::new(x as f64, y as f64).distance_to(*dst)
        })
        .fold(0.0, |worst: f64, r| if r.is_nan() || r > worst { r } else { worst });
    if residual.is_nan() || residual > MAX_CORNER_RESIDUAL {
        return Err(FlatscanError::Geometry(format!(
            "perspective transform misses a corner by {:.2}px",
            residual
        )));
    }
    let inverse = forward.invert();

    let max_x = src_w as f32 - 1.0 - 1e-3;
    let max_y = src_h as f32 - 1.0 - 1e-3;
    let clamp = |v: f32, max: f32| if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };

    let mut output = RgbImage::new(out_w, out_h);
    warp_into_with(
        raster,
        |x, y| {
            let (sx, sy) = inverse * (x, y);
            (clamp(sx, max_x), clamp(sy, max_y))
        },
        Interpolation::Bilinear,
        Rgb([255, 255, 255]),
        &mut output,
    );

    debug!(out_w, out_h, "Rectified");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(origin: f64, side: f64) -> Quad {
        Quad::from_ordered([
            Point::new(origin, origin),
            Point::new(origin + side, origin),
            Point::new(origin + side, origin + side),
            Point::new(origin, origin + side),
        ])
    }

    #[test]
    fn square_keeps_its_side_length() {
        assert_eq!(target_size(&square(10.0, 100.0)), (100, 100));
    }

    #[test]
    fn size_uses_longest_opposite_edges() {
        let quad = Quad::from_ordered([
            Point::new(50.0, 50.0),
            Point::new(950.0, 50.0),
            Point::new(950.0, 750.0),
            Point::new(50.0, 750.0),
        ]);
        assert_eq!(target_size(&quad), (900, 700));

        let trapezoid = Quad::from_ordered([
            Point::new(20.0, 0.0),
            Point::new(80.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(0.0, 50.0),
        ]);
        assert_eq!(target_size(&trapezoid).0, 100);
    }

    #[test]
    fn collapsed_quad_is_at_least_one_pixel() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(target_size(&Quad::from_ordered([p, p, p, p])), (1, 1));
    }

    #[test]
    fn axis_aligned_crop_copies_pixels() {
        let raster = RgbImage::from_fn(60, 40, |x, _| if x < 30 { Rgb([0, 0, 0]) } else { Rgb([200, 200, 200]) });
        let quad = Quad::from_ordered([
            Point::new(10.0, 5.0),
            Point::new(50.0, 5.0),
            Point::new(50.0, 35.0),
            Point::new(10.0, 35.0),
        ]);
        let out = rectify(&raster, &quad).expect("rectify");
        assert_eq!(out.dimensions(), (40, 30));
        assert!(out.get_pixel(2, 15).0[0] < 5);
        assert!(out.get_pixel(37, 15).0[0] > 195);
    }

    #[test]
    fn outside_samples_repeat_the_border() {
        let raster = RgbImage::from_pixel(40, 40, Rgb([50, 50, 50]));
        let quad = Quad::from_ordered([
            Point::new(-20.0, -10.0),
            Point::new(70.0, -5.0),
            Point::new(60.0, 55.0),
            Point::new(-15.0, 50.0),
        ]);
        let out = rectify(&raster, &quad).expect("rectify");
        assert!(
            out.pixels().all(|p| p.0.iter().all(|&c| (49..=50).contains(&c))),
            "no white fill expected when the quad leaves the raster"
        );
    }

    #[test]
    fn collinear_quad_is_a_geometry_error() {
        let raster = RgbImage::from_pixel(40, 40, Rgb([50, 50, 50]));
        let quad = Quad::from_ordered([
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(30.0, 30.0),
        ]);
        assert!(matches!(rectify(&raster, &quad), Err(FlatscanError::Geometry(_))));
    }

    #[test]
    fn skewed_quad_corners_land_on_output_corners() {
        // Four distinct colour blocks sit under the four corners of a skewed quad.
        let raster = RgbImage::from_fn(220, 270, |x, y| match (x < 110, y < 135) {
            (true, true) => Rgb([255, 0, 0]),
            (false, true) => Rgb([0, 255, 0]),
            (false, false) => Rgb([0, 0, 255]),
            (true, false) => Rgb([255, 255, 0]),
        });
        let quad = Quad::from_ordered([
            Point::new(12.0, 8.0),
            Point::new(205.0, 30.0),
            Point::new(190.0, 260.0),
            Point::new(5.0, 240.0),
        ]);
        let out = rectify(&raster, &quad).expect("rectify");
        let (w, h) = out.dimensions();
        let close = |x: u32, y: u32, want: [u8; 3]| {
            let got = out.get_pixel(x, y).0;
            assert!(
                got.iter().zip(want).all(|(&g, w)| g.abs_diff(w) <= 2),
                "pixel ({x}, {y}) is {got:?}, expected {want:?}"
            );
        };
        close(1, 1, [255, 0, 0]);
        close(w - 2, 1, [0, 255, 0]);
        close(w - 2, h - 2, [0, 0, 255]);
        close(1, h - 2, [255, 255, 0]);
    }

    #[test]
    fn single_pixel_raster_is_rejected() {
        let raster = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        assert!(matches!(
            rectify(&raster, &square(0.0, 1.0)),
            Err(FlatscanError::Geometry(_))
        ));
    }
}
