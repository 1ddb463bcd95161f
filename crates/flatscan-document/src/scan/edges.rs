// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canny edge detection on an image the caller has already smoothed.
//
// `imageproc::edges::canny` applies its own sigma 1.4 blur first; stacked on
// the detector's 5x5 blur that flattens gradients enough that the fixed
// thresholds miss moderate-contrast pages. This runs the same Sobel, thinning
// and hysteresis steps without the extra blur.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

const EDGE: Luma<u8> = Luma([255]);

/// Binary edge map (0 or 255) of a pre-smoothed grayscale image.
///
/// Edge strength is the L2 norm of the Sobel gradient. Pixels stronger than
/// `high` seed edges; pixels stronger than `low` join an edge when
/// 8-connected to one. The outermost ring of pixels is never an edge.
pub fn canny_presmoothed(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return GrayImage::new(width, height);
    }

    let gx = horizontal_sobel(image);
    let gy = vertical_sobel(image);
    let magnitude: Image<Luma<f32>> = ImageBuffer::from_fn(width, height, |x, y| {
        let dx = gx.get_pixel(x, y).0[0] as f32;
        let dy = gy.get_pixel(x, y).0[0] as f32;
        Luma([dx.hypot(dy)])
    });

    let thinned = suppress_non_maxima(&magnitude, &gx, &gy);
    trace_hysteresis(&thinned, low, high)
}

/// Keep only pixels that are a local maximum across the edge, comparing
/// against the two neighbours along the quantized gradient direction.
///
/// A plateau two pixels wide keeps its first pixel only.
fn suppress_non_maxima(
    magnitude: &Image<Luma<f32>>,
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
) -> Image<Luma<f32>> {
    let (width, height) = magnitude.dimensions();
    let mut out = ImageBuffer::from_pixel(width, height, Luma([0f32]));

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let m = magnitude.get_pixel(x, y).0[0];
            if m == 0.0 {
                continue;
            }
            let dx = gx.get_pixel(x, y).0[0] as f32;
            let dy = gy.get_pixel(x, y).0[0] as f32;
            let mut angle = dy.atan2(dx).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }

            let (before, after) = if !(22.5..157.5).contains(&angle) {
                ((x - 1, y), (x + 1, y))
            } else if angle < 67.5 {
                ((x - 1, y - 1), (x + 1, y + 1))
            } else if angle < 112.5 {
                ((x, y - 1), (x, y + 1))
            } else {
                ((x + 1, y - 1), (x - 1, y + 1))
            };

            let before = magnitude.get_pixel(before.0, before.1).0[0];
            let after = magnitude.get_pixel(after.0, after.1).0[0];
            if m > before && m >= after {
                out.put_pixel(x, y, Luma([m]));
            }
        }
    }
    out
}

fn trace_hysteresis(strength: &Image<Luma<f32>>, low: f32, high: f32) -> GrayImage {
    let (width, height) = strength.dimensions();
    let mut out = GrayImage::new(width, height);
    let mut stack = Vec::new();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if strength.get_pixel(x, y).0[0] <= high || out.get_pixel(x, y).0[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, EDGE);
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for ny in cy - 1..=cy + 1 {
                    for nx in cx - 1..=cx + 1 {
                        if nx == 0 || ny == 0 || nx >= width - 1 || ny >= height - 1 {
                            continue;
                        }
                        if out.get_pixel(nx, ny).0[0] == 0 && strength.get_pixel(nx, ny).0[0] > low {
                            out.put_pixel(nx, ny, EDGE);
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }
    out
}
