// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry helpers — closed-contour simplification, convexity, and the
// collinearity check guarding the projective warp. Lengths and areas come
// from `imageproc::geometry`.

use flatscan_core::types::Point;

// -- Polygons -----------------------------------------------------------------

/// Whether the closed polygon turns the same way at every vertex.
///
/// Collinear vertices (zero turn) are tolerated, but a polygon with no turn
/// at all is not convex.
pub fn is_convex(points: &[Point]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let (mut positive, mut negative) = (false, false);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross > 0.0 {
            positive = true;
        } else if cross < 0.0 {
            negative = true;
        }
        if positive && negative {
            return false;
        }
    }
    positive || negative
}

/// Douglas-Peucker simplification of a closed contour.
///
/// The contour is split at an approximate diameter (found by repeating the
/// farthest-point search from the previous result) so that the split points
/// are themselves extreme vertices, then each half is simplified as an open
/// chain. The returned polygon keeps the cyclic order of the input.
pub fn approximate_closed_polygon(contour: &[Point], epsilon: f64) -> Vec<Point> {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }

    let mut start = 0;
    let mut far = farthest_from(contour, start);
    for _ in 0..2 {
        start = far;
        far = farthest_from(contour, start);
    }
    if contour[start].distance_to(contour[far]) <= epsilon {
        return vec![contour[start]];
    }

    let span = (far + n - start) % n;
    let first: Vec<Point> = (0..=span).map(|i| contour[(start + i) % n]).collect();
    let second: Vec<Point> = (0..=n - span).map(|i| contour[(far + i) % n]).collect();

    let mut polygon = simplify_open(&first, epsilon);
    polygon.pop();
    let mut rest = simplify_open(&second, epsilon);
    rest.pop();
    polygon.append(&mut rest);
    polygon
}

fn farthest_from(points: &[Point], index: usize) -> usize {
    let origin = points[index];
    let mut best = (index, 0.0);
    for (i, p) in points.iter().enumerate() {
        let d = origin.distance_to(*p);
        if d > best.1 {
            best = (i, d);
        }
    }
    best.0
}

/// Open-chain Douglas-Peucker; both endpoints are always kept.
fn simplify_open(chain: &[Point], epsilon: f64) -> Vec<Point> {
    let last = chain.len() - 1;
    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((first, end)) = stack.pop() {
        if end <= first + 1 {
            continue;
        }
        let mut split = (first, 0.0);
        for (i, p) in chain.iter().enumerate().take(end).skip(first + 1) {
            let d = line_distance(*p, chain[first], chain[end]);
            if d > split.1 {
                split = (i, d);
            }
        }
        if split.1 > epsilon {
            keep[split.0] = true;
            stack.push((first, split.0));
            stack.push((split.0, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Distance from `p` to the line through `a` and `b` (or to `a` when the two
/// coincide).
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    if len < f64::EPSILON {
        return p.distance_to(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}

// -- Projective constraints ---------------------------------------------------

/// Whether any three of the four points lie on one line (coincident points
/// included). No projective transform can map such a set onto a rectangle.
pub fn has_collinear_triple(points: &[Point; 4]) -> bool {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    TRIPLES.iter().any(|&(i, j, k)| {
        let (a, b, c) = (points[i], points[j], points[k]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        let scale = a.distance_to(b) * a.distance_to(c);
        cross.abs() <= 1e-9 * scale.max(1.0)
    })
}
