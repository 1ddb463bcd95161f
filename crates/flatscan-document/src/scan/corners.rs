// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner labelling for detected quadrilaterals.

use flatscan_core::types::{Point, Quad};

/// Assign four unordered points to the quadrilateral slots.
///
/// - top-left: smallest `x + y`
/// - bottom-right: largest `x + y`
/// - top-right: largest `x - y`
/// - bottom-left: smallest `x - y`
///
/// Comparisons are strict, so on a tie the point that appears first in
/// `points` keeps the slot. For a strongly rotated quad (close to 45°) two
/// slots may pick the same point; callers get back whatever the rule yields.
pub fn order_corners(points: [Point; 4]) -> Quad {
    let sum = |p: &Point| p.x + p.y;
    let diff = |p: &Point| p.x - p.y;

    let mut top_left = points[0];
    let mut bottom_right = points[0];
    let mut top_right = points[0];
    let mut bottom_left = points[0];

    for p in &points[1..] {
        if sum(p) < sum(&top_left) {
            top_left = *p;
        }
        if sum(p) > sum(&bottom_right) {
            bottom_right = *p;
        }
        if diff(p) > diff(&top_right) {
            top_right = *p;
        }
        if diff(p) < diff(&bottom_left) {
            bottom_left = *p;
        }
    }

    Quad {
        top_left,
        top_right,
        bottom_right,
        bottom_left,
    }
}
