// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint projection and 2D contour helpers.
//!
//! Projects a possibly-non-planar element boundary onto its best-fit plane
//! by dropping the coordinate axis with the smallest span. A vertical wall
//! keeps a usable footprint this way instead of collapsing to a line under
//! a naive plan projection.

use nalgebra::{Point2, Point3};

/// Coordinate axis dropped by a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroppedAxis {
    X,
    Y,
    Z,
}

/// Project a 3D boundary onto its best-fit plane
///
/// The axis with the smallest coordinate span is dropped; the remaining
/// two become the 2D coordinates, in axis order, preserving the input
/// winding. Returns the contour and the dropped axis.
pub fn project_boundary(boundary: &[Point3<f64>]) -> (Vec<Point2<f64>>, DroppedAxis) {
    let mut min = [f64::MAX; 3];
    let mut max = [f64::MIN; 3];
    for p in boundary {
        for (i, c) in [p.x, p.y, p.z].into_iter().enumerate() {
            min[i] = min[i].min(c);
            max[i] = max[i].max(c);
        }
    }

    let spans = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
    let mut dropped = 2;
    for i in 0..2 {
        if spans[i] < spans[dropped] {
            dropped = i;
        }
    }

    let contour = boundary
        .iter()
        .map(|p| match dropped {
            0 => Point2::new(p.y, p.z),
            1 => Point2::new(p.x, p.z),
            _ => Point2::new(p.x, p.y),
        })
        .collect();

    let axis = match dropped {
        0 => DroppedAxis::X,
        1 => DroppedAxis::Y,
        _ => DroppedAxis::Z,
    };
    (contour, axis)
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();
    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }
    area * 0.5
}

/// Check if a contour is usable (≥3 vertices, non-negligible area)
pub fn is_valid_contour(contour: &[Point2<f64>], area_epsilon: f64) -> bool {
    contour.len() >= 3 && signed_area(contour).abs() > area_epsilon
}

/// Ensure counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();
    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    if contour.is_empty() {
        return None;
    }

    let mut min = contour[0];
    let mut max = contour[0];
    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slab_projects_to_plan() {
        // Horizontal slab: Z span is zero, so Z is dropped
        let boundary = vec![
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(4.0, 3.0, 3.0),
            Point3::new(0.0, 3.0, 3.0),
        ];
        let (contour, axis) = project_boundary(&boundary);

        assert_eq!(axis, DroppedAxis::Z);
        assert_relative_eq!(signed_area(&contour).abs(), 12.0);
    }

    #[test]
    fn test_wall_does_not_collapse() {
        // Vertical wall in the XZ plane: Y span is zero, so Y is dropped
        let boundary = vec![
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(5.0, 2.0, 0.0),
            Point3::new(5.0, 2.0, 3.0),
            Point3::new(0.0, 2.0, 3.0),
        ];
        let (contour, axis) = project_boundary(&boundary);

        assert_eq!(axis, DroppedAxis::Y);
        assert_relative_eq!(signed_area(&contour).abs(), 15.0);
    }

    #[test]
    fn test_winding_is_preserved() {
        let ccw = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let (contour, _) = project_boundary(&ccw);
        assert!(signed_area(&contour) > 0.0);

        let cw: Vec<_> = ccw.iter().rev().cloned().collect();
        let (contour, _) = project_boundary(&cw);
        assert!(signed_area(&contour) < 0.0);
    }

    #[test]
    fn test_degenerate_ring_has_zero_area() {
        // Collinear boundary projects to a zero-area contour
        let boundary = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let (contour, _) = project_boundary(&boundary);
        assert!(!is_valid_contour(&contour, 1e-9));
    }

    #[test]
    fn test_point_in_contour() {
        let contour = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(point_in_contour(&Point2::new(5.0, 5.0), &contour));
        assert!(!point_in_contour(&Point2::new(15.0, 5.0), &contour));
    }
}
