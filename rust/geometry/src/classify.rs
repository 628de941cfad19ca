// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis/plane classification.
//!
//! Derives the supporting global axis and outward sign of a shell element
//! from its boundary normal. The signature discriminates footprint groups
//! (a slab never merges with a wall) and resolves local load directions
//! onto a global axis.

use nalgebra::{Point3, Vector3};

/// Fraction of the normal magnitude a component must reach to count as
/// dominant
const DOMINANCE_THRESHOLD: f64 = 0.7;

/// Supporting global axis of a shell element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportAxis {
    /// Wall normal to global X
    X,
    /// Wall normal to global Y
    Y,
    /// Slab (normal dominated by global Z)
    Z,
    /// No dominant axis
    Oblique,
}

/// Classification of a shell element's plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSignature {
    /// Dominant global axis of the boundary normal
    pub axis: SupportAxis,
    /// Sign of the dominant normal component; +1 for oblique
    pub sign: i8,
    /// Coordinate of the element along its axis (plane position)
    pub position: f64,
}

impl AxisSignature {
    /// Classify a boundary by its Newell normal
    ///
    /// A degenerate boundary (zero normal) classifies as oblique at
    /// position 0; the caller skips such elements before grouping.
    pub fn from_boundary(boundary: &[Point3<f64>]) -> Self {
        let normal = newell_normal(boundary);
        let len = normal.norm();
        if len <= f64::EPSILON {
            return Self {
                axis: SupportAxis::Oblique,
                sign: 1,
                position: 0.0,
            };
        }

        let n = normal / len;
        let (axis, component) = if n.z.abs() >= DOMINANCE_THRESHOLD {
            (SupportAxis::Z, n.z)
        } else if n.x.abs() >= n.y.abs() && n.x.abs() >= DOMINANCE_THRESHOLD {
            (SupportAxis::X, n.x)
        } else if n.y.abs() >= DOMINANCE_THRESHOLD {
            (SupportAxis::Y, n.y)
        } else {
            (SupportAxis::Oblique, 1.0)
        };

        let position = match axis {
            SupportAxis::X => mean_coordinate(boundary, |p| p.x),
            SupportAxis::Y => mean_coordinate(boundary, |p| p.y),
            SupportAxis::Z | SupportAxis::Oblique => mean_coordinate(boundary, |p| p.z),
        };

        Self {
            axis,
            sign: if component < 0.0 { -1 } else { 1 },
            position,
        }
    }

    /// Unit vector along the signature's axis with its sign; `None` for
    /// oblique signatures
    pub fn axis_vector(&self) -> Option<Vector3<f64>> {
        let s = self.sign as f64;
        match self.axis {
            SupportAxis::X => Some(Vector3::new(s, 0.0, 0.0)),
            SupportAxis::Y => Some(Vector3::new(0.0, s, 0.0)),
            SupportAxis::Z => Some(Vector3::new(0.0, 0.0, s)),
            SupportAxis::Oblique => None,
        }
    }
}

/// Newell's method: robust polygon normal for non-planar boundaries
fn newell_normal(boundary: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    let n = boundary.len();
    if n < 3 {
        return normal;
    }

    for i in 0..n {
        let a = &boundary[i];
        let b = &boundary[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

fn mean_coordinate(boundary: &[Point3<f64>], f: impl Fn(&Point3<f64>) -> f64) -> f64 {
    if boundary.is_empty() {
        return 0.0;
    }
    boundary.iter().map(f).sum::<f64>() / boundary.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_horizontal_slab_is_z() {
        let boundary = vec![
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(4.0, 3.0, 3.0),
            Point3::new(0.0, 3.0, 3.0),
        ];
        let sig = AxisSignature::from_boundary(&boundary);

        assert_eq!(sig.axis, SupportAxis::Z);
        assert_eq!(sig.sign, 1);
        assert_relative_eq!(sig.position, 3.0);
    }

    #[test]
    fn test_reversed_slab_flips_sign() {
        let boundary = vec![
            Point3::new(0.0, 3.0, 3.0),
            Point3::new(4.0, 3.0, 3.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(0.0, 0.0, 3.0),
        ];
        let sig = AxisSignature::from_boundary(&boundary);
        assert_eq!(sig.axis, SupportAxis::Z);
        assert_eq!(sig.sign, -1);
    }

    #[test]
    fn test_wall_normal_to_x() {
        // Wall in the YZ plane at x = 2
        let boundary = vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 5.0, 0.0),
            Point3::new(2.0, 5.0, 3.0),
            Point3::new(2.0, 0.0, 3.0),
        ];
        let sig = AxisSignature::from_boundary(&boundary);

        assert_eq!(sig.axis, SupportAxis::X);
        assert_relative_eq!(sig.position, 2.0);
        assert!(sig.axis_vector().is_some());
    }

    #[test]
    fn test_skewed_plane_is_oblique() {
        // Plane with normal (1,1,1)/√3: every component is 0.577, below
        // the 0.7 dominance gate
        let boundary = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(2.0, -1.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
        ];
        let sig = AxisSignature::from_boundary(&boundary);
        assert_eq!(sig.axis, SupportAxis::Oblique);
        assert!(sig.axis_vector().is_none());
    }

    #[test]
    fn test_degenerate_boundary() {
        let sig = AxisSignature::from_boundary(&[Point3::origin(), Point3::origin()]);
        assert_eq!(sig.axis, SupportAxis::Oblique);
    }
}
