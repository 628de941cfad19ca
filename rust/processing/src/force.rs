// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Force-direction resolution and vector sums.

use loadaudit_core::LoadDirection;
use loadaudit_geometry::AxisSignature;
use nalgebra::Vector3;
use std::ops::{Add, AddAssign};

/// A global (Fx, Fy, Fz) force sum in kN
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForceVector {
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
}

impl ForceVector {
    pub const ZERO: ForceVector = ForceVector {
        fx: 0.0,
        fy: 0.0,
        fz: 0.0,
    };

    /// Force from a signed total magnitude along a unit direction
    pub fn along(direction: &Vector3<f64>, total: f64) -> Self {
        Self {
            fx: direction.x * total,
            fy: direction.y * total,
            fz: direction.z * total,
        }
    }

    /// Component-wise closeness, for invariant checks
    pub fn approx_eq(&self, other: &ForceVector, epsilon: f64) -> bool {
        (self.fx - other.fx).abs() <= epsilon
            && (self.fy - other.fy).abs() <= epsilon
            && (self.fz - other.fz).abs() <= epsilon
    }
}

impl Add for ForceVector {
    type Output = ForceVector;

    fn add(self, rhs: ForceVector) -> ForceVector {
        ForceVector {
            fx: self.fx + rhs.fx,
            fy: self.fy + rhs.fy,
            fz: self.fz + rhs.fz,
        }
    }
}

impl AddAssign for ForceVector {
    fn add_assign(&mut self, rhs: ForceVector) {
        self.fx += rhs.fx;
        self.fy += rhs.fy;
        self.fz += rhs.fz;
    }
}

impl std::iter::Sum for ForceVector {
    fn sum<I: Iterator<Item = ForceVector>>(iter: I) -> ForceVector {
        iter.fold(ForceVector::ZERO, Add::add)
    }
}

/// Resolve a load direction descriptor to a global unit vector
///
/// Gravity always resolves to the negative vertical axis. Explicit global
/// directions resolve directly. A local/projected direction falls back to
/// the governing element's axis signature, and to vertical when no
/// unambiguous signature exists.
pub fn resolve_direction(
    direction: LoadDirection,
    signature: Option<&AxisSignature>,
) -> Vector3<f64> {
    match direction {
        LoadDirection::Gravity => Vector3::new(0.0, 0.0, -1.0),
        LoadDirection::GlobalX => Vector3::new(1.0, 0.0, 0.0),
        LoadDirection::GlobalY => Vector3::new(0.0, 1.0, 0.0),
        LoadDirection::GlobalZ => Vector3::new(0.0, 0.0, 1.0),
        LoadDirection::LocalProjected => signature
            .and_then(|s| s.axis_vector())
            .unwrap_or_else(|| Vector3::new(0.0, 0.0, -1.0)),
    }
}
