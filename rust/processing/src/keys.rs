// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping keys.
//!
//! Structural key types deciding which raw records merge before union and
//! decomposition. Scalar components are quantized to integer ticks before
//! hashing — rounding is part of key normalization, never applied after
//! the fact — so records within a tolerance quantum land in the same map
//! bucket with derived equality and hashing.

use loadaudit_core::{LineSubtype, LoadDirection};
use loadaudit_geometry::SupportAxis;

/// Quantize a scalar to integer ticks of `quantum`
pub fn quantize(value: f64, quantum: f64) -> i64 {
    (value / quantum).round() as i64
}

/// Grouping key for area loads: same plane, same signed intensity, same
/// direction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AreaKey {
    pub axis: SupportAxis,
    pub sign: i8,
    /// Plane position along the axis, in key-quantum ticks
    pub position: i64,
    /// Signed intensity, in key-quantum ticks
    pub magnitude: i64,
    pub direction: LoadDirection,
}

/// Grouping key for line loads: same grid bucket, same subtype, same
/// signed intensity, same direction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Resolved grid location label
    pub location: String,
    pub subtype: Option<LineSubtype>,
    pub magnitude: i64,
    pub direction: LoadDirection,
}

/// Grouping key for point loads: same resolved location, same signed
/// intensity, same direction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PointKey {
    pub location: String,
    pub magnitude: i64,
    pub direction: LoadDirection,
}
