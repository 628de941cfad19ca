// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load record and reference data model.
//!
//! Everything here is immutable once read from the host model: raw load
//! records, element geometry and the named reference grids/levels used to
//! produce human-readable location labels.

use nalgebra::Point3;
use smallvec::SmallVec;

/// Identifier of a structural element in the host model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural category of a load record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadCategory {
    /// Distributed load on a shell element (slab, wall), kN/m²
    Area,
    /// Distributed load on a frame element (beam, column, brace), kN/m
    Line,
    /// Concentrated load on a joint, kN
    Point,
}

impl LoadCategory {
    /// Engineering unit of the load intensity for this category
    pub fn unit_load_unit(&self) -> &'static str {
        match self {
            LoadCategory::Area => "kN/m²",
            LoadCategory::Line => "kN/m",
            LoadCategory::Point => "kN",
        }
    }

    /// Engineering unit of the covered quantity for this category
    pub fn quantity_unit(&self) -> &'static str {
        match self {
            LoadCategory::Area => "m²",
            LoadCategory::Line => "m",
            LoadCategory::Point => "pcs",
        }
    }
}

/// Direction descriptor of a load record as stored by the host model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadDirection {
    /// Vertical, acting with gravity (resolves to the negative global Z axis)
    Gravity,
    /// Explicit global X
    GlobalX,
    /// Explicit global Y
    GlobalY,
    /// Explicit global Z
    GlobalZ,
    /// Local or projected direction; resolved from the element's axis signature
    LocalProjected,
}

impl LoadDirection {
    /// Short label used in audit entries
    pub fn label(&self) -> &'static str {
        match self {
            LoadDirection::Gravity => "Gravity",
            LoadDirection::GlobalX => "X",
            LoadDirection::GlobalY => "Y",
            LoadDirection::GlobalZ => "Z",
            LoadDirection::LocalProjected => "Local",
        }
    }
}

/// Structural subtype of a frame element, used as a grouping discriminant
/// for line loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineSubtype {
    Beam,
    Column,
    Brace,
}

impl LineSubtype {
    pub fn label(&self) -> &'static str {
        match self {
            LineSubtype::Beam => "Beam",
            LineSubtype::Column => "Column",
            LineSubtype::Brace => "Brace",
        }
    }
}

/// One raw load record as read from the host model, immutable after read
#[derive(Debug, Clone)]
pub struct RawLoadRecord {
    /// Element the load is applied to
    pub element: ElementId,
    /// Structural category (determines the grouping key shape)
    pub category: LoadCategory,
    /// Signed load intensity; the sign is carried through the whole
    /// pipeline unmodified so that vector sums are exact
    pub magnitude: f64,
    /// Direction descriptor
    pub direction: LoadDirection,
    /// Raw elevation of the element, before story bucketing
    pub elevation: f64,
    /// Frame subtype; only meaningful for `LoadCategory::Line`
    pub subtype: Option<LineSubtype>,
}

/// Element geometry, owned by the per-run snapshot
#[derive(Debug, Clone)]
pub enum ElementGeometry {
    /// Ordered boundary of a shell element, at least 3 vertices for a
    /// non-degenerate footprint
    Area(SmallVec<[Point3<f64>; 8]>),
    /// Frame element between two joints
    Line([Point3<f64>; 2]),
    /// Single joint
    Point(Point3<f64>),
}

impl ElementGeometry {
    /// Category this geometry can carry loads of
    pub fn category(&self) -> LoadCategory {
        match self {
            ElementGeometry::Area(_) => LoadCategory::Area,
            ElementGeometry::Line(_) => LoadCategory::Line,
            ElementGeometry::Point(_) => LoadCategory::Point,
        }
    }

    /// True when the geometry cannot produce a usable footprint
    /// (fewer than 3 boundary vertices, zero-length line)
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        match self {
            ElementGeometry::Area(ring) => ring.len() < 3,
            ElementGeometry::Line([a, b]) => (b - a).norm() <= epsilon,
            ElementGeometry::Point(_) => false,
        }
    }
}

/// Horizontal axis of a reference grid line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridAxis {
    X,
    Y,
}

/// A named reference line at a global coordinate
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceGrid {
    pub label: String,
    pub coordinate: f64,
    pub axis: GridAxis,
}

/// A named reference level at a global elevation
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceLevel {
    pub label: String,
    pub elevation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use smallvec::smallvec;

    #[test]
    fn test_category_units() {
        assert_eq!(LoadCategory::Area.unit_load_unit(), "kN/m²");
        assert_eq!(LoadCategory::Line.quantity_unit(), "m");
        assert_eq!(LoadCategory::Point.quantity_unit(), "pcs");
    }

    #[test]
    fn test_degenerate_area() {
        let ring: SmallVec<[Point3<f64>; 8]> =
            smallvec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert!(ElementGeometry::Area(ring).is_degenerate(1e-9));
    }

    #[test]
    fn test_degenerate_line() {
        let geo = ElementGeometry::Line([Point3::origin(), Point3::origin()]);
        assert!(geo.is_degenerate(1e-9));

        let geo = ElementGeometry::Line([Point3::origin(), Point3::new(0.0, 0.0, 3.0)]);
        assert!(!geo.is_degenerate(1e-9));
    }
}
