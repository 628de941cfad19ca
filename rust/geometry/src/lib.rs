// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # LoadAudit Geometry
//!
//! Footprint processing for the load audit pipeline: best-fit plane
//! projection, axis/plane classification, planar union via the i_overlay
//! boolean kernel, and the rectangle/triangle decomposition arbiter.

pub mod classify;
pub mod decompose;
pub mod error;
pub mod projection;
pub mod region;
pub mod union;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use classify::{AxisSignature, SupportAxis};
pub use decompose::{decompose, DecompositionResult, ShapeTerm, TermShape};
pub use error::{Error, Result};
pub use projection::{project_boundary, DroppedAxis};
pub use region::{Footprint, UnionedRegion};
pub use union::{merge_segments, union_footprints, MergedSegment};
