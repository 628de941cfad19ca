// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # LoadAudit Core
//!
//! Data model and reference resolution for the load audit pipeline: raw
//! load records, the per-run model snapshot, grid label resolution and
//! story bucketing. Geometry processing lives in `loadaudit-geometry`,
//! the aggregation pipeline in `loadaudit-processing`.

pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod snapshot;
pub mod story;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use config::Tolerances;
pub use error::{Error, Result};
pub use grid::GridResolver;
pub use model::{
    ElementGeometry, ElementId, GridAxis, LineSubtype, LoadCategory, LoadDirection,
    RawLoadRecord, ReferenceGrid, ReferenceLevel,
};
pub use snapshot::{LoadProvider, ModelProvider, ModelSnapshot};
pub use story::{StoryBucket, StoryBucketer};
