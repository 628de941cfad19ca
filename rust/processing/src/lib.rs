// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # LoadAudit Processing
//!
//! The load aggregation pipeline: grouping keys, force-direction
//! resolution and the report tree with vector-sum invariants. One call to
//! [`AuditPipeline::run`] turns a load pattern into a completed
//! [`Report`]; the pipeline never fails on data quality, it degrades
//! locally and always hands back a best-effort tree.

pub mod force;
pub mod keys;
pub mod pipeline;
pub mod report;

pub use force::{resolve_direction, ForceVector};
pub use keys::{quantize, AreaKey, LineKey, PointKey};
pub use pipeline::AuditPipeline;
pub use report::{AuditEntry, CategoryGroup, Report, StoryReport};
