// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference grid resolution.
//!
//! Snaps numeric coordinate ranges to named reference lines, producing the
//! human-readable location labels used by audit entries ("2", "1-3",
//! "B(+0.40m)"). Resolution never fails: an axis without reference lines
//! yields an explicit unresolved marker instead.

use crate::model::{GridAxis, ReferenceGrid};

/// Resolves coordinates against the reference lines of one axis
#[derive(Debug, Clone)]
pub struct GridResolver {
    axis: GridAxis,
    /// Reference lines sorted ascending by coordinate; ties on distance
    /// resolve to the earlier line
    lines: Vec<ReferenceGrid>,
    snap: f64,
}

impl GridResolver {
    /// Build a resolver from the reference lines of `axis`
    ///
    /// Lines on other axes are ignored. Lines are sorted ascending by
    /// coordinate so that exact-distance ties resolve deterministically.
    pub fn new(axis: GridAxis, lines: &[ReferenceGrid], snap: f64) -> Self {
        let mut lines: Vec<ReferenceGrid> =
            lines.iter().filter(|l| l.axis == axis).cloned().collect();
        lines.sort_by(|a, b| a.coordinate.total_cmp(&b.coordinate));
        Self { axis, lines, snap }
    }

    /// Axis this resolver covers
    pub fn axis(&self) -> GridAxis {
        self.axis
    }

    /// True when the axis has no reference lines at all
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Resolve a single coordinate to a grid label
    ///
    /// Snaps to the nearest line; a residual offset beyond the snap
    /// tolerance is appended as a signed annotation, e.g. `"2(+0.40m)"`.
    pub fn resolve_point(&self, coord: f64) -> String {
        match self.nearest(coord) {
            Some(line) => annotate(&line.label, coord - line.coordinate, self.snap),
            None => unresolved(coord),
        }
    }

    /// Resolve a coordinate range to a grid label
    ///
    /// Both ends are resolved independently; when they land on the same
    /// line the single-label form is returned, otherwise `"start-end"`.
    /// A range shorter than the snap tolerance collapses to a point query.
    pub fn resolve_range(&self, min: f64, max: f64) -> String {
        if max - min < self.snap {
            return self.resolve_point(min);
        }

        let (lo, hi) = match (self.nearest(min), self.nearest(max)) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return format!("{}-{}", unresolved(min), unresolved(max)),
        };

        if lo.label == hi.label {
            return annotate(&lo.label, min - lo.coordinate, self.snap);
        }

        format!(
            "{}-{}",
            annotate(&lo.label, min - lo.coordinate, self.snap),
            annotate(&hi.label, max - hi.coordinate, self.snap)
        )
    }

    /// Nearest reference line to `coord`; ties go to the line appearing
    /// first in ascending coordinate order
    fn nearest(&self, coord: f64) -> Option<&ReferenceGrid> {
        let mut best: Option<(&ReferenceGrid, f64)> = None;
        for line in &self.lines {
            let dist = (coord - line.coordinate).abs();
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((line, dist)),
            }
        }
        best.map(|(line, _)| line)
    }
}

/// Bare label when the residual is within the snap tolerance, annotated
/// label otherwise
fn annotate(label: &str, offset: f64, snap: f64) -> String {
    if offset.abs() <= snap {
        label.to_string()
    } else {
        format!("{label}({offset:+.2}m)")
    }
}

/// Explicit marker for a coordinate that has no reference line to snap to
fn unresolved(coord: f64) -> String {
    format!("?{coord:.2}")
}
