// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint and unioned-region types.

use crate::error::{Error, Result};
use crate::projection::{contour_bounds, point_in_contour, signed_area};
use loadaudit_core::ElementId;
use nalgebra::Point2;

/// One element's projected 2D footprint
#[derive(Debug, Clone)]
pub struct Footprint {
    /// Projected boundary, input winding preserved
    pub contour: Vec<Point2<f64>>,
    /// Element the footprint came from
    pub source: ElementId,
}

impl Footprint {
    pub fn new(contour: Vec<Point2<f64>>, source: ElementId) -> Self {
        Self { contour, source }
    }

    /// Validated footprint: at least 3 vertices, non-negligible area
    pub fn try_new(
        contour: Vec<Point2<f64>>,
        source: ElementId,
        area_epsilon: f64,
    ) -> Result<Self> {
        if contour.len() < 3 {
            return Err(Error::InvalidFootprint(format!(
                "{source}: {} boundary vertices",
                contour.len()
            )));
        }
        if signed_area(&contour).abs() <= area_epsilon {
            return Err(Error::InvalidFootprint(format!(
                "{source}: zero-area boundary"
            )));
        }
        Ok(Self { contour, source })
    }

    /// Unsigned footprint area
    pub fn area(&self) -> f64 {
        signed_area(&self.contour).abs()
    }
}

/// One maximal region of a footprint union, with provenance
#[derive(Debug, Clone)]
pub struct UnionedRegion {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
    /// Elements whose footprints geometrically contribute to this region
    pub members: Vec<ElementId>,
    /// False when the union kernel failed and this region is one loose,
    /// unmerged input footprint; decomposition of a loose region is
    /// flagged inexact downstream
    pub merged: bool,
}

impl UnionedRegion {
    /// Region from a single contour with no holes
    pub fn from_contour(outer: Vec<Point2<f64>>, members: Vec<ElementId>, merged: bool) -> Self {
        Self {
            outer,
            holes: Vec::new(),
            members,
            merged,
        }
    }

    /// Net area: outer area minus hole areas
    pub fn area(&self) -> f64 {
        let outer = signed_area(&self.outer).abs();
        let holes: f64 = self.holes.iter().map(|h| signed_area(h).abs()).sum();
        outer - holes
    }

    /// Axis-aligned bounding envelope
    pub fn envelope(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        contour_bounds(&self.outer)
    }

    /// Envelope area; zero for an empty region
    pub fn envelope_area(&self) -> f64 {
        match self.envelope() {
            Some((min, max)) => (max.x - min.x) * (max.y - min.y),
            None => 0.0,
        }
    }

    /// Point-in-region test honoring holes
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point_in_contour(point, &self.outer)
            && !self.holes.iter().any(|h| point_in_contour(point, h))
    }

    /// All distinct X and Y coordinates of the region's vertices, sorted
    /// ascending — the breakpoints of the decomposition cell grid
    pub fn breakpoints(&self) -> (Vec<f64>, Vec<f64>) {
        let mut xs: Vec<f64> = Vec::new();
        let mut ys: Vec<f64> = Vec::new();
        for p in self.outer.iter().chain(self.holes.iter().flatten()) {
            xs.push(p.x);
            ys.push(p.y);
        }
        xs.sort_by(f64::total_cmp);
        ys.sort_by(f64::total_cmp);
        xs.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        ys.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        (xs, ys)
    }
}
