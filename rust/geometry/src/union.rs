// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint union engine.
//!
//! Merges the projected footprints of a grouping-key bucket into maximal
//! planar regions using the i_overlay boolean kernel. Member provenance is
//! recomputed per output region by intersection-area overlap rather than
//! inherited from the group. A kernel failure degrades to a loose,
//! unmerged region set instead of aborting the run.

use crate::projection::{ensure_ccw, is_valid_contour, signed_area};
use crate::region::{Footprint, UnionedRegion};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use loadaudit_core::{ElementId, Tolerances};
use nalgebra::{Point2, Point3};
use rustc_hash::FxHashMap;

/// Union the footprints of one group into maximal regions
///
/// Degenerate footprints are dropped. When the boolean kernel produces no
/// usable output from valid input, each footprint becomes its own region
/// with `merged = false` (the loose-union degrade path).
pub fn union_footprints(footprints: &[Footprint], tol: &Tolerances) -> Vec<UnionedRegion> {
    let valid: Vec<&Footprint> = footprints
        .iter()
        .filter(|f| is_valid_contour(&f.contour, tol.area_epsilon))
        .collect();

    if valid.is_empty() {
        return Vec::new();
    }
    if valid.len() == 1 {
        return vec![UnionedRegion::from_contour(
            ensure_ccw(&valid[0].contour),
            vec![valid[0].source],
            true,
        )];
    }

    let subject: Vec<Vec<[f64; 2]>> = vec![contour_to_path(&valid[0].contour)];
    let clip: Vec<Vec<[f64; 2]>> = valid[1..]
        .iter()
        .map(|f| contour_to_path(&f.contour))
        .collect();

    let shapes = subject.overlay(&clip, OverlayRule::Union, FillRule::EvenOdd);

    let mut regions: Vec<UnionedRegion> = shapes
        .iter()
        .filter_map(|shape| shape_to_region(shape, tol.area_epsilon))
        .collect();

    if regions.is_empty() {
        // Kernel failure: degrade to a loose region per footprint
        return loose_regions(&valid);
    }

    // Recompute provenance by geometric overlap
    for region in &mut regions {
        region.members = valid
            .iter()
            .filter(|f| intersection_area(region, &f.contour) > tol.area_epsilon)
            .map(|f| f.source)
            .collect();
        region.members.sort_unstable();
        region.members.dedup();
    }
    regions
}

/// Degrade path: one unmerged region per footprint, in input order
///
/// Downstream entries built from these regions are flagged inexact
/// because the footprints were never actually merged.
pub(crate) fn loose_regions(footprints: &[&Footprint]) -> Vec<UnionedRegion> {
    footprints
        .iter()
        .map(|f| UnionedRegion::from_contour(ensure_ccw(&f.contour), vec![f.source], false))
        .collect()
}

/// Convert one i_overlay output shape (outer + holes) to a region
fn shape_to_region(shape: &[Vec<[f64; 2]>], area_epsilon: f64) -> Option<UnionedRegion> {
    let outer: Vec<Point2<f64>> = path_to_contour(shape.first()?);
    if !is_valid_contour(&outer, area_epsilon) {
        return None;
    }

    let holes: Vec<Vec<Point2<f64>>> = shape[1..]
        .iter()
        .map(|path| path_to_contour(path))
        .filter(|h| is_valid_contour(h, area_epsilon))
        .collect();

    Some(UnionedRegion {
        outer: ensure_ccw(&outer),
        holes,
        members: Vec::new(),
        merged: true,
    })
}

/// Area of the intersection between a region and a single contour
pub fn intersection_area(region: &UnionedRegion, contour: &[Point2<f64>]) -> f64 {
    let subject = region_to_paths(region);
    let clip = vec![contour_to_path(contour)];
    let shapes = subject.overlay(&clip, OverlayRule::Intersect, FillRule::EvenOdd);

    shapes_area(&shapes)
}

/// Net area of an i_overlay result: outer areas minus hole areas
pub(crate) fn shapes_area(shapes: &[Vec<Vec<[f64; 2]>>]) -> f64 {
    let mut area = 0.0;
    for shape in shapes {
        for (i, path) in shape.iter().enumerate() {
            let contour = path_to_contour(path);
            let a = signed_area(&contour).abs();
            if i == 0 {
                area += a;
            } else {
                area -= a;
            }
        }
    }
    area
}

/// Region as i_overlay paths: outer + holes
pub(crate) fn region_to_paths(region: &UnionedRegion) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::with_capacity(1 + region.holes.len());
    paths.push(contour_to_path(&region.outer));
    for hole in &region.holes {
        paths.push(contour_to_path(hole));
    }
    paths
}

pub(crate) fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

pub(crate) fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// A maximal merged run of collinear line-load segments
#[derive(Debug, Clone)]
pub struct MergedSegment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Elements whose segments contribute to this run
    pub members: Vec<ElementId>,
}

impl MergedSegment {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Quantum for bucketing segment carrier lines (direction and offset)
const CARRIER_QUANTUM: f64 = 1e-6;

/// Merge collinear, overlapping or near-touching segments into maximal runs
///
/// This is the line-load counterpart of the footprint union: segments on
/// the same carrier line whose spans overlap (or come within `gap`) fuse
/// into one run with combined provenance. Zero-length segments are
/// skipped.
pub fn merge_segments(
    segments: &[(ElementId, [Point3<f64>; 2])],
    gap: f64,
) -> Vec<MergedSegment> {
    type CarrierKey = ([i64; 3], [i64; 3]);

    struct Span {
        t0: f64,
        t1: f64,
        member: ElementId,
    }

    let mut carriers: FxHashMap<CarrierKey, (nalgebra::Vector3<f64>, Point3<f64>, Vec<Span>)> =
        FxHashMap::default();

    for (id, [a, b]) in segments {
        let d = b - a;
        let len = d.norm();
        if len <= f64::EPSILON {
            continue;
        }
        let mut dir = d / len;
        // Canonical direction sign so antiparallel segments share a carrier
        if dir.x < -CARRIER_QUANTUM
            || (dir.x.abs() <= CARRIER_QUANTUM && dir.y < -CARRIER_QUANTUM)
            || (dir.x.abs() <= CARRIER_QUANTUM
                && dir.y.abs() <= CARRIER_QUANTUM
                && dir.z < 0.0)
        {
            dir = -dir;
        }

        // Perpendicular foot of the carrier line through the origin
        let foot = a - dir * a.coords.dot(&dir);
        let key: CarrierKey = (quantize3(&dir.into()), quantize3(&foot.coords.into()));

        let (t0, t1) = {
            let ta = a.coords.dot(&dir);
            let tb = b.coords.dot(&dir);
            (ta.min(tb), ta.max(tb))
        };

        carriers
            .entry(key)
            .or_insert_with(|| (dir, foot, Vec::new()))
            .2
            .push(Span {
                t0,
                t1,
                member: *id,
            });
    }

    let mut merged = Vec::new();
    let mut carriers: Vec<(CarrierKey, _)> = carriers.into_iter().collect();
    carriers.sort_unstable_by_key(|(key, _)| *key);

    for (_, (dir, foot, mut spans)) in carriers {
        spans.sort_by(|a, b| a.t0.total_cmp(&b.t0));

        let mut run_start = spans[0].t0;
        let mut run_end = spans[0].t1;
        let mut members = vec![spans[0].member];

        for span in &spans[1..] {
            if span.t0 <= run_end + gap {
                run_end = run_end.max(span.t1);
                members.push(span.member);
            } else {
                merged.push(close_run(&foot, &dir, run_start, run_end, &mut members));
                run_start = span.t0;
                run_end = span.t1;
                members = vec![span.member];
            }
        }
        merged.push(close_run(&foot, &dir, run_start, run_end, &mut members));
    }
    merged
}

fn close_run(
    foot: &Point3<f64>,
    dir: &nalgebra::Vector3<f64>,
    t0: f64,
    t1: f64,
    members: &mut Vec<ElementId>,
) -> MergedSegment {
    members.sort_unstable();
    members.dedup();
    MergedSegment {
        start: foot + dir * t0,
        end: foot + dir * t1,
        members: std::mem::take(members),
    }
}

fn quantize3(v: &[f64; 3]) -> [i64; 3] {
    [
        (v[0] / CARRIER_QUANTUM).round() as i64,
        (v[1] / CARRIER_QUANTUM).round() as i64,
        (v[2] / CARRIER_QUANTUM).round() as i64,
    ]
}
