// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The load aggregation pipeline.
//!
//! One audit run is a single pass: read records, snapshot geometry, bucket
//! stories, group by category-specific keys, union and decompose each
//! footprint group, and roll the resulting entries up into the report
//! tree. Groups are independent of each other, so their union and
//! decomposition run in parallel and join only at aggregation time.
//!
//! All failures are local: degenerate elements are skipped with a log
//! line, union failures degrade to loose regions, and unresolvable labels
//! get explicit markers. A run always completes with a best-effort report.

use crate::force::{resolve_direction, ForceVector};
use crate::keys::{quantize, AreaKey, LineKey, PointKey};
use crate::report::{AuditEntry, CategoryGroup, Report, StoryReport};
use loadaudit_core::{
    ElementGeometry, ElementId, GridAxis, GridResolver, LoadCategory, LoadProvider,
    ModelProvider, ModelSnapshot, RawLoadRecord, Result, StoryBucketer, Tolerances,
};
use loadaudit_geometry::{
    decompose, merge_segments, project_boundary, union_footprints, AxisSignature, DroppedAxis,
    Footprint, Point3, UnionedRegion,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// One audit run over a load pattern
pub struct AuditPipeline<'a> {
    loads: &'a dyn LoadProvider,
    model: &'a dyn ModelProvider,
    tol: Tolerances,
}

/// Collected state of one area grouping-key bucket
struct AreaGroup {
    magnitude: f64,
    direction: loadaudit_core::LoadDirection,
    signature: AxisSignature,
    dropped: DroppedAxis,
    footprints: Vec<Footprint>,
}

/// Collected state of one line grouping-key bucket
struct LineGroup {
    magnitude: f64,
    direction: loadaudit_core::LoadDirection,
    segments: Vec<(ElementId, [Point3<f64>; 2])>,
}

/// Collected state of one point grouping-key bucket
struct PointGroup {
    magnitude: f64,
    direction: loadaudit_core::LoadDirection,
    location: String,
    members: Vec<ElementId>,
}

impl<'a> AuditPipeline<'a> {
    pub fn new(loads: &'a dyn LoadProvider, model: &'a dyn ModelProvider) -> Self {
        Self {
            loads,
            model,
            tol: Tolerances::default(),
        }
    }

    /// Override the run tolerances
    pub fn with_tolerances(mut self, tol: Tolerances) -> Result<Self> {
        tol.validate()?;
        self.tol = tol;
        Ok(self)
    }

    /// Run the audit for one load pattern
    pub fn run(&self, pattern: &str) -> Report {
        let records = self.loads.read_all_loads(pattern);
        debug!(pattern, records = records.len(), "audit run started");

        let snapshot = ModelSnapshot::build(self.model, &records);
        debug!(elements = snapshot.element_count(), "model snapshot built");

        let elevations: Vec<f64> = records.iter().map(|r| r.elevation).collect();
        let bucketer = StoryBucketer::build(&elevations, snapshot.levels(), self.tol.story);

        let grid_x = GridResolver::new(
            GridAxis::X,
            snapshot.grids(GridAxis::X),
            self.tol.grid_snap,
        );
        let grid_y = GridResolver::new(
            GridAxis::Y,
            snapshot.grids(GridAxis::Y),
            self.tol.grid_snap,
        );

        let mut per_bucket: Vec<Vec<&RawLoadRecord>> =
            vec![Vec::new(); bucketer.buckets().len()];
        for record in &records {
            if let Some(idx) = bucketer.assign(record.elevation) {
                per_bucket[idx].push(record);
            }
        }

        // Stories top-down
        let mut stories = Vec::with_capacity(per_bucket.len());
        for idx in (0..per_bucket.len()).rev() {
            let bucket = &bucketer.buckets()[idx];
            let groups = self.audit_story(&per_bucket[idx], &snapshot, &grid_x, &grid_y);
            stories.push(StoryReport::new(
                bucket.label.clone(),
                bucket.elevation,
                groups,
            ));
        }

        let report = Report::new(pattern.to_string(), stories);
        debug!(
            stories = report.stories.len(),
            entries = report.entry_count(),
            "audit run completed"
        );
        report
    }

    /// Audit all records of one story bucket
    fn audit_story(
        &self,
        records: &[&RawLoadRecord],
        snapshot: &ModelSnapshot,
        grid_x: &GridResolver,
        grid_y: &GridResolver,
    ) -> Vec<CategoryGroup> {
        let tol = self.tol;

        let mut area_groups: FxHashMap<AreaKey, AreaGroup> = FxHashMap::default();
        let mut line_groups: FxHashMap<LineKey, LineGroup> = FxHashMap::default();
        let mut point_groups: FxHashMap<PointKey, PointGroup> = FxHashMap::default();

        for record in records {
            let Some(geometry) = snapshot.geometry(record.element) else {
                warn!(element = %record.element, "no geometry for element, record skipped");
                continue;
            };
            if geometry.category() != record.category {
                warn!(element = %record.element, "geometry category mismatch, record skipped");
                continue;
            }
            if geometry.is_degenerate(tol.area_epsilon) {
                warn!(element = %record.element, "degenerate geometry, record skipped");
                continue;
            }

            match (record.category, geometry) {
                (LoadCategory::Area, ElementGeometry::Area(ring)) => {
                    let signature = AxisSignature::from_boundary(ring);
                    let (contour, dropped) = project_boundary(ring);
                    let footprint =
                        match Footprint::try_new(contour, record.element, tol.area_epsilon) {
                            Ok(footprint) => footprint,
                            Err(err) => {
                                warn!(element = %record.element, %err, "record skipped");
                                continue;
                            }
                        };
                    let key = AreaKey {
                        axis: signature.axis,
                        sign: signature.sign,
                        position: quantize(signature.position, tol.key_quantum),
                        magnitude: quantize(record.magnitude, tol.key_quantum),
                        direction: record.direction,
                    };
                    area_groups
                        .entry(key)
                        .or_insert_with(|| AreaGroup {
                            magnitude: record.magnitude,
                            direction: record.direction,
                            signature,
                            dropped,
                            footprints: Vec::new(),
                        })
                        .footprints
                        .push(footprint);
                }
                (LoadCategory::Line, ElementGeometry::Line(endpoints)) => {
                    let [a, b] = endpoints;
                    let bucket = line_bucket(a, b, grid_x, grid_y);
                    let key = LineKey {
                        location: bucket,
                        subtype: record.subtype,
                        magnitude: quantize(record.magnitude, tol.key_quantum),
                        direction: record.direction,
                    };
                    line_groups
                        .entry(key)
                        .or_insert_with(|| LineGroup {
                            magnitude: record.magnitude,
                            direction: record.direction,
                            segments: Vec::new(),
                        })
                        .segments
                        .push((record.element, [*a, *b]));
                }
                (LoadCategory::Point, ElementGeometry::Point(p)) => {
                    let location = format!(
                        "{} / {}",
                        grid_x.resolve_point(p.x),
                        grid_y.resolve_point(p.y)
                    );
                    let key = PointKey {
                        location: location.clone(),
                        magnitude: quantize(record.magnitude, tol.key_quantum),
                        direction: record.direction,
                    };
                    point_groups
                        .entry(key)
                        .or_insert_with(|| PointGroup {
                            magnitude: record.magnitude,
                            direction: record.direction,
                            location,
                            members: Vec::new(),
                        })
                        .members
                        .push(record.element);
                }
                _ => unreachable!("category checked against geometry above"),
            }
        }

        // Union + decomposition of each area group is independent of every
        // other group; fan out and join at entry collection
        let area_group_list: Vec<AreaGroup> = area_groups.into_values().collect();
        let mut area_entries: Vec<AuditEntry> = area_group_list
            .into_par_iter()
            .flat_map_iter(|group| area_group_entries(group, &tol, grid_x, grid_y))
            .collect();
        sort_entries(&mut area_entries);

        let mut line_entries: Vec<AuditEntry> = line_groups
            .into_values()
            .flat_map(|group| line_group_entries(group, &tol, grid_x, grid_y))
            .collect();
        sort_entries(&mut line_entries);

        let mut point_entries: Vec<AuditEntry> =
            point_groups.into_values().map(point_group_entry).collect();
        sort_entries(&mut point_entries);

        let mut groups = Vec::new();
        for (category, entries) in [
            (LoadCategory::Area, area_entries),
            (LoadCategory::Line, line_entries),
            (LoadCategory::Point, point_entries),
        ] {
            if !entries.is_empty() {
                groups.push(CategoryGroup::new(category, entries));
            }
        }
        groups
    }
}

/// Deterministic entry order within a category
fn sort_entries(entries: &mut [AuditEntry]) {
    entries.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.formula.cmp(&b.formula))
            .then_with(|| a.total.total_cmp(&b.total))
    });
}

/// Union one area group's footprints and decompose every resulting region
fn area_group_entries(
    group: AreaGroup,
    tol: &Tolerances,
    grid_x: &GridResolver,
    grid_y: &GridResolver,
) -> Vec<AuditEntry> {
    let regions = union_footprints(&group.footprints, tol);
    area_region_entries(&group, &regions, tol, grid_x, grid_y)
}

/// Emit one entry per unioned region
///
/// An entry is exact only when its decomposition is exact AND the region
/// actually merged; a loose region from the union degrade path always
/// flags its entry inexact.
fn area_region_entries(
    group: &AreaGroup,
    regions: &[UnionedRegion],
    tol: &Tolerances,
    grid_x: &GridResolver,
    grid_y: &GridResolver,
) -> Vec<AuditEntry> {
    let direction = resolve_direction(group.direction, Some(&group.signature));

    let mut entries = Vec::with_capacity(regions.len());
    for region in regions {
        let area = region.area();
        if area <= tol.area_epsilon {
            continue;
        }
        let result = decompose(region, tol);
        let total = group.magnitude * area;

        entries.push(AuditEntry {
            location: region_location(region, group, grid_x, grid_y),
            formula: result.formula(),
            quantity: area,
            quantity_unit: LoadCategory::Area.quantity_unit(),
            unit_load: group.magnitude,
            unit_load_unit: LoadCategory::Area.unit_load_unit(),
            direction: group.direction.label(),
            total,
            force: ForceVector::along(&direction, total),
            members: region.members.clone(),
            category: LoadCategory::Area,
            exact: result.exact && region.merged,
        });
    }
    entries
}

/// Location label for a unioned region, phrased per the element plane
///
/// A slab resolves both plan axes over its envelope. A wall resolves its
/// own grid line from the plane position plus its extent along the
/// in-plane axis (the projected X axis maps back to global Y when global
/// X was dropped, and vice versa).
fn region_location(
    region: &UnionedRegion,
    group: &AreaGroup,
    grid_x: &GridResolver,
    grid_y: &GridResolver,
) -> String {
    let Some((min, max)) = region.envelope() else {
        return "?".to_string();
    };

    match group.dropped {
        DroppedAxis::Z => format!(
            "{} / {}",
            grid_x.resolve_range(min.x, max.x),
            grid_y.resolve_range(min.y, max.y)
        ),
        DroppedAxis::X => format!(
            "{} / {}",
            grid_x.resolve_point(group.signature.position),
            grid_y.resolve_range(min.x, max.x)
        ),
        DroppedAxis::Y => format!(
            "{} / {}",
            grid_x.resolve_range(min.x, max.x),
            grid_y.resolve_point(group.signature.position)
        ),
    }
}

/// Merge one line group's segments and emit an entry per maximal run
fn line_group_entries(
    group: LineGroup,
    tol: &Tolerances,
    grid_x: &GridResolver,
    grid_y: &GridResolver,
) -> Vec<AuditEntry> {
    let merged = merge_segments(&group.segments, tol.merge_gap);
    let direction = resolve_direction(group.direction, None);

    let mut entries = Vec::with_capacity(merged.len());
    for segment in &merged {
        let length = segment.length();
        if length <= tol.area_epsilon {
            continue;
        }
        let total = group.magnitude * length;

        entries.push(AuditEntry {
            location: span_location(&segment.start, &segment.end, grid_x, grid_y),
            formula: format!("L={length:.2}"),
            quantity: length,
            quantity_unit: LoadCategory::Line.quantity_unit(),
            unit_load: group.magnitude,
            unit_load_unit: LoadCategory::Line.unit_load_unit(),
            direction: group.direction.label(),
            total,
            force: ForceVector::along(&direction, total),
            members: segment.members.clone(),
            category: LoadCategory::Line,
            exact: true,
        });
    }
    entries
}

/// One entry per point grouping key: a count of equal loads at a location
fn point_group_entry(mut group: PointGroup) -> AuditEntry {
    group.members.sort_unstable();
    group.members.dedup();
    let count = group.members.len();
    let direction = resolve_direction(group.direction, None);
    let total = group.magnitude * count as f64;

    AuditEntry {
        location: group.location,
        formula: format!("{}x{:.2}", count, group.magnitude),
        quantity: count as f64,
        quantity_unit: LoadCategory::Point.quantity_unit(),
        unit_load: group.magnitude,
        unit_load_unit: LoadCategory::Point.unit_load_unit(),
        direction: group.direction.label(),
        total,
        force: ForceVector::along(&direction, total),
        members: group.members,
        category: LoadCategory::Point,
        exact: true,
    }
}

/// Grid bucket for a line segment: the reference line the run sits on
///
/// A run along global X lives on a Y gridline and vice versa, so the
/// bucket resolves the perpendicular coordinate at the segment midpoint.
/// Collinear segments in different bays then land in the same bucket and
/// can merge into one maximal run.
fn line_bucket(
    a: &Point3<f64>,
    b: &Point3<f64>,
    grid_x: &GridResolver,
    grid_y: &GridResolver,
) -> String {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    if dx >= dy {
        grid_y.resolve_point((a.y + b.y) * 0.5)
    } else {
        grid_x.resolve_point((a.x + b.x) * 0.5)
    }
}

/// Plan-range label for a 3D span (line segment or endpoints of a run)
fn span_location(
    a: &Point3<f64>,
    b: &Point3<f64>,
    grid_x: &GridResolver,
    grid_y: &GridResolver,
) -> String {
    format!(
        "{} / {}",
        grid_x.resolve_range(a.x.min(b.x), a.x.max(b.x)),
        grid_y.resolve_range(a.y.min(b.y), a.y.max(b.y))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadaudit_core::LoadDirection;
    use loadaudit_geometry::{Point2, SupportAxis};

    #[test]
    fn test_loose_region_yields_inexact_entry() {
        let group = AreaGroup {
            magnitude: 2.5,
            direction: LoadDirection::Gravity,
            signature: AxisSignature {
                axis: SupportAxis::Z,
                sign: 1,
                position: 3.0,
            },
            dropped: DroppedAxis::Z,
            footprints: Vec::new(),
        };
        // A loose region as produced by the union degrade path
        let region = UnionedRegion::from_contour(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 3.0),
                Point2::new(0.0, 3.0),
            ],
            vec![ElementId(1)],
            false,
        );
        let tol = Tolerances::default();
        let grid_x = GridResolver::new(GridAxis::X, &[], tol.grid_snap);
        let grid_y = GridResolver::new(GridAxis::Y, &[], tol.grid_snap);

        let entries = area_region_entries(&group, &[region], &tol, &grid_x, &grid_y);
        assert_eq!(entries.len(), 1);
        // The decomposition itself is clean, but the region never merged
        assert_eq!(entries[0].formula, "4x3");
        assert!(!entries[0].exact);
        assert_eq!(entries[0].members, vec![ElementId(1)]);
    }
}
