// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Provider interfaces and the per-run model snapshot.
//!
//! The host model is consumed through two narrow traits; everything the
//! pipeline needs is pulled into an immutable [`ModelSnapshot`] before any
//! grouping or decomposition begins. The rebuild and query phases never
//! interleave: after construction the snapshot is pure reads.

use crate::model::{
    ElementGeometry, ElementId, GridAxis, RawLoadRecord, ReferenceGrid, ReferenceLevel,
};
use rustc_hash::FxHashMap;

/// Source of raw load records, opaque to the core
pub trait LoadProvider {
    /// All load records of a named load pattern
    fn read_all_loads(&self, pattern: &str) -> Vec<RawLoadRecord>;
}

/// Source of element geometry and reference data, opaque to the core
pub trait ModelProvider {
    /// Geometry of one element, if the model knows it
    fn element_geometry(&self, id: ElementId) -> Option<ElementGeometry>;

    /// Named reference lines of one horizontal axis
    fn reference_grids(&self, axis: GridAxis) -> Vec<ReferenceGrid>;

    /// Named reference levels
    fn reference_levels(&self) -> Vec<ReferenceLevel>;
}

/// Immutable snapshot of everything one audit run reads from the model
///
/// Built once per run from a [`ModelProvider`], covering exactly the
/// elements referenced by the run's load records. Never mutated afterward;
/// discarded with the run.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    geometry: FxHashMap<ElementId, ElementGeometry>,
    grids_x: Vec<ReferenceGrid>,
    grids_y: Vec<ReferenceGrid>,
    levels: Vec<ReferenceLevel>,
}

impl ModelSnapshot {
    /// Build the snapshot for one run
    ///
    /// Fetches geometry for every element referenced by `records`;
    /// elements the provider does not know stay absent and are skipped
    /// downstream as degenerate.
    pub fn build(provider: &dyn ModelProvider, records: &[RawLoadRecord]) -> Self {
        let mut geometry =
            FxHashMap::with_capacity_and_hasher(records.len(), Default::default());
        for record in records {
            geometry
                .entry(record.element)
                .or_insert_with(|| provider.element_geometry(record.element));
        }

        Self {
            geometry: geometry
                .into_iter()
                .filter_map(|(id, geo)| geo.map(|g| (id, g)))
                .collect(),
            grids_x: provider.reference_grids(GridAxis::X),
            grids_y: provider.reference_grids(GridAxis::Y),
            levels: provider.reference_levels(),
        }
    }

    /// Geometry of one element, if the snapshot holds it
    pub fn geometry(&self, id: ElementId) -> Option<&ElementGeometry> {
        self.geometry.get(&id)
    }

    /// Reference lines of one axis
    pub fn grids(&self, axis: GridAxis) -> &[ReferenceGrid] {
        match axis {
            GridAxis::X => &self.grids_x,
            GridAxis::Y => &self.grids_y,
        }
    }

    /// Reference levels
    pub fn levels(&self) -> &[ReferenceLevel] {
        &self.levels
    }

    /// Number of elements with known geometry
    pub fn element_count(&self) -> usize {
        self.geometry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LoadCategory, LoadDirection};
    use nalgebra::Point3;

    struct FakeModel;

    impl ModelProvider for FakeModel {
        fn element_geometry(&self, id: ElementId) -> Option<ElementGeometry> {
            // Element 99 is unknown to the model
            if id.0 == 99 {
                return None;
            }
            Some(ElementGeometry::Point(Point3::new(id.0 as f64, 0.0, 0.0)))
        }

        fn reference_grids(&self, axis: GridAxis) -> Vec<ReferenceGrid> {
            match axis {
                GridAxis::X => vec![ReferenceGrid {
                    label: "1".to_string(),
                    coordinate: 0.0,
                    axis,
                }],
                GridAxis::Y => Vec::new(),
            }
        }

        fn reference_levels(&self) -> Vec<ReferenceLevel> {
            vec![ReferenceLevel {
                label: "Ground".to_string(),
                elevation: 0.0,
            }]
        }
    }

    fn record(element: u32) -> RawLoadRecord {
        RawLoadRecord {
            element: ElementId(element),
            category: LoadCategory::Point,
            magnitude: -10.0,
            direction: LoadDirection::Gravity,
            elevation: 0.0,
            subtype: None,
        }
    }

    #[test]
    fn test_snapshot_covers_referenced_elements() {
        let records = vec![record(1), record(2), record(2)];
        let snapshot = ModelSnapshot::build(&FakeModel, &records);

        assert_eq!(snapshot.element_count(), 2);
        assert!(snapshot.geometry(ElementId(1)).is_some());
        assert!(snapshot.geometry(ElementId(3)).is_none());
    }

    #[test]
    fn test_unknown_geometry_stays_absent() {
        let records = vec![record(99)];
        let snapshot = ModelSnapshot::build(&FakeModel, &records);
        assert_eq!(snapshot.element_count(), 0);
    }

    #[test]
    fn test_reference_data_is_captured() {
        let snapshot = ModelSnapshot::build(&FakeModel, &[record(1)]);
        assert_eq!(snapshot.grids(GridAxis::X).len(), 1);
        assert!(snapshot.grids(GridAxis::Y).is_empty());
        assert_eq!(snapshot.levels().len(), 1);
    }
}
