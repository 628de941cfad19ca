// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use loadaudit_core::{ElementId, Tolerances};
use loadaudit_geometry::{decompose, union_footprints, Footprint, Point2, UnionedRegion};

fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Vec<Point2<f64>> {
    vec![
        Point2::new(x0, y0),
        Point2::new(x0 + w, y0),
        Point2::new(x0 + w, y0 + h),
        Point2::new(x0, y0 + h),
    ]
}

#[test]
fn edge_sharing_rectangles_union_to_two_terms() {
    // A 4x3 base and a 2x3 leg sharing the leg's full bottom edge
    let tol = Tolerances::default();
    let footprints = vec![
        Footprint::new(rect(0.0, 0.0, 4.0, 3.0), ElementId(1)),
        Footprint::new(rect(0.0, 3.0, 2.0, 3.0), ElementId(2)),
    ];

    let regions = union_footprints(&footprints, &tol);
    assert_eq!(regions.len(), 1);
    assert!(regions[0].merged);
    assert_relative_eq!(regions[0].area(), 18.0, epsilon = 1e-9);
    assert_eq!(regions[0].members, vec![ElementId(1), ElementId(2)]);

    let d = decompose(&regions[0], &tol);
    assert!(d.exact);
    assert_eq!(d.term_count(), 2);
    assert_eq!(d.formula(), "4x3 + 2x3");
}

#[test]
fn slab_with_centered_hole_prefers_subtraction() {
    let tol = Tolerances::default();
    let mut region = UnionedRegion::from_contour(
        rect(0.0, 0.0, 10.0, 10.0),
        vec![ElementId(1)],
        true,
    );
    region.holes.push(rect(4.0, 4.0, 2.0, 2.0));

    let d = decompose(&region, &tol);
    assert!(d.exact);
    assert_eq!(d.term_count(), 2);
    assert_eq!(d.formula(), "10x10 - 2x2");
    assert_relative_eq!(d.term_area(), region.area(), max_relative = 1e-6);
}

#[test]
fn exact_results_reproduce_region_area() {
    // A staircase of three rectangles
    let tol = Tolerances::default();
    let region = UnionedRegion::from_contour(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(9.0, 0.0),
            Point2::new(9.0, 2.0),
            Point2::new(6.0, 2.0),
            Point2::new(6.0, 4.0),
            Point2::new(3.0, 4.0),
            Point2::new(3.0, 6.0),
            Point2::new(0.0, 6.0),
        ],
        vec![ElementId(1)],
        true,
    );

    let d = decompose(&region, &tol);
    assert!(d.exact);
    assert_relative_eq!(d.term_area(), region.area(), max_relative = 1e-6);
    for pair in d.terms.windows(2) {
        assert!(pair[0].area >= pair[1].area);
    }
}

#[test]
fn overlapping_same_key_footprints_do_not_double_count() {
    let tol = Tolerances::default();
    let footprints = vec![
        Footprint::new(rect(0.0, 0.0, 4.0, 4.0), ElementId(1)),
        Footprint::new(rect(2.0, 0.0, 4.0, 4.0), ElementId(2)),
    ];

    let regions = union_footprints(&footprints, &tol);
    assert_eq!(regions.len(), 1);
    // 16 + 16 overlapping by 8: the union holds 24, not 32
    assert_relative_eq!(regions[0].area(), 24.0, epsilon = 1e-9);

    let d = decompose(&regions[0], &tol);
    assert!(d.exact);
    assert_eq!(d.formula(), "6x4");
}

#[test]
fn disjoint_footprints_each_get_a_formula() {
    let tol = Tolerances::default();
    let footprints = vec![
        Footprint::new(rect(0.0, 0.0, 3.0, 2.0), ElementId(1)),
        Footprint::new(rect(20.0, 0.0, 2.0, 2.0), ElementId(2)),
    ];

    let regions = union_footprints(&footprints, &tol);
    assert_eq!(regions.len(), 2);

    let mut formulas: Vec<String> = regions
        .iter()
        .map(|r| decompose(r, &tol).formula())
        .collect();
    formulas.sort();
    assert_eq!(formulas, vec!["2x2".to_string(), "3x2".to_string()]);
}
