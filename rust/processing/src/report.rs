// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The audit report aggregation tree.
//!
//! Report → story → category group → entry. Every level stores the vector
//! sum of its children; the sums are built bottom-up at construction and
//! [`Report::verify`] re-checks them before handoff to a renderer. The
//! tree is immutable once produced.

use crate::force::ForceVector;
use loadaudit_core::{ElementId, LoadCategory};

/// One audited load line: a location, a geometric explanation and the
/// resulting force
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuditEntry {
    /// Resolved grid location label
    pub location: String,
    /// Geometric formula ("4x3 + 2x3", "L=7.00", "3x12.5")
    pub formula: String,
    /// Covered quantity (m², m or piece count)
    pub quantity: f64,
    /// Unit of the covered quantity
    pub quantity_unit: &'static str,
    /// Signed load intensity
    pub unit_load: f64,
    /// Unit of the load intensity
    pub unit_load_unit: &'static str,
    /// Direction label as read from the record
    pub direction: &'static str,
    /// Signed total force along the resolved direction, kN
    pub total: f64,
    /// Global force components, kN
    pub force: ForceVector,
    /// Contributing elements, sorted
    pub members: Vec<ElementId>,
    /// Structural category
    pub category: LoadCategory,
    /// False when the geometry was merged loosely or decomposed
    /// approximately; the formula is then an estimate
    pub exact: bool,
}

/// All entries of one category within a story
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CategoryGroup {
    pub category: LoadCategory,
    pub entries: Vec<AuditEntry>,
    /// Sum of the entries' force vectors
    pub subtotal: ForceVector,
}

impl CategoryGroup {
    /// Build a group, computing the subtotal from its entries
    pub fn new(category: LoadCategory, entries: Vec<AuditEntry>) -> Self {
        let subtotal = entries.iter().map(|e| e.force).sum();
        Self {
            category,
            entries,
            subtotal,
        }
    }
}

/// All category groups of one physical level
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StoryReport {
    pub label: String,
    pub elevation: f64,
    pub groups: Vec<CategoryGroup>,
    /// Sum of the group subtotals
    pub subtotal: ForceVector,
}

impl StoryReport {
    pub fn new(label: String, elevation: f64, groups: Vec<CategoryGroup>) -> Self {
        let subtotal = groups.iter().map(|g| g.subtotal).sum();
        Self {
            label,
            elevation,
            groups,
            subtotal,
        }
    }
}

/// A completed audit run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    /// Load pattern the run audited
    pub pattern: String,
    /// Stories, top-down
    pub stories: Vec<StoryReport>,
    /// Sum of the story subtotals
    pub total: ForceVector,
}

impl Report {
    pub fn new(pattern: String, stories: Vec<StoryReport>) -> Self {
        let total = stories.iter().map(|s| s.subtotal).sum();
        Self {
            pattern,
            stories,
            total,
        }
    }

    /// Re-check the vector-sum invariant at every level
    ///
    /// True when each subtotal equals the sum of its children within
    /// `epsilon` per component. The pipeline guarantees this holds; a
    /// renderer may call it as a handoff assertion.
    pub fn verify(&self, epsilon: f64) -> bool {
        for story in &self.stories {
            for group in &story.groups {
                let sum: ForceVector = group.entries.iter().map(|e| e.force).sum();
                if !sum.approx_eq(&group.subtotal, epsilon) {
                    return false;
                }
            }
            let sum: ForceVector = story.groups.iter().map(|g| g.subtotal).sum();
            if !sum.approx_eq(&story.subtotal, epsilon) {
                return false;
            }
        }
        let sum: ForceVector = self.stories.iter().map(|s| s.subtotal).sum();
        sum.approx_eq(&self.total, epsilon)
    }

    /// Total number of entries across the tree
    pub fn entry_count(&self) -> usize {
        self.stories
            .iter()
            .flat_map(|s| &s.groups)
            .map(|g| g.entries.len())
            .sum()
    }
}
