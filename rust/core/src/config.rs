// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Numeric tolerances used across the audit pipeline.
//!
//! These values are engineering judgment calls tuned against real models,
//! not hard invariants. All of them can be overridden per run.

use crate::error::{Error, Result};

/// Default snap distance when matching a coordinate to a reference grid
/// line, in model units (m)
pub const DEFAULT_GRID_SNAP: f64 = 0.25;

/// Default clustering tolerance when bucketing raw elevations into
/// physical stories, in model units (m)
pub const DEFAULT_STORY_TOLERANCE: f64 = 0.20;

/// Default quantum used to round scalar key components before hashing
pub const DEFAULT_KEY_QUANTUM: f64 = 1e-3;

/// Relative tolerance for treating a region as filling its bounding
/// envelope (single-rectangle fast path)
pub const DEFAULT_ENVELOPE_MATCH: f64 = 0.01;

/// Minimum solid fraction (region area / envelope area) before a
/// subtractive decomposition is attempted
pub const DEFAULT_SOLID_FRACTION_GATE: f64 = 0.6;

/// Absolute area below which a polygon piece is considered degenerate
pub const DEFAULT_AREA_EPSILON: f64 = 1e-9;

/// Gap tolerance when merging adjacent decomposition strips or collinear
/// line segments
pub const DEFAULT_MERGE_GAP: f64 = 1e-6;

/// Tolerances for one audit run
#[derive(Debug, Clone, Copy)]
pub struct Tolerances {
    /// Grid label snap distance (m)
    pub grid_snap: f64,
    /// Story clustering tolerance (m)
    pub story: f64,
    /// Rounding quantum for grouping-key scalars
    pub key_quantum: f64,
    /// Relative envelope-fill match for the rectangle fast path
    pub envelope_match: f64,
    /// Solid-fraction gate for the subtractive strategy
    pub solid_fraction_gate: f64,
    /// Degenerate-area threshold
    pub area_epsilon: f64,
    /// Strip/segment merge gap
    pub merge_gap: f64,
}

impl Tolerances {
    /// Override the grid snap distance
    pub fn with_grid_snap(mut self, snap: f64) -> Self {
        self.grid_snap = snap;
        self
    }

    /// Override the story clustering tolerance
    pub fn with_story_tolerance(mut self, tolerance: f64) -> Self {
        self.story = tolerance;
        self
    }

    /// Check that every tolerance is usable
    ///
    /// Distances, quanta and gates must be finite and positive; the
    /// envelope match and solid-fraction gate must stay below 1.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("grid_snap", self.grid_snap),
            ("story", self.story),
            ("key_quantum", self.key_quantum),
            ("envelope_match", self.envelope_match),
            ("solid_fraction_gate", self.solid_fraction_gate),
            ("area_epsilon", self.area_epsilon),
            ("merge_gap", self.merge_gap),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidTolerance(format!("{name} = {value}")));
            }
        }
        if self.envelope_match >= 1.0 {
            return Err(Error::InvalidTolerance(format!(
                "envelope_match = {}",
                self.envelope_match
            )));
        }
        if self.solid_fraction_gate >= 1.0 {
            return Err(Error::InvalidTolerance(format!(
                "solid_fraction_gate = {}",
                self.solid_fraction_gate
            )));
        }
        Ok(())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            grid_snap: DEFAULT_GRID_SNAP,
            story: DEFAULT_STORY_TOLERANCE,
            key_quantum: DEFAULT_KEY_QUANTUM,
            envelope_match: DEFAULT_ENVELOPE_MATCH,
            solid_fraction_gate: DEFAULT_SOLID_FRACTION_GATE,
            area_epsilon: DEFAULT_AREA_EPSILON,
            merge_gap: DEFAULT_MERGE_GAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tolerances::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_tolerance_is_rejected() {
        let tol = Tolerances::default().with_grid_snap(0.0);
        assert!(tol.validate().is_err());

        let tol = Tolerances::default().with_story_tolerance(f64::NAN);
        assert!(tol.validate().is_err());
    }

    #[test]
    fn test_relative_gates_must_stay_below_one() {
        let mut tol = Tolerances::default();
        tol.solid_fraction_gate = 1.5;
        assert!(tol.validate().is_err());
    }
}
