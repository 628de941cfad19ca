// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Story bucketing.
//!
//! Clusters the raw elevations actually present in the data into physical
//! levels, so intermediate or mezzanine stories absent from the reference
//! level list are still detected. Every record is guaranteed a bucket: an
//! elevation outside every cluster tolerance is assigned to the globally
//! nearest bucket rather than dropped.

use crate::model::ReferenceLevel;

/// Quantum used to deduplicate raw elevations before clustering
const ELEVATION_QUANTUM: f64 = 1e-3;

/// One detected physical level
#[derive(Debug, Clone)]
pub struct StoryBucket {
    /// Label from the nearest reference level within tolerance, or a
    /// synthesized `EL…` label from the cluster mean
    pub label: String,
    /// Mean elevation of the cluster
    pub elevation: f64,
}

/// Assigns raw elevations to detected story buckets
#[derive(Debug, Clone)]
pub struct StoryBucketer {
    /// Buckets sorted ascending by elevation
    buckets: Vec<StoryBucket>,
    tolerance: f64,
}

impl StoryBucketer {
    /// Detect story buckets from the elevations present in the data
    ///
    /// Walks the sorted distinct elevations, growing the current cluster
    /// while each next elevation stays within `tolerance` of the running
    /// cluster mean, then labels each closed cluster from the nearest
    /// reference level (within tolerance) or synthesizes a label.
    pub fn build(elevations: &[f64], levels: &[ReferenceLevel], tolerance: f64) -> Self {
        let mut distinct: Vec<i64> = elevations
            .iter()
            .map(|e| (e / ELEVATION_QUANTUM).round() as i64)
            .collect();
        distinct.sort_unstable();
        distinct.dedup();

        let mut buckets = Vec::new();
        let mut cluster: Vec<f64> = Vec::new();
        let mut running_sum = 0.0;

        for q in distinct {
            let elevation = q as f64 * ELEVATION_QUANTUM;
            let within = if cluster.is_empty() {
                true
            } else {
                let mean = running_sum / cluster.len() as f64;
                (elevation - mean).abs() <= tolerance
            };

            if !within {
                buckets.push(close_cluster(&cluster, running_sum, levels, tolerance));
                cluster.clear();
                running_sum = 0.0;
            }
            cluster.push(elevation);
            running_sum += elevation;
        }
        if !cluster.is_empty() {
            buckets.push(close_cluster(&cluster, running_sum, levels, tolerance));
        }

        Self { buckets, tolerance }
    }

    /// Detected buckets, ascending by elevation
    pub fn buckets(&self) -> &[StoryBucket] {
        &self.buckets
    }

    /// Bucket index for a raw elevation
    ///
    /// Prefers a bucket within the clustering tolerance; falls back to the
    /// globally nearest bucket so coverage is total. `None` only when no
    /// buckets exist (no input elevations).
    pub fn assign(&self, elevation: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, bucket) in self.buckets.iter().enumerate() {
            let dist = (elevation - bucket.elevation).abs();
            if dist <= self.tolerance {
                return Some(idx);
            }
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((idx, dist)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// Close a cluster: compute its mean and label it
fn close_cluster(
    cluster: &[f64],
    sum: f64,
    levels: &[ReferenceLevel],
    tolerance: f64,
) -> StoryBucket {
    let mean = sum / cluster.len() as f64;

    let mut best: Option<(&ReferenceLevel, f64)> = None;
    for level in levels {
        let dist = (mean - level.elevation).abs();
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((level, dist)),
        }
    }

    let label = match best {
        Some((level, dist)) if dist <= tolerance => level.label.clone(),
        _ => synthesize_label(mean),
    };

    StoryBucket {
        label,
        elevation: mean,
    }
}

/// Label for a detected level with no matching reference level
fn synthesize_label(mean: f64) -> String {
    if mean >= 0.0 {
        format!("EL+{mean:.2}")
    } else {
        format!("EL{mean:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(label: &str, elevation: f64) -> ReferenceLevel {
        ReferenceLevel {
            label: label.to_string(),
            elevation,
        }
    }

    #[test]
    fn test_three_clusters() {
        let elevations = [0.0, 0.05, 3.10, 3.15, 6.20];
        let bucketer = StoryBucketer::build(&elevations, &[], 0.2);
        let buckets = bucketer.buckets();

        assert_eq!(buckets.len(), 3);
        assert!((buckets[0].elevation - 0.025).abs() < 1e-9);
        assert!((buckets[1].elevation - 3.125).abs() < 1e-9);
        assert!((buckets[2].elevation - 6.20).abs() < 1e-9);
    }

    #[test]
    fn test_labels_from_reference_levels() {
        let elevations = [0.02, 3.12];
        let levels = [level("Ground", 0.0), level("Level 1", 3.10)];
        let bucketer = StoryBucketer::build(&elevations, &levels, 0.2);

        assert_eq!(bucketer.buckets()[0].label, "Ground");
        assert_eq!(bucketer.buckets()[1].label, "Level 1");
    }

    #[test]
    fn test_synthesized_label_for_mezzanine() {
        // 1.55 is far from both reference levels
        let elevations = [0.0, 1.55, 3.10];
        let levels = [level("Ground", 0.0), level("Level 1", 3.10)];
        let bucketer = StoryBucketer::build(&elevations, &levels, 0.2);

        assert_eq!(bucketer.buckets().len(), 3);
        assert_eq!(bucketer.buckets()[1].label, "EL+1.55");
    }

    #[test]
    fn test_assignment_covers_every_elevation() {
        let elevations = [0.0, 0.05, 3.10, 3.15, 6.20];
        let bucketer = StoryBucketer::build(&elevations, &[], 0.2);

        for &e in &elevations {
            assert!(bucketer.assign(e).is_some());
        }
        // Within-tolerance elevations of the same cluster share a bucket
        assert_eq!(bucketer.assign(0.0), bucketer.assign(0.05));
        assert_eq!(bucketer.assign(3.10), bucketer.assign(3.15));
        assert_ne!(bucketer.assign(0.0), bucketer.assign(6.20));
    }

    #[test]
    fn test_out_of_tolerance_elevation_takes_nearest_bucket() {
        let elevations = [0.0, 6.0];
        let bucketer = StoryBucketer::build(&elevations, &[], 0.2);

        // 2.0 matches no bucket within tolerance, nearest is 0.0
        assert_eq!(bucketer.assign(2.0), Some(0));
        assert_eq!(bucketer.assign(5.0), Some(1));
    }

    #[test]
    fn test_no_elevations_no_buckets() {
        let bucketer = StoryBucketer::build(&[], &[], 0.2);
        assert!(bucketer.buckets().is_empty());
        assert_eq!(bucketer.assign(1.0), None);
    }

    #[test]
    fn test_negative_elevation_label() {
        let elevations = [-2.8];
        let bucketer = StoryBucketer::build(&elevations, &[], 0.2);
        assert_eq!(bucketer.buckets()[0].label, "EL-2.80");
    }
}
