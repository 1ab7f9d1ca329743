//! Revision-keyed cache over [`analyze`]: the analyzer is a pure function
//! of the primitive set, so it only needs to re-run when `primitiveRevision`
//! changes.

use std::sync::Mutex;

use grid_geom::{distance_xz, NodeDensityOracle, Vec2Xz};
use grid_world::Primitive;

use crate::analyze::analyze;
use crate::types::SpatialSummary;

struct Inner {
    revision: Option<u64>,
    summary: SpatialSummary,
}

/// Caches the last [`SpatialSummary`] computed, recomputing only when the
/// world's `primitiveRevision` has advanced.
pub struct AnalysisCache {
    inner: Mutex<Inner>,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisCache {
    /// Builds an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                revision: None,
                summary: SpatialSummary::default(),
            }),
        }
    }

    /// Returns the cached summary if it matches `revision`, recomputing
    /// from `primitives` otherwise.
    pub fn get_or_compute(&self, primitives: &[Primitive], revision: u64) -> SpatialSummary {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.revision != Some(revision) {
            guard.summary = analyze(primitives, revision);
            guard.revision = Some(revision);
        }
        guard.summary.clone()
    }
}

impl NodeDensityOracle for AnalysisCache {
    fn nearest_node_density(&self, point: Vec2Xz) -> Option<(String, u32)> {
        let guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .summary
            .nodes
            .iter()
            .min_by(|a, b| distance_xz(point, a.centroid).total_cmp(&distance_xz(point, b.centroid)))
            .map(|n| (n.name.clone(), n.structure_count))
    }
}
