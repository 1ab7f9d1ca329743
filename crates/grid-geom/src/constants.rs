//! Default tunable thresholds (spec.md §6 "Policy constants").
//!
//! These are the geometry module's own defaults; `grid-app-core::PolicyConfig`
//! exposes the same values as configurable fields and is the source of truth
//! at runtime. The constants live here too so `grid-geom`'s unit tests don't
//! need to depend on the config crate.

/// Credit cost of placing a single primitive.
pub const PRIMITIVE_COST: u64 = 1;
/// Minimum distance (XZ) from the world origin a primitive may be placed.
pub const MIN_ORIGIN_EXCLUSION: f64 = 50.0;
/// Minimum XZ distance from the acting agent to a build target.
pub const MIN_BUILD_RANGE: f64 = 2.0;
/// Maximum XZ distance from the acting agent to a build target.
pub const MAX_BUILD_RANGE: f64 = 20.0;
/// Primitive count below which settlement-proximity checks are bypassed
/// (bootstrap phase).
pub const SETTLEMENT_THRESHOLD: usize = 5;
/// Maximum allowed distance to the nearest existing primitive.
pub const SETTLEMENT_MAX: f64 = 601.0;
/// Distance at/above which the expansion gate is consulted.
pub const FRONTIER_MIN: f64 = 200.0;
/// Upper bound used when classifying frontier-type open areas.
pub const FRONTIER_MAX: f64 = 600.0;
/// Minimum structure count a nearby node must have before frontier-distance
/// building is permitted.
pub const NODE_EXPANSION_GATE: u32 = 25;
/// Tolerance, in world units, within which a provided `y` is accepted
/// without a `correctedY` snap.
pub const Y_SNAP_TOLERANCE: f64 = 0.01;
