// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Policy constants and server settings, loaded as one config value through
//! [`crate::ConfigService`]. Defaults match spec.md §6 exactly; `grid-geom`
//! keeps the same numbers as plain constants so its own unit tests don't
//! need to depend on this crate.

use serde::{Deserialize, Serialize};

/// Tunable policy thresholds and server settings for a running `gridd`
/// instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Credit cost of placing a single primitive.
    pub primitive_cost: u64,
    /// Minimum XZ distance from the world origin a primitive may be placed.
    pub min_origin_exclusion: f64,
    /// Minimum XZ distance from the acting agent to a build target.
    pub min_build_range: f64,
    /// Maximum XZ distance from the acting agent to a build target.
    pub max_build_range: f64,
    /// Primitive count below which settlement-proximity checks are bypassed.
    pub settlement_threshold: usize,
    /// Maximum allowed distance to the nearest existing primitive.
    pub settlement_max: f64,
    /// Distance at/above which the expansion gate is consulted.
    pub frontier_min: f64,
    /// Upper bound used when classifying frontier-type open areas.
    pub frontier_max: f64,
    /// Minimum structure count a nearby node must have before
    /// frontier-distance building is permitted.
    pub node_expansion_gate: u32,
    /// Tolerance, in world units, within which a provided `y` is accepted
    /// without a `correctedY` snap.
    pub y_snap_tolerance: f64,
    /// Daily credit refill for an agent with no guild, applied on a rolling
    /// 24h window from `joined_at`.
    pub refill_solo_per_day: u64,
    /// Daily credit refill for an agent in a guild, applied the same way.
    pub refill_guild_per_day: u64,
    /// Address `gridd` binds its HTTP/WS listener to.
    pub bind_addr: std::net::SocketAddr,
    /// Milliseconds between simulation clock ticks.
    pub tick_interval_ms: u64,
    /// Milliseconds between liveness sweeper passes.
    pub liveness_sweep_interval_ms: u64,
    /// Milliseconds of inactivity after which an agent is marked offline by
    /// the liveness sweeper.
    pub liveness_timeout_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            primitive_cost: grid_geom::constants::PRIMITIVE_COST,
            min_origin_exclusion: grid_geom::constants::MIN_ORIGIN_EXCLUSION,
            min_build_range: grid_geom::constants::MIN_BUILD_RANGE,
            max_build_range: grid_geom::constants::MAX_BUILD_RANGE,
            settlement_threshold: grid_geom::constants::SETTLEMENT_THRESHOLD,
            settlement_max: grid_geom::constants::SETTLEMENT_MAX,
            frontier_min: grid_geom::constants::FRONTIER_MIN,
            frontier_max: grid_geom::constants::FRONTIER_MAX,
            node_expansion_gate: grid_geom::constants::NODE_EXPANSION_GATE,
            y_snap_tolerance: grid_geom::constants::Y_SNAP_TOLERANCE,
            refill_solo_per_day: 500,
            refill_guild_per_day: 750,
            bind_addr: std::net::SocketAddr::from(([0, 0, 0, 0], 7777)),
            tick_interval_ms: 1000,
            liveness_sweep_interval_ms: 5000,
            liveness_timeout_ms: 30_000,
        }
    }
}
