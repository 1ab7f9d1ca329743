//! Online agents.

use grid_geom::Vec3;
use serde::{Deserialize, Serialize};

/// Activity state of an online agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgentStatus {
    /// Not moving, not building, not chatting.
    Idle,
    /// Interpolating toward `target_position`.
    Moving,
    /// A build action is being applied (transient; set and cleared within a
    /// single action).
    Building,
    /// A chat action is being applied.
    Chatting,
}

/// An online agent: identity, position, and presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Server-minted identifier.
    pub id: String,
    /// Lowercase wallet address; the external principal.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Optional free-text bio.
    pub bio: Option<String>,
    /// Current world-space position.
    pub position: Vec3,
    /// Where the agent is moving toward; equals `position` when idle.
    pub target_position: Vec3,
    /// Current activity state.
    pub status: AgentStatus,
    /// Unix milliseconds of the last request or heartbeat seen from this
    /// agent.
    pub last_seen_at: u64,
}

impl Agent {
    /// Creates a new agent standing still at `position`.
    pub fn new(id: String, owner_id: String, name: String, color: String, position: Vec3, now_ms: u64) -> Self {
        Self {
            id,
            owner_id,
            name,
            color,
            bio: None,
            position,
            target_position: position,
            status: AgentStatus::Idle,
            last_seen_at: now_ms,
        }
    }

    /// True once `last_seen_at` is older than `horizon_ms`.
    pub fn is_stale(&self, now_ms: u64, horizon_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_seen_at) > horizon_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staleness_uses_a_saturating_horizon() {
        let agent = Agent::new(
            "a1".into(),
            "0xabc".into(),
            "Ada".into(),
            "#fff".into(),
            Vec3::ZERO,
            1_000,
        );
        assert!(!agent.is_stale(1_500, 1_000));
        assert!(agent.is_stale(3_000, 1_000));
    }
}
