//! Entity-tagged read surfaces: `state-lite`, `agents-lite`, `state`, and
//! `spatial-summary`.

use grid_geom::Vec3;
use grid_world::{Agent, AgentStatus, BlueprintPlan, Primitive};
use serde::{Deserialize, Serialize};

/// A chat or terminal broadcast entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Monotonically increasing id, assigned in commit order.
    pub id: u64,
    /// Author agent id.
    pub agent_id: String,
    /// Author display name, denormalized for display without a join.
    pub agent_name: String,
    /// Message body.
    pub message: String,
    /// Commit timestamp, in epoch milliseconds.
    pub created_at: u64,
}

/// A system/terminal broadcast entry (build confirmations, directive
/// transitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalMessage {
    /// Monotonically increasing id, assigned in commit order.
    pub id: u64,
    /// Message body.
    pub message: String,
    /// Commit timestamp, in epoch milliseconds.
    pub created_at: u64,
}

/// The cheapest read surface: enough for a client to decide whether to
/// fetch anything heavier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateLite {
    /// Current simulation tick.
    pub tick: u64,
    /// Current primitive revision.
    pub primitive_revision: u64,
    /// Count of agents not marked offline by the liveness sweeper.
    pub agents_online: u32,
    /// Total primitive count.
    pub primitive_count: u32,
    /// Id of the most recent terminal message, if any.
    pub latest_terminal_message_id: Option<u64>,
    /// Id of the most recent chat message, if any.
    pub latest_chat_message_id: Option<u64>,
}

/// One agent's position/status, as exposed by `agents-lite`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentLite {
    /// Agent id.
    pub id: String,
    /// Current world position.
    pub position: Vec3,
    /// Current status.
    pub status: AgentStatus,
}

/// The cheap per-tick surface for rendering other agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsLite {
    /// Current simulation tick.
    pub tick: u64,
    /// One entry per online agent.
    pub agents: Vec<AgentLite>,
}

/// Full world snapshot: every agent, every primitive, and the most recent
/// chat/terminal messages (capped at 30 each).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Current simulation tick.
    pub tick: u64,
    /// Current primitive revision.
    pub primitive_revision: u64,
    /// Every online agent.
    pub agents: Vec<Agent>,
    /// Every placed primitive.
    pub primitives: Vec<Primitive>,
    /// Every agent's active blueprint plan, if any.
    pub blueprint_plans: Vec<BlueprintPlan>,
    /// Most recent chat messages, oldest first, capped at 30.
    pub recent_chat: Vec<ChatMessage>,
    /// Most recent terminal messages, oldest first, capped at 30.
    pub recent_terminal: Vec<TerminalMessage>,
}

/// Computes the entity tag for `state-lite`: a compound hash of the fields
/// that make it up, so any field change invalidates it.
pub fn state_lite_tag(s: &StateLite) -> String {
    let tuple = (
        s.tick,
        s.primitive_revision,
        s.agents_online,
        s.primitive_count,
        s.latest_terminal_message_id,
        s.latest_chat_message_id,
    );
    hash_tuple(&tuple)
}

/// Computes the entity tag for `agents-lite`: a hash of the sorted
/// `(id, position, status)` tuples, so reordering agents doesn't spuriously
/// invalidate the cache.
pub fn agents_lite_tag(agents: &[AgentLite]) -> String {
    let mut rows: Vec<(String, (f64, f64, f64), AgentStatus)> = agents
        .iter()
        .map(|a| (a.id.clone(), (a.position.x, a.position.y, a.position.z), a.status))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    hash_tuple(&rows)
}

/// Computes the entity tag for `state`: composes the revision with the
/// `agents-lite` positional hash and the latest message ids.
pub fn state_tag(primitive_revision: u64, agents: &[AgentLite], latest_chat_id: Option<u64>, latest_terminal_id: Option<u64>) -> String {
    format!(
        "{primitive_revision}-{}-{}-{}",
        agents_lite_tag(agents),
        latest_chat_id.map_or_else(|| "none".to_string(), |id| id.to_string()),
        latest_terminal_id.map_or_else(|| "none".to_string(), |id| id.to_string())
    )
}

/// Computes the entity tag for `spatial-summary`: just the revision it was
/// computed from, since the analyzer is a pure function of the primitive
/// set.
pub fn spatial_summary_tag(primitive_revision: u64) -> String {
    format!("spatial-{primitive_revision}")
}

fn hash_tuple<T: Serialize>(value: &T) -> String {
    let mut bytes = Vec::new();
    if ciborium::ser::into_writer(value, &mut bytes).is_err() {
        return "unhashable".to_string();
    }
    blake3::hash(&bytes).to_hex().to_string()
}
