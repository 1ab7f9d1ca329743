//! `WorldRepository`: the persistence collaborator contract (spec.md §6),
//! scoped to the entities this engine actually models. Guilds, on-chain
//! entry-fee bookkeeping, and bounded per-agent memory are named in
//! spec.md's persistence collaborator bullet list but have no
//! corresponding type anywhere in the World Store, Ledger, or Action
//! Pipeline — they belong to the auth/chain collaborator and the guild
//! system spec.md explicitly puts out of scope (§1), so this trait omits
//! them rather than persist state nothing else ever produces.

use async_trait::async_trait;
use grid_geom::Vec2Xz;
use grid_proto::{ChatMessage, TerminalMessage};
use grid_world::{Agent, BlueprintPlan, WorldSnapshot};

use crate::error::PersistError;

/// Async persistence contract backing crash recovery of agents,
/// primitives, credits, and in-flight blueprint plans.
///
/// Every method may suspend (spec.md §5: "any step that touches the
/// persistence collaborator ... may suspend") — this is the one seam in
/// the engine where that is true; `grid-world`/`grid-ledger`/`grid-pipeline`
/// never suspend.
#[async_trait]
pub trait WorldRepository: Send + Sync {
    /// Persists the full world snapshot (agents, primitives, blueprint
    /// plans, tick, primitive revision), replacing any previous one. The
    /// single write-back operation the round-trip property is tested
    /// against.
    async fn save_snapshot(&self, snapshot: &WorldSnapshot) -> Result<(), PersistError>;

    /// Loads the most recently saved snapshot, or `None` on a cold start.
    async fn load_snapshot(&self) -> Result<Option<WorldSnapshot>, PersistError>;

    /// Upserts one agent's persisted record.
    async fn upsert_agent(&self, agent: &Agent) -> Result<(), PersistError>;

    /// Loads one agent's persisted record.
    async fn get_agent(&self, id: &str) -> Result<Option<Agent>, PersistError>;

    /// Updates only `last_seen_at` for an already-persisted agent.
    async fn touch_agent(&self, id: &str, now_ms: u64) -> Result<(), PersistError>;

    /// Lists every persisted agent within `radius` XZ units of `center`.
    async fn list_agents_in_radius(&self, center: Vec2Xz, radius: f64) -> Result<Vec<Agent>, PersistError>;

    /// Upserts one agent's active blueprint plan.
    async fn upsert_blueprint_plan(&self, plan: &BlueprintPlan) -> Result<(), PersistError>;

    /// Removes a completed, cancelled, or abandoned blueprint plan.
    async fn delete_blueprint_plan(&self, agent_id: &str) -> Result<(), PersistError>;

    /// Loads every in-flight blueprint plan, for boot recovery.
    async fn load_all_blueprint_plans(&self) -> Result<Vec<BlueprintPlan>, PersistError>;

    /// Appends one chat message to the durable log.
    async fn write_chat_message(&self, message: &ChatMessage) -> Result<(), PersistError>;

    /// Appends one terminal/system message to the durable log.
    async fn write_terminal_message(&self, message: &TerminalMessage) -> Result<(), PersistError>;

    /// Lists the most recent `limit` chat messages, oldest first.
    async fn list_recent_chat(&self, limit: usize) -> Result<Vec<ChatMessage>, PersistError>;

    /// Lists the most recent `limit` terminal messages, oldest first.
    async fn list_recent_terminal(&self, limit: usize) -> Result<Vec<TerminalMessage>, PersistError>;
}
