//! In-memory `WorldRepository`, generalizing `echo-cas::MemoryTier`'s
//! trait-plus-in-memory-impl shape. Sufficient to exercise crash recovery
//! and the round-trip property without a real database, which spec.md §1
//! keeps explicitly out of scope.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use grid_geom::{distance_xz, Vec2Xz};
use grid_proto::{ChatMessage, TerminalMessage};
use grid_world::{Agent, BlueprintPlan, WorldSnapshot};

use crate::error::PersistError;
use crate::repository::WorldRepository;

#[derive(Debug, Default)]
struct Inner {
    snapshot: Option<WorldSnapshot>,
    agents: HashMap<String, Agent>,
    blueprint_plans: HashMap<String, BlueprintPlan>,
    chat: Vec<ChatMessage>,
    terminal: Vec<TerminalMessage>,
}

/// A process-local `WorldRepository`, guarded by one `tokio::sync::RwLock`
/// so reads don't serialize against each other the way the coarse
/// `parking_lot::Mutex` in `grid-world` does.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: RwLock<Inner>,
}

impl InMemoryRepository {
    /// Builds an empty repository (a cold start).
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorldRepository for InMemoryRepository {
    async fn save_snapshot(&self, snapshot: &WorldSnapshot) -> Result<(), PersistError> {
        self.inner.write().await.snapshot = Some(snapshot.clone());
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<WorldSnapshot>, PersistError> {
        Ok(self.inner.read().await.snapshot.clone())
    }

    async fn upsert_agent(&self, agent: &Agent) -> Result<(), PersistError> {
        self.inner.write().await.agents.insert(agent.id.clone(), agent.clone());
        Ok(())
    }

    async fn get_agent(&self, id: &str) -> Result<Option<Agent>, PersistError> {
        Ok(self.inner.read().await.agents.get(id).cloned())
    }

    async fn touch_agent(&self, id: &str, now_ms: u64) -> Result<(), PersistError> {
        let mut inner = self.inner.write().await;
        let agent = inner.agents.get_mut(id).ok_or_else(|| PersistError::AgentNotFound(id.to_string()))?;
        agent.last_seen_at = now_ms;
        Ok(())
    }

    async fn list_agents_in_radius(&self, center: Vec2Xz, radius: f64) -> Result<Vec<Agent>, PersistError> {
        let inner = self.inner.read().await;
        Ok(inner
            .agents
            .values()
            .filter(|a| distance_xz(center, a.position.to_xz()) <= radius)
            .cloned()
            .collect())
    }

    async fn upsert_blueprint_plan(&self, plan: &BlueprintPlan) -> Result<(), PersistError> {
        self.inner
            .write()
            .await
            .blueprint_plans
            .insert(plan.agent_id.clone(), plan.clone());
        Ok(())
    }

    async fn delete_blueprint_plan(&self, agent_id: &str) -> Result<(), PersistError> {
        self.inner.write().await.blueprint_plans.remove(agent_id);
        Ok(())
    }

    async fn load_all_blueprint_plans(&self) -> Result<Vec<BlueprintPlan>, PersistError> {
        Ok(self.inner.read().await.blueprint_plans.values().cloned().collect())
    }

    async fn write_chat_message(&self, message: &ChatMessage) -> Result<(), PersistError> {
        self.inner.write().await.chat.push(message.clone());
        Ok(())
    }

    async fn write_terminal_message(&self, message: &TerminalMessage) -> Result<(), PersistError> {
        self.inner.write().await.terminal.push(message.clone());
        Ok(())
    }

    async fn list_recent_chat(&self, limit: usize) -> Result<Vec<ChatMessage>, PersistError> {
        let inner = self.inner.read().await;
        let start = inner.chat.len().saturating_sub(limit);
        Ok(inner.chat[start..].to_vec())
    }

    async fn list_recent_terminal(&self, limit: usize) -> Result<Vec<TerminalMessage>, PersistError> {
        let inner = self.inner.read().await;
        let start = inner.terminal.len().saturating_sub(limit);
        Ok(inner.terminal[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_world::AgentStatus;

    fn agent(id: &str) -> Agent {
        Agent {
            id: id.to_string(),
            owner_id: format!("0x{id}"),
            name: id.to_string(),
            color: "#fff".to_string(),
            bio: None,
            position: grid_geom::Vec3::new(0.0, 0.0, 0.0),
            target_position: grid_geom::Vec3::new(0.0, 0.0, 0.0),
            status: AgentStatus::Idle,
            last_seen_at: 0,
        }
    }

    #[tokio::test]
    async fn cold_start_has_no_snapshot() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_snapshot().await.unwrap(), None);
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_save_and_load() {
        let repo = InMemoryRepository::new();
        let snapshot = WorldSnapshot {
            agents: vec![agent("a1")],
            primitives: vec![],
            blueprint_plans: vec![],
            tick: 42,
            primitive_revision: 7,
        };
        repo.save_snapshot(&snapshot).await.unwrap();
        let loaded = repo.load_snapshot().await.unwrap();
        assert_eq!(loaded, Some(snapshot));
    }

    #[tokio::test]
    async fn touch_agent_requires_an_existing_record() {
        let repo = InMemoryRepository::new();
        let err = repo.touch_agent("ghost", 100).await.unwrap_err();
        assert_eq!(err, PersistError::AgentNotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn blueprint_plans_round_trip_for_boot_recovery() {
        let repo = InMemoryRepository::new();
        let plan = crate::tests_support::sample_plan("a1");
        repo.upsert_blueprint_plan(&plan).await.unwrap();
        let loaded = repo.load_all_blueprint_plans().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].agent_id, "a1");

        repo.delete_blueprint_plan("a1").await.unwrap();
        assert!(repo.load_all_blueprint_plans().await.unwrap().is_empty());
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use grid_geom::Vec2Xz;
    use grid_world::BlueprintPlan;

    pub fn sample_plan(agent_id: &str) -> BlueprintPlan {
        BlueprintPlan {
            agent_id: agent_id.to_string(),
            blueprint_name: "BRIDGE".to_string(),
            anchor: Vec2Xz::new(120.0, 120.0),
            all_primitives: vec![],
            phases: vec![],
            total_primitives: 0,
            placed_count: 0,
            failed_count: 0,
            next_index: 0,
            started_at: 0,
        }
    }
}
