//! The authoritative in-memory world: agents, primitives, and blueprint
//! plans, behind a single coarse lock (spec §5: "a single coarse mutex over
//! the world state is acceptable").

use std::collections::HashMap;

use parking_lot::Mutex;

use grid_geom::{Aabb, Vec2Xz, Vec3};

use crate::agent::{Agent, AgentStatus};
use crate::blueprint::BlueprintPlan;
use crate::error::StoreError;
use crate::primitive::Primitive;

/// Reason a candidate primitive was rejected by the closure passed to
/// [`WorldStore::try_insert_primitive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceRejection {
    /// The candidate overlaps existing non-exempt geometry.
    Overlap,
    /// The candidate failed a validity check unrelated to overlap (e.g. a
    /// non-finite coordinate).
    Invalid(String),
}

#[derive(Debug, Default)]
struct Inner {
    agents: HashMap<String, Agent>,
    agent_by_owner: HashMap<String, String>,
    primitives: Vec<Primitive>,
    blueprint_plans: HashMap<String, BlueprintPlan>,
    tick: u64,
    primitive_revision: u64,
}

/// A full persistence snapshot of the world, used for boot recovery and the
/// round-trip invariant.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct WorldSnapshot {
    /// Every online agent at snapshot time.
    pub agents: Vec<Agent>,
    /// Every placed primitive, in insertion order.
    pub primitives: Vec<Primitive>,
    /// Every active blueprint plan, keyed by agent id.
    pub blueprint_plans: Vec<BlueprintPlan>,
    /// Tick counter at snapshot time.
    pub tick: u64,
    /// Primitive revision at snapshot time.
    pub primitive_revision: u64,
}

/// The authoritative world store.
#[derive(Debug, Default)]
pub struct WorldStore {
    inner: Mutex<Inner>,
}

impl WorldStore {
    /// Builds an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a world from a persisted snapshot. Used at boot; does not
    /// reset `primitive_revision` to zero so readers who cached the old
    /// revision correctly treat it as changed going forward is left to the
    /// caller (invariant 9 only requires monotonicity from this point on).
    pub fn restore(snapshot: WorldSnapshot) -> Self {
        let mut agent_by_owner = HashMap::new();
        for agent in &snapshot.agents {
            agent_by_owner.insert(agent.owner_id.clone(), agent.id.clone());
        }
        let mut blueprint_plans = HashMap::new();
        for plan in snapshot.blueprint_plans {
            blueprint_plans.insert(plan.agent_id.clone(), plan);
        }
        let agents = snapshot
            .agents
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                agents,
                agent_by_owner,
                primitives: snapshot.primitives,
                blueprint_plans,
                tick: snapshot.tick,
                primitive_revision: snapshot.primitive_revision,
            }),
        }
    }

    /// Captures the current state for persistence.
    pub fn snapshot(&self) -> WorldSnapshot {
        let inner = self.lock();
        WorldSnapshot {
            agents: inner.agents.values().cloned().collect(),
            primitives: inner.primitives.clone(),
            blueprint_plans: inner.blueprint_plans.values().cloned().collect(),
            tick: inner.tick,
            primitive_revision: inner.primitive_revision,
        }
    }

    fn lock(&self) -> parking_lot::MutexGuard<'_, Inner> {
        self.inner.lock()
    }

    // --- Agents --------------------------------------------------------

    /// Registers an online agent. If the owner wallet already has an online
    /// agent, that prior session is evicted and returned (single-session-
    /// per-owner invariant).
    pub fn add_agent(&self, agent: Agent) -> Option<Agent> {
        let mut inner = self.lock();
        let previous = inner
            .agent_by_owner
            .get(&agent.owner_id)
            .cloned()
            .and_then(|old_id| inner.agents.remove(&old_id));
        inner
            .agent_by_owner
            .insert(agent.owner_id.clone(), agent.id.clone());
        inner.agents.insert(agent.id.clone(), agent);
        previous
    }

    /// Removes an agent's online session.
    pub fn remove_agent(&self, id: &str) -> Result<Agent, StoreError> {
        let mut inner = self.lock();
        let agent = inner
            .agents
            .remove(id)
            .ok_or_else(|| StoreError::AgentNotFound(id.to_string()))?;
        inner.agent_by_owner.remove(&agent.owner_id);
        Ok(agent)
    }

    /// Reads an agent by id.
    pub fn get_agent(&self, id: &str) -> Option<Agent> {
        self.lock().agents.get(id).cloned()
    }

    /// Updates `last_seen_at`.
    pub fn touch_agent(&self, id: &str, now_ms: u64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let agent = inner
            .agents
            .get_mut(id)
            .ok_or_else(|| StoreError::AgentNotFound(id.to_string()))?;
        agent.last_seen_at = now_ms;
        Ok(())
    }

    /// Immediately relocates an agent, bypassing movement interpolation.
    pub fn teleport_agent(&self, id: &str, x: f64, z: f64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let agent = inner
            .agents
            .get_mut(id)
            .ok_or_else(|| StoreError::AgentNotFound(id.to_string()))?;
        let next = Vec3::new(x, agent.position.y, z);
        agent.position = next;
        agent.target_position = next;
        agent.status = AgentStatus::Idle;
        Ok(())
    }

    /// Sets a movement target; the simulation clock interpolates toward it
    /// on subsequent [`WorldStore::advance_movement`] calls.
    pub fn set_move_target(&self, id: &str, x: f64, z: f64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let agent = inner
            .agents
            .get_mut(id)
            .ok_or_else(|| StoreError::AgentNotFound(id.to_string()))?;
        agent.target_position = Vec3::new(x, agent.position.y, z);
        agent.status = AgentStatus::Moving;
        Ok(())
    }

    /// Advances every moving agent toward its target by `speed * dt_secs`,
    /// clamping at arrival and returning to `idle`.
    pub fn advance_movement(&self, dt_secs: f64, speed: f64) {
        let mut inner = self.lock();
        for agent in inner.agents.values_mut() {
            if agent.status != AgentStatus::Moving {
                continue;
            }
            let delta = agent.target_position.sub(agent.position);
            let dist = (delta.x * delta.x + delta.z * delta.z).sqrt();
            let step = speed * dt_secs;
            if dist <= step || dist == 0.0 {
                agent.position = agent.target_position;
                agent.status = AgentStatus::Idle;
            } else {
                let ratio = step / dist;
                agent.position = Vec3::new(
                    agent.position.x + delta.x * ratio,
                    agent.position.y,
                    agent.position.z + delta.z * ratio,
                );
            }
        }
    }

    /// Snapshot of every online agent.
    pub fn list_agents(&self) -> Vec<Agent> {
        self.lock().agents.values().cloned().collect()
    }

    /// Agents within `radius` (XZ) of `center`.
    pub fn list_agents_in_radius(&self, center: Vec2Xz, radius: f64) -> Vec<Agent> {
        self.lock()
            .agents
            .values()
            .filter(|a| grid_geom::distance_xz(a.position.to_xz(), center) <= radius)
            .cloned()
            .collect()
    }

    // --- Primitives ------------------------------------------------------

    /// Attempts to insert a primitive. `build` receives a consistent
    /// snapshot of the current primitives (the same one a concurrent reader
    /// would see) and either returns the finished primitive to insert or a
    /// rejection reason. Nothing is mutated on rejection.
    pub fn try_insert_primitive(
        &self,
        build: impl FnOnce(&[Primitive]) -> Result<Primitive, PlaceRejection>,
    ) -> Result<Primitive, PlaceRejection> {
        let mut inner = self.lock();
        let primitive = build(&inner.primitives)?;
        inner.primitives.push(primitive.clone());
        inner.primitive_revision += 1;
        Ok(primitive)
    }

    /// Removes a primitive owned by `requesting_agent`.
    pub fn remove_primitive(&self, id: &str, requesting_agent: &str) -> Result<Primitive, StoreError> {
        let mut inner = self.lock();
        let pos = inner
            .primitives
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::PrimitiveNotFound(id.to_string()))?;
        if inner.primitives[pos].owner_agent_id != requesting_agent {
            return Err(StoreError::NotOwner {
                agent: requesting_agent.to_string(),
                primitive: id.to_string(),
            });
        }
        let removed = inner.primitives.remove(pos);
        inner.primitive_revision += 1;
        Ok(removed)
    }

    /// Removes every primitive (used by the persistence collaborator's
    /// `clearAllPrimitives` recovery path).
    pub fn clear_all_primitives(&self) {
        let mut inner = self.lock();
        if !inner.primitives.is_empty() {
            inner.primitives.clear();
            inner.primitive_revision += 1;
        }
    }

    /// A consistent snapshot of every placed primitive.
    pub fn get_primitives(&self) -> Vec<Primitive> {
        self.lock().primitives.clone()
    }

    /// Reads one primitive by id.
    pub fn get_primitive(&self, id: &str) -> Option<Primitive> {
        self.lock().primitives.iter().find(|p| p.id == id).cloned()
    }

    // --- Blueprint plans ---------------------------------------------------

    /// Registers a new active plan for its agent.
    pub fn set_build_plan(&self, plan: BlueprintPlan) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.blueprint_plans.contains_key(&plan.agent_id) {
            return Err(StoreError::BlueprintAlreadyActive(plan.agent_id));
        }
        inner.blueprint_plans.insert(plan.agent_id.clone(), plan);
        Ok(())
    }

    /// Reads the active plan for an agent, if any.
    pub fn get_build_plan(&self, agent_id: &str) -> Option<BlueprintPlan> {
        self.lock().blueprint_plans.get(agent_id).cloned()
    }

    /// Removes and returns the active plan for an agent.
    pub fn clear_build_plan(&self, agent_id: &str) -> Result<BlueprintPlan, StoreError> {
        let mut inner = self.lock();
        inner
            .blueprint_plans
            .remove(agent_id)
            .ok_or_else(|| StoreError::BlueprintNotActive(agent_id.to_string()))
    }

    /// Applies `f` to the agent's active plan and returns the updated copy.
    pub fn update_build_plan(
        &self,
        agent_id: &str,
        f: impl FnOnce(&mut BlueprintPlan),
    ) -> Result<BlueprintPlan, StoreError> {
        let mut inner = self.lock();
        let plan = inner
            .blueprint_plans
            .get_mut(agent_id)
            .ok_or_else(|| StoreError::BlueprintNotActive(agent_id.to_string()))?;
        f(plan);
        Ok(plan.clone())
    }

    /// Every active blueprint footprint reservation, as `(agent_id, bbox)`.
    pub fn reservations(&self) -> Vec<(String, Aabb)> {
        self.lock()
            .blueprint_plans
            .values()
            .filter_map(|p| p.footprint().map(|bbox| (p.agent_id.clone(), bbox)))
            .collect()
    }

    /// Every active blueprint plan, for the `state` read surface.
    pub fn list_blueprint_plans(&self) -> Vec<BlueprintPlan> {
        self.lock().blueprint_plans.values().cloned().collect()
    }

    // --- Counters --------------------------------------------------------

    /// Advances and returns the new tick value.
    pub fn advance_tick(&self) -> u64 {
        let mut inner = self.lock();
        inner.tick += 1;
        inner.tick
    }

    /// Current tick.
    pub fn get_current_tick(&self) -> u64 {
        self.lock().tick
    }

    /// Current primitive revision.
    pub fn get_primitive_revision(&self) -> u64 {
        self.lock().primitive_revision
    }

    /// Count of online agents.
    pub fn get_agent_count(&self) -> usize {
        self.lock().agents.len()
    }

    /// Count of placed primitives.
    pub fn get_world_primitive_count(&self) -> usize {
        self.lock().primitives.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Primitive;
    use grid_geom::Shape;

    fn agent(id: &str, owner: &str) -> Agent {
        Agent::new(id.into(), owner.into(), "Ada".into(), "#fff".into(), Vec3::ZERO, 0)
    }

    fn primitive(id: &str, owner: &str, x: f64) -> Primitive {
        Primitive {
            id: id.into(),
            owner_agent_id: owner.into(),
            owner_agent_name: "Ada".into(),
            shape: Shape::Box,
            position: Vec3::new(x, 0.5, 0.0),
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
            color: "#fff".into(),
            created_at: 0,
        }
    }

    #[test]
    fn a_second_login_for_the_same_owner_evicts_the_first() {
        let store = WorldStore::new();
        store.add_agent(agent("a1", "0xowner"));
        let evicted = store.add_agent(agent("a2", "0xowner"));
        assert_eq!(evicted.map(|a| a.id), Some("a1".to_string()));
        assert_eq!(store.get_agent_count(), 1);
        assert!(store.get_agent("a2").is_some());
    }

    #[test]
    fn primitive_revision_increases_exactly_once_per_committed_change() {
        let store = WorldStore::new();
        assert_eq!(store.get_primitive_revision(), 0);
        store
            .try_insert_primitive(|_existing| Ok(primitive("p1", "a1", 10.0)))
            .unwrap();
        assert_eq!(store.get_primitive_revision(), 1);
        let rejected = store.try_insert_primitive(|_| Err(PlaceRejection::Overlap));
        assert!(rejected.is_err());
        assert_eq!(store.get_primitive_revision(), 1);
    }

    #[test]
    fn removing_someone_elses_primitive_is_rejected() {
        let store = WorldStore::new();
        store
            .try_insert_primitive(|_| Ok(primitive("p1", "a1", 10.0)))
            .unwrap();
        let err = store.remove_primitive("p1", "a2").unwrap_err();
        assert_eq!(
            err,
            StoreError::NotOwner {
                agent: "a2".into(),
                primitive: "p1".into()
            }
        );
    }

    #[test]
    fn round_trips_through_a_snapshot() {
        let store = WorldStore::new();
        store.add_agent(agent("a1", "0xowner"));
        store
            .try_insert_primitive(|_| Ok(primitive("p1", "a1", 10.0)))
            .unwrap();
        let snap = store.snapshot();
        let restored = WorldStore::restore(snap);
        assert_eq!(restored.get_agent_count(), 1);
        assert_eq!(restored.get_world_primitive_count(), 1);
        assert_eq!(restored.get_primitive_revision(), 1);
    }

    #[test]
    fn movement_clamps_at_arrival() {
        let store = WorldStore::new();
        store.add_agent(agent("a1", "0xowner"));
        store.set_move_target("a1", 10.0, 0.0).unwrap();
        store.advance_movement(100.0, 5.0);
        let a = store.get_agent("a1").unwrap();
        assert_eq!(a.position.x, 10.0);
        assert_eq!(a.status, AgentStatus::Idle);
    }
}
