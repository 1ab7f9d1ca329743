//! `BUILD_BLUEPRINT_START`, `BUILD_BLUEPRINT_CONTINUE`, and
//! `BUILD_BLUEPRINT_CANCEL`.

use grid_geom::constants::{MAX_BUILD_RANGE, PRIMITIVE_COST};
use grid_geom::{distance_xz, validate_placement, PlacementOutcome, Vec2Xz, Vec3};
use grid_proto::{
    ActionError, BlueprintCancelResponse, BlueprintContinueResponse, BlueprintRunStatus, BlueprintStartResponse, ErrorPayload, ItemResult,
};
use grid_world::{BlueprintPhase, BlueprintPlan, PlaceRejection, Primitive};

use crate::checks::gate_point;
use crate::pipeline::ActionPipeline;
use crate::recipes;
use crate::throttle::ActionClass;

const BLUEPRINT_BATCH_SIZE: usize = 5;

impl ActionPipeline {
    /// `BUILD_BLUEPRINT_START`: registers a new plan for the agent.
    pub fn blueprint_start(
        &self,
        agent_id: &str,
        name: &str,
        anchor_x: f64,
        anchor_z: f64,
        now_ms: u64,
    ) -> Result<BlueprintStartResponse, ActionError> {
        self.throttle
            .try_acquire(ActionClass::BlueprintStart, agent_id, now_ms)
            .map_err(|retry_after_ms| ActionError::RateLimited { retry_after_ms })?;

        let agent = self.store.get_agent(agent_id).ok_or(ActionError::Unauthorized)?;

        if self.store.get_build_plan(agent_id).is_some() {
            return Err(ActionError::BlueprintAlreadyActive);
        }

        let anchor = Vec2Xz::new(anchor_x, anchor_z);
        if !anchor.is_finite() {
            return Err(ActionError::InvalidCoords);
        }
        if distance_xz(agent.position.to_xz(), anchor) > MAX_BUILD_RANGE {
            return Err(ActionError::BlueprintAnchorTooFar);
        }

        let primitives = self.store.get_primitives();
        self.cache.get_or_compute(&primitives, self.store.get_primitive_revision());
        gate_point(anchor, &primitives, &self.cache)?;

        let recipe = recipes::find(name).ok_or(ActionError::BlueprintNotFound)?;
        let all_primitives = recipe.resolve(anchor_x, anchor_z);
        let phases: Vec<BlueprintPhase> = recipe.phases();
        let total_primitives = recipe.total_primitives();

        let plan = BlueprintPlan {
            agent_id: agent_id.to_string(),
            blueprint_name: recipe.name.to_string(),
            anchor,
            all_primitives,
            phases: phases.clone(),
            total_primitives,
            placed_count: 0,
            failed_count: 0,
            next_index: 0,
            started_at: now_ms,
        };

        let footprint = plan.footprint().ok_or(ActionError::InvalidCoords)?;
        for primitive in &primitives {
            if grid_geom::Aabb::of(primitive).overlaps_xz(footprint) {
                return Err(ActionError::BlueprintFootprintOverlap);
            }
        }
        for (reservation_agent, bbox) in self.store.reservations() {
            if reservation_agent != agent_id && bbox.overlaps_xz(footprint) {
                return Err(ActionError::BlueprintFootprintOverlap);
            }
        }

        let total_cost = total_primitives as u64 * PRIMITIVE_COST;
        if total_cost > self.ledger.get_credits(agent_id) {
            return Err(ActionError::InsufficientCredits);
        }

        self.store.set_build_plan(plan).map_err(|_| ActionError::BlueprintAlreadyActive)?;

        self.messages.push_terminal(format!("{} started building {}", agent.name, recipe.name), now_ms);

        Ok(BlueprintStartResponse {
            blueprint_name: recipe.name.to_string(),
            total_primitives: total_primitives as u32,
            phases,
            anchor_x,
            anchor_z,
        })
    }

    /// `BUILD_BLUEPRINT_CONTINUE`: places the next batch of up to five
    /// primitives. A per-item failure still advances the cursor.
    pub fn blueprint_continue(&self, agent_id: &str, now_ms: u64) -> Result<BlueprintContinueResponse, ActionError> {
        self.throttle
            .try_acquire(ActionClass::BlueprintContinue, agent_id, now_ms)
            .map_err(|retry_after_ms| ActionError::RateLimited { retry_after_ms })?;

        let agent = self.store.get_agent(agent_id).ok_or(ActionError::Unauthorized)?;
        let plan = self.store.get_build_plan(agent_id).ok_or(ActionError::BlueprintNotActive)?;

        if distance_xz(agent.position.to_xz(), plan.anchor) > MAX_BUILD_RANGE {
            return Err(ActionError::BlueprintAnchorOutOfRange);
        }

        let start = plan.next_index;
        let end = (start + BLUEPRINT_BATCH_SIZE).min(plan.total_primitives);
        let batch = &plan.all_primitives[start..end];

        let mut results = Vec::with_capacity(batch.len());
        let mut placed_this_call = 0usize;
        let mut failed_this_call = 0usize;

        for (offset, resolved) in batch.iter().enumerate() {
            let index = start + offset;
            let primitives = self.store.get_primitives();
            let outcome = resolve_and_place(self, agent_id, &agent.name, resolved, now_ms, &primitives);
            match outcome {
                Ok(primitive) => {
                    placed_this_call += 1;
                    results.push(ItemResult::ok(index as u32, primitive));
                }
                Err(err) => {
                    failed_this_call += 1;
                    results.push(ItemResult::err(index as u32, ErrorPayload::from(&err)));
                }
            }
        }

        let updated = self
            .store
            .update_build_plan(agent_id, |p| {
                p.next_index = end;
                p.placed_count += placed_this_call;
                p.failed_count += failed_this_call;
            })
            .map_err(|_| ActionError::BlueprintNotActive)?;

        let current_phase = updated.current_phase().map(str::to_string);
        let next_batch_size = if updated.is_complete() {
            None
        } else {
            Some((updated.total_primitives - updated.next_index).min(BLUEPRINT_BATCH_SIZE) as u32)
        };

        let status = if !updated.is_complete() {
            BlueprintRunStatus::Building
        } else if updated.failed_count == 0 {
            BlueprintRunStatus::Complete
        } else {
            BlueprintRunStatus::CompleteWithFailures
        };

        if updated.is_complete() {
            let _ = self.store.clear_build_plan(agent_id);
            self.messages
                .push_terminal(format!("{} finished building {}", agent.name, updated.blueprint_name), now_ms);
        }

        Ok(BlueprintContinueResponse {
            status,
            placed: updated.placed_count as u32,
            total: updated.total_primitives as u32,
            current_phase,
            next_batch_size,
            results,
        })
    }

    /// `BUILD_BLUEPRINT_CANCEL`: removes the plan and its reservation;
    /// already-placed primitives remain.
    pub fn blueprint_cancel(&self, agent_id: &str) -> Result<BlueprintCancelResponse, ActionError> {
        let plan = self.store.clear_build_plan(agent_id).map_err(|_| ActionError::BlueprintNotActive)?;
        Ok(BlueprintCancelResponse {
            cancelled: true,
            pieces_placed: plan.placed_count as u32,
        })
    }
}

/// Places one already-resolved blueprint primitive: `validatePlacement`
/// with a single `correctedY` retry, then `debitAndPlace`.
fn resolve_and_place(
    pipeline: &ActionPipeline,
    agent_id: &str,
    agent_name: &str,
    resolved: &grid_world::ResolvedPrimitive,
    now_ms: u64,
    nearby: &[Primitive],
) -> Result<Primitive, ActionError> {
    let settled = resolve_blueprint_placement(resolved.shape, resolved.position, resolved.scale, nearby)?;

    let owner_id = agent_id.to_string();
    let owner_name = agent_name.to_string();
    let shape = resolved.shape;
    let rotation = resolved.rotation;
    let scale = resolved.scale;
    let color = resolved.color.clone();
    let id = pipeline.next_primitive_id();

    pipeline
        .ledger
        .debit_and_place(&pipeline.store, agent_id, PRIMITIVE_COST, move |live_nearby| {
            match validate_placement(shape, settled, scale, live_nearby) {
                PlacementOutcome { valid: true, overlap: false, .. } => Ok(Primitive {
                    id,
                    owner_agent_id: owner_id,
                    owner_agent_name: owner_name,
                    shape,
                    position: settled,
                    rotation,
                    scale,
                    color,
                    created_at: now_ms,
                }),
                _ => Err(PlaceRejection::Overlap),
            }
        })
        .map_err(|e| match e {
            grid_ledger::LedgerError::InsufficientCredits { .. } => ActionError::InsufficientCredits,
            grid_ledger::LedgerError::Overlap => ActionError::Overlap,
            grid_ledger::LedgerError::Invalid(_) => ActionError::InvalidCoords,
            _ => ActionError::ConcurrencyConflict,
        })
}

fn resolve_blueprint_placement(shape: grid_geom::Shape, position: Vec3, scale: Vec3, nearby: &[Primitive]) -> Result<Vec3, ActionError> {
    let first = validate_placement(shape, position, scale, nearby);
    if first.valid {
        return Ok(Vec3::new(position.x, first.corrected_y.unwrap_or(position.y), position.z));
    }
    let Some(corrected_y) = first.corrected_y else {
        return Err(ActionError::Overlap);
    };
    let retried_position = Vec3::new(position.x, corrected_y, position.z);
    let second = validate_placement(shape, retried_position, scale, nearby);
    if second.valid {
        return Ok(retried_position);
    }
    if second.overlap {
        return Err(ActionError::Overlap);
    }
    Err(ActionError::Floating {
        corrected_y: second.corrected_y.unwrap_or(corrected_y),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_graph::AnalysisCache;
    use grid_ledger::CreditLedger;
    use grid_world::{Agent, WorldStore};
    use std::sync::Arc;

    fn pipeline_with_agent(credits: u64) -> (ActionPipeline, Vec2Xz) {
        let store = Arc::new(WorldStore::new());
        let ledger = Arc::new(CreditLedger::new());
        let anchor = Vec2Xz::new(120.0, 120.0);
        store.add_agent(Agent::new(
            "a1".into(),
            "0x1".into(),
            "Ada".into(),
            "#fff".into(),
            Vec3::new(120.0, 0.0, 120.0),
            0,
        ));
        ledger.ensure_account("a1", credits, 0);
        (ActionPipeline::new(store, ledger, Arc::new(AnalysisCache::new())), anchor)
    }

    #[test]
    fn s6_bridge_happy_path_completes_after_three_continues() {
        let (p, anchor) = pipeline_with_agent(100);
        let started = p
            .blueprint_start("a1", "BRIDGE", anchor.x, anchor.z, 0)
            .expect("anchor is clear and affordable");
        assert_eq!(started.total_primitives, 11);

        let first = p.blueprint_continue("a1", 1).expect("first batch");
        assert_eq!(first.status, BlueprintRunStatus::Building);
        assert_eq!(first.placed, 5);

        let second = p.blueprint_continue("a1", 2).expect("second batch");
        assert_eq!(second.status, BlueprintRunStatus::Building);
        assert_eq!(second.placed, 10);

        let third = p.blueprint_continue("a1", 3).expect("final batch");
        assert_eq!(third.status, BlueprintRunStatus::Complete);
        assert_eq!(third.placed, 11);
        assert!(p.store.get_build_plan("a1").is_none());
    }

    #[test]
    fn cannot_start_a_second_plan_while_one_is_active() {
        let (p, anchor) = pipeline_with_agent(100);
        p.blueprint_start("a1", "BRIDGE", anchor.x, anchor.z, 0).unwrap();
        let err = p.blueprint_start("a1", "BRIDGE", anchor.x, anchor.z, 1).unwrap_err();
        assert_eq!(err, ActionError::BlueprintAlreadyActive);
    }

    #[test]
    fn cancel_removes_the_plan_and_reports_progress() {
        let (p, anchor) = pipeline_with_agent(100);
        p.blueprint_start("a1", "BRIDGE", anchor.x, anchor.z, 0).unwrap();
        p.blueprint_continue("a1", 1).unwrap();
        let cancelled = p.blueprint_cancel("a1").expect("an active plan can be cancelled");
        assert!(cancelled.cancelled);
        assert_eq!(cancelled.pieces_placed, 5);
        assert!(p.store.get_build_plan("a1").is_none());
    }

    #[test]
    fn continue_without_a_plan_is_rejected() {
        let (p, _anchor) = pipeline_with_agent(100);
        assert_eq!(p.blueprint_continue("a1", 0).unwrap_err(), ActionError::BlueprintNotActive);
    }
}
