//! `BUILD_PRIMITIVE` and `BUILD_MULTI`.

use grid_geom::constants::{MAX_BUILD_RANGE, MIN_BUILD_RANGE, PRIMITIVE_COST};
use grid_geom::{check_build_range_from_agent, validate_placement, PlacementOutcome};
use grid_proto::{ActionError, BuildMultiResponse, BuildPrimitiveRequest, ErrorPayload, ItemResult};
use grid_world::{PlaceRejection, Primitive};

use crate::checks::gate_point;
use crate::multi::mutually_contiguous;
use crate::pipeline::ActionPipeline;
use crate::throttle::ActionClass;

impl ActionPipeline {
    /// `BUILD_PRIMITIVE`: the nine-step contract in order (spec.md §4.4).
    pub fn build_primitive(&self, agent_id: &str, req: BuildPrimitiveRequest, now_ms: u64) -> Result<Primitive, ActionError> {
        self.throttle
            .try_acquire(ActionClass::Primitive, agent_id, now_ms)
            .map_err(|retry_after_ms| ActionError::RateLimited { retry_after_ms })?;

        let agent = self.store.get_agent(agent_id).ok_or(ActionError::Unauthorized)?;

        if !req.position.is_finite() || !req.scale.is_finite() || req.scale.x <= 0.0 || req.scale.y <= 0.0 || req.scale.z <= 0.0 {
            return Err(ActionError::InvalidCoords);
        }

        if self.ledger.get_credits(agent_id) < PRIMITIVE_COST {
            return Err(ActionError::InsufficientCredits);
        }

        let target = req.position.to_xz();
        if !check_build_range_from_agent(agent.position.to_xz(), target, MIN_BUILD_RANGE, MAX_BUILD_RANGE) {
            return Err(ActionError::OutOfRange);
        }

        let primitives = self.store.get_primitives();
        self.cache.get_or_compute(&primitives, self.store.get_primitive_revision());
        gate_point(target, &primitives, &self.cache)?;

        let settled = resolve_placement(req.shape, req.position, req.scale, &primitives)?;

        let owner_id = agent_id.to_string();
        let owner_name = agent.name.clone();
        let color = req.color.clone();
        let id = self.next_primitive_id();
        let placed = self
            .ledger
            .debit_and_place(&self.store, agent_id, PRIMITIVE_COST, move |nearby| {
                match validate_placement(req.shape, settled, req.scale, nearby) {
                    PlacementOutcome { valid: true, overlap: false, .. } => Ok(Primitive {
                        id,
                        owner_agent_id: owner_id,
                        owner_agent_name: owner_name,
                        shape: req.shape,
                        position: settled,
                        rotation: req.rotation,
                        scale: req.scale,
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
            })?;

        self.messages.push_terminal(
            format!("{} built a {:?} near ({:.1}, {:.1})", agent.name, placed.shape, placed.position.x, placed.position.z),
            now_ms,
        );

        Ok(placed)
    }

    /// `BUILD_MULTI`: atomic pre-validation, then in-order insertion with
    /// the one documented partial-outcome exception.
    pub fn build_multi(&self, agent_id: &str, items: Vec<BuildPrimitiveRequest>, now_ms: u64) -> Result<BuildMultiResponse, ActionError> {
        if items.is_empty() || items.len() > 5 {
            return Err(ActionError::InvalidBody);
        }
        self.throttle
            .try_acquire(ActionClass::Primitive, agent_id, now_ms)
            .map_err(|retry_after_ms| ActionError::RateLimited { retry_after_ms })?;

        let agent = self.store.get_agent(agent_id).ok_or(ActionError::Unauthorized)?;

        for item in &items {
            if !item.position.is_finite() || !item.scale.is_finite() || item.scale.x <= 0.0 || item.scale.y <= 0.0 || item.scale.z <= 0.0 {
                return Err(ActionError::InvalidCoords);
            }
            if !check_build_range_from_agent(agent.position.to_xz(), item.position.to_xz(), MIN_BUILD_RANGE, MAX_BUILD_RANGE) {
                return Err(ActionError::OutOfRange);
            }
        }

        if !mutually_contiguous(&items) {
            return Err(ActionError::MultiDisconnected);
        }

        let primitives = self.store.get_primitives();
        self.cache.get_or_compute(&primitives, self.store.get_primitive_revision());
        for item in &items {
            gate_point(item.position.to_xz(), &primitives, &self.cache)?;
        }

        if self.ledger.get_credits(agent_id) < PRIMITIVE_COST * items.len() as u64 {
            return Err(ActionError::InsufficientCredits);
        }

        // Pre-validation is all-or-nothing: resolve every item's placement
        // against existing geometry plus the other not-yet-placed items in
        // this same batch. Any failure here rejects the whole call; only a
        // failure during the insertion pass below (a concurrent change) is
        // the documented partial-outcome exception.
        let mut probe = primitives;
        let mut settled_positions = Vec::with_capacity(items.len());
        for item in &items {
            let settled = resolve_placement(item.shape, item.position, item.scale, &probe)?;
            probe.push(Primitive {
                id: String::new(),
                owner_agent_id: agent_id.to_string(),
                owner_agent_name: agent.name.clone(),
                shape: item.shape,
                position: settled,
                rotation: item.rotation,
                scale: item.scale,
                color: item.color.clone(),
                created_at: now_ms,
            });
            settled_positions.push(settled);
        }

        let mut results = Vec::with_capacity(items.len());
        for (index, (item, settled)) in items.into_iter().zip(settled_positions).enumerate() {
            let owner_id = agent_id.to_string();
            let owner_name = agent.name.clone();
            let color = item.color.clone();
            let id = self.next_primitive_id();
            let outcome = self.ledger.debit_and_place(&self.store, agent_id, PRIMITIVE_COST, move |nearby| {
                match validate_placement(item.shape, settled, item.scale, nearby) {
                    PlacementOutcome { valid: true, overlap: false, .. } => Ok(Primitive {
                        id,
                        owner_agent_id: owner_id,
                        owner_agent_name: owner_name,
                        shape: item.shape,
                        position: settled,
                        rotation: item.rotation,
                        scale: item.scale,
                        color,
                        created_at: now_ms,
                    }),
                    _ => Err(PlaceRejection::Overlap),
                }
            });

            match outcome {
                Ok(primitive) => results.push(ItemResult::ok(index as u32, primitive)),
                Err(e) => {
                    let mapped = match e {
                        grid_ledger::LedgerError::InsufficientCredits { .. } => ActionError::InsufficientCredits,
                        grid_ledger::LedgerError::Overlap => ActionError::Overlap,
                        grid_ledger::LedgerError::Invalid(_) => ActionError::InvalidCoords,
                        _ => ActionError::ConcurrencyConflict,
                    };
                    results.push(ItemResult::err(index as u32, ErrorPayload::from(&mapped)));
                    break;
                }
            }
        }

        Ok(BuildMultiResponse { results })
    }

    pub(crate) fn next_primitive_id(&self) -> String {
        self.primitive_ids.next_id()
    }
}

/// Runs `validatePlacement` once, applying the `correctedY` snap and
/// re-validating exactly once more, per spec.md §4.4 step 7.
fn resolve_placement(
    shape: grid_geom::Shape,
    position: grid_geom::Vec3,
    scale: grid_geom::Vec3,
    nearby: &[Primitive],
) -> Result<grid_geom::Vec3, ActionError> {
    let first = validate_placement(shape, position, scale, nearby);
    if first.valid {
        return Ok(grid_geom::Vec3::new(position.x, first.corrected_y.unwrap_or(position.y), position.z));
    }
    let Some(corrected_y) = first.corrected_y else {
        return Err(ActionError::Overlap);
    };
    let retried_position = grid_geom::Vec3::new(position.x, corrected_y, position.z);
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
    use grid_geom::{Shape, Vec2Xz, Vec3};
    use grid_graph::AnalysisCache;
    use grid_ledger::CreditLedger;
    use grid_world::{Agent, WorldStore};
    use std::sync::Arc;

    fn pipeline_with_agent(agent_pos: Vec3, credits: u64) -> ActionPipeline {
        let store = Arc::new(WorldStore::new());
        let ledger = Arc::new(CreditLedger::new());
        store.add_agent(Agent::new("a1".into(), "0x1".into(), "Ada".into(), "#fff".into(), agent_pos, 0));
        ledger.ensure_account("a1", credits, 0);
        ActionPipeline::new(store, ledger, Arc::new(AnalysisCache::new()))
    }

    fn box_request(position: Vec3) -> BuildPrimitiveRequest {
        BuildPrimitiveRequest {
            shape: Shape::Box,
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, 1.0, 1.0),
            color: "#fff".into(),
        }
    }

    /// S1 Ground snap: agent at (100, 0, 100) requests a box at (105, 0, 100).
    #[test]
    fn s1_ground_snap_corrects_y_and_debits_one_credit() {
        let p = pipeline_with_agent(Vec3::new(100.0, 0.0, 100.0), 10);
        let before_revision = p.store.get_primitive_revision();

        let placed = p.build_primitive("a1", box_request(Vec3::new(105.0, 0.0, 100.0)), 0).unwrap();

        assert!((placed.position.y - 0.5).abs() < 1e-9);
        assert_eq!(p.store.get_primitive_revision(), before_revision + 1);
        assert_eq!(p.ledger.get_credits("a1"), 9);
    }

    #[test]
    fn build_primitive_rejects_out_of_range_target_with_no_state_change() {
        let p = pipeline_with_agent(Vec3::new(0.0, 0.0, 0.0), 10);
        let before_revision = p.store.get_primitive_revision();

        let err = p.build_primitive("a1", box_request(Vec3::new(30.0, 0.5, 30.0)), 0).unwrap_err();

        assert_eq!(err, ActionError::OutOfRange);
        assert_eq!(p.store.get_primitive_revision(), before_revision);
        assert_eq!(p.ledger.get_credits("a1"), 10);
    }

    #[test]
    fn build_primitive_rejects_when_credits_are_insufficient() {
        let p = pipeline_with_agent(Vec3::new(100.0, 0.0, 100.0), 0);
        let err = p.build_primitive("a1", box_request(Vec3::new(105.0, 0.0, 100.0)), 0).unwrap_err();
        assert_eq!(err, ActionError::InsufficientCredits);
        assert!(p.store.get_primitives().is_empty());
    }

    /// S5 Multi contiguity: three boxes at (110,110), (113,110), (140,110) —
    /// the third is too far from the other two under the contiguity rule, so
    /// the whole batch is atomically rejected. Agent placed at (120, 110), in
    /// build range of every item, so only the contiguity rule is exercised.
    #[test]
    fn s5_multi_contiguity_rejects_the_whole_batch_and_places_nothing() {
        let p = pipeline_with_agent(Vec3::new(120.0, 0.0, 110.0), 10);
        let items = vec![
            box_request(Vec3::new(110.0, 0.5, 110.0)),
            box_request(Vec3::new(113.0, 0.5, 110.0)),
            box_request(Vec3::new(140.0, 0.5, 110.0)),
        ];

        let err = p.build_multi("a1", items, 0).unwrap_err();

        assert_eq!(err, ActionError::MultiDisconnected);
        assert!(p.store.get_primitives().is_empty());
        assert_eq!(p.ledger.get_credits("a1"), 10);
    }

    #[test]
    fn build_multi_happy_path_places_every_contiguous_item() {
        let p = pipeline_with_agent(Vec3::new(120.0, 0.0, 110.0), 10);
        let items = vec![
            box_request(Vec3::new(110.0, 0.5, 110.0)),
            box_request(Vec3::new(113.0, 0.5, 110.0)),
        ];

        let response = p.build_multi("a1", items, 0).unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(p.store.get_primitives().len(), 2);
        assert_eq!(p.ledger.get_credits("a1"), 8);
        assert!(gate_point(Vec2Xz::new(120.0, 110.0), &p.store.get_primitives(), &p.cache).is_ok());
    }
}
