//! `ActionPipeline`: the synchronous entry point for every authenticated
//! action, mirroring the session hub's match-on-message dispatch
//! (`echo-session-service::handle_message`) but never suspending, per the
//! store/ledger's own no-suspend contract.

use std::sync::Arc;

use grid_graph::AnalysisCache;
use grid_ledger::CreditLedger;
use grid_proto::{Action, AcceptedResponse, AcceptedStatus, ActionError, BlueprintCancelResponse, BlueprintContinueResponse, BlueprintStartResponse, BuildMultiResponse};
use grid_world::{Primitive, WorldStore};

use crate::ids::IdCounter;
use crate::message_log::MessageLog;
use crate::throttle::ThrottleRegistry;

const CHAT_MAX_LEN: usize = 500;

/// Outcome of dispatching one [`Action`] through the pipeline.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// `MOVE` or `CHAT`.
    Accepted(AcceptedResponse),
    /// `BUILD_PRIMITIVE`.
    Primitive(Primitive),
    /// `BUILD_MULTI`.
    Multi(BuildMultiResponse),
    /// `BUILD_BLUEPRINT_START`.
    BlueprintStart(BlueprintStartResponse),
    /// `BUILD_BLUEPRINT_CONTINUE`.
    BlueprintContinue(BlueprintContinueResponse),
    /// `BUILD_BLUEPRINT_CANCEL`.
    BlueprintCancel(BlueprintCancelResponse),
}

/// The action pipeline: one instance shared across every connected agent.
pub struct ActionPipeline {
    pub(crate) store: Arc<WorldStore>,
    pub(crate) ledger: Arc<CreditLedger>,
    pub(crate) cache: Arc<AnalysisCache>,
    pub(crate) throttle: ThrottleRegistry,
    pub(crate) messages: MessageLog,
    pub(crate) primitive_ids: IdCounter,
}

impl ActionPipeline {
    /// Builds a pipeline over shared store/ledger/analyzer handles.
    pub fn new(store: Arc<WorldStore>, ledger: Arc<CreditLedger>, cache: Arc<AnalysisCache>) -> Self {
        Self {
            store,
            ledger,
            cache,
            throttle: ThrottleRegistry::new(),
            messages: MessageLog::new(),
            primitive_ids: IdCounter::new("p"),
        }
    }

    /// The shared chat/terminal history, for read-surface assembly.
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// The shared world store, for read-surface assembly.
    pub fn store(&self) -> &Arc<WorldStore> {
        &self.store
    }

    /// The shared spatial analyzer cache, for the `spatial-summary` read
    /// surface.
    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    /// The shared credit ledger, for callers outside dispatch (agent
    /// registration's `ensure_account` call).
    pub fn ledger(&self) -> &Arc<CreditLedger> {
        &self.ledger
    }

    /// Dispatches one action for `agent_id`, mirroring the per-message match
    /// the session hub uses, but synchronously.
    pub fn dispatch(&self, agent_id: &str, action: Action, now_ms: u64) -> Result<ActionOutcome, ActionError> {
        match action {
            Action::Move { x, z } => self.r#move(agent_id, x, z).map(ActionOutcome::Accepted),
            Action::Chat { message } => self.chat(agent_id, message, now_ms).map(ActionOutcome::Accepted),
            Action::BuildPrimitive(req) => self
                .build_primitive(agent_id, req, now_ms)
                .map(ActionOutcome::Primitive),
            Action::BuildMulti { primitives } => self
                .build_multi(agent_id, primitives, now_ms)
                .map(ActionOutcome::Multi),
            Action::BuildBlueprintStart { name, anchor_x, anchor_z } => self
                .blueprint_start(agent_id, &name, anchor_x, anchor_z, now_ms)
                .map(ActionOutcome::BlueprintStart),
            Action::BuildBlueprintContinue => self
                .blueprint_continue(agent_id, now_ms)
                .map(ActionOutcome::BlueprintContinue),
            Action::BuildBlueprintCancel => self.blueprint_cancel(agent_id).map(ActionOutcome::BlueprintCancel),
        }
    }

    /// `MOVE`: sets a movement target. Cannot fail for geometry reasons.
    pub fn r#move(&self, agent_id: &str, x: f64, z: f64) -> Result<AcceptedResponse, ActionError> {
        self.store
            .set_move_target(agent_id, x, z)
            .map_err(|_| ActionError::Unauthorized)?;
        Ok(AcceptedResponse {
            status: AcceptedStatus::Queued,
            tick: self.store.get_current_tick(),
        })
    }

    /// `CHAT`: appends a trimmed, size-bounded chat entry and broadcasts it.
    pub fn chat(&self, agent_id: &str, message: String, now_ms: u64) -> Result<AcceptedResponse, ActionError> {
        let agent = self.store.get_agent(agent_id).ok_or(ActionError::Unauthorized)?;
        let trimmed = message.trim();
        let bounded: String = trimmed.chars().take(CHAT_MAX_LEN).collect();
        self.messages.push_chat(agent_id.to_string(), agent.name, bounded, now_ms);
        Ok(AcceptedResponse {
            status: AcceptedStatus::Executed,
            tick: self.store.get_current_tick(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_geom::Vec3;
    use grid_world::Agent;

    fn pipeline() -> ActionPipeline {
        ActionPipeline::new(
            Arc::new(WorldStore::new()),
            Arc::new(CreditLedger::new()),
            Arc::new(AnalysisCache::new()),
        )
    }

    #[test]
    fn move_queues_without_any_validation_failure() {
        let p = pipeline();
        p.store.add_agent(Agent::new("a1".into(), "0x1".into(), "Ada".into(), "#fff".into(), Vec3::ZERO, 0));
        let resp = p.r#move("a1", 10.0, 10.0).expect("move never fails on geometry grounds");
        assert_eq!(resp.status, AcceptedStatus::Queued);
    }

    #[test]
    fn chat_is_trimmed_and_bounded() {
        let p = pipeline();
        p.store.add_agent(Agent::new("a1".into(), "0x1".into(), "Ada".into(), "#fff".into(), Vec3::ZERO, 0));
        let long = "x".repeat(600);
        p.chat("a1", format!("  {long}  "), 0).expect("chat always succeeds");
        let recent = p.messages.recent_chat();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message.len(), 500);
    }

    #[test]
    fn unknown_agent_is_unauthorized() {
        let p = pipeline();
        assert_eq!(p.r#move("ghost", 1.0, 1.0).unwrap_err(), ActionError::Unauthorized);
    }
}
