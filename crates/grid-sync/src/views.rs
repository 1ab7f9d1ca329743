//! Entity-tagged read surfaces: `state-lite`, `agents-lite`, `state`, and
//! `spatial-summary`, each short-circuiting to [`ReadOutcome::NotModified`]
//! when the caller's tag already matches.

use grid_graph::SpatialSummary;
use grid_pipeline::ActionPipeline;
use grid_proto::{
    agents_lite_tag, spatial_summary_tag, state_lite_tag, state_tag, AgentLite, AgentsLite, State, StateLite,
};

/// Result of a tagged read: either the caller's tag is still current, or a
/// fresh body and its tag are returned.
#[derive(Debug, Clone)]
pub enum ReadOutcome<T> {
    /// The caller-supplied tag still matches; nothing is re-sent.
    NotModified,
    /// The current value and its tag.
    Fresh {
        /// The computed DTO.
        body: T,
        /// Its entity tag.
        tag: String,
    },
}

fn agents_lite_list(pipeline: &ActionPipeline) -> Vec<AgentLite> {
    pipeline
        .store()
        .list_agents()
        .into_iter()
        .map(|a| AgentLite { id: a.id, position: a.position, status: a.status })
        .collect()
}

/// Assembles the `state-lite` view.
pub fn state_lite(pipeline: &ActionPipeline, if_none_match: Option<&str>) -> ReadOutcome<StateLite> {
    let store = pipeline.store();
    let body = StateLite {
        tick: store.get_current_tick(),
        primitive_revision: store.get_primitive_revision(),
        agents_online: store.get_agent_count() as u32,
        primitive_count: store.get_world_primitive_count() as u32,
        latest_terminal_message_id: pipeline.messages().recent_terminal().last().map(|m| m.id),
        latest_chat_message_id: pipeline.messages().recent_chat().last().map(|m| m.id),
    };
    let tag = state_lite_tag(&body);
    if if_none_match == Some(tag.as_str()) {
        return ReadOutcome::NotModified;
    }
    ReadOutcome::Fresh { body, tag }
}

/// Assembles the `agents-lite` view.
pub fn agents_lite(pipeline: &ActionPipeline, if_none_match: Option<&str>) -> ReadOutcome<AgentsLite> {
    let agents = agents_lite_list(pipeline);
    let tag = agents_lite_tag(&agents);
    if if_none_match == Some(tag.as_str()) {
        return ReadOutcome::NotModified;
    }
    let body = AgentsLite { tick: pipeline.store().get_current_tick(), agents };
    ReadOutcome::Fresh { body, tag }
}

/// Assembles the full `state` view, including the last 30 chat and
/// terminal messages.
pub fn state(pipeline: &ActionPipeline, if_none_match: Option<&str>) -> ReadOutcome<State> {
    let store = pipeline.store();
    let agents = store.list_agents();
    let agent_lites: Vec<AgentLite> = agents.iter().map(|a| AgentLite { id: a.id.clone(), position: a.position, status: a.status }).collect();
    let recent_chat = pipeline.messages().recent_chat();
    let recent_terminal = pipeline.messages().recent_terminal();
    let latest_chat_id = recent_chat.last().map(|m| m.id);
    let latest_terminal_id = recent_terminal.last().map(|m| m.id);
    let primitive_revision = store.get_primitive_revision();
    let tag = state_tag(primitive_revision, &agent_lites, latest_chat_id, latest_terminal_id);
    if if_none_match == Some(tag.as_str()) {
        return ReadOutcome::NotModified;
    }
    let body = State {
        tick: store.get_current_tick(),
        primitive_revision,
        agents,
        primitives: store.get_primitives(),
        blueprint_plans: store.list_blueprint_plans(),
        recent_chat,
        recent_terminal,
    };
    ReadOutcome::Fresh { body, tag }
}

/// Assembles the `spatial-summary` view, reusing the cached analysis if
/// the primitive revision hasn't advanced.
pub fn spatial_summary(pipeline: &ActionPipeline, if_none_match: Option<&str>) -> ReadOutcome<SpatialSummary> {
    let revision = pipeline.store().get_primitive_revision();
    let tag = spatial_summary_tag(revision);
    if if_none_match == Some(tag.as_str()) {
        return ReadOutcome::NotModified;
    }
    let primitives = pipeline.store().get_primitives();
    let body = pipeline.cache().get_or_compute(&primitives, revision);
    ReadOutcome::Fresh { body, tag }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use grid_geom::Vec3;
    use grid_graph::AnalysisCache;
    use grid_ledger::CreditLedger;
    use grid_pipeline::ActionPipeline;
    use grid_world::{Agent, WorldStore};

    use super::{agents_lite, spatial_summary, state, state_lite, ReadOutcome};

    fn pipeline_with_one_agent() -> ActionPipeline {
        let store = Arc::new(WorldStore::new());
        let ledger = Arc::new(CreditLedger::new());
        store.add_agent(Agent::new("a1".into(), "0x1".into(), "Ada".into(), "#fff".into(), Vec3::new(10.0, 0.0, 10.0), 0));
        ledger.ensure_account("a1", 100, 0);
        ActionPipeline::new(store, ledger, Arc::new(AnalysisCache::new()))
    }

    #[test]
    fn state_lite_reports_the_one_online_agent() {
        let pipeline = pipeline_with_one_agent();
        match state_lite(&pipeline, None) {
            ReadOutcome::Fresh { body, .. } => assert_eq!(body.agents_online, 1),
            ReadOutcome::NotModified => panic!("expected a fresh body on first read"),
        }
    }

    #[test]
    fn state_lite_short_circuits_when_the_tag_is_unchanged() {
        let pipeline = pipeline_with_one_agent();
        let tag = match state_lite(&pipeline, None) {
            ReadOutcome::Fresh { tag, .. } => tag,
            ReadOutcome::NotModified => panic!("expected a fresh body on first read"),
        };
        assert!(matches!(state_lite(&pipeline, Some(&tag)), ReadOutcome::NotModified));
    }

    #[test]
    fn agents_lite_lists_the_one_agent_at_its_position() {
        let pipeline = pipeline_with_one_agent();
        match agents_lite(&pipeline, None) {
            ReadOutcome::Fresh { body, .. } => {
                assert_eq!(body.agents.len(), 1);
                assert_eq!(body.agents[0].id, "a1");
            }
            ReadOutcome::NotModified => panic!("expected a fresh body on first read"),
        }
    }

    #[test]
    fn state_carries_the_full_agent_record() {
        let pipeline = pipeline_with_one_agent();
        match state(&pipeline, None) {
            ReadOutcome::Fresh { body, .. } => {
                assert_eq!(body.agents.len(), 1);
                assert!(body.primitives.is_empty());
            }
            ReadOutcome::NotModified => panic!("expected a fresh body on first read"),
        }
    }

    #[test]
    fn spatial_summary_is_empty_with_no_primitives() {
        let pipeline = pipeline_with_one_agent();
        match spatial_summary(&pipeline, None) {
            ReadOutcome::Fresh { body, tag } => {
                assert!(body.structures.is_empty());
                assert_eq!(tag, "spatial-0");
            }
            ReadOutcome::NotModified => panic!("expected a fresh body on first read"),
        }
    }
}
