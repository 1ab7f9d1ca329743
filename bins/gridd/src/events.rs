//! Maps one dispatched action's outcome to the broadcast events it
//! produces, translating `grid-pipeline`'s per-action side effects
//! (primitives placed, chat appended, terminal messages pushed) into
//! `grid-sync`'s vocabulary. `MOVE` and `BUILD_BLUEPRINT_CANCEL` produce no
//! broadcast event: movement is picked up by polling `agents-lite`, and
//! cancellation leaves no message behind for subscribers to see.

use grid_pipeline::{ActionOutcome, ActionPipeline};
use grid_proto::{AcceptedStatus, BlueprintRunStatus};
use grid_sync::BroadcastEvent;

/// Broadcast events produced by dispatching one action, in commit order.
pub fn events_for(pipeline: &ActionPipeline, outcome: &ActionOutcome) -> Vec<BroadcastEvent> {
    match outcome {
        ActionOutcome::Accepted(r) if r.status == AcceptedStatus::Executed => latest_chat(pipeline),
        ActionOutcome::Accepted(_) => Vec::new(),
        ActionOutcome::Primitive(p) => vec![BroadcastEvent::PrimitiveInserted(p.clone())],
        ActionOutcome::Multi(r) => r
            .results
            .iter()
            .filter_map(|item| item.primitive.clone())
            .map(BroadcastEvent::PrimitiveInserted)
            .collect(),
        ActionOutcome::BlueprintStart(_) => latest_terminal(pipeline),
        ActionOutcome::BlueprintContinue(r) => {
            let mut events: Vec<BroadcastEvent> = r
                .results
                .iter()
                .filter_map(|item| item.primitive.clone())
                .map(BroadcastEvent::PrimitiveInserted)
                .collect();
            if matches!(r.status, BlueprintRunStatus::Complete | BlueprintRunStatus::CompleteWithFailures) {
                events.extend(latest_terminal(pipeline));
            }
            events
        }
        ActionOutcome::BlueprintCancel(_) => Vec::new(),
    }
}

fn latest_chat(pipeline: &ActionPipeline) -> Vec<BroadcastEvent> {
    pipeline.messages().recent_chat().last().cloned().map(BroadcastEvent::Chat).into_iter().collect()
}

fn latest_terminal(pipeline: &ActionPipeline) -> Vec<BroadcastEvent> {
    pipeline
        .messages()
        .recent_terminal()
        .last()
        .cloned()
        .map(BroadcastEvent::Terminal)
        .into_iter()
        .collect()
}
