//! Action dispatch and entity-tagged read handlers.
//!
//! `If-None-Match` / `ETag` carry the abstract "entity tag" `grid-sync`
//! computes; a matching tag short-circuits to `304 Not Modified` with an
//! empty body, same contract as a conditional GET against any HTTP cache.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use grid_proto::{Action, ErrorPayload};
use grid_sync::{agents_lite, spatial_summary, state, state_lite, ReadOutcome};
use grid_world::Agent;
use serde::{Deserialize, Serialize};

use crate::events::events_for;
use crate::state::AppState;

const STARTING_CREDITS: u64 = 100;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn if_none_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_matches('"').to_string())
}

fn etag_header(tag: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("\"{tag}\"")).unwrap_or_else(|_| HeaderValue::from_static("\"unhashable\""))
}

/// Serializes a [`ReadOutcome`] into the matching HTTP response: `304` with
/// no body, or `200` with the body and its `ETag`.
fn tagged_response<T: Serialize>(outcome: ReadOutcome<T>) -> Response {
    match outcome {
        ReadOutcome::NotModified => StatusCode::NOT_MODIFIED.into_response(),
        ReadOutcome::Fresh { body, tag } => {
            let mut response = Json(body).into_response();
            response.headers_mut().insert(axum::http::header::ETAG, etag_header(&tag));
            response
        }
    }
}

/// `GET /state-lite`
pub async fn state_lite_handler(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let tag = if_none_match(&headers);
    tagged_response(state_lite(&app.pipeline, tag.as_deref()))
}

/// `GET /agents-lite`
pub async fn agents_lite_handler(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let tag = if_none_match(&headers);
    tagged_response(agents_lite(&app.pipeline, tag.as_deref()))
}

/// `GET /state`
pub async fn state_handler(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let tag = if_none_match(&headers);
    tagged_response(state(&app.pipeline, tag.as_deref()))
}

/// `GET /spatial-summary`
pub async fn spatial_summary_handler(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let tag = if_none_match(&headers);
    tagged_response(spatial_summary(&app.pipeline, tag.as_deref()))
}

/// `GET /primitives`
pub async fn primitives_handler(State(app): State<AppState>) -> Response {
    Json(app.store().get_primitives()).into_response()
}

/// `GET /agents`
pub async fn agents_handler(State(app): State<AppState>) -> Response {
    Json(app.store().list_agents()).into_response()
}

/// `GET /agents/:id`
pub async fn agent_handler(State(app): State<AppState>, Path(id): Path<String>) -> Response {
    match app.store().get_agent(&id) {
        Some(agent) => Json(agent).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `POST /agents/:id/actions`
pub async fn dispatch_action_handler(
    State(app): State<AppState>,
    Path(agent_id): Path<String>,
    Json(action): Json<Action>,
) -> Response {
    let now = now_ms();
    match app.pipeline.dispatch(&agent_id, action, now) {
        Ok(outcome) => {
            for event in events_for(&app.pipeline, &outcome) {
                app.fabric.broadcast(&event);
            }
            Json(outcome_body(outcome)).into_response()
        }
        Err(err) => action_error_response(&err),
    }
}

fn outcome_body(outcome: grid_pipeline::ActionOutcome) -> serde_json::Value {
    use grid_pipeline::ActionOutcome::{Accepted, BlueprintCancel, BlueprintContinue, BlueprintStart, Multi, Primitive};
    match outcome {
        Accepted(r) => serde_json::to_value(r),
        Primitive(r) => serde_json::to_value(r),
        Multi(r) => serde_json::to_value(r),
        BlueprintStart(r) => serde_json::to_value(r),
        BlueprintContinue(r) => serde_json::to_value(r),
        BlueprintCancel(r) => serde_json::to_value(r),
    }
    .unwrap_or(serde_json::Value::Null)
}

fn action_error_response(err: &grid_proto::ActionError) -> Response {
    let status = match err {
        grid_proto::ActionError::Unauthorized
        | grid_proto::ActionError::TokenMismatch
        | grid_proto::ActionError::FeeRequired
        | grid_proto::ActionError::FeeInvalid => StatusCode::UNAUTHORIZED,
        grid_proto::ActionError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        grid_proto::ActionError::PersistenceUnavailable | grid_proto::ActionError::ConcurrencyConflict => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(ErrorPayload::from(err))).into_response()
}

/// Request body for `POST /agents`.
///
/// `grid-pipeline`'s action surface assumes an already-authenticated agent;
/// the collaborator that establishes that (wallet signature + on-chain
/// identity + entry fee, spec.md §6) is an explicit non-goal (spec.md §1),
/// so this endpoint registers an agent directly instead of standing in a
/// fake verifier for a collaborator this engine never implements.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAgentRequest {
    /// Server-minted identifier the caller wants to use.
    pub id: String,
    /// Wallet address / external principal.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Starting X.
    pub x: f64,
    /// Starting Z.
    pub z: f64,
}

/// `POST /agents`
pub async fn register_agent_handler(State(app): State<AppState>, Json(req): Json<RegisterAgentRequest>) -> Response {
    let now = now_ms();
    let agent = Agent::new(
        req.id.clone(),
        req.owner_id,
        req.name,
        req.color,
        grid_geom::Vec3::new(req.x, 0.0, req.z),
        now,
    );
    let evicted = app.store().add_agent(agent.clone());
    app.pipeline.ledger().ensure_account(&req.id, STARTING_CREDITS, now);
    if let Some(evicted) = evicted {
        app.fabric.broadcast(&grid_sync::BroadcastEvent::AgentLeft { id: evicted.id });
    }
    app.fabric.broadcast(&grid_sync::BroadcastEvent::AgentJoined(agent.clone()));
    (StatusCode::CREATED, Json(agent)).into_response()
}
