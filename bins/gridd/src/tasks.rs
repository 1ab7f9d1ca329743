//! Background loops: the 1 Hz simulation clock, the liveness sweeper, and
//! the periodic snapshot saver, each a `tokio::time::interval`-driven loop
//! directly generalizing `echo-sched::Scheduler` (fixed `Duration`, a tick
//! counter, `info!` logged only every Nth tick).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time;
use tracing::{info, warn};

use crate::state::AppState;

const AGENT_MOVE_SPEED: f64 = 5.0;
const SNAPSHOT_EVERY_N_TICKS: u64 = 10;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Advances movement and the tick counter once per `policy.tick_interval_ms`.
pub async fn run_sim_clock(app: AppState) {
    let mut interval = time::interval(Duration::from_millis(app.policy.tick_interval_ms));
    let dt_secs = app.policy.tick_interval_ms as f64 / 1000.0;
    let mut tick_count: u64 = 0;

    info!(interval_ms = app.policy.tick_interval_ms, "simulation clock started");

    loop {
        interval.tick().await;
        app.store().advance_movement(dt_secs, AGENT_MOVE_SPEED);
        let tick = app.store().advance_tick();
        tick_count += 1;
        if tick_count.is_multiple_of(10) {
            info!(tick, "sim clock tick");
        }
        if tick_count.is_multiple_of(SNAPSHOT_EVERY_N_TICKS) {
            save_snapshot(&app).await;
        }
    }
}

/// Evicts agents that have gone quiet for longer than
/// `policy.liveness_timeout_ms`, once per `policy.liveness_sweep_interval_ms`.
pub async fn run_liveness_sweeper(app: AppState) {
    let mut interval = time::interval(Duration::from_millis(app.policy.liveness_sweep_interval_ms));
    info!(interval_ms = app.policy.liveness_sweep_interval_ms, "liveness sweeper started");

    loop {
        interval.tick().await;
        let now = now_ms();
        let stale: Vec<String> = app
            .store()
            .list_agents()
            .into_iter()
            .filter(|a| a.is_stale(now, app.policy.liveness_timeout_ms))
            .map(|a| a.id)
            .collect();
        for id in stale {
            if app.store().remove_agent(&id).is_ok() {
                info!(agent_id = %id, "liveness sweeper evicted an idle agent");
                app.fabric.broadcast(&grid_sync::BroadcastEvent::AgentLeft { id });
            }
        }
    }
}

/// Persists the current world state. Exposed for the final save on
/// shutdown as well as the periodic timer above.
pub async fn save_snapshot(app: &AppState) {
    let snapshot = app.store().snapshot();
    if let Err(err) = app.repo.save_snapshot(&snapshot).await {
        warn!(%err, "periodic snapshot save failed");
    }
}
