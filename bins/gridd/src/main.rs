// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Grid World Daemon (gridd)
//!
//! Wires `grid-pipeline`'s synchronous action dispatch, `grid-sync`'s
//! entity-tagged reads and broadcast fan-out, and `grid-persist`'s
//! crash-recovery snapshot behind an `axum` `Router`, generalizing
//! `bins/jitosd`'s `Router` + `State(Arc<...>)` handler pattern. The 1 Hz
//! simulation clock and liveness sweeper run as background tasks
//! generalizing `echo-sched::Scheduler`'s tick loop.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod events;
mod http;
mod state;
mod tasks;
mod ws;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use grid_app_core::ConfigService;
use grid_config_fs::FsConfigStore;
use grid_graph::AnalysisCache;
use grid_ledger::CreditLedger;
use grid_persist::{InMemoryRepository, WorldRepository};
use grid_pipeline::ActionPipeline;
use grid_sync::SyncFabric;
use grid_world::WorldStore;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use state::AppState;

const RESTORED_AGENT_STARTING_CREDITS: u64 = 100;

/// Command-line flags, overriding the persisted `PolicyConfig` where given.
#[derive(Parser, Debug)]
#[command(author, version, about = "Grid world simulation daemon", long_about = None)]
struct Args {
    /// Override the address `gridd` binds its HTTP/WS listener to.
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// Override the simulation clock's tick interval, in milliseconds.
    #[arg(long)]
    tick_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config_store = FsConfigStore::new()?;
    let config = ConfigService::new(config_store);
    let mut policy = config.load_policy_or_default("policy")?;
    if let Some(bind) = args.bind {
        policy.bind_addr = bind;
    }
    if let Some(tick_interval_ms) = args.tick_interval_ms {
        policy.tick_interval_ms = tick_interval_ms;
    }

    let repo: Arc<dyn WorldRepository> = Arc::new(InMemoryRepository::new());

    let store = Arc::new(match repo.load_snapshot().await {
        Ok(Some(snapshot)) => {
            info!(agents = snapshot.agents.len(), primitives = snapshot.primitives.len(), "restored world from snapshot");
            WorldStore::restore(snapshot)
        }
        Ok(None) => {
            info!("no snapshot found; starting from an empty world");
            WorldStore::new()
        }
        Err(err) => {
            warn!(%err, "snapshot load failed; starting from an empty world");
            WorldStore::new()
        }
    });

    match repo.load_all_blueprint_plans().await {
        Ok(plans) => {
            for plan in plans {
                let _ = store.set_build_plan(plan);
            }
        }
        Err(err) => warn!(%err, "blueprint plan recovery failed"),
    }

    let ledger = Arc::new(CreditLedger::new());
    for agent in store.list_agents() {
        ledger.ensure_account(&agent.id, RESTORED_AGENT_STARTING_CREDITS, agent.last_seen_at);
    }

    let pipeline = Arc::new(ActionPipeline::new(store, ledger, Arc::new(AnalysisCache::new())));
    let fabric = Arc::new(SyncFabric::new());

    let app_state = AppState { pipeline, fabric, repo, policy };

    tokio::spawn(tasks::run_sim_clock(app_state.clone()));
    tokio::spawn(tasks::run_liveness_sweeper(app_state.clone()));

    let router = Router::new()
        .route("/agents", get(http::agents_handler).post(http::register_agent_handler))
        .route("/agents/:id", get(http::agent_handler))
        .route("/agents/:id/actions", post(http::dispatch_action_handler))
        .route("/state-lite", get(http::state_lite_handler))
        .route("/agents-lite", get(http::agents_lite_handler))
        .route("/state", get(http::state_handler))
        .route("/spatial-summary", get(http::spatial_summary_handler))
        .route("/primitives", get(http::primitives_handler))
        .route("/ws", get(ws::ws_handler))
        .with_state(app_state.clone());

    let listener = TcpListener::bind(policy.bind_addr).await?;
    info!(addr = %policy.bind_addr, "gridd listening");

    tokio::select! {
        result = axum::serve(listener, router) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received; saving final snapshot");
            tasks::save_snapshot(&app_state).await;
        }
    }

    Ok(())
}
