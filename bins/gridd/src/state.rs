//! Shared application state handed to every `axum` handler, mirroring
//! `bins/jitosd`'s `Arc<Mutex<Kernel>>` `State` extractor but split into the
//! engine's own already-thread-safe components instead of one big lock.

use std::sync::Arc;

use grid_app_core::PolicyConfig;
use grid_persist::WorldRepository;
use grid_pipeline::ActionPipeline;
use grid_sync::SyncFabric;

/// Everything a request handler or background task needs.
#[derive(Clone)]
pub struct AppState {
    /// The synchronous action pipeline (owns the store/ledger/cache handles).
    pub pipeline: Arc<ActionPipeline>,
    /// Broadcast fan-out for `GET /ws` subscribers.
    pub fabric: Arc<SyncFabric>,
    /// Durable backing store, consulted at boot and on the snapshot timer.
    pub repo: Arc<dyn WorldRepository>,
    /// Tunable policy thresholds and server settings.
    pub policy: PolicyConfig,
}
