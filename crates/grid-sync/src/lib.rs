// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sync Fabric: entity-tagged read surfaces over the world store and
//! spatial analyzer, plus a broadcast registry generalizing
//! `echo-session-service`'s `HubState`/`ConnState` (same per-connection
//! `mpsc::Sender` shape, renamed to this engine's event set).
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
mod views;

pub use events::{BroadcastEvent, SyncFabric};
pub use views::{agents_lite, spatial_summary, state, state_lite, ReadOutcome};
