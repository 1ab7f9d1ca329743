// SPDX-License-Identifier: Apache-2.0
//! The authoritative in-memory world: online agents, placed primitives, and
//! active blueprint plans.
//!
//! Everything here is guarded by one coarse lock inside [`WorldStore`].
//! Credits are deliberately kept out of this crate — `grid-ledger` owns
//! them and composes its own lock with this store's to implement the
//! atomic "debit and place" operation.
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
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod agent;
mod blueprint;
mod error;
mod primitive;
mod store;

pub use agent::{Agent, AgentStatus};
pub use blueprint::{BlueprintPhase, BlueprintPlan, ResolvedPrimitive};
pub use error::StoreError;
pub use primitive::Primitive;
pub use store::{PlaceRejection, WorldSnapshot, WorldStore};
