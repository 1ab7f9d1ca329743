// SPDX-License-Identifier: Apache-2.0
//! The action pipeline: validates, authorizes, throttles, and applies one
//! action on behalf of one authenticated agent.
//!
//! [`ActionPipeline`] is the single entry point. Every method is
//! synchronous — the store and ledger's own locks must never be held
//! across a suspend point, so this crate has no async runtime dependency
//! at all.
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

mod blueprint;
mod build;
mod checks;
mod directives;
mod ids;
mod message_log;
mod multi;
mod pipeline;
mod recipes;
mod throttle;

pub use directives::{DirectiveError, DirectiveRegistry};
pub use message_log::MessageLog;
pub use pipeline::{ActionOutcome, ActionPipeline};
pub use recipes::{find as find_recipe, Recipe};
pub use throttle::ActionClass;
