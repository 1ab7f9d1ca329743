// SPDX-License-Identifier: Apache-2.0
//! Wire schema for the grid world engine.
//!
//! Defines the request/response shapes carried over whatever transport
//! `bins/gridd` chooses, plus the stable error tag list and the
//! entity-tagged read surfaces. Transport framing itself is out of scope.
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
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod action;
mod error;
mod read;
mod response;

pub use action::{Action, BuildPrimitiveRequest};
pub use error::{ActionError, ErrorPayload};
pub use read::{
    agents_lite_tag, spatial_summary_tag, state_lite_tag, state_tag, AgentLite, AgentsLite, ChatMessage, State,
    StateLite, TerminalMessage,
};
pub use response::{
    AcceptedResponse, AcceptedStatus, BlueprintCancelResponse, BlueprintContinueResponse, BlueprintRunStatus,
    BlueprintStartResponse, BuildMultiResponse, ItemResult,
};
