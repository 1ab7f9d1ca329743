// SPDX-License-Identifier: Apache-2.0
//! Spatial analyzer: derives structures, settlement nodes, node edges, and
//! open areas from the current primitive set.
//!
//! Nothing here is stored. [`analyze`] is a pure function of its input
//! slice; [`AnalysisCache`] exists only to avoid recomputing it on every
//! read when the world hasn't changed.
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

mod analyze;
mod cache;
mod edges;
mod hash;
mod nodes;
mod open_areas;
mod structures;
mod types;
mod union_find;

pub use analyze::analyze;
pub use cache::AnalysisCache;
pub use hash::{compute_hash, to_canonical_bytes};
pub use types::{
    CategoryCounts, NodeEdge, OpenArea, OpenAreaKind, SettlementNode, SpatialSummary, Structure, Tier,
};
