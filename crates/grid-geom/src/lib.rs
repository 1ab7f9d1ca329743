// SPDX-License-Identifier: Apache-2.0
//! Grid world geometry: vectors, shape taxonomy, bounding boxes, and
//! placement validation.
//!
//! This crate is a leaf: it has no dependency on the world store, ledger, or
//! spatial analyzer. Anything those components need to feed into validation
//! (existing primitives, node density) is taken as a generic `impl Solid` or
//! a small trait object (`NodeDensityOracle`), never as a concrete type from
//! a higher crate.
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

pub mod aabb;
pub mod constants;
pub mod shape;
pub mod validate;
pub mod vec;

pub use aabb::{bounding_box, distance_xz as solid_distance_xz, infer_category, is_connector, overlaps_xz, position_xz, xz_radius, Aabb, Solid};
pub use shape::{Category, Shape};
pub use validate::{
    check_build_range_from_agent, check_origin_exclusion, check_settlement_proximity,
    validate_placement, NodeDensityOracle, PlacementOutcome, SettlementProximity,
};
pub use vec::{distance_xz, Vec2Xz, Vec3};
