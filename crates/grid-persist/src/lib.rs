// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The persistence contract: a [`WorldRepository`] trait matching the
//! relational-store collaborator spec.md names but never implements
//! internally, plus [`InMemoryRepository`], a lock-protected in-process
//! implementation sufficient to make crash-recovery and round-trip
//! behavior testable without a real database.
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

mod error;
mod memory;
mod repository;

pub use error::PersistError;
pub use memory::InMemoryRepository;
pub use repository::WorldRepository;
