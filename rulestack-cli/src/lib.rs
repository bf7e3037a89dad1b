//! rulestack CLI library
//!
//! Command implementations behind the `rulestack` binary, exposed so they can
//! be driven from tests without spawning a process.

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::multiple_crate_versions)]

pub mod commands;
pub mod context;
mod output;

pub use context::Workspace;
