//! # fittrack
//!
//! Composition root for the FitTrack client core. Loads configuration,
//! installs tracing, and wires the `ft-*` crates into an [`AppRuntime`].

pub mod bootstrap;

pub use bootstrap::{create_runtime, load_config, AppRuntime};
