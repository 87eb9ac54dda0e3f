//! Core application modules
//!
//! Command-line handling, configuration, logging, the target probe, the
//! completion provider, the suggestion pipeline and the ffuf runner.

pub mod args;
pub mod config;
pub mod constants;
pub mod logging;
pub mod provider;
pub mod providers;
pub mod runner;
pub mod suggest;
pub mod target;
