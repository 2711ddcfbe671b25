//! # grantplan-cli
//!
//! The outer surface: argument parsing, the `plan` and `print-plan`
//! commands, text rendering, and a replay transport for recorded query
//! results.

pub mod args;
pub mod commands;
pub mod render;
pub mod replay;

pub use args::Cli;
pub use commands::{project_root, run, Report};
pub use replay::ReplayTransport;
