//! Core application infrastructure

pub mod cli;
pub mod constants;

pub use crate::app::CoreApp;
pub use cli::{AnalyzeArgs, Cli, Commands, OutputMode};
