/// Argument Parsing
pub mod args;
/// Script discovery
pub mod config;
/// Logging setup
pub mod logging;

mod commands;
mod main;

pub use main::main;
