//! Application layer modules
//!
//! CLI interface, configuration loading and command dispatch.

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod loader;

pub use cli::{Cli, CliConfig, Commands};
pub use commands::{CommandContext, execute_command, execute_command_with_context};
pub use config::AppConfig;
pub use env::EnvironmentConfig;
pub use loader::*;
