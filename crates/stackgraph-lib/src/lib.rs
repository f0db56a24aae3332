//! # stackgraph Library
//!
//! Declarative resource graph for the services stack, synthesized into a
//! CloudFormation template inside a cloud assembly directory.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Shared enums and error taxonomy
//! - [`logger`] - Structured logging setup
//! - [`infra`] - Deferred tokens, resources, the resource graph and synthesis
//! - [`application`] - CLI interface, configuration and command dispatch
//!
//! ## Quick Start
//!
//! ```no_run
//! use stackgraph_lib::infra::{StackEnvironment, StartupScript, build_services_stack, synthesize};
//!
//! let environment = StackEnvironment::new("123456789012", "us-east-1")?;
//! let script = StartupScript::load(std::path::Path::new("."))?;
//! let stack = build_services_stack(environment, &script)?;
//! println!("{}", synthesize(&stack)?.to_json_string()?);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod application;
pub mod infra;
pub mod logger;
pub mod primitives;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use application::{AppConfig, Cli, Commands, LoadedConfig, execute_command};
pub use logger::Logger;
pub use primitives::{
    ColorIntent, ConfigError, LogFormat, LogLevel, LogOutput, LoggerError, TemplateFormat,
};

use anyhow::Result;

pub fn main() -> Result<()> {
    // Load configuration: defaults -> .env -> env vars -> CLI
    let config = LoadedConfig::load()?;

    let colors = config.app_config.color.resolve();
    console::set_colors_enabled(colors);
    console::set_colors_enabled_stderr(colors);

    Logger::init(config.app_config.to_logger_config(colors))?;

    execute_command(config)
}
