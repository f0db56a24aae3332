use crate::primitives::{ConfigError, TemplateFormat};
use clap::{Parser, Subcommand};

use super::config::AppConfig;

/// stackgraph CLI - declarative resource graph and template synthesis
#[derive(Debug, Clone, Parser)]
#[command(name = "stackgraph")]
#[command(about = "Build the services resource graph and synthesize its template")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration options
    #[command(flatten)]
    pub config: AppConfig,

    /// stackgraph commands (defaults to `synth`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Configuration loaded from CLI
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Option<Commands>,
}

impl CliConfig {
    /// Load configuration from command line arguments
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Cli::parse().into())
    }

    /// Parse an explicit argument list
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Into::into)
    }
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            app_config: cli.config,
            command: cli.command,
        }
    }
}

/// Available stackgraph commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Build the resource graph and write the cloud assembly
    Synth {
        /// Template serialization
        #[arg(long, default_value = "json", help = "Template format: json, yaml")]
        format: TemplateFormat,

        /// Print the template instead of writing the assembly
        #[arg(long, help = "Print the template to stdout instead of writing files")]
        stdout: bool,
    },

    /// List declarations in dependency order
    List,

    /// Show version information
    Version,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Synth {
            format: TemplateFormat::default(),
            stdout: false,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}
