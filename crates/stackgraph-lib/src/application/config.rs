//! Application configuration management
//!
//! Precedence: defaults -> .env -> env vars -> CLI args.

use crate::primitives::*;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Default configuration values
pub mod defaults {
    pub const LOG_LEVEL: &str = "0"; // Error-only logging by default
    pub const LOG_FORMAT: &str = "text";
    pub const LOG_OUTPUT: &str = "stderr";
    pub const COLOR: &str = "auto";
    pub const OUTPUT_DIR: &str = "cdk.out";
}

mod default_fns {
    use super::*;

    pub fn log_level() -> u8 {
        defaults::LOG_LEVEL.parse().unwrap_or(0)
    }

    pub fn output_dir() -> PathBuf {
        PathBuf::from(defaults::OUTPUT_DIR)
    }
}

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Parser)]
pub struct AppConfig {
    /// Directory holding scripts/ and .env files
    #[arg(short, long, global = true, env = "STACKGRAPH_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Cloud assembly directory, relative to the working directory
    #[arg(short, long, global = true, env = "STACKGRAPH_OUTPUT", default_value = defaults::OUTPUT_DIR)]
    pub output: PathBuf,

    /// Verbosity level (0=error, 1=warn, 2=info, 3=debug, 4=trace)
    #[arg(long, global = true, env = "STACKGRAPH_LOG_LEVEL", default_value = defaults::LOG_LEVEL,
          value_parser = clap::value_parser!(u8).range(0..=4))]
    pub log_level: u8,

    /// Log format (text, json, yaml)
    #[arg(long, global = true, env = "STACKGRAPH_LOG_FORMAT", default_value = defaults::LOG_FORMAT)]
    pub log_format: LogFormat,

    /// Log output stream (stderr, stdout)
    #[arg(long, global = true, env = "STACKGRAPH_LOG_OUTPUT", default_value = defaults::LOG_OUTPUT)]
    pub log_output: LogOutput,

    /// Color output control (auto, always, never)
    #[arg(short, long, global = true, env = "STACKGRAPH_COLOR", default_value = defaults::COLOR)]
    pub color: ColorIntent,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            output: default_fns::output_dir(),
            log_level: default_fns::log_level(),
            log_format: LogFormat::Text,
            log_output: LogOutput::Stderr,
            color: ColorIntent::Auto,
        }
    }
}

impl AppConfig {
    /// Logger settings for the resolved colour decision
    pub fn to_logger_config(&self, ansi: bool) -> LoggerConfig {
        LoggerConfig {
            level: LogLevel::from_verbosity(self.log_level),
            format: self.log_format,
            output: self.log_output,
            ansi,
        }
    }

    /// Merge this config with another, taking non-default values from other
    pub fn merge_with(mut self, other: Self) -> Self {
        if other.workdir.is_some() {
            self.workdir = other.workdir;
        }
        if other.output != default_fns::output_dir() {
            self.output = other.output;
        }
        if other.log_level != default_fns::log_level() {
            self.log_level = other.log_level;
        }
        if !matches!(other.log_format, LogFormat::Text) {
            self.log_format = other.log_format;
        }
        if !matches!(other.log_output, LogOutput::Stderr) {
            self.log_output = other.log_output;
        }
        if !matches!(other.color, ColorIntent::Auto) {
            self.color = other.color;
        }

        self
    }

    /// Resolve the working directory and anchor the output directory to it
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.log_level > 4 {
            return Err(ConfigError::ParseError {
                value: self.log_level.to_string(),
                reason: "log level must be between 0 and 4".to_string(),
            });
        }

        let workdir = match self.workdir.take() {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        if self.output.is_relative() {
            self.output = workdir.join(&self.output);
        }
        self.workdir = Some(workdir);

        Ok(())
    }

    /// Working directory, `.` until validated
    pub fn workdir(&self) -> &Path {
        self.workdir.as_deref().unwrap_or(Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    include!("config.test.rs");
}
