//! Configuration loading
//!
//! Coordinates `.env` files, environment variables and the command line into
//! one [`LoadedConfig`].

use crate::primitives::ConfigError;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{
    cli::{CliConfig, Commands},
    config::AppConfig,
    env::EnvironmentConfig,
};

/// `.env` files read from the working directory, in priority order
pub const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Everything a command needs before it runs
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub app_config: AppConfig,
    pub environment: EnvironmentConfig,
    pub command: Option<Commands>,
}

/// Load `.env.local` then `.env` from `dir`; existing variables always win
pub fn load_env_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut loaded = Vec::new();
    for env_file in ENV_FILES {
        let path = dir.join(env_file);
        match dotenvy::from_path(&path) {
            Ok(()) => loaded.push(path),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(ConfigError::EnvFileError {
                    file: path.display().to_string(),
                    source: e,
                });
            }
        }
    }
    Ok(loaded)
}

impl LoadedConfig {
    /// Load config: defaults -> .env -> env vars -> CLI
    pub fn load() -> Result<Self, ConfigError> {
        // .env in the invocation directory feeds STACKGRAPH_* into clap
        let mut env_files = load_env_files(&std::env::current_dir()?)?;

        let cli_config = CliConfig::load()?;

        // A different working directory may carry its own .env
        if let Some(workdir) = &cli_config.app_config.workdir {
            env_files.extend(load_env_files(workdir)?);
        }

        let loaded = Self::resolve(cli_config, EnvironmentConfig::load()?)?;
        debug!(?env_files, "Configuration loaded");
        Ok(loaded)
    }

    /// Layer parsed CLI input over defaults and environment
    pub fn resolve(cli_config: CliConfig, environment: EnvironmentConfig) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.color = environment.apply_color_config(config.color);
        config = config.merge_with(cli_config.app_config);
        config.validate()?;

        Ok(Self {
            app_config: config,
            environment,
            command: cli_config.command,
        })
    }
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}
