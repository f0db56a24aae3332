//! Isolated working directory for end-to-end runs
//!
//! Each [`TestEnvironment`] owns a temp directory laid out like a checkout
//! of the services repository, plus the account/region the run targets.
//! Nothing is read from or written to the process environment.

use anyhow::Result;
use stackgraph_lib::application::{
    AppConfig, CommandContext, Commands, EnvironmentConfig, execute_command_with_context,
};
use stackgraph_lib::infra::StartupScript;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TEST_ACCOUNT: &str = "123456789012";
pub const TEST_REGION: &str = "us-east-1";

/// Default boot script used by workflows that do not care about its content
pub const DEFAULT_SCRIPT: &str = "#!/usr/bin/env bash\nset -euo pipefail\ndnf install -y ruby wget\n";

pub struct TestEnvironment {
    /// Temporary directory for the test environment
    pub temp_dir: TempDir,
    /// Working directory handed to the commands
    pub work_path: PathBuf,
    environment: EnvironmentConfig,
}

/// Output of one command run
#[derive(Debug)]
pub struct CommandRun {
    pub result: Result<()>,
    pub stdout: String,
}

impl TestEnvironment {
    /// Working directory with account and region set, but no boot script
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let work_path = temp_dir.path().join("work");
        fs::create_dir_all(&work_path)?;

        Ok(Self {
            temp_dir,
            work_path,
            environment: EnvironmentConfig {
                cdk_default_account: Some(TEST_ACCOUNT.to_string()),
                cdk_default_region: Some(TEST_REGION.to_string()),
                ..EnvironmentConfig::default()
            },
        })
    }

    /// Ready-to-synthesize environment with the default boot script
    pub fn with_default_script() -> Result<Self> {
        let env = Self::new()?;
        env.write_script(DEFAULT_SCRIPT)?;
        Ok(env)
    }

    pub fn write_script(&self, content: &str) -> Result<()> {
        let path = self.work_path.join(StartupScript::DEFAULT_PATH);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Replace the target account/region (None = unset)
    pub fn with_target(mut self, account: Option<&str>, region: Option<&str>) -> Self {
        self.environment.cdk_default_account = account.map(str::to_string);
        self.environment.cdk_default_region = region.map(str::to_string);
        self
    }

    pub fn work_path(&self) -> &Path {
        &self.work_path
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_path.join("cdk.out")
    }

    pub fn context(&self) -> Result<CommandContext> {
        let mut app = AppConfig {
            workdir: Some(self.work_path.clone()),
            ..AppConfig::default()
        };
        app.validate()?;
        Ok(CommandContext::new(app, self.environment.clone()))
    }

    /// Run one command, capturing what it prints
    pub fn run(&self, command: Commands) -> Result<CommandRun> {
        let context = self.context()?;
        let mut out = Vec::new();
        let result = execute_command_with_context(command, &context, &mut out);
        Ok(CommandRun {
            result,
            stdout: String::from_utf8(out)?,
        })
    }
}
