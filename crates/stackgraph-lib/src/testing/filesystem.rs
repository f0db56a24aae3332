//! Filesystem-based testing utilities
//!
//! A temporary working directory that disappears on drop, with helpers for
//! the boot script and `.env` files the stack reads.

use crate::infra::StartupScript;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Temporary directory fixture with automatic cleanup
pub struct TempDirFixture {
    /// The temporary directory (automatically cleaned up on drop)
    pub temp_dir: TempDir,
}

impl TempDirFixture {
    /// Create a new temporary directory fixture
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        Ok(Self { temp_dir })
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write content to a file within the temporary directory
    pub fn write_file(
        &self,
        file_path: &str,
        content: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let full_path = self.path().join(file_path);

        // Ensure parent directory exists
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, content)?;
        Ok(())
    }

    /// Place the instance boot script where the builder looks for it
    pub fn write_script(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write_file(StartupScript::DEFAULT_PATH, content)
    }

    /// Write a `.env` file from key/value pairs
    pub fn write_env_file(
        &self,
        name: &str,
        vars: &[(&str, &str)],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content: String = vars
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect();
        self.write_file(name, &content)
    }

    /// Read content from a file within the temporary directory
    pub fn read_file(&self, file_path: &str) -> Result<String, Box<dyn std::error::Error>> {
        let full_path = self.path().join(file_path);
        let content = fs::read_to_string(&full_path)?;
        Ok(content)
    }

    /// Check if a file exists within the temporary directory
    pub fn file_exists(&self, file_path: &str) -> bool {
        self.path().join(file_path).exists()
    }
}

#[cfg(test)]
mod tests {
    include!("filesystem.test.rs");
}
