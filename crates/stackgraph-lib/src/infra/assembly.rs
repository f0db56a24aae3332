//! Cloud assembly: the directory handed to the provisioning engine

use crate::infra::stack::Stack;
use crate::infra::synth::{SynthError, Template};
use crate::primitives::TemplateFormat;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

const MANIFEST_FILE: &str = "manifest.json";
const MANIFEST_VERSION: &str = "36.0.0";
const STACK_ARTIFACT_TYPE: &str = "aws:cloudformation:stack";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub version: String,
    pub artifacts: BTreeMap<String, ManifestArtifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestArtifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub environment: String,
    pub properties: ArtifactProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
    pub template_file: String,
}

/// Paths written by [`CloudAssembly::write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenAssembly {
    pub template: PathBuf,
    pub manifest: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CloudAssembly {
    directory: PathBuf,
}

impl CloudAssembly {
    pub const DEFAULT_DIR: &'static str = "cdk.out";

    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn template_file_name(stack: &Stack, format: TemplateFormat) -> String {
        format!("{}.template.{}", stack.name(), format.extension())
    }

    pub fn manifest(stack: &Stack, format: TemplateFormat) -> Manifest {
        let artifact = ManifestArtifact {
            artifact_type: STACK_ARTIFACT_TYPE.to_string(),
            environment: stack.environment().to_string(),
            properties: ArtifactProperties {
                template_file: Self::template_file_name(stack, format),
            },
        };

        Manifest {
            version: MANIFEST_VERSION.to_string(),
            artifacts: BTreeMap::from([(stack.name().to_string(), artifact)]),
        }
    }

    /// Write the template and manifest, creating the directory if needed
    pub fn write(
        &self,
        stack: &Stack,
        template: &Template,
        format: TemplateFormat,
    ) -> Result<WrittenAssembly, SynthError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| SynthError::Io {
            path: self.directory.display().to_string(),
            source: e,
        })?;

        let body = match format {
            TemplateFormat::Json => template.to_json_string()?,
            TemplateFormat::Yaml => template.to_yaml_string()?,
        };
        let template_path = self.directory.join(Self::template_file_name(stack, format));
        write_file(&template_path, &body)?;

        let manifest = serde_json::to_string_pretty(&Self::manifest(stack, format)).map_err(|e| {
            SynthError::Serialization {
                format: "json".to_string(),
                reason: e.to_string(),
            }
        })?;
        let manifest_path = self.directory.join(MANIFEST_FILE);
        write_file(&manifest_path, &manifest)?;

        info!(
            directory = %self.directory.display(),
            template = %template_path.display(),
            "Wrote cloud assembly"
        );

        Ok(WrittenAssembly {
            template: template_path,
            manifest: manifest_path,
        })
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), SynthError> {
    std::fs::write(path, contents).map_err(|e| SynthError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    include!("assembly.test.rs");
}
