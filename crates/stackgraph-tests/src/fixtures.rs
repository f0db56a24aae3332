//! Readers for a written cloud assembly

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub artifacts: BTreeMap<String, ManifestArtifact>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestArtifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub environment: String,
    pub properties: ArtifactProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
    pub template_file: String,
}

/// Manifest plus the parsed template it points at
#[derive(Debug)]
pub struct AssemblyFixture {
    pub directory: PathBuf,
    pub manifest: Manifest,
    pub template: Value,
}

impl AssemblyFixture {
    /// Read `manifest.json` and the single stack template it lists
    pub fn load(directory: &Path) -> Result<Self> {
        let manifest_path = directory.join("manifest.json");
        let manifest: Manifest = serde_json::from_str(
            &std::fs::read_to_string(&manifest_path)
                .with_context(|| format!("Failed to read {}", manifest_path.display()))?,
        )?;

        let artifact = manifest
            .artifacts
            .values()
            .next()
            .context("Manifest lists no artifacts")?;
        let template_path = directory.join(&artifact.properties.template_file);
        let template: Value = serde_json::from_str(
            &std::fs::read_to_string(&template_path)
                .with_context(|| format!("Failed to read {}", template_path.display()))?,
        )?;

        Ok(Self {
            directory: directory.to_path_buf(),
            manifest,
            template,
        })
    }

    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(String, Value)> {
        resources_of_type(&self.template, resource_type)
    }
}

/// `(logical id, resource)` pairs of one template type
pub fn resources_of_type(template: &Value, resource_type: &str) -> Vec<(String, Value)> {
    template["Resources"]
        .as_object()
        .map(|resources| {
            resources
                .iter()
                .filter(|(_, resource)| resource["Type"] == resource_type)
                .map(|(id, resource)| (id.clone(), resource.clone()))
                .collect()
        })
        .unwrap_or_default()
}
