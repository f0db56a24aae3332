//! Build project fed and drained by the pipeline

use super::iam::{PolicyStatement, Role, ServicePrincipal};
use crate::infra::graph::ResourceRef;
use crate::infra::synth::{SynthContext, Synthesize};
use crate::infra::token::{Attribute, Expr, LogicalId, Pseudo};
use serde_json::{Value, json};

const SERVICE_PRINCIPAL: &str = "codebuild.amazonaws.com";

/// Where the build instructions come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSpec {
    /// Path of a buildspec file inside the source artifact
    FromSourceFilename(String),
}

impl BuildSpec {
    pub fn from_source_filename(path: impl Into<String>) -> Self {
        BuildSpec::FromSourceFilename(path.into())
    }

    fn render(&self) -> &str {
        match self {
            BuildSpec::FromSourceFilename(path) => path,
        }
    }
}

/// Curated build images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildImage {
    Standard7,
}

impl BuildImage {
    pub const STANDARD_7_0: BuildImage = BuildImage::Standard7;

    pub fn image_id(&self) -> &'static str {
        match self {
            BuildImage::Standard7 => "aws/codebuild/standard:7.0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeType {
    #[default]
    Small,
}

impl ComputeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeType::Small => "BUILD_GENERAL1_SMALL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    pub image: BuildImage,
    pub compute_type: ComputeType,
    pub privileged: bool,
}

impl BuildEnvironment {
    fn to_json(&self) -> Value {
        json!({
            "ComputeType": self.compute_type.as_str(),
            "Image": self.image.image_id(),
            "ImagePullCredentialsType": "CODEBUILD",
            "PrivilegedMode": self.privileged,
            "Type": "LINUX_CONTAINER",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCacheMode {
    Source,
    Custom,
}

impl LocalCacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalCacheMode::Source => "LOCAL_SOURCE_CACHE",
            LocalCacheMode::Custom => "LOCAL_CUSTOM_CACHE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cache {
    None,
    Local(Vec<LocalCacheMode>),
}

impl Cache {
    pub fn local(modes: impl IntoIterator<Item = LocalCacheMode>) -> Self {
        Cache::Local(modes.into_iter().collect())
    }

    fn to_json(&self) -> Value {
        match self {
            Cache::None => json!({ "Type": "NO_CACHE" }),
            Cache::Local(modes) => {
                let modes: Vec<&str> = modes.iter().map(LocalCacheMode::as_str).collect();
                json!({ "Modes": modes, "Type": "LOCAL" })
            }
        }
    }
}

/// Build job whose source and artifacts are handed over by a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProject {
    pub name: String,
    pub build_spec: BuildSpec,
    pub environment: BuildEnvironment,
    pub cache: Cache,
}

impl BuildProject {
    /// Logical id of the service role rendered with a project
    pub fn service_role_id(project: &ResourceRef) -> LogicalId {
        LogicalId::from_path(&[project.construct_id.as_str(), "Role", "Resource"])
    }

    fn log_group_arn(&self, ctx: &SynthContext<'_>, suffix: &str) -> Expr {
        let environment = ctx.environment();
        Expr::concat([
            Expr::literal("arn:"),
            Expr::Pseudo(Pseudo::Partition),
            Expr::literal(format!(
                ":logs:{}:{}:log-group:/aws/codebuild/{}{}",
                environment.region(),
                environment.account(),
                self.name,
                suffix
            )),
        ])
    }
}

impl Synthesize for BuildProject {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let role = Role::new(ServicePrincipal::new(SERVICE_PRINCIPAL)).add_to_policy(
            PolicyStatement::allow(["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"])
                .on(self.log_group_arn(ctx, ""))
                .on(self.log_group_arn(ctx, ":*")),
        );
        let role_id = ctx.child_id("Role");
        ctx.emit_child(role_id.clone(), "AWS::IAM::Role", role.properties());

        let resource = ctx.emit(
            "AWS::CodeBuild::Project",
            json!({
                "Artifacts": { "Type": "CODEPIPELINE" },
                "Cache": self.cache.to_json(),
                "Environment": self.environment.to_json(),
                "Name": self.name,
                "ServiceRole": Expr::GetAtt(role_id.clone(), Attribute::Arn),
                "Source": {
                    "BuildSpec": self.build_spec.render(),
                    "Type": "CODEPIPELINE",
                },
            }),
        );
        resource.depends_on.push(role_id);
    }
}

#[cfg(test)]
mod tests {
    include!("codebuild.test.rs");
}
