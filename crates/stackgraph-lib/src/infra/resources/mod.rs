//! Declarable resource kinds
//!
//! Each kind lives in its own module and knows how to report the references
//! it carries and how to render itself. [`Resource`] is the closed set stored
//! in the graph.

pub mod codebuild;
pub mod codedeploy;
pub mod ec2;
pub mod gateway;
pub mod iam;
pub mod pipeline;

use crate::infra::synth::{SynthContext, Synthesize};
use crate::infra::token::{Attribute, Expr, LogicalId};
use std::fmt;

pub use codebuild::BuildProject;
pub use codedeploy::{DeploymentApplication, DeploymentGroup};
pub use ec2::{Instance, SecurityGroup};
pub use gateway::{ApiKey, HttpGateway, UsagePlan};
pub use iam::Role;
pub use pipeline::Pipeline;

/// Kind tag of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Role,
    SecurityGroup,
    Instance,
    HttpGateway,
    ApiKey,
    UsagePlan,
    BuildProject,
    DeploymentApplication,
    DeploymentGroup,
    Pipeline,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Role,
        ResourceKind::SecurityGroup,
        ResourceKind::Instance,
        ResourceKind::HttpGateway,
        ResourceKind::ApiKey,
        ResourceKind::UsagePlan,
        ResourceKind::BuildProject,
        ResourceKind::DeploymentApplication,
        ResourceKind::DeploymentGroup,
        ResourceKind::Pipeline,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Role => "role",
            ResourceKind::SecurityGroup => "security-group",
            ResourceKind::Instance => "instance",
            ResourceKind::HttpGateway => "http-gateway",
            ResourceKind::ApiKey => "api-key",
            ResourceKind::UsagePlan => "usage-plan",
            ResourceKind::BuildProject => "build-project",
            ResourceKind::DeploymentApplication => "deployment-application",
            ResourceKind::DeploymentGroup => "deployment-group",
            ResourceKind::Pipeline => "pipeline",
        }
    }

    /// Template type of the declaration's primary resource
    pub fn cfn_type(&self) -> &'static str {
        match self {
            ResourceKind::Role => "AWS::IAM::Role",
            ResourceKind::SecurityGroup => "AWS::EC2::SecurityGroup",
            ResourceKind::Instance => "AWS::EC2::Instance",
            ResourceKind::HttpGateway => "AWS::ApiGatewayV2::Api",
            ResourceKind::ApiKey => "AWS::ApiGateway::ApiKey",
            ResourceKind::UsagePlan => "AWS::ApiGateway::UsagePlan",
            ResourceKind::BuildProject => "AWS::CodeBuild::Project",
            ResourceKind::DeploymentApplication => "AWS::CodeDeploy::Application",
            ResourceKind::DeploymentGroup => "AWS::CodeDeploy::DeploymentGroup",
            ResourceKind::Pipeline => "AWS::CodePipeline::Pipeline",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Any declarable resource
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Role(Role),
    SecurityGroup(SecurityGroup),
    Instance(Box<Instance>),
    HttpGateway(HttpGateway),
    ApiKey(ApiKey),
    UsagePlan(UsagePlan),
    BuildProject(BuildProject),
    DeploymentApplication(DeploymentApplication),
    DeploymentGroup(DeploymentGroup),
    Pipeline(Box<Pipeline>),
}

macro_rules! impl_from_resource {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(resource: $ty) -> Self {
                    Resource::$variant(resource.into())
                }
            }
        )*
    };
}

impl_from_resource! {
    Role => Role,
    SecurityGroup => SecurityGroup,
    Instance => Instance,
    HttpGateway => HttpGateway,
    ApiKey => ApiKey,
    UsagePlan => UsagePlan,
    BuildProject => BuildProject,
    DeploymentApplication => DeploymentApplication,
    DeploymentGroup => DeploymentGroup,
    Pipeline => Pipeline,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Role(_) => ResourceKind::Role,
            Resource::SecurityGroup(_) => ResourceKind::SecurityGroup,
            Resource::Instance(_) => ResourceKind::Instance,
            Resource::HttpGateway(_) => ResourceKind::HttpGateway,
            Resource::ApiKey(_) => ResourceKind::ApiKey,
            Resource::UsagePlan(_) => ResourceKind::UsagePlan,
            Resource::BuildProject(_) => ResourceKind::BuildProject,
            Resource::DeploymentApplication(_) => ResourceKind::DeploymentApplication,
            Resource::DeploymentGroup(_) => ResourceKind::DeploymentGroup,
            Resource::Pipeline(_) => ResourceKind::Pipeline,
        }
    }

    /// Declarations this resource points at, possibly with duplicates
    pub fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        match self {
            Resource::Role(role) => role.references(),
            Resource::SecurityGroup(group) => group.references(),
            Resource::Instance(instance) => instance.references(),
            Resource::HttpGateway(gateway) => gateway.references(),
            Resource::ApiKey(_) => Vec::new(),
            Resource::UsagePlan(plan) => plan.references(),
            Resource::BuildProject(_) => Vec::new(),
            Resource::DeploymentApplication(_) => Vec::new(),
            Resource::DeploymentGroup(group) => group.references(),
            Resource::Pipeline(pipeline) => pipeline.references(),
        }
    }
}

impl Synthesize for Resource {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        match self {
            Resource::Role(role) => role.synthesize(ctx),
            Resource::SecurityGroup(group) => group.synthesize(ctx),
            Resource::Instance(instance) => instance.synthesize(ctx),
            Resource::HttpGateway(gateway) => gateway.synthesize(ctx),
            Resource::ApiKey(key) => key.synthesize(ctx),
            Resource::UsagePlan(plan) => plan.synthesize(ctx),
            Resource::BuildProject(project) => project.synthesize(ctx),
            Resource::DeploymentApplication(application) => application.synthesize(ctx),
            Resource::DeploymentGroup(group) => group.synthesize(ctx),
            Resource::Pipeline(pipeline) => pipeline.synthesize(ctx),
        }
    }
}

impl Synthesize for Role {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        ctx.emit("AWS::IAM::Role", self.properties());
    }
}

/// Owned resource references carried by a set of values
pub(crate) fn owned_refs(values: &[&Expr]) -> Vec<(LogicalId, Option<Attribute>)> {
    values
        .iter()
        .flat_map(|value| value.resource_refs())
        .map(|(id, attribute)| (id.clone(), attribute))
        .collect()
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
