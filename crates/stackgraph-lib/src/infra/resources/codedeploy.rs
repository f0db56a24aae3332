//! Deployment application and group targeting tagged instances

use super::iam::{ManagedPolicy, Role, ServicePrincipal};
use crate::infra::graph::ResourceRef;
use crate::infra::synth::{SynthContext, Synthesize};
use crate::infra::token::{Attribute, Expr, LogicalId};
use serde_json::{Value, json};
use std::collections::BTreeMap;

const SERVICE_PRINCIPAL: &str = "codedeploy.amazonaws.com";
const SERVICE_ROLE_POLICY: &str = "service-role/AWSCodeDeployRole";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputePlatform {
    #[default]
    Server,
}

impl ComputePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputePlatform::Server => "Server",
        }
    }
}

/// Container for deployment groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentApplication {
    pub name: String,
    pub platform: ComputePlatform,
}

impl DeploymentApplication {
    pub fn server(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: ComputePlatform::Server,
        }
    }
}

impl Synthesize for DeploymentApplication {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        ctx.emit(
            "AWS::CodeDeploy::Application",
            json!({
                "ApplicationName": self.name,
                "ComputePlatform": self.platform.as_str(),
            }),
        );
    }
}

/// Instances matched by tag; values for one key are alternatives
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceTagSet {
    tags: BTreeMap<String, Vec<String>>,
}

impl InstanceTagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag<V: Into<String>>(mut self, key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        self.tags
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn filters(&self) -> Vec<Value> {
        self.tags
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |value| {
                    json!({ "Key": key, "Type": "KEY_AND_VALUE", "Value": value })
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentConfig {
    #[default]
    OneAtATime,
}

impl DeploymentConfig {
    pub fn name(&self) -> &'static str {
        match self {
            DeploymentConfig::OneAtATime => "CodeDeployDefault.OneAtATime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRollback {
    pub failed_deployment: bool,
    pub stopped_deployment: bool,
}

impl Default for AutoRollback {
    fn default() -> Self {
        Self {
            failed_deployment: true,
            stopped_deployment: false,
        }
    }
}

impl AutoRollback {
    fn to_json(self) -> Value {
        let mut events = Vec::new();
        if self.failed_deployment {
            events.push("DEPLOYMENT_FAILURE");
        }
        if self.stopped_deployment {
            events.push("DEPLOYMENT_STOP_ON_REQUEST");
        }
        if events.is_empty() {
            return json!({ "Enabled": false });
        }
        json!({ "Enabled": true, "Events": events })
    }
}

/// Set of tagged instances receiving revisions of one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentGroup {
    pub application: ResourceRef,
    pub name: String,
    pub instance_tags: InstanceTagSet,
    pub install_agent: bool,
    pub config: DeploymentConfig,
    pub auto_rollback: AutoRollback,
}

impl DeploymentGroup {
    pub fn new(application: &ResourceRef, name: impl Into<String>) -> Self {
        Self {
            application: application.clone(),
            name: name.into(),
            instance_tags: InstanceTagSet::new(),
            install_agent: false,
            config: DeploymentConfig::default(),
            auto_rollback: AutoRollback::default(),
        }
    }

    pub fn with_instance_tags(mut self, tags: InstanceTagSet) -> Self {
        self.instance_tags = tags;
        self
    }

    pub fn install_agent(mut self, install: bool) -> Self {
        self.install_agent = install;
        self
    }

    pub fn with_config(mut self, config: DeploymentConfig) -> Self {
        self.config = config;
        self
    }

    pub(crate) fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        vec![(self.application.logical_id.clone(), None)]
    }
}

impl Synthesize for DeploymentGroup {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let role = Role::new(ServicePrincipal::new(SERVICE_PRINCIPAL))
            .with_managed_policy(ManagedPolicy::aws_managed(SERVICE_ROLE_POLICY));
        let role_id = ctx.child_id("Role");
        ctx.emit_child(role_id.clone(), "AWS::IAM::Role", role.properties());

        let mut properties = json!({
            "ApplicationName": self.application.reference(),
            "AutoRollbackConfiguration": self.auto_rollback.to_json(),
            "DeploymentConfigName": self.config.name(),
            "DeploymentGroupName": self.name,
            "ServiceRoleArn": Expr::GetAtt(role_id, Attribute::Arn),
        });
        if !self.instance_tags.is_empty() {
            properties["Ec2TagSet"] = json!({
                "Ec2TagSetList": [{ "Ec2TagGroup": self.instance_tags.filters() }],
            });
        }

        ctx.emit("AWS::CodeDeploy::DeploymentGroup", properties);
    }
}

#[cfg(test)]
mod tests {
    include!("codedeploy.test.rs");
}
