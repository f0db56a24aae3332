//! Three-stage delivery pipeline: source, build, deploy
//!
//! Stages are fields rather than a list, so a pipeline always has exactly one
//! source, one build and one deploy stage, in that order. Artifacts are
//! matched by name: the build consumes what the source produces and the
//! deploy consumes what the build produces.

use super::codebuild::BuildProject;
use super::iam::{PolicyStatement, Role, ServicePrincipal};
use crate::infra::graph::ResourceRef;
use crate::infra::synth::{SynthContext, Synthesize};
use crate::infra::token::{Attribute, Expr, LogicalId, Pseudo};
use serde_json::{Value, json};
use std::fmt;

const SERVICE_PRINCIPAL: &str = "codepipeline.amazonaws.com";

/// Named intermediate bundle passed between stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    name: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn to_json(&self) -> Value {
        json!({ "Name": self.name })
    }
}

/// Repository reached through a pre-existing connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConnection {
    pub connection_arn: String,
    pub owner: String,
    pub repository: String,
    pub branch: String,
}

impl SourceConnection {
    /// `owner/repository`
    pub fn full_repository_id(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAction {
    pub action_name: String,
    pub connection: SourceConnection,
    pub output: Artifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildAction {
    pub action_name: String,
    pub project: ResourceRef,
    pub input: Artifact,
    pub output: Artifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployAction {
    pub action_name: String,
    pub application: ResourceRef,
    pub deployment_group: ResourceRef,
    pub input: Artifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Source,
    Build,
    Deploy,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Source => "Source",
            StageKind::Build => "Build",
            StageKind::Deploy => "Deploy",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub name: String,
    pub source: SourceAction,
    pub build: BuildAction,
    pub deploy: DeployAction,
}

impl Pipeline {
    pub fn stages(&self) -> [StageKind; 3] {
        [StageKind::Source, StageKind::Build, StageKind::Deploy]
    }

    /// Each stage consumes the artifact produced by the one before it
    pub fn artifacts_chain(&self) -> bool {
        self.build.input == self.source.output && self.deploy.input == self.build.output
    }

    pub(crate) fn references(&self) -> Vec<(LogicalId, Option<Attribute>)> {
        vec![
            (self.build.project.logical_id.clone(), None),
            (self.deploy.application.logical_id.clone(), None),
            (self.deploy.deployment_group.logical_id.clone(), None),
        ]
    }

    fn action_type(category: &str, owner: &str, provider: &str) -> Value {
        json!({
            "Category": category,
            "Owner": owner,
            "Provider": provider,
            "Version": "1",
        })
    }

    fn render_stages(&self, ctx: &SynthContext<'_>) -> Value {
        let environment = ctx.environment();
        let deploy_application = self.deploy.application.reference();

        json!([
            {
                "Actions": [{
                    "ActionTypeId": Self::action_type("Source", "AWS", "CodeStarSourceConnection"),
                    "Configuration": {
                        "BranchName": self.source.connection.branch,
                        "ConnectionArn": self.source.connection.connection_arn,
                        "FullRepositoryId": self.source.connection.full_repository_id(),
                    },
                    "Name": self.source.action_name,
                    "OutputArtifacts": [self.source.output.to_json()],
                    "RunOrder": 1,
                }],
                "Name": StageKind::Source.name(),
            },
            {
                "Actions": [{
                    "ActionTypeId": Self::action_type("Build", "AWS", "CodeBuild"),
                    "Configuration": { "ProjectName": self.build.project.reference() },
                    "InputArtifacts": [self.build.input.to_json()],
                    "Name": self.build.action_name,
                    "OutputArtifacts": [self.build.output.to_json()],
                    "RunOrder": 1,
                }],
                "Name": StageKind::Build.name(),
            },
            {
                "Actions": [{
                    "ActionTypeId": Self::action_type("Deploy", "AWS", "CodeDeploy"),
                    "Configuration": {
                        "ApplicationName": deploy_application,
                        "DeploymentGroupName": self.deploy.deployment_group.reference(),
                    },
                    "InputArtifacts": [self.deploy.input.to_json()],
                    "Name": self.deploy.action_name,
                    "Region": environment.region(),
                    "RunOrder": 1,
                }],
                "Name": StageKind::Deploy.name(),
            },
        ])
    }

    fn role(&self, ctx: &SynthContext<'_>, bucket_id: &LogicalId) -> Role {
        let environment = ctx.environment();
        let bucket_arn = Expr::GetAtt(bucket_id.clone(), Attribute::Arn);
        let bucket_objects = Expr::concat([bucket_arn.clone(), Expr::literal("/*")]);
        let project_arn = Expr::concat([
            Expr::literal("arn:"),
            Expr::Pseudo(Pseudo::Partition),
            Expr::literal(format!(
                ":codebuild:{}:{}:project/",
                environment.region(),
                environment.account()
            )),
            self.build.project.reference(),
        ]);
        let deploy_arn = |resource: &str| {
            Expr::concat([
                Expr::literal("arn:"),
                Expr::Pseudo(Pseudo::Partition),
                Expr::literal(format!(
                    ":codedeploy:{}:{}:{}",
                    environment.region(),
                    environment.account(),
                    resource
                )),
            ])
        };

        Role::new(ServicePrincipal::new(SERVICE_PRINCIPAL))
            .add_to_policy(
                PolicyStatement::allow([
                    "s3:Abort*",
                    "s3:DeleteObject*",
                    "s3:GetBucket*",
                    "s3:GetObject*",
                    "s3:List*",
                    "s3:PutObject",
                ])
                .on(bucket_arn)
                .on(bucket_objects),
            )
            .add_to_policy(
                PolicyStatement::allow(["codestar-connections:UseConnection"])
                    .on(self.source.connection.connection_arn.as_str()),
            )
            .add_to_policy(
                PolicyStatement::allow([
                    "codebuild:BatchGetBuilds",
                    "codebuild:StartBuild",
                    "codebuild:StopBuild",
                ])
                .on(project_arn),
            )
            .add_to_policy(
                PolicyStatement::allow([
                    "codedeploy:CreateDeployment",
                    "codedeploy:GetApplication",
                    "codedeploy:GetApplicationRevision",
                    "codedeploy:GetDeployment",
                    "codedeploy:GetDeploymentConfig",
                    "codedeploy:RegisterApplicationRevision",
                ])
                .on(deploy_arn("application:*"))
                .on(deploy_arn("deploymentgroup:*"))
                .on(deploy_arn("deploymentconfig:*")),
            )
    }
}

impl Synthesize for Pipeline {
    fn synthesize(&self, ctx: &mut SynthContext<'_>) {
        let bucket_id = ctx.child_id("ArtifactsBucket");
        ctx.emit_child(
            bucket_id.clone(),
            "AWS::S3::Bucket",
            json!({
                "BucketEncryption": {
                    "ServerSideEncryptionConfiguration": [{
                        "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" },
                    }],
                },
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true,
                },
            }),
        )
        .retain();

        let role_id = ctx.child_id("Role");
        let role = self.role(ctx, &bucket_id);
        ctx.emit_child(role_id.clone(), "AWS::IAM::Role", role.properties());

        // The build project's role must read and write the artifact bucket
        let build_role_id = BuildProject::service_role_id(&self.build.project);
        let artifacts_policy_id = ctx.child_id("BuildArtifactsPolicy");
        let bucket_arn = Expr::GetAtt(bucket_id.clone(), Attribute::Arn);
        let access = PolicyStatement::allow([
            "s3:GetBucket*",
            "s3:GetObject*",
            "s3:List*",
            "s3:PutObject",
        ])
        .on(bucket_arn.clone())
        .on(Expr::concat([bucket_arn, Expr::literal("/*")]));
        ctx.emit_child(
            artifacts_policy_id,
            "AWS::IAM::Policy",
            json!({
                "PolicyDocument": {
                    "Statement": [access.to_json()],
                    "Version": "2012-10-17",
                },
                "PolicyName": "BuildArtifactsPolicy",
                "Roles": [Expr::Ref(build_role_id)],
            }),
        );

        let stages = self.render_stages(ctx);
        let resource = ctx.emit(
            "AWS::CodePipeline::Pipeline",
            json!({
                "ArtifactStore": {
                    "Location": Expr::Ref(bucket_id),
                    "Type": "S3",
                },
                "Name": self.name,
                "RestartExecutionOnUpdate": false,
                "RoleArn": Expr::GetAtt(role_id.clone(), Attribute::Arn),
                "Stages": stages,
            }),
        );
        resource.depends_on.push(role_id);
        resource.depends_on.sort();
    }
}

#[cfg(test)]
mod tests {
    include!("pipeline.test.rs");
}
