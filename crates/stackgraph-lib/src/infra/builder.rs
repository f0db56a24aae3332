//! The services stack: one linear pass over every declaration
//!
//! Inputs are resolved before the first declaration. A [`StackEnvironment`]
//! can only exist once the account and region are known, and the instance's
//! boot script can only be attached once [`StartupScript::load`] succeeded,
//! so neither failure can leave a partially built graph behind.

use crate::infra::graph::GraphError;
use crate::infra::resources::codebuild::{
    BuildEnvironment, BuildImage, BuildProject, BuildSpec, Cache, ComputeType, LocalCacheMode,
};
use crate::infra::resources::codedeploy::{
    DeploymentApplication, DeploymentConfig, DeploymentGroup, InstanceTagSet,
};
use crate::infra::resources::ec2::{
    Instance, InstanceClass, InstanceSize, InstanceType, MachineImage, Peer, Port, SecurityGroup,
    UserData, VpcLookup,
};
use crate::infra::resources::gateway::{
    ApiKey, CorsPreflight, HttpGateway, HttpMethod, HttpUrlIntegration, RouteKey, UsagePlan,
};
use crate::infra::resources::iam::{
    ManagedPolicy, ParameterPath, PolicyStatement, Role, ServicePrincipal,
};
use crate::infra::resources::pipeline::{
    Artifact, BuildAction, DeployAction, Pipeline, SourceAction, SourceConnection,
};
use crate::infra::stack::{Stack, StackEnvironment};
use crate::infra::token::{Attribute, Expr};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Fixed names and values of the services stack
pub mod settings {
    pub const STACK_NAME: &str = "ZuinoServicesStack";
    pub const APP_PORT: u16 = 3000;
    pub const SHEBANG: &str = "#!/bin/bash";

    pub const APP_TAG_KEY: &str = "App";
    pub const APP_TAG_VALUE: &str = "MyBackend";

    pub const SECRET_PARAMETER: &str = "/zuino/api/gemini-api-key";

    pub const API_NAME: &str = "ZuinoServicesApi";
    pub const API_KEY_NAME: &str = "zuino-mobile-app-key";
    pub const USAGE_PLAN_NAME: &str = "ZuinoAppUsagePlan";

    pub const BUILD_PROJECT_NAME: &str = "ZuinoReceiptApiBuild";
    pub const BUILD_SPEC_PATH: &str = "services/receipt-api/buildspec.yml";

    pub const DEPLOY_APPLICATION_NAME: &str = "ZuinoReceiptApiService-App";
    pub const DEPLOYMENT_GROUP_NAME: &str = "ZuinoReceiptApiService-DG";

    pub const PIPELINE_NAME: &str = "ZuinoReceiptApiPipeline";
    pub const CONNECTION_ARN: &str = "arn:aws:codeconnections:us-east-1:314678225910:connection/48e26a39-dd56-4de1-8539-d6dc839972a2";
    pub const REPOSITORY_OWNER: &str = "paulo-eduardo";
    pub const REPOSITORY_NAME: &str = "zuino";
    pub const REPOSITORY_BRANCH: &str = "main";
    pub const SOURCE_ARTIFACT: &str = "SourceOutput";
    pub const BUILD_ARTIFACT: &str = "BuildOutput";
}

/// Construct ids, which also seed the template's logical ids
pub mod construct_ids {
    pub const ROLE: &str = "EC2InstanceRole";
    pub const SECURITY_GROUP: &str = "EC2InstanceSecurityGroup";
    pub const INSTANCE: &str = "AppEC2Instance";
    pub const GATEWAY: &str = "NewHttpApi";
    pub const API_KEY: &str = "AppApiKey";
    pub const USAGE_PLAN: &str = "AppUsagePlan";
    pub const BUILD_PROJECT: &str = "AppCodeBuildProject";
    pub const DEPLOY_APPLICATION: &str = "CodeDeployApplication";
    pub const DEPLOYMENT_GROUP: &str = "CodeDeployDeploymentGroup";
    pub const PIPELINE: &str = "CiCdPipeline";
}

/// Failure to obtain the instance boot script
#[derive(Debug, Error)]
pub enum UserDataError {
    // The io cause is part of the message, so it is not chained as a source
    #[error("Failed to read UserData script file: {path}\n{cause}")]
    ScriptUnreadable {
        path: String,
        cause: std::io::Error,
    },
}

/// Verbatim contents of the instance boot script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupScript {
    source: PathBuf,
    contents: String,
}

impl StartupScript {
    /// Location relative to the working directory
    pub const DEFAULT_PATH: &'static str = "scripts/ec2-init.sh";

    /// Read `scripts/ec2-init.sh` under `workdir`
    pub fn load(workdir: &Path) -> Result<Self, UserDataError> {
        let source = workdir.join(Self::DEFAULT_PATH);
        let contents =
            std::fs::read_to_string(&source).map_err(|e| UserDataError::ScriptUnreadable {
                path: Self::DEFAULT_PATH.to_string(),
                cause: e,
            })?;

        debug!(path = %source.display(), bytes = contents.len(), "Loaded startup script");
        Ok(Self { source, contents })
    }

    pub fn from_text(contents: impl Into<String>) -> Self {
        Self {
            source: PathBuf::from(Self::DEFAULT_PATH),
            contents: contents.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn user_data(&self) -> UserData {
        UserData::for_linux(settings::SHEBANG).add_commands([self.contents.as_str()])
    }
}

/// Declare every resource of the services stack
pub fn build_services_stack(
    environment: StackEnvironment,
    script: &StartupScript,
) -> Result<Stack, GraphError> {
    info!(stack = settings::STACK_NAME, %environment, "Building resource graph");

    let mut stack = Stack::new(settings::STACK_NAME, environment);

    // Instance identity
    let secret = ParameterPath::new(settings::SECRET_PARAMETER)?;
    let role = Role::new(ServicePrincipal::new("ec2.amazonaws.com"))
        .with_description("Role for the EC2 instance managed by CodeDeploy and SSM")
        .with_managed_policy(ManagedPolicy::aws_managed("AmazonSSMManagedInstanceCore"))
        .with_managed_policy(ManagedPolicy::aws_managed("AmazonS3ReadOnlyAccess"))
        .add_to_policy(
            PolicyStatement::allow(["ssm:GetParameter"]).on(secret.arn(stack.environment())),
        );
    let role = stack.declare(construct_ids::ROLE, role)?;

    // Network
    let network = VpcLookup::default_vpc().resolve(&mut stack);
    let security_group = SecurityGroup::new(
        &network,
        format!("Allow HTTP traffic on port {} from anywhere", settings::APP_PORT),
    )
    .allow_all_outbound(true)
    .add_ingress_rule(
        Peer::any_ipv4(),
        Port::tcp(settings::APP_PORT),
        format!("Allow HTTP traffic on port {}", settings::APP_PORT),
    );
    let security_group = stack.declare(construct_ids::SECURITY_GROUP, security_group)?;

    // Compute
    let image_id = MachineImage::LatestAmazonLinux2023.resolve(&mut stack);
    let instance = Instance {
        instance_type: InstanceType::of(InstanceClass::T3, InstanceSize::Micro),
        image_id,
        subnet_id: network.public_subnet_id.clone(),
        associate_public_ip: true,
        security_group,
        role,
        user_data: script.user_data(),
        tags: BTreeMap::new(),
    }
    .with_tag(settings::APP_TAG_KEY, settings::APP_TAG_VALUE);
    let instance = stack.declare(construct_ids::INSTANCE, instance)?;

    stack.add_output(
        "InstancePublicIpOutput",
        instance.attr(Attribute::PublicIp),
        "Public IP address of the EC2 instance",
    );

    // Gateway
    let instance_url = Expr::concat([
        Expr::literal("http://"),
        instance.attr(Attribute::PublicDnsName),
        Expr::literal(format!(":{}", settings::APP_PORT)),
    ]);
    let gateway = HttpGateway::new(settings::API_NAME)
        .with_description("HTTP API Gateway for Zuino Backend Services")
        .with_cors(CorsPreflight {
            allow_headers: vec!["*".to_string()],
            allow_methods: vec![HttpMethod::Post],
            allow_origins: vec!["*".to_string()],
        })
        .add_route(
            "DefaultRoute",
            RouteKey::Default,
            HttpUrlIntegration::new("EC2Integration", instance_url, HttpMethod::Any),
        );
    let gateway = stack.declare(construct_ids::GATEWAY, gateway)?;

    stack.add_output(
        "ApiGatewayUrlOutput",
        gateway.attr(Attribute::ApiEndpoint),
        "Endpoint URL for the HTTP API Gateway",
    );

    // Client access
    let api_key = stack.declare(
        construct_ids::API_KEY,
        ApiKey::new(settings::API_KEY_NAME).with_description("API key for the Zuino mobile app"),
    )?;
    stack.declare(
        construct_ids::USAGE_PLAN,
        UsagePlan::new(settings::USAGE_PLAN_NAME)
            .with_description("Usage plan for the Zuino mobile app")
            .add_api_key(&api_key),
    )?;

    stack.add_output(
        "ApiKeyIdOutput",
        api_key.reference(),
        "Id of the generated API key (read the secret value from the console)",
    );

    // Delivery
    let build_project = stack.declare(
        construct_ids::BUILD_PROJECT,
        BuildProject {
            name: settings::BUILD_PROJECT_NAME.to_string(),
            build_spec: BuildSpec::from_source_filename(settings::BUILD_SPEC_PATH),
            environment: BuildEnvironment {
                image: BuildImage::STANDARD_7_0,
                compute_type: ComputeType::Small,
                privileged: false,
            },
            cache: Cache::local([LocalCacheMode::Source, LocalCacheMode::Custom]),
        },
    )?;

    let application = stack.declare(
        construct_ids::DEPLOY_APPLICATION,
        DeploymentApplication::server(settings::DEPLOY_APPLICATION_NAME),
    )?;
    let deployment_group = stack.declare(
        construct_ids::DEPLOYMENT_GROUP,
        DeploymentGroup::new(&application, settings::DEPLOYMENT_GROUP_NAME)
            .with_instance_tags(
                InstanceTagSet::new().with_tag(settings::APP_TAG_KEY, [settings::APP_TAG_VALUE]),
            )
            .install_agent(true)
            .with_config(DeploymentConfig::OneAtATime),
    )?;

    let source_output = Artifact::new(settings::SOURCE_ARTIFACT);
    let build_output = Artifact::new(settings::BUILD_ARTIFACT);
    let pipeline = Pipeline {
        name: settings::PIPELINE_NAME.to_string(),
        source: SourceAction {
            action_name: "GitHub_Source".to_string(),
            connection: SourceConnection {
                connection_arn: settings::CONNECTION_ARN.to_string(),
                owner: settings::REPOSITORY_OWNER.to_string(),
                repository: settings::REPOSITORY_NAME.to_string(),
                branch: settings::REPOSITORY_BRANCH.to_string(),
            },
            output: source_output.clone(),
        },
        build: BuildAction {
            action_name: "CodeBuild".to_string(),
            project: build_project,
            input: source_output,
            output: build_output.clone(),
        },
        deploy: DeployAction {
            action_name: "CodeDeploy_To_EC2".to_string(),
            application,
            deployment_group,
            input: build_output,
        },
    };
    stack.declare(construct_ids::PIPELINE, pipeline)?;

    debug!(
        declarations = stack.graph().node_count(),
        references = stack.graph().edge_count(),
        lookups = stack.lookups().len(),
        "Resource graph complete"
    );

    Ok(stack)
}

#[cfg(test)]
mod tests {
    include!("builder.test.rs");
}
