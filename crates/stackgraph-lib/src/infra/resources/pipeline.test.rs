use super::*;
use crate::infra::resources::codebuild::{BuildEnvironment, BuildSpec, Cache, ComputeType, BuildImage};
use crate::infra::resources::codedeploy::{DeploymentApplication, DeploymentGroup};
use crate::infra::stack::{Stack, StackEnvironment};
use crate::infra::synth::synthesize;

fn pipeline_stack() -> (Stack, ResourceRef) {
    let mut stack = Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    );
    let project = stack
        .declare(
            "Build",
            BuildProject {
                name: "Build".to_string(),
                build_spec: BuildSpec::from_source_filename("buildspec.yml"),
                environment: BuildEnvironment {
                    image: BuildImage::STANDARD_7_0,
                    compute_type: ComputeType::Small,
                    privileged: false,
                },
                cache: Cache::None,
            },
        )
        .unwrap();
    let application = stack
        .declare("App", DeploymentApplication::server("App"))
        .unwrap();
    let group = stack
        .declare("Group", DeploymentGroup::new(&application, "Group"))
        .unwrap();

    let source_output = Artifact::new("SourceOutput");
    let build_output = Artifact::new("BuildOutput");
    let pipeline = Pipeline {
        name: "Pipeline".to_string(),
        source: SourceAction {
            action_name: "GitHub_Source".to_string(),
            connection: SourceConnection {
                connection_arn: "arn:aws:codeconnections:us-east-1:111111111111:connection/abc"
                    .to_string(),
                owner: "owner".to_string(),
                repository: "repo".to_string(),
                branch: "main".to_string(),
            },
            output: source_output.clone(),
        },
        build: BuildAction {
            action_name: "CodeBuild".to_string(),
            project,
            input: source_output,
            output: build_output.clone(),
        },
        deploy: DeployAction {
            action_name: "CodeDeploy_To_EC2".to_string(),
            application,
            deployment_group: group,
            input: build_output,
        },
    };
    assert!(pipeline.artifacts_chain());
    let reference = stack.declare("Pipeline", pipeline).unwrap();
    (stack, reference)
}

#[test]
fn test_pipeline_depends_on_project_application_and_group() {
    let (stack, pipeline) = pipeline_stack();
    let dependencies = stack.graph().dependencies(&pipeline.logical_id).unwrap();
    assert_eq!(dependencies.len(), 3);
}

#[test]
fn test_stages_render_in_order_with_chained_artifacts() {
    let (stack, pipeline) = pipeline_stack();
    let template = synthesize(&stack).unwrap();
    let stages = &template.resources[&pipeline.logical_id].properties["Stages"];

    let names: Vec<&str> = stages
        .as_array()
        .unwrap()
        .iter()
        .map(|stage| stage["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Source", "Build", "Deploy"]);

    assert_eq!(
        stages[0]["Actions"][0]["Configuration"]["FullRepositoryId"],
        "owner/repo"
    );
    assert_eq!(
        stages[0]["Actions"][0]["OutputArtifacts"][0]["Name"],
        stages[1]["Actions"][0]["InputArtifacts"][0]["Name"]
    );
    assert_eq!(
        stages[1]["Actions"][0]["OutputArtifacts"][0]["Name"],
        stages[2]["Actions"][0]["InputArtifacts"][0]["Name"]
    );
    assert_eq!(stages[2]["Actions"][0]["ActionTypeId"]["Provider"], "CodeDeploy");
}

#[test]
fn test_artifact_bucket_is_retained_and_encrypted() {
    let (stack, _) = pipeline_stack();
    let template = synthesize(&stack).unwrap();
    let buckets: Vec<_> = template.resources_of_type("AWS::S3::Bucket").collect();
    assert_eq!(buckets.len(), 1);

    let bucket = buckets[0].1;
    assert_eq!(bucket.deletion_policy.as_deref(), Some("Retain"));
    assert_eq!(
        bucket.properties["BucketEncryption"]["ServerSideEncryptionConfiguration"][0]
            ["ServerSideEncryptionByDefault"]["SSEAlgorithm"],
        "AES256"
    );
}

#[test]
fn test_build_role_gains_artifact_access() {
    let (stack, _) = pipeline_stack();
    let template = synthesize(&stack).unwrap();
    let (_, policy) = template.resources_of_type("AWS::IAM::Policy").next().unwrap();
    let project = stack.graph().find("Build").unwrap();
    let build_role = LogicalId::from_path(&[project.construct_id.as_str(), "Role", "Resource"]);
    assert_eq!(
        policy.properties["Roles"],
        json!([{ "Ref": build_role.as_str() }])
    );
}
