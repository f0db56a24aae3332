use super::*;
use crate::infra::stack::{Stack, StackEnvironment};
use crate::infra::synth::synthesize;

fn project() -> BuildProject {
    BuildProject {
        name: "ReceiptBuild".to_string(),
        build_spec: BuildSpec::from_source_filename("services/receipt-api/buildspec.yml"),
        environment: BuildEnvironment {
            image: BuildImage::STANDARD_7_0,
            compute_type: ComputeType::Small,
            privileged: false,
        },
        cache: Cache::local([LocalCacheMode::Source, LocalCacheMode::Custom]),
    }
}

#[test]
fn test_environment_and_cache_rendering() {
    let project = project();
    let environment = project.environment.to_json();
    assert_eq!(environment["Image"], "aws/codebuild/standard:7.0");
    assert_eq!(environment["ComputeType"], "BUILD_GENERAL1_SMALL");
    assert_eq!(environment["PrivilegedMode"], false);

    let cache = project.cache.to_json();
    assert_eq!(cache["Type"], "LOCAL");
    assert_eq!(
        cache["Modes"],
        json!(["LOCAL_SOURCE_CACHE", "LOCAL_CUSTOM_CACHE"])
    );
    assert_eq!(Cache::None.to_json()["Type"], "NO_CACHE");
}

#[test]
fn test_project_renders_with_its_own_service_role() {
    let mut stack = Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    );
    let reference = stack.declare("Build", project()).unwrap();
    let template = synthesize(&stack).unwrap();

    let role_id = BuildProject::service_role_id(&reference);
    let role = &template.resources[&role_id];
    assert_eq!(role.resource_type, "AWS::IAM::Role");
    assert_eq!(
        role.properties["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"],
        "codebuild.amazonaws.com"
    );

    let rendered = &template.resources[&reference.logical_id];
    assert_eq!(rendered.properties["Name"], "ReceiptBuild");
    assert_eq!(
        rendered.properties["Source"]["BuildSpec"],
        "services/receipt-api/buildspec.yml"
    );
    assert_eq!(rendered.properties["Source"]["Type"], "CODEPIPELINE");
    assert_eq!(
        rendered.properties["ServiceRole"],
        json!({ "Fn::GetAtt": [role_id.as_str(), "Arn"] })
    );
    assert_eq!(rendered.depends_on, vec![role_id]);
}
