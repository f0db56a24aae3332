use super::*;
use crate::infra::stack::{Stack, StackEnvironment};
use crate::infra::synth::synthesize;

#[test]
fn test_auto_rollback_events() {
    let rollback = AutoRollback::default().to_json();
    assert_eq!(rollback["Enabled"], true);
    assert_eq!(rollback["Events"], json!(["DEPLOYMENT_FAILURE"]));

    let disabled = AutoRollback {
        failed_deployment: false,
        stopped_deployment: false,
    };
    assert_eq!(disabled.to_json(), json!({ "Enabled": false }));
}

#[test]
fn test_group_renders_against_its_application() {
    let mut stack = Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    );
    let application = stack
        .declare("App", DeploymentApplication::server("Service-App"))
        .unwrap();
    let group = stack
        .declare(
            "Group",
            DeploymentGroup::new(&application, "Service-DG")
                .with_instance_tags(InstanceTagSet::new().with_tag("App", ["MyBackend"]))
                .install_agent(true)
                .with_config(DeploymentConfig::OneAtATime),
        )
        .unwrap();

    let template = synthesize(&stack).unwrap();
    let app = &template.resources[&application.logical_id];
    assert_eq!(app.properties["ComputePlatform"], "Server");

    let rendered = &template.resources[&group.logical_id];
    assert_eq!(
        rendered.properties["ApplicationName"],
        json!({ "Ref": application.logical_id.as_str() })
    );
    assert_eq!(
        rendered.properties["DeploymentConfigName"],
        "CodeDeployDefault.OneAtATime"
    );
    assert_eq!(
        rendered.properties["Ec2TagSet"]["Ec2TagSetList"][0]["Ec2TagGroup"][0],
        json!({ "Key": "App", "Type": "KEY_AND_VALUE", "Value": "MyBackend" })
    );
    assert_eq!(rendered.depends_on, vec![application.logical_id.clone()]);
}
