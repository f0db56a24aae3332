use super::*;
use crate::infra::resources::iam::{PolicyStatement, Role, ServicePrincipal};
use crate::infra::resources::{ApiKey, UsagePlan};
use crate::infra::stack::Lookup;
use crate::infra::token::Attribute;
use serde_json::json;

fn stack() -> Stack {
    Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    )
    .with_description("test stack")
}

#[test]
fn test_empty_stack_renders_header_only() {
    let template = synthesize(&stack()).unwrap();
    assert_eq!(template.format_version, "2010-09-09");
    assert_eq!(template.description.as_deref(), Some("test stack"));
    assert!(template.resources.is_empty());

    let json: Value = serde_json::from_str(&template.to_json_string().unwrap()).unwrap();
    assert!(json.get("Parameters").is_none());
    assert!(json.get("Outputs").is_none());
    assert_eq!(json["Resources"], json!({}));
}

#[test]
fn test_dependencies_become_depends_on() {
    let mut stack = stack();
    let key = stack.declare("Key", ApiKey::new("key")).unwrap();
    let plan = stack
        .declare("Plan", UsagePlan::new("plan").add_api_key(&key))
        .unwrap();

    let template = synthesize(&stack).unwrap();
    assert_eq!(template.resources[&plan.logical_id].depends_on, vec![key.logical_id.clone()]);
    assert!(template.resources[&key.logical_id].depends_on.is_empty());
}

#[test]
fn test_lookups_and_outputs_are_rendered() {
    let mut stack = stack();
    let vpc = stack.lookup(Lookup {
        name: "VpcId".to_string(),
        parameter_type: "AWS::EC2::VPC::Id".to_string(),
        description: "vpc".to_string(),
        default: None,
    });
    let key = stack.declare("Key", ApiKey::new("key")).unwrap();
    stack.add_output("KeyId", key.reference(), "key id");
    stack.add_output("Vpc", vpc, "vpc id");

    let template = synthesize(&stack).unwrap();
    assert_eq!(template.parameters["VpcId"].parameter_type, "AWS::EC2::VPC::Id");

    let json: Value = serde_json::from_str(&template.to_json_string().unwrap()).unwrap();
    assert_eq!(
        json["Outputs"]["KeyId"],
        json!({ "Description": "key id", "Value": { "Ref": key.logical_id.as_str() } })
    );
    assert_eq!(json["Outputs"]["Vpc"]["Value"], json!({ "Ref": "VpcId" }));
}

#[test]
fn test_output_pointing_at_nothing_fails_validation() {
    let mut stack = stack();
    stack.add_output(
        "Dangling",
        Expr::GetAtt(LogicalId::from_path(&["Ghost", "Resource"]), Attribute::Arn),
        "nothing",
    );

    let err = synthesize(&stack).unwrap_err();
    match err {
        SynthError::UnresolvedReference { location, .. } => assert_eq!(location, "Output Dangling"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_parameter_reference_without_lookup_fails_validation() {
    let mut stack = stack();
    stack
        .declare(
            "Role",
            Role::new(ServicePrincipal::new("ec2.amazonaws.com"))
                .add_to_policy(PolicyStatement::allow(["s3:GetObject"]).on(Expr::Param("Unregistered".to_string()))),
        )
        .unwrap();

    assert!(matches!(
        synthesize(&stack),
        Err(SynthError::UnresolvedReference { .. })
    ));
}

#[test]
fn test_pseudo_parameters_pass_validation() {
    let mut stack = stack();
    stack
        .declare(
            "Role",
            Role::new(ServicePrincipal::new("ec2.amazonaws.com")).add_to_policy(
                PolicyStatement::allow(["s3:GetObject"]).on(Expr::concat([
                    Expr::literal("arn:"),
                    Expr::Pseudo(crate::infra::token::Pseudo::Partition),
                    Expr::literal(":s3:::bucket/*"),
                ])),
            ),
        )
        .unwrap();

    assert!(synthesize(&stack).is_ok());
}

#[test]
fn test_synthesis_is_deterministic() {
    let build = || {
        let mut stack = stack();
        let key = stack.declare("Key", ApiKey::new("key")).unwrap();
        stack
            .declare("Plan", UsagePlan::new("plan").add_api_key(&key))
            .unwrap();
        synthesize(&stack).unwrap().to_json_string().unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_yaml_rendering_carries_the_same_resources() {
    let mut stack = stack();
    let key = stack.declare("Key", ApiKey::new("key")).unwrap();
    let yaml = synthesize(&stack).unwrap().to_yaml_string().unwrap();
    assert!(yaml.contains("AWSTemplateFormatVersion"));
    assert!(yaml.contains(key.logical_id.as_str()));
    assert!(yaml.contains("AWS::ApiGateway::ApiKey"));
}
