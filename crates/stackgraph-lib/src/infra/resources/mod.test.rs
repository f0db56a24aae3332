use super::*;
use crate::infra::stack::{Stack, StackEnvironment};
use crate::infra::synth::synthesize;
use iam::ServicePrincipal;

#[test]
fn test_resource_kind_labels_are_unique() {
    let mut labels: Vec<&str> = ResourceKind::ALL.iter().map(ResourceKind::label).collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), ResourceKind::ALL.len());
}

#[test]
fn test_resource_reports_kind_of_wrapped_value() {
    let role: Resource = Role::new(ServicePrincipal::new("ec2.amazonaws.com")).into();
    assert_eq!(role.kind(), ResourceKind::Role);
    assert_eq!(role.kind().to_string(), "role");

    let key: Resource = ApiKey::new("key").into();
    assert_eq!(key.kind(), ResourceKind::ApiKey);
    assert!(key.references().is_empty());
}

#[test]
fn test_owned_refs_collects_nested_references() {
    let role = LogicalId::from_path(&["Role", "Resource"]);
    let group = LogicalId::from_path(&["Group", "Resource"]);
    let joined = Expr::concat([
        Expr::literal("http://"),
        Expr::GetAtt(group.clone(), Attribute::GroupId),
    ]);
    let plain = Expr::Ref(role.clone());
    let param = Expr::Param("DefaultVpcId".to_string());

    let refs = owned_refs(&[&joined, &plain, &param]);
    assert_eq!(
        refs,
        vec![(group, Some(Attribute::GroupId)), (role, None)]
    );
}

#[test]
fn test_role_renders_primary_resource_with_kind_type() {
    let mut stack = Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    );
    let role = stack
        .declare("ServiceRole", Role::new(ServicePrincipal::new("ec2.amazonaws.com")))
        .unwrap();

    let template = synthesize(&stack).unwrap();
    let rendered = &template.resources[&role.logical_id];
    assert_eq!(rendered.resource_type, ResourceKind::Role.cfn_type());
    assert!(rendered.depends_on.is_empty());
}
