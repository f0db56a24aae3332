use super::*;
use crate::infra::stack::StackEnvironment;

fn stack() -> Stack {
    Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    )
}

#[test]
fn test_user_data_prepends_shebang_and_keeps_script_verbatim() {
    let script = "set -e\ndnf install -y nodejs\n";
    let user_data = UserData::for_linux("#!/bin/bash").add_commands([script]);
    assert_eq!(user_data.render(), format!("#!/bin/bash\n{script}"));
}

#[test]
fn test_instance_type_display() {
    let instance_type = InstanceType::of(InstanceClass::T3, InstanceSize::Micro);
    assert_eq!(instance_type.to_string(), "t3.micro");
}

#[test]
fn test_vpc_lookup_registers_deferred_parameters_once() {
    let mut stack = stack();
    let first = VpcLookup::default_vpc().resolve(&mut stack);
    let second = VpcLookup::default_vpc().resolve(&mut stack);

    assert_eq!(first, second);
    assert_eq!(first.vpc_id, Expr::Param("DefaultVpcId".to_string()));
    assert!(first.public_subnet_id.is_deferred());
    assert_eq!(stack.lookups().len(), 2);
    assert_eq!(stack.lookups()[0].parameter_type, "AWS::EC2::VPC::Id");
}

#[test]
fn test_machine_image_defaults_to_public_ssm_parameter() {
    let mut stack = stack();
    let image = MachineImage::LatestAmazonLinux2023.resolve(&mut stack);
    assert!(image.is_deferred());
    assert_eq!(
        stack.lookups()[0].default.as_deref(),
        Some(AL2023_AMI_PARAMETER)
    );
}

#[test]
fn test_security_group_holds_single_rule_without_resource_refs() {
    let mut stack = stack();
    let network = VpcLookup::default_vpc().resolve(&mut stack);
    let group = SecurityGroup::new(&network, "app port")
        .add_ingress_rule(Peer::any_ipv4(), Port::tcp(3000), "app");

    assert_eq!(group.ingress_rules.len(), 1);
    assert_eq!(group.ingress_rules[0].peer.cidr(), "0.0.0.0/0");
    assert_eq!(group.ingress_rules[0].port, Port::tcp(3000));
    assert!(group.allow_all_outbound);
    assert!(group.references().is_empty());
}
