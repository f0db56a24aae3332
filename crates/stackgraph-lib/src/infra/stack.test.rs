use super::*;
use crate::infra::resources::ApiKey;

#[test]
fn test_environment_requires_account_and_region() {
    assert!(matches!(
        StackEnvironment::new("", "us-east-1"),
        Err(ConfigError::MissingStackEnvironment)
    ));
    assert!(matches!(
        StackEnvironment::new("123456789012", "  "),
        Err(ConfigError::MissingStackEnvironment)
    ));

    let environment = StackEnvironment::new("123456789012", "us-east-1").unwrap();
    assert_eq!(environment.account(), "123456789012");
    assert_eq!(environment.region(), "us-east-1");
    assert_eq!(environment.to_string(), "aws://123456789012/us-east-1");
}

#[test]
fn test_lookup_is_registered_once_per_name() {
    let mut stack = Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    );
    let lookup = Lookup {
        name: "VpcId".to_string(),
        parameter_type: "AWS::EC2::VPC::Id".to_string(),
        description: "vpc".to_string(),
        default: None,
    };
    let first = stack.lookup(lookup.clone());
    let second = stack.lookup(lookup);
    assert_eq!(first, second);
    assert_eq!(stack.lookups().len(), 1);
}

#[test]
fn test_declarations_land_in_the_graph() {
    let mut stack = Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    );
    stack.declare("Key", ApiKey::new("key")).unwrap();
    stack.add_output("KeyId", Expr::literal("x"), "key");

    assert_eq!(stack.name(), "TestStack");
    assert_eq!(stack.graph().node_count(), 1);
    assert_eq!(stack.outputs().len(), 1);
    assert!(stack.description().is_none());
}
