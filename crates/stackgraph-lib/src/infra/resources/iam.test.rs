use super::*;

fn environment() -> StackEnvironment {
    StackEnvironment::new("123456789012", "sa-east-1").unwrap()
}

#[test]
fn test_parameter_path_rejects_wildcards() {
    for path in ["/zuino/*", "*", "/zuino/api/", "/", "", "/zuino/api?key"] {
        assert!(
            matches!(
                ParameterPath::new(path),
                Err(GraphError::WildcardParameterPath { .. })
            ),
            "{path:?} should be rejected"
        );
    }
    assert!(ParameterPath::new("/zuino/api/gemini-api-key").is_ok());
}

#[test]
fn test_parameter_arn_uses_stack_account_and_region() {
    let path = ParameterPath::new("/zuino/api/gemini-api-key").unwrap();
    let arn = serde_json::to_value(path.arn(&environment())).unwrap();
    let tail = arn["Fn::Join"][1][2].as_str().unwrap();
    assert_eq!(
        tail,
        ":ssm:sa-east-1:123456789012:parameter/zuino/api/gemini-api-key"
    );
}

#[test]
fn test_single_action_statement_is_scalar() {
    let statement = PolicyStatement::allow(["ssm:GetParameter"]).on("arn:aws:ssm:::parameter/x");
    let json = statement.to_json();
    assert_eq!(json["Action"], "ssm:GetParameter");
    assert_eq!(json["Effect"], "Allow");
    assert_eq!(json["Resource"], "arn:aws:ssm:::parameter/x");
}

#[test]
fn test_role_properties_include_managed_and_inline_policies() {
    let role = Role::new(ServicePrincipal::new("ec2.amazonaws.com"))
        .with_description("instance role")
        .with_managed_policy(ManagedPolicy::aws_managed("AmazonSSMManagedInstanceCore"))
        .add_to_policy(PolicyStatement::allow(["ssm:GetParameter"]).on("arn:param"));

    let properties = role.properties();
    assert_eq!(
        properties["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"],
        "ec2.amazonaws.com"
    );
    assert_eq!(properties["Description"], "instance role");
    assert_eq!(
        properties["ManagedPolicyArns"][0]["Fn::Join"][1][2],
        ":iam::aws:policy/AmazonSSMManagedInstanceCore"
    );
    assert_eq!(
        properties["Policies"][0]["PolicyDocument"]["Statement"][0]["Action"],
        "ssm:GetParameter"
    );
    assert!(role.references().is_empty());
}

#[test]
fn test_bare_role_omits_optional_properties() {
    let properties = Role::new(ServicePrincipal::new("codebuild.amazonaws.com")).properties();
    assert!(properties.get("Description").is_none());
    assert!(properties.get("ManagedPolicyArns").is_none());
    assert!(properties.get("Policies").is_none());
}
