use super::*;
use serde_json::json;

#[test]
fn test_logical_id_is_readable_and_hashed() {
    let id = LogicalId::from_path(&["EC2InstanceRole", "Resource"]);
    let text = id.as_str();
    assert!(text.starts_with("EC2InstanceRole"));
    assert_eq!(text.len(), "EC2InstanceRole".len() + 8);
    assert!(
        text["EC2InstanceRole".len()..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    );
}

#[test]
fn test_logical_id_is_stable_and_path_sensitive() {
    let a = LogicalId::from_path(&["AppEC2Instance", "Resource"]);
    let b = LogicalId::from_path(&["AppEC2Instance", "Resource"]);
    let c = LogicalId::from_path(&["AppEC2Instance", "InstanceProfile"]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_logical_id_strips_non_alphanumerics() {
    let id = LogicalId::from_path(&["Code-Deploy_App", "Resource"]);
    assert!(id.as_str().starts_with("CodeDeployApp"));
}

#[test]
fn test_intrinsics_serialize_like_cloudformation() {
    let role = LogicalId::from_path(&["Role", "Resource"]);

    assert_eq!(serde_json::to_value(Expr::literal("x")).unwrap(), json!("x"));
    assert_eq!(
        serde_json::to_value(Expr::Ref(role.clone())).unwrap(),
        json!({ "Ref": role.as_str() })
    );
    assert_eq!(
        serde_json::to_value(Expr::GetAtt(role.clone(), Attribute::Arn)).unwrap(),
        json!({ "Fn::GetAtt": [role.as_str(), "Arn"] })
    );
    assert_eq!(
        serde_json::to_value(Expr::Pseudo(Pseudo::Partition)).unwrap(),
        json!({ "Ref": "AWS::Partition" })
    );
    assert_eq!(
        serde_json::to_value(Expr::Param("DefaultVpcId".into())).unwrap(),
        json!({ "Ref": "DefaultVpcId" })
    );
    assert_eq!(
        serde_json::to_value(Expr::base64(Expr::literal("echo"))).unwrap(),
        json!({ "Fn::Base64": "echo" })
    );
}

#[test]
fn test_concat_folds_literals_and_keeps_tokens_deferred() {
    let instance = LogicalId::from_path(&["AppEC2Instance", "Resource"]);
    let url = Expr::concat([
        Expr::literal("http://"),
        Expr::GetAtt(instance.clone(), Attribute::PublicDnsName),
        Expr::literal(":"),
        Expr::literal("3000"),
    ]);

    assert!(url.is_deferred());
    assert_eq!(
        serde_json::to_value(&url).unwrap(),
        json!({ "Fn::Join": ["", [
            "http://",
            { "Fn::GetAtt": [instance.as_str(), "PublicDnsName"] },
            ":3000"
        ]] })
    );
    assert_eq!(
        url.resource_refs(),
        vec![(&instance, Some(Attribute::PublicDnsName))]
    );
}

#[test]
fn test_concat_of_literals_stays_literal() {
    let value = Expr::concat([Expr::literal("a"), Expr::literal("b")]);
    assert_eq!(value.as_literal(), Some("ab"));
    assert!(!value.is_deferred());
}

#[test]
fn test_param_refs_are_not_resource_refs() {
    let value = Expr::concat([Expr::literal("vpc:"), Expr::Param("DefaultVpcId".into())]);
    assert!(value.resource_refs().is_empty());
    assert_eq!(value.param_refs(), vec!["DefaultVpcId"]);
}

#[test]
fn test_arn_targets_exact_parameter_path() {
    let arn = ArnComponents {
        service: "ssm",
        region: "us-east-1",
        account: "123456789012",
        resource: "parameter",
        resource_name: Some("/zuino/api/gemini-api-key"),
    }
    .format();

    assert_eq!(
        serde_json::to_value(&arn).unwrap(),
        json!({ "Fn::Join": ["", [
            "arn:",
            { "Ref": "AWS::Partition" },
            ":ssm:us-east-1:123456789012:parameter/zuino/api/gemini-api-key"
        ]] })
    );
}
