use super::*;
use crate::infra::stack::{Stack, StackEnvironment};
use crate::infra::synth::synthesize;

fn stack() -> Stack {
    Stack::new(
        "TestStack",
        StackEnvironment::new("123456789012", "us-east-1").unwrap(),
    )
}

fn cors() -> CorsPreflight {
    CorsPreflight {
        allow_headers: vec!["*".to_string()],
        allow_methods: vec![HttpMethod::Post],
        allow_origins: vec!["*".to_string()],
    }
}

#[test]
fn test_route_key_rendering() {
    assert_eq!(RouteKey::Default.render(), "$default");
}

#[test]
fn test_cors_uses_wildcard_for_any_method() {
    let preflight = CorsPreflight {
        allow_methods: vec![HttpMethod::Any],
        ..cors()
    };
    assert_eq!(preflight.to_json()["AllowMethods"], json!(["*"]));
    assert_eq!(cors().to_json()["AllowMethods"], json!(["POST"]));
}

#[test]
fn test_gateway_integration_url_stays_deferred() {
    let target = LogicalId::from_path(&["Instance", "Resource"]);
    let url = Expr::concat([
        Expr::literal("http://"),
        Expr::GetAtt(target.clone(), Attribute::PublicDnsName),
        Expr::literal(":3000"),
    ]);
    let gateway = HttpGateway::new("Api").add_route(
        "DefaultRoute",
        RouteKey::Default,
        HttpUrlIntegration::new("Integration", url, HttpMethod::Any),
    );

    let route = gateway.default_route().unwrap();
    assert!(route.integration.url.is_deferred());
    assert_eq!(
        gateway.references(),
        vec![(target, Some(Attribute::PublicDnsName))]
    );
}

#[test]
fn test_gateway_renders_api_stage_integration_and_route() {
    let mut stack = stack();
    let gateway = HttpGateway::new("Api")
        .with_description("test api")
        .with_cors(cors())
        .add_route(
            "DefaultRoute",
            RouteKey::Default,
            HttpUrlIntegration::new(
                "Integration",
                Expr::literal("http://example.com:3000"),
                HttpMethod::Any,
            ),
        );
    let api = stack.declare("Gateway", gateway).unwrap();
    let template = synthesize(&stack).unwrap();

    let properties = &template.resources[&api.logical_id].properties;
    assert_eq!(properties["ProtocolType"], "HTTP");
    assert_eq!(properties["Description"], "test api");
    assert_eq!(properties["CorsConfiguration"]["AllowOrigins"], json!(["*"]));

    assert_eq!(template.resources_of_type("AWS::ApiGatewayV2::Stage").count(), 1);
    let (_, integration) = template
        .resources_of_type("AWS::ApiGatewayV2::Integration")
        .next()
        .unwrap();
    assert_eq!(integration.properties["IntegrationType"], "HTTP_PROXY");
    assert_eq!(integration.properties["IntegrationMethod"], "ANY");

    let (_, route) = template
        .resources_of_type("AWS::ApiGatewayV2::Route")
        .next()
        .unwrap();
    assert_eq!(route.properties["RouteKey"], "$default");
    assert_eq!(route.properties["Target"]["Fn::Join"][1][0], "integrations/");
}

#[test]
fn test_usage_plan_attaches_each_key() {
    let mut stack = stack();
    let key = stack
        .declare("Key", ApiKey::new("client-key").with_description("client"))
        .unwrap();
    let plan = stack
        .declare("Plan", UsagePlan::new("Plan").add_api_key(&key))
        .unwrap();

    let dependencies = stack.graph().dependencies(&plan.logical_id).unwrap();
    assert_eq!(dependencies.len(), 1);
    assert_eq!(dependencies[0].0.logical_id, key.logical_id);

    let template = synthesize(&stack).unwrap();
    let key_properties = &template.resources[&key.logical_id].properties;
    assert_eq!(key_properties["Name"], "client-key");
    assert_eq!(key_properties["Enabled"], true);

    let attachments: Vec<_> = template
        .resources_of_type("AWS::ApiGateway::UsagePlanKey")
        .collect();
    assert_eq!(attachments.len(), 1);
    assert_eq!(
        attachments[0].1.properties["KeyId"],
        json!({ "Ref": key.logical_id.as_str() })
    );
    assert_eq!(attachments[0].1.properties["KeyType"], "API_KEY");
}
