use super::*;
use crate::infra::graph::Declaration;
use crate::infra::resources::pipeline::StageKind;
use crate::infra::resources::{Resource, ResourceKind};
use crate::infra::synth::synthesize;
use tempfile::TempDir;

const SCRIPT: &str = "dnf install -y nodejs\nsystemctl enable codedeploy-agent\n";

fn environment() -> StackEnvironment {
    StackEnvironment::new("123456789012", "us-east-1").unwrap()
}

fn build() -> Stack {
    build_services_stack(environment(), &StartupScript::from_text(SCRIPT)).unwrap()
}

fn declaration<'a>(stack: &'a Stack, construct_id: &str) -> &'a Declaration {
    stack.graph().find(construct_id).unwrap()
}

#[test]
fn test_script_load_reports_fixed_path_and_cause() {
    let dir = TempDir::new().unwrap();
    let err = StartupScript::load(dir.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to read UserData script file: scripts/ec2-init.sh\n"));
    assert!(message.len() > "Failed to read UserData script file: scripts/ec2-init.sh\n".len());
}

#[test]
fn test_script_load_error_names_the_cause_once() {
    let dir = TempDir::new().unwrap();
    let err = StartupScript::load(dir.path()).unwrap_err();
    assert!(std::error::Error::source(&err).is_none());

    let UserDataError::ScriptUnreadable { cause, .. } = &err;
    let cause_text = cause.to_string();
    let report = format!("{:?}", anyhow::Error::from(err));
    assert_eq!(report.matches(cause_text.as_str()).count(), 1);
}

#[test]
fn test_script_load_keeps_contents_verbatim() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
    std::fs::write(dir.path().join(StartupScript::DEFAULT_PATH), SCRIPT).unwrap();

    let script = StartupScript::load(dir.path()).unwrap();
    assert_eq!(script.contents(), SCRIPT);
    assert!(script.source().ends_with("scripts/ec2-init.sh"));
    assert_eq!(script.user_data().render(), format!("#!/bin/bash\n{SCRIPT}"));
}

#[test]
fn test_exactly_one_declaration_per_kind() {
    let stack = build();
    for kind in ResourceKind::ALL {
        assert_eq!(stack.graph().count_of(kind), 1, "{kind} should be declared once");
    }
    assert_eq!(stack.graph().node_count(), ResourceKind::ALL.len());
    assert_eq!(stack.name(), settings::STACK_NAME);
}

#[test]
fn test_pipeline_has_three_ordered_stages_with_artifact_continuity() {
    let stack = build();
    let Resource::Pipeline(pipeline) = &declaration(&stack, construct_ids::PIPELINE).resource else {
        panic!("pipeline construct holds a different resource");
    };

    assert_eq!(
        pipeline.stages(),
        [StageKind::Source, StageKind::Build, StageKind::Deploy]
    );
    assert_eq!(pipeline.deploy.input, pipeline.build.output);
    assert_eq!(pipeline.build.input, pipeline.source.output);
    assert!(pipeline.artifacts_chain());
    assert_eq!(pipeline.source.output.name(), "SourceOutput");
    assert_eq!(pipeline.build.output.name(), "BuildOutput");
    assert_eq!(pipeline.source.connection.full_repository_id(), "paulo-eduardo/zuino");
}

#[test]
fn test_security_group_has_single_port_3000_rule() {
    let stack = build();
    let Resource::SecurityGroup(group) = &declaration(&stack, construct_ids::SECURITY_GROUP).resource
    else {
        panic!("security group construct holds a different resource");
    };

    assert_eq!(group.ingress_rules.len(), 1);
    let rule = &group.ingress_rules[0];
    assert_eq!(rule.port, Port::tcp(3000));
    assert_eq!(rule.peer, Peer::any_ipv4());
    assert!(group.allow_all_outbound);
}

#[test]
fn test_role_grants_only_the_named_secret() {
    let stack = build();
    let Resource::Role(role) = &declaration(&stack, construct_ids::ROLE).resource else {
        panic!("role construct holds a different resource");
    };

    assert_eq!(role.assumed_by.as_str(), "ec2.amazonaws.com");
    let names: Vec<&str> = role.managed_policies.iter().map(ManagedPolicy::name).collect();
    assert_eq!(names, ["AmazonSSMManagedInstanceCore", "AmazonS3ReadOnlyAccess"]);

    assert_eq!(role.statements.len(), 1);
    let statement = &role.statements[0];
    assert_eq!(statement.actions, ["ssm:GetParameter"]);
    let arn = serde_json::to_string(&statement.resources[0]).unwrap();
    assert!(arn.contains(":ssm:us-east-1:123456789012:parameter/zuino/api/gemini-api-key"));
    assert!(!arn.contains('*'));
}

#[test]
fn test_instance_is_wired_to_role_group_and_script() {
    let stack = build();
    let Resource::Instance(instance) = &declaration(&stack, construct_ids::INSTANCE).resource else {
        panic!("instance construct holds a different resource");
    };

    assert_eq!(instance.instance_type.to_string(), "t3.micro");
    assert!(instance.associate_public_ip);
    assert_eq!(instance.tags.get("App").map(String::as_str), Some("MyBackend"));
    assert_eq!(instance.user_data.render(), format!("#!/bin/bash\n{SCRIPT}"));
    assert_eq!(instance.role.construct_id, construct_ids::ROLE);
    assert_eq!(instance.security_group.construct_id, construct_ids::SECURITY_GROUP);
}

#[test]
fn test_gateway_route_targets_deferred_instance_dns() {
    let stack = build();
    let Resource::HttpGateway(gateway) = &declaration(&stack, construct_ids::GATEWAY).resource else {
        panic!("gateway construct holds a different resource");
    };

    let route = gateway.default_route().unwrap();
    assert_eq!(route.integration.method, HttpMethod::Any);

    let instance = declaration(&stack, construct_ids::INSTANCE);
    let url = &route.integration.url;
    assert!(url.is_deferred());
    assert_eq!(
        url.resource_refs(),
        vec![(&instance.logical_id, Some(Attribute::PublicDnsName))]
    );
    assert_eq!(
        serde_json::to_value(url).unwrap(),
        serde_json::json!({
            "Fn::Join": ["", [
                "http://",
                { "Fn::GetAtt": [instance.logical_id.as_str(), "PublicDnsName"] },
                ":3000",
            ]]
        })
    );
}

#[test]
fn test_graph_edges_follow_references() {
    let stack = build();
    let graph = stack.graph();
    let instance = declaration(&stack, construct_ids::INSTANCE);

    let dependencies: Vec<&str> = graph
        .dependencies(&instance.logical_id)
        .unwrap()
        .into_iter()
        .map(|(decl, _)| decl.construct_id.as_str())
        .collect();
    assert!(dependencies.contains(&construct_ids::ROLE));
    assert!(dependencies.contains(&construct_ids::SECURITY_GROUP));

    let pipeline = declaration(&stack, construct_ids::PIPELINE);
    assert_eq!(graph.dependencies(&pipeline.logical_id).unwrap().len(), 3);
    assert!(!graph.has_cycles());

    let order: Vec<&str> = graph
        .topological_order()
        .unwrap()
        .into_iter()
        .map(|decl| decl.construct_id.as_str())
        .collect();
    let position = |id: &str| order.iter().position(|c| *c == id).unwrap();
    assert!(position(construct_ids::ROLE) < position(construct_ids::INSTANCE));
    assert!(position(construct_ids::INSTANCE) < position(construct_ids::GATEWAY));
    assert!(position(construct_ids::DEPLOYMENT_GROUP) < position(construct_ids::PIPELINE));
}

#[test]
fn test_outputs_are_deferred() {
    let stack = build();
    let ids: Vec<&str> = stack.outputs().iter().map(|o| o.id.as_str()).collect();
    assert_eq!(
        ids,
        ["InstancePublicIpOutput", "ApiGatewayUrlOutput", "ApiKeyIdOutput"]
    );
    assert!(stack.outputs().iter().all(|output| output.value.is_deferred()));
}

#[test]
fn test_construction_is_deterministic() {
    let first = build();
    let second = build();

    let first_decls: Vec<&Declaration> = first.graph().declarations().collect();
    let second_decls: Vec<&Declaration> = second.graph().declarations().collect();
    assert_eq!(first_decls, second_decls);
    assert_eq!(first.graph().edge_count(), second.graph().edge_count());

    let first_json = synthesize(&first).unwrap().to_json_string().unwrap();
    let second_json = synthesize(&second).unwrap().to_json_string().unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn test_full_stack_synthesizes_with_one_security_group() {
    let template = synthesize(&build()).unwrap();

    let groups: Vec<_> = template.resources_of_type("AWS::EC2::SecurityGroup").collect();
    assert_eq!(groups.len(), 1);
    let ingress = &groups[0].1.properties["SecurityGroupIngress"];
    assert_eq!(ingress.as_array().unwrap().len(), 1);
    assert_eq!(ingress[0]["FromPort"], 3000);
    assert_eq!(ingress[0]["CidrIp"], "0.0.0.0/0");

    assert_eq!(template.resources_of_type("AWS::EC2::Instance").count(), 1);
    assert_eq!(template.resources_of_type("AWS::CodePipeline::Pipeline").count(), 1);
    assert_eq!(template.outputs.len(), 3);
    assert!(template.parameters.contains_key("LatestAmazonLinux2023AmiId"));
    assert!(template.parameters.contains_key("DefaultVpcId"));
}
