//! E2E tests for the synth command
//!
//! These tests run the real command handlers against a temp working
//! directory and read the cloud assembly back from disk.

use anyhow::Result;
use stackgraph_lib::application::Commands;
use stackgraph_lib::primitives::TemplateFormat;
use stackgraph_tests::test_env::{TEST_ACCOUNT, TEST_REGION};
use stackgraph_tests::{AssemblyFixture, TestEnvironment};

fn synth(format: TemplateFormat) -> Commands {
    Commands::Synth {
        format,
        stdout: false,
    }
}

#[test]
fn e2e_synth_writes_template_and_manifest() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;

    let run = env.run(synth(TemplateFormat::Json))?;
    run.result?;
    assert!(run.stdout.contains("ZuinoServicesStack"));

    let assembly = AssemblyFixture::load(&env.output_path())?;
    assert!(assembly.directory.join("ZuinoServicesStack.template.json").is_file());

    let artifact = &assembly.manifest.artifacts["ZuinoServicesStack"];
    assert_eq!(artifact.artifact_type, "aws:cloudformation:stack");
    assert_eq!(
        artifact.environment,
        format!("aws://{TEST_ACCOUNT}/{TEST_REGION}")
    );
    assert_eq!(artifact.properties.template_file, "ZuinoServicesStack.template.json");

    Ok(())
}

#[test]
fn e2e_synth_declares_one_of_each_top_level_resource() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;
    env.run(synth(TemplateFormat::Json))?.result?;
    let assembly = AssemblyFixture::load(&env.output_path())?;

    for resource_type in [
        "AWS::EC2::SecurityGroup",
        "AWS::EC2::Instance",
        "AWS::ApiGatewayV2::Api",
        "AWS::ApiGateway::ApiKey",
        "AWS::ApiGateway::UsagePlan",
        "AWS::CodeBuild::Project",
        "AWS::CodeDeploy::Application",
        "AWS::CodeDeploy::DeploymentGroup",
        "AWS::CodePipeline::Pipeline",
    ] {
        assert_eq!(
            assembly.resources_of_type(resource_type).len(),
            1,
            "{resource_type} should appear once"
        );
    }

    let outputs = assembly.template["Outputs"]
        .as_object()
        .map(|outputs| outputs.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    assert_eq!(outputs.len(), 3);

    Ok(())
}

#[test]
fn e2e_synth_embeds_boot_script_verbatim() -> Result<()> {
    let env = TestEnvironment::new()?;
    let script = "echo 'custom boot'\nsystemctl start app\n";
    env.write_script(script)?;

    env.run(synth(TemplateFormat::Json))?.result?;
    let assembly = AssemblyFixture::load(&env.output_path())?;

    let instances = assembly.resources_of_type("AWS::EC2::Instance");
    let (_, instance) = &instances[0];
    assert_eq!(
        instance["Properties"]["UserData"]["Fn::Base64"],
        format!("#!/bin/bash\n{script}")
    );

    Ok(())
}

#[test]
fn e2e_synth_references_only_declared_resources() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;
    env.run(synth(TemplateFormat::Json))?.result?;
    let assembly = AssemblyFixture::load(&env.output_path())?;

    let resources = assembly.template["Resources"]
        .as_object()
        .cloned()
        .unwrap_or_default();
    for (id, resource) in &resources {
        if let Some(depends_on) = resource["DependsOn"].as_array() {
            for dependency in depends_on {
                let dependency = dependency.as_str().unwrap_or_default();
                assert!(
                    resources.contains_key(dependency),
                    "{id} depends on undeclared {dependency}"
                );
            }
        }
    }

    let (_, integration) = &assembly.resources_of_type("AWS::ApiGatewayV2::Integration")[0];
    let (instance_id, _) = &assembly.resources_of_type("AWS::EC2::Instance")[0];
    let url = integration["Properties"]["IntegrationUri"].to_string();
    assert!(url.contains(instance_id.as_str()));
    assert!(url.contains("PublicDnsName"));

    Ok(())
}

#[test]
fn e2e_synth_is_byte_for_byte_repeatable() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;
    let template_path = env.output_path().join("ZuinoServicesStack.template.json");

    env.run(synth(TemplateFormat::Json))?.result?;
    let first = std::fs::read_to_string(&template_path)?;
    env.run(synth(TemplateFormat::Json))?.result?;
    let second = std::fs::read_to_string(&template_path)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn e2e_synth_yaml_writes_yaml_template() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;
    env.run(synth(TemplateFormat::Yaml))?.result?;

    let template = env.output_path().join("ZuinoServicesStack.template.yaml");
    let body = std::fs::read_to_string(&template)?;
    assert!(body.contains("AWSTemplateFormatVersion"));
    assert!(body.contains("AWS::CodePipeline::Pipeline"));

    let manifest: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(
        env.output_path().join("manifest.json"),
    )?)?;
    assert_eq!(
        manifest["artifacts"]["ZuinoServicesStack"]["properties"]["templateFile"],
        "ZuinoServicesStack.template.yaml"
    );
    Ok(())
}

#[test]
fn e2e_synth_to_stdout_leaves_no_assembly() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;

    let run = env.run(Commands::Synth {
        format: TemplateFormat::Json,
        stdout: true,
    })?;
    run.result?;

    let template: serde_json::Value = serde_json::from_str(&run.stdout)?;
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert!(!env.output_path().exists());
    Ok(())
}
