//! E2E tests for the list command

use anyhow::Result;
use stackgraph_lib::application::Commands;
use stackgraph_tests::TestEnvironment;

#[test]
fn e2e_list_prints_every_declaration_in_dependency_order() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;

    let run = env.run(Commands::List)?;
    run.result?;

    let position = |construct: &str| {
        run.stdout
            .find(construct)
            .unwrap_or_else(|| panic!("{construct} missing from:\n{}", run.stdout))
    };
    assert!(run.stdout.contains("ZuinoServicesStack"));
    assert!(position("EC2InstanceRole") < position("AppEC2Instance"));
    assert!(position("AppEC2Instance") < position("NewHttpApi"));
    assert!(position("AppApiKey") < position("AppUsagePlan"));
    assert!(position("CodeDeployDeploymentGroup") < position("CiCdPipeline"));

    Ok(())
}

#[test]
fn e2e_list_writes_nothing_to_disk() -> Result<()> {
    let env = TestEnvironment::with_default_script()?;
    env.run(Commands::List)?.result?;
    assert!(!env.output_path().exists());
    Ok(())
}

#[test]
fn e2e_version_needs_no_inputs() -> Result<()> {
    let env = TestEnvironment::new()?.with_target(None, None);

    let run = env.run(Commands::Version)?;
    run.result?;
    assert!(run.stdout.starts_with("stackgraph "));
    Ok(())
}
