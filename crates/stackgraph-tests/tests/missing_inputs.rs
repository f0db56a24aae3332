//! E2E tests for the two fatal input failures
//!
//! Both must stop the run before anything is declared or written.

use anyhow::Result;
use stackgraph_lib::application::Commands;
use stackgraph_lib::primitives::MISSING_STACK_ENV_MESSAGE;
use stackgraph_tests::TestEnvironment;

#[test]
fn e2e_missing_account_aborts_synth() -> Result<()> {
    let env = TestEnvironment::with_default_script()?.with_target(None, Some("us-east-1"));

    let run = env.run(Commands::default())?;
    let err = run.result.expect_err("synth should fail without an account");
    assert_eq!(err.to_string(), MISSING_STACK_ENV_MESSAGE);
    assert!(!env.output_path().exists());
    Ok(())
}

#[test]
fn e2e_empty_region_counts_as_missing() -> Result<()> {
    let env = TestEnvironment::with_default_script()?.with_target(Some("123456789012"), Some(""));

    let err = env
        .run(Commands::List)?
        .result
        .expect_err("list should fail with an empty region");
    assert_eq!(err.to_string(), MISSING_STACK_ENV_MESSAGE);
    Ok(())
}

#[test]
fn e2e_missing_environment_is_reported_before_missing_script() -> Result<()> {
    let env = TestEnvironment::new()?.with_target(None, None);

    let err = env
        .run(Commands::default())?
        .result
        .expect_err("synth should fail");
    assert_eq!(err.to_string(), MISSING_STACK_ENV_MESSAGE);
    Ok(())
}

#[test]
fn e2e_missing_script_aborts_synth() -> Result<()> {
    let env = TestEnvironment::new()?;

    let err = env
        .run(Commands::default())?
        .result
        .expect_err("synth should fail without a boot script");
    assert!(
        err.to_string()
            .starts_with("Failed to read UserData script file: scripts/ec2-init.sh\n")
    );
    assert!(!env.output_path().exists());
    Ok(())
}
