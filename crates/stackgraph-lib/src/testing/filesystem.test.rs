use super::*;

#[test]
fn test_script_lands_at_builder_path() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TempDirFixture::new()?;
    fixture.write_script("echo boot\n")?;

    assert!(fixture.file_exists("scripts/ec2-init.sh"));
    let script = StartupScript::load(fixture.path())?;
    assert_eq!(script.contents(), "echo boot\n");
    Ok(())
}

#[test]
fn test_env_file_lines() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = TempDirFixture::new()?;
    fixture.write_env_file(".env", &[("CDK_DEFAULT_ACCOUNT", "123"), ("CDK_DEFAULT_REGION", "x")])?;

    assert_eq!(
        fixture.read_file(".env")?,
        "CDK_DEFAULT_ACCOUNT=123\nCDK_DEFAULT_REGION=x\n"
    );
    Ok(())
}

#[test]
fn test_temp_dir_isolation() -> Result<(), Box<dyn std::error::Error>> {
    let fixture1 = TempDirFixture::new()?;
    let fixture2 = TempDirFixture::new()?;
    assert_ne!(fixture1.path(), fixture2.path());

    fixture1.write_file("nested/one.txt", "content1")?;
    assert!(fixture1.file_exists("nested/one.txt"));
    assert!(!fixture2.file_exists("nested/one.txt"));
    Ok(())
}
