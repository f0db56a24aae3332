use super::*;
use crate::primitives::ColorIntent;
use std::path::PathBuf;

#[test]
fn test_no_subcommand_defaults_to_synth() {
    let config = CliConfig::try_parse_from(["stackgraph"]).unwrap();
    assert!(config.command.is_none());
    assert_eq!(config.command.unwrap_or_default(), Commands::default());
}

#[test]
fn test_synth_flags() {
    let config =
        CliConfig::try_parse_from(["stackgraph", "synth", "--format", "yml", "--stdout"]).unwrap();
    assert_eq!(
        config.command,
        Some(Commands::Synth {
            format: TemplateFormat::Yaml,
            stdout: true,
        })
    );
}

#[test]
fn test_global_flags_after_subcommand() {
    let config = CliConfig::try_parse_from([
        "stackgraph",
        "list",
        "--workdir",
        "/srv/stack",
        "--color",
        "never",
        "--log-level",
        "3",
    ])
    .unwrap();
    assert_eq!(config.command, Some(Commands::List));
    assert_eq!(config.app_config.workdir, Some(PathBuf::from("/srv/stack")));
    assert_eq!(config.app_config.color, ColorIntent::Never);
    assert_eq!(config.app_config.log_level, 3);
}

#[test]
fn test_log_level_out_of_range_is_rejected() {
    assert!(CliConfig::try_parse_from(["stackgraph", "--log-level", "7"]).is_err());
}
