use clap::Parser;
use sdd::actions::DeletionPolicy;
use sdd::cli::Cli;
use sdd::config::{Defaults, Settings};
use sdd::duplicates::{HashFailurePolicy, LinkMode};
use sdd::scanner::HashAlgorithm;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_defaults_file_then_cli_override() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "algorithm": "md5",
            "policy": "automatic",
            "link_mode": "distinct",
            "workers": 2,
            "on_unreadable": "skip"
        }"#,
    )
    .unwrap();
    let defaults = Defaults::load_from(&path).unwrap();

    let from_file = Settings::resolve(&Cli::try_parse_from(["sdd", "/x"]).unwrap(), &defaults);
    assert_eq!(from_file.algorithm, HashAlgorithm::Md5);
    assert_eq!(from_file.policy, DeletionPolicy::Automatic);
    assert_eq!(from_file.link_mode, LinkMode::Distinct);
    assert_eq!(from_file.workers, 2);
    assert_eq!(from_file.failure_policy, HashFailurePolicy::Skip);

    let overridden = Settings::resolve(
        &Cli::try_parse_from(["sdd", "--sha256", "-n", "-j", "6", "/x"]).unwrap(),
        &defaults,
    );
    assert_eq!(overridden.algorithm, HashAlgorithm::Sha256);
    assert_eq!(overridden.policy, DeletionPolicy::DryRun);
    assert_eq!(overridden.workers, 6);
    // No CLI flag turns distinct mode back off
    assert_eq!(overridden.link_mode, LinkMode::Distinct);
}

#[test]
fn test_settings_roots_and_switches() {
    let cli = Cli::try_parse_from(["sdd", "-q", "--no-color", "/a", "/b"]).unwrap();
    let settings = Settings::resolve(&cli, &Defaults::default());

    assert_eq!(settings.roots.len(), 2);
    assert!(settings.quiet);
    assert!(!settings.color);
}

#[test]
fn test_engine_config_from_settings() {
    let cli = Cli::try_parse_from(["sdd", "-H", "--skip-unreadable", "-j", "2", "/a"]).unwrap();
    let config = Settings::resolve(&cli, &Defaults::default()).engine_config();

    assert_eq!(config.workers, 2);
    assert_eq!(config.link_mode, LinkMode::Distinct);
    assert_eq!(config.failure_policy, HashFailurePolicy::Skip);
    assert!(config.progress_callback.is_none());
}
