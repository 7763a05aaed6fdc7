// tests/config.rs

use std::path::PathBuf;

use clap::Parser;

use gotest_watch::cli::CliArgs;
use gotest_watch::config::{
    find_config_file, load_from_path, load_or_default, merge_layers, RawTestConfig, TestConfig,
};
use gotest_watch::errors::GotestWatchError;

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn cli(args: &[&str]) -> CliArgs {
    let mut argv = vec!["gotest-watch"];
    argv.extend_from_slice(args);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn loads_every_yaml_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        ".gotest-watch.yml",
        r#"
commandBase: [richgo, test]
testPath: ./pkg/...
verbose: true
race: true
failfast: true
cover: true
clearScreen: true
color: true
count: 2
runPattern: TestFoo
skipPattern: TestBar
workingDir: /tmp/project
"#,
    );

    let raw = load_from_path(&path).unwrap();
    let cfg = merge_layers([&raw]).unwrap();

    assert_eq!(
        cfg,
        TestConfig {
            command_base: vec!["richgo".into(), "test".into()],
            test_path: "./pkg/...".into(),
            verbose: true,
            race: true,
            fail_fast: true,
            cover: true,
            clear_screen: true,
            color: true,
            count: 2,
            run_pattern: "TestFoo".into(),
            skip_pattern: "TestBar".into(),
            working_dir: Some(PathBuf::from("/tmp/project")),
        }
    );
}

#[test]
fn empty_file_is_an_empty_layer() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        load_from_path(write(&dir, "a.yml", "")).unwrap(),
        RawTestConfig::default()
    );
    assert_eq!(
        load_from_path(write(&dir, "b.yml", "---\n")).unwrap(),
        RawTestConfig::default()
    );
}

#[test]
fn malformed_yaml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_from_path(write(&dir, "bad.yml", "verbose: [unterminated")).unwrap_err();
    assert!(matches!(err, GotestWatchError::YamlError(_)));

    let err = load_from_path(write(&dir, "neg.yml", "count: -3\n")).unwrap_err();
    assert!(matches!(err, GotestWatchError::YamlError(_)));
}

#[test]
fn missing_explicit_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_from_path(dir.path().join("nope.yml")).unwrap_err();
    assert!(matches!(err, GotestWatchError::IoError(_)));
}

#[test]
fn yml_wins_over_yaml() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(find_config_file(dir.path()), None);

    write(&dir, ".gotest-watch.yaml", "verbose: true\n");
    assert_eq!(
        find_config_file(dir.path()),
        Some(dir.path().join(".gotest-watch.yaml"))
    );

    write(&dir, ".gotest-watch.yml", "race: true\n");
    assert_eq!(
        find_config_file(dir.path()),
        Some(dir.path().join(".gotest-watch.yml"))
    );
    assert_eq!(load_or_default(dir.path()).race, Some(true));
}

#[test]
fn unparsable_discovered_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir, ".gotest-watch.yml", "verbose: {{{\n");
    assert_eq!(load_or_default(dir.path()), RawTestConfig::default());
}

#[test]
fn cli_overrides_file_overrides_defaults() {
    let file = RawTestConfig {
        verbose: Some(true),
        run_pattern: Some("FromFile".into()),
        count: Some(5),
        ..Default::default()
    };
    let flags = cli(&["--run", "FromCli", "--verbose=false"]).config_layer();

    let cfg = merge_layers([&file, &flags]).unwrap();

    assert!(!cfg.verbose);
    assert_eq!(cfg.run_pattern, "FromCli");
    assert_eq!(cfg.count, 5);
    assert_eq!(cfg.test_path, "./...");
    assert_eq!(cfg.command_base, ["go", "test"]);
}

#[test]
fn invalid_merged_values_are_rejected() {
    let empty_cmd = RawTestConfig {
        command_base: Some(vec![]),
        ..Default::default()
    };
    assert!(matches!(
        merge_layers([&empty_cmd]),
        Err(GotestWatchError::ConfigError(_))
    ));

    let empty_path = RawTestConfig {
        test_path: Some("  ".into()),
        ..Default::default()
    };
    assert!(matches!(
        merge_layers([&empty_path]),
        Err(GotestWatchError::ConfigError(_))
    ));
}

#[test]
fn empty_working_dir_means_no_override() {
    let raw = RawTestConfig {
        working_dir: Some(PathBuf::new()),
        ..Default::default()
    };
    assert_eq!(merge_layers([&raw]).unwrap().working_dir, None);
}

#[test]
fn cli_flags_map_onto_a_layer() {
    let args = cli(&[
        "-m", "richgo test -tags=unit",
        "-p", "./pkg/...",
        "-v",
        "-r", "Foo",
        "-s", "Bar",
        "-n", "3",
        "-l",
        "--color=false",
    ]);
    let layer = args.config_layer();

    assert_eq!(
        layer.command_base,
        Some(vec!["richgo".into(), "test".into(), "-tags=unit".into()])
    );
    assert_eq!(layer.test_path.as_deref(), Some("./pkg/..."));
    assert_eq!(layer.verbose, Some(true));
    assert_eq!(layer.run_pattern.as_deref(), Some("Foo"));
    assert_eq!(layer.skip_pattern.as_deref(), Some("Bar"));
    assert_eq!(layer.count, Some(3));
    assert_eq!(layer.clear_screen, Some(true));
    assert_eq!(layer.color, Some(false));
    assert_eq!(layer.race, None);
}

#[test]
fn absent_flags_leave_the_layer_empty() {
    assert_eq!(cli(&[]).config_layer(), RawTestConfig::default());
}

#[test]
fn logging_options_parse() {
    let args = cli(&["--log-level", "debug", "--log-file", "/tmp/gw.log", "--config", "x.yml"]);
    assert!(matches!(args.log_level, Some(gotest_watch::cli::LogLevel::Debug)));
    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/gw.log")));
    assert_eq!(args.config, Some(PathBuf::from("x.yml")));

    assert_eq!(
        gotest_watch::logging::parse_level_str(" WARNING "),
        Some(tracing::Level::WARN)
    );
    assert_eq!(gotest_watch::logging::parse_level_str("loud"), None);
}
