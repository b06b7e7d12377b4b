use std::fs;
use tempfile::tempdir;

#[test]
fn configure_logging_writes_app_and_metrics_in_dir() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("proc_logs");
    orderbench::logger::configure_logging(Some(base.as_path()), Some("debug"), Some(3)).unwrap();
    log::info!("hello app");
    log::info!(target: orderbench::logger::METRICS_TARGET, "rows=1 partitions=1 runtime_sec=0.1");
    assert!(base.join("app.log").exists());
    assert!(base.join("metrics.log").exists());
    log::logger().flush();
    let metrics = fs::read_to_string(base.join("metrics.log")).unwrap();
    assert!(metrics.contains("runtime_sec=0.1"));
    assert!(!fs::read_to_string(base.join("app.log")).unwrap().contains("runtime_sec"));
    // a second global logger cannot be installed
    assert!(orderbench::logger::configure_logging(Some(base.as_path()), None, None).is_err());
}

#[test]
fn parse_level_defaults_to_info() {
    use log::LevelFilter;
    use orderbench::logger::parse_level;
    assert_eq!(parse_level(None), LevelFilter::Info);
    assert_eq!(parse_level(Some("WARN")), LevelFilter::Warn);
    assert_eq!(parse_level(Some("bogus")), LevelFilter::Info);
}

#[test]
fn log_settings_cli_over_env_over_file() {
    use orderbench::logger::LogSettings;
    use std::path::PathBuf;

    let file = LogSettings {
        dir: Some(PathBuf::from("file_logs")),
        level: Some("warn".into()),
        retention: None,
    };
    let env = |key: &str| match key {
        "ORDERBENCH_LOG_DIR" => Some("env_logs".to_string()),
        "ORDERBENCH_LOG_RETENTION" => Some("4".to_string()),
        _ => None,
    };

    let got = LogSettings::resolve(LogSettings::default(), file.clone(), env);
    assert_eq!(got.dir, Some(PathBuf::from("env_logs")));
    assert_eq!(got.level.as_deref(), Some("warn"));
    assert_eq!(got.retention, Some(4));

    let cli = LogSettings {
        dir: Some(PathBuf::from("cli_logs")),
        level: Some("debug".into()),
        retention: None,
    };
    let got = LogSettings::resolve(cli, file.clone(), env);
    assert_eq!(got.dir, Some(PathBuf::from("cli_logs")));
    assert_eq!(got.level.as_deref(), Some("debug"));

    let got = LogSettings::resolve(LogSettings::default(), file.clone(), |_| None);
    assert_eq!(got, LogSettings { retention: None, ..file });
}
