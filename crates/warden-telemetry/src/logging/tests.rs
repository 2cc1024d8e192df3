use super::*;
use tempfile::TempDir;

#[test]
fn test_log_level_from_str() {
    assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
    assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
    assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
}

#[test]
fn test_log_level_from_str_warning() {
    assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
}

#[test]
fn test_log_level_from_str_case_insensitive() {
    assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
}

#[test]
fn test_log_level_from_str_invalid() {
    assert!(matches!(
        "invalid".parse::<LogLevel>(),
        Err(TelemetryError::Logging(_))
    ));
}

#[test]
fn test_log_level_display_roundtrip() {
    for level in [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ] {
        assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
    }
}

#[test]
fn test_log_level_ordering() {
    assert!(LogLevel::Trace < LogLevel::Debug);
    assert!(LogLevel::Debug < LogLevel::Info);
    assert!(LogLevel::Warn < LogLevel::Error);
}

#[test]
fn test_verbosity() {
    assert_eq!(LogLevel::from_verbosity(0), None);
    assert_eq!(LogLevel::from_verbosity(1), Some(LogLevel::Info));
    assert_eq!(LogLevel::from_verbosity(2), Some(LogLevel::Debug));
    assert_eq!(LogLevel::from_verbosity(7), Some(LogLevel::Trace));
}

#[test]
fn test_log_format_from_str() {
    assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    assert!("xml".parse::<LogFormat>().is_err());
}

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.output, LogOutput::Stdout);
}

#[test]
fn test_log_output_from_settings() {
    assert_eq!(LogOutput::from_settings("stdout", None).unwrap(), LogOutput::Stdout);
    assert_eq!(LogOutput::from_settings("STDERR", None).unwrap(), LogOutput::Stderr);
    assert!(matches!(
        LogOutput::from_settings("syslog", None),
        Err(TelemetryError::Logging(_))
    ));

    let path = Path::new("/var/log/warden/auditor.log");
    assert_eq!(
        LogOutput::from_settings("stderr", Some(path)).unwrap(),
        LogOutput::File(path.to_path_buf())
    );
}

#[test]
fn test_log_config_from_settings() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("auditor.log");

    let config = LogConfig::from_settings("debug", "json", "stdout", Some(&log_path)).unwrap();
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.output, LogOutput::File(log_path));

    let config = LogConfig::from_settings("warn", "compact", "stderr", None).unwrap();
    assert_eq!(config.output, LogOutput::Stderr);

    assert!(LogConfig::from_settings("loud", "compact", "stdout", None).is_err());
}

#[test]
fn test_open_log_file_creates_parents() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs").join("warden").join("audit.log");
    open_log_file(&log_path).unwrap();
    assert!(log_path.exists());
}

#[test]
fn test_second_init_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = LogConfig {
        level: LogLevel::Trace,
        format: LogFormat::Compact,
        output: LogOutput::File(temp_dir.path().join("test.log")),
    };
    // Whichever call installs the global subscriber, the other must fail cleanly.
    let first = init_logging(&config);
    let second = init_logging(&config);
    assert!(first.is_err() || matches!(second, Err(TelemetryError::Init(_))));
}
