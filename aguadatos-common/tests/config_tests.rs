//! Config file loading from disk

use aguadatos_common::config::{load_config_file, FileConfig, Overrides, Settings};
use aguadatos_common::Error;
use std::io::Write;

#[test]
fn test_load_config_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "host = \"0.0.0.0\"").unwrap();
    writeln!(file, "database = \"sqlite://plants.db\"").unwrap();

    let config = load_config_file(file.path()).unwrap();
    assert_eq!(
        config,
        FileConfig {
            host: Some("0.0.0.0".to_string()),
            port: None,
            database: Some("sqlite://plants.db".to_string()),
            debug: None,
        }
    );

    let settings = Settings::resolve(Overrides::default(), config);
    assert_eq!(settings.bind_addr(), "0.0.0.0:5000");
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_malformed_config_file_names_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let err = load_config_file(file.path()).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains(&file.path().display().to_string())),
        other => panic!("expected Config error, got {:?}", other),
    }
}
