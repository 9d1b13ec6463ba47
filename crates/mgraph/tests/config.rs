use config::Map;
use mgraph::config::{ConfigError, load_config, load_config_with_env};
use mgraph::core::AbstractResolution;
use mgraph::logger::LogLevel;
use mgraph::{PlatformError, Settings};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SETTINGS_TOML: &str = r#"
[serializer]
deduplicate_resources = true

[factory]
abstract_resolution = "rejectAmbiguous"

[logging]
name = "fleet"
level = "verbose"
debug = "@serializer -mgraph:core/typed_stack"

[logging.profiles]
fleet = ["mgraph:core/factory"]
"#;

fn write_settings(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("mgraph.toml");
    fs::write(&path, contents).expect("write settings");
    (dir, path)
}

#[test]
fn reads_every_section_from_a_file() -> Result<(), ConfigError> {
    let (_dir, path) = write_settings(SETTINGS_TOML);
    let settings: Settings = load_config_with_env(Some(&path), Map::new())?;

    assert!(settings.serializer.validate);
    assert!(settings.serializer.deduplicate_resources);
    assert_eq!(settings.factory.abstract_resolution, AbstractResolution::RejectAmbiguous);
    assert_eq!(settings.logging.name, "fleet");
    assert_eq!(settings.logging.level, LogLevel::Verbose);
    assert_eq!(settings.logging.debug, "@serializer -mgraph:core/typed_stack");
    assert_eq!(
        settings.logging.profiles.get("fleet"),
        Some(&vec!["mgraph:core/factory".to_owned()])
    );
    Ok(())
}

#[test]
fn environment_overrides_the_file() -> Result<(), ConfigError> {
    let (_dir, path) = write_settings(SETTINGS_TOML);
    let mut environment = Map::new();
    environment.insert("MGRAPH__SERIALIZER__VALIDATE".to_owned(), "false".to_owned());
    environment.insert("MGRAPH__LOGGING__LEVEL".to_owned(), "debug".to_owned());
    environment.insert("UNRELATED__LOGGING__NAME".to_owned(), "ignored".to_owned());

    let settings: Settings = load_config_with_env(Some(&path), environment)?;

    assert!(!settings.serializer.validate);
    assert!(settings.serializer.deduplicate_resources);
    assert_eq!(settings.logging.level, LogLevel::Debug);
    assert_eq!(settings.logging.name, "fleet");
    Ok(())
}

#[test]
fn an_empty_file_yields_defaults() -> Result<(), ConfigError> {
    let (_dir, path) = write_settings("");
    let settings: Settings = load_config_with_env(Some(&path), Map::new())?;
    assert_eq!(settings, Settings::default());
    Ok(())
}

#[test]
fn a_missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");

    let err = load_config::<Settings>(Some(&path)).expect_err("file is required");
    assert!(matches!(err, ConfigError::Config { .. }));
    assert!(err.to_string().contains("Failed to build config"));
}

#[test]
fn mistyped_values_fail_to_deserialize() {
    let (_dir, path) = write_settings("[factory]\nabstract_resolution = \"pickAny\"\n");

    let err = load_config_with_env::<Settings>(Some(&path), Map::new()).expect_err("bad variant");
    assert!(err.to_string().contains("Failed to deserialize config"));

    let wrapped = PlatformError::from(err);
    assert!(matches!(wrapped, PlatformError::Config { .. }));
}
