use mgraph::logger::LoggerError;
use mgraph::prelude::*;
use serial_test::serial;
use std::fs;

const CREW: &str = "org.acme.crew";

fn crew_model() -> ModelFile {
    ModelFile::new(CREW)
        .declare(
            DeclarationDefinition::participant("Member")
                .abstract_type()
                .identified_by("badge")
                .property(PropertyDefinition::field("badge", "String")),
        )
        .declare(DeclarationDefinition::participant("Pilot").extends("Member"))
        .declare(DeclarationDefinition::participant("Steward").extends("Member"))
        .declare(
            DeclarationDefinition::asset("Aircraft")
                .identified_by("tail")
                .property(PropertyDefinition::field("tail", "String"))
                .property(PropertyDefinition::relationship("captain", "Member").optional()),
        )
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.logging.console = false;
    settings
}

#[test]
fn wires_factory_settings() -> Result<(), PlatformError> {
    let platform = Platform::new(settings(), [crew_model()])?;
    let options = FactoryOptions::default();

    let member = platform.factory().new_resource(CREW, "Member", "B-7", &options).expect("first");
    assert_eq!(member.fully_qualified_type(), "org.acme.crew.Pilot");
    assert!(platform.model_manager().namespaces().contains(&CREW.to_owned()));

    let mut strict = settings();
    strict.factory.abstract_resolution = AbstractResolution::RejectAmbiguous;
    let platform = Platform::new(strict, [crew_model()])?;
    let err = platform.factory().new_resource(CREW, "Member", "B-7", &options).expect_err("two");
    assert!(matches!(err, ModelError::AmbiguousConcreteType { .. }));
    Ok(())
}

#[test]
fn wires_serializer_defaults() -> Result<(), PlatformError> {
    let mut settings = settings();
    settings.serializer.validate = false;
    let platform = Platform::new(settings, [crew_model()])?;

    assert_eq!(platform.serializer().default_options(), &platform.settings().serializer);

    let unchecked = FactoryOptions::unvalidated();
    let aircraft = platform
        .factory()
        .new_resource(CREW, "Aircraft", "G-ACME", &unchecked)
        .expect("aircraft");
    let json = platform.serializer().to_json(&aircraft).expect("written without validation");
    assert_eq!(json["$class"], "org.acme.crew.Aircraft");
    assert_eq!(json["tail"], "G-ACME");
    Ok(())
}

#[test]
fn unresolved_models_are_schema_errors() {
    let broken = ModelFile::new("org.acme.broken").declare(
        DeclarationDefinition::concept("Orphan").property(PropertyDefinition::field("x", "Ghost")),
    );

    let err = Platform::new(settings(), [broken]).expect_err("unknown type");
    assert!(matches!(err, PlatformError::Schema { .. }));
    assert!(err.to_string().contains("Registering model files"));
}

#[test]
fn malformed_control_strings_fail_assembly() {
    let mut settings = settings();
    settings.logging.debug = "mgraph[loud]:core".to_owned();

    let err = Platform::new(settings, [crew_model()]).expect_err("bad level");
    assert!(matches!(err, PlatformError::Logging { source: LoggerError::InvalidLevel { .. }, .. }));
}

#[test]
fn reconfigures_the_selection() -> Result<(), PlatformError> {
    let mut settings = settings();
    settings.logging.debug = "mgraph:core".to_owned();
    let platform = Platform::new(settings, [crew_model()])?;
    let selection = platform.selection();

    assert!(selection.is_enabled("mgraph_core::factory", LogLevel::Info));
    assert!(!selection.is_enabled("mgraph_introspect::manager", LogLevel::Info));

    platform.reconfigure_logging("@schema mgraph[debug]:core/factory")?;
    assert_eq!(selection.control(), "@schema mgraph[debug]:core/factory");
    assert!(selection.is_enabled("mgraph_introspect::manager", LogLevel::Info));
    assert!(selection.is_enabled("mgraph_core::factory", LogLevel::Debug));
    assert!(!selection.is_enabled("mgraph_core::serializer", LogLevel::Info));

    let err = platform.reconfigure_logging("@missing").expect_err("unknown profile");
    assert!(matches!(err, PlatformError::Logging { .. }));
    assert_eq!(selection.control(), "@schema mgraph[debug]:core/factory");
    Ok(())
}

#[test]
#[serial]
fn platform_from_a_config_file() -> Result<(), PlatformError> {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("mgraph.toml");
    let contents = r#"
[factory]
abstract_resolution = "rejectAmbiguous"

[logging]
console = false
"#;
    fs::write(&path, contents).expect("write settings");

    let platform = Platform::from_config(Some(&path), [crew_model()])?;
    let resolution = platform.settings().factory.abstract_resolution;
    assert_eq!(resolution, AbstractResolution::RejectAmbiguous);
    assert!(!platform.settings().logging.console);

    let missing = Platform::from_config(Some(dir.path().join("absent.toml")), [crew_model()]);
    assert!(matches!(missing, Err(PlatformError::Config { .. })));
    Ok(())
}

#[test]
#[serial]
fn logging_installs_once() -> Result<(), PlatformError> {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut settings = settings();
    settings.logging.path = Some(dir.path().to_path_buf());
    let mut platform = Platform::new(settings, [crew_model()])?;

    let logger = platform.init_logging()?;
    platform.reconfigure_logging("mgraph:core")?;
    assert!(platform.selection().is_enabled("mgraph_core::factory", LogLevel::Info));
    logger.flush();

    let again = platform.init_logging();
    assert!(matches!(again, Err(PlatformError::Logging { .. })));
    Ok(())
}
