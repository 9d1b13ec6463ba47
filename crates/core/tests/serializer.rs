mod fixtures;

use fixtures::{FLEET, factory, serializer};
use mgraph_core::*;
use serde_json::json;

fn licensed_driver() -> Resource {
    let options = FactoryOptions::default();
    let mut driver =
        factory().new_resource(FLEET, "Driver", "ann@acme.org", &options).expect("driver");
    driver.set_property_value("licence", "AB123").expect("licence");
    driver
}

fn equipped_vehicle() -> Result<Resource, ModelError> {
    let factory = factory();
    let options = FactoryOptions::default();
    let mut vehicle = factory.new_resource(FLEET, "Vehicle", "V1", &options)?;
    let mut engine = factory.new_concept(FLEET, "Engine", &options)?;
    engine.set_property_value("capacity", 2.5)?;

    vehicle.set_property_value("mileage", 1200)?;
    let owner = factory.new_relationship(FLEET, "Driver", "ann@acme.org")?;
    vehicle.set_property_value("owner", owner)?;
    vehicle.add_array_value("tags", "red")?;
    vehicle.set_property_value("engine", engine)?;
    Ok(vehicle)
}

#[test]
fn writes_and_reads_a_resource_graph() -> Result<(), ModelError> {
    let serializer = serializer();
    let vehicle = equipped_vehicle()?;

    let written = serializer.to_json(&vehicle)?;
    assert_eq!(
        written,
        json!({
            "$class": "org.acme.fleet.Vehicle",
            "vin": "V1",
            "colour": "RED",
            "mileage": 1200,
            "owner": "resource:org.acme.fleet.Driver#ann@acme.org",
            "tags": ["red"],
            "engine": { "$class": "org.acme.fleet.Engine", "capacity": 2.5 }
        })
    );

    let read = serializer.from_json(&written)?;
    assert_eq!(read, Instance::Resource(vehicle));
    Ok(())
}

#[test]
fn writes_concepts_and_dates() -> Result<(), ModelError> {
    let serializer = serializer();
    let json = json!({
        "$class": "org.acme.fleet.Engine",
        "capacity": 1.6,
        "serviced": "2024-02-29T13:05:09.250Z"
    });

    let engine = serializer.from_json(&json)?.into_concept()?;
    assert!(matches!(engine.get_property_value("serviced"), Some(Value::DateTime(_))));
    assert_eq!(serializer.to_json(&engine)?, json);
    Ok(())
}

#[test]
fn stamps_transactions_read_from_json() -> Result<(), ModelError> {
    let serializer = serializer();
    let json = json!({
        "$class": "org.acme.fleet.Deliver",
        "transactionId": "tx-1",
        "timestamp": "2024-02-29T13:05:09.000Z",
        "vehicle": "resource:org.acme.fleet.Vehicle#V1"
    });

    let deliver = serializer.from_json(&json)?.into_resource()?;
    assert_eq!(deliver.identifier(), "tx-1");
    let timestamp = deliver.get_property_value("timestamp").map(ToString::to_string);
    assert_eq!(timestamp.as_deref(), Some("2024-02-29T13:05:09.000Z"));
    assert_eq!(serializer.to_json(&deliver)?, json);
    Ok(())
}

#[test]
fn rejects_inputs_without_a_class() {
    let serializer = serializer();

    let err = serializer.from_json(&json!({ "vin": "V1" })).expect_err("no $class");
    assert!(matches!(err, ModelError::MissingClassDiscriminator { .. }));
    assert!(err.to_string().contains("Does not contain a $class type identifier"));

    let colour = json!({ "$class": "org.acme.fleet.Colour" });
    let err = serializer.from_json(&colour).expect_err("enum root");
    assert!(matches!(err, ModelError::EnumNotInstantiable { .. }));

    let truck = json!({ "$class": "org.acme.fleet.Truck" });
    let err = serializer.from_json(&truck).expect_err("unknown type");
    assert!(matches!(err, ModelError::Introspect { .. }));
}

#[test]
fn rejects_unexpected_and_malformed_members() {
    let serializer = serializer();
    let options = SerializerOptions::default().without_validation();

    let wheels = json!({ "$class": "org.acme.fleet.Vehicle", "vin": "V1", "wheels": 4 });
    let err = serializer.from_json_with(&wheels, &options).expect_err("undeclared member");
    assert_eq!(err.violation_kind(), Some(ViolationKind::UnexpectedProperty));
    assert!(err.to_string().contains("wheels"));

    let err = serializer
        .from_json(&json!({ "$class": "org.acme.fleet.Vehicle", "vin": "V1", "mileage": "many" }))
        .expect_err("not a number");
    assert!(matches!(err, ModelError::MalformedInput { .. }));

    let err = serializer
        .from_json(&json!({ "$class": "org.acme.fleet.Vehicle", "vin": "V1", "tags": "red" }))
        .expect_err("not an array");
    assert!(matches!(err, ModelError::MalformedInput { .. }));
}

#[test]
fn validation_on_read_can_be_disabled() -> Result<(), ModelError> {
    let serializer = serializer();
    let json = json!({ "$class": "org.acme.fleet.Vehicle", "vin": "V1", "mileage": -1 });

    let err = serializer.from_json(&json).expect_err("out of range");
    assert_eq!(err.violation_kind(), Some(ViolationKind::ValueConstraint));

    let unchecked = SerializerOptions::default().without_validation();
    let vehicle = serializer.from_json_with(&json, &unchecked)?;
    assert_eq!(vehicle.get_property_value("mileage"), Some(&Value::Integer(-1)));
    let colour = vehicle.get_property_value("colour");
    assert_eq!(colour, Some(&Value::from("RED")), "defaults still apply");
    Ok(())
}

#[test]
fn validation_on_write_can_be_disabled() -> Result<(), ModelError> {
    let serializer = serializer();
    let options = FactoryOptions::default();
    let driver = factory().new_resource(FLEET, "Driver", "ann@acme.org", &options)?;

    let err = serializer.to_json(&driver).expect_err("licence missing");
    assert_eq!(err.violation_kind(), Some(ViolationKind::MissingRequiredField));

    let unchecked = SerializerOptions::default().without_validation();
    let written = serializer.to_json_with(&driver, &unchecked)?;
    assert_eq!(written, json!({ "$class": "org.acme.fleet.Driver", "email": "ann@acme.org" }));
    Ok(())
}

#[test]
fn reads_every_relationship_form() -> Result<(), ModelError> {
    let serializer = serializer();
    let json = json!({
        "$class": "org.acme.fleet.Vehicle",
        "vin": "V1",
        "owner": "org.acme.fleet.Driver#ann@acme.org",
        "previousOwners": ["resource:org.acme.fleet.Mechanic#bob%40acme.org", "carl@acme.org"]
    });

    let vehicle = serializer.from_json(&json)?;
    let owner = vehicle.get_property_value("owner").and_then(Value::as_relationship);
    let owner = owner.expect("owner");
    assert_eq!(owner.fully_qualified_identifier(), "org.acme.fleet.Driver#ann@acme.org");

    let previous: Vec<String> = vehicle
        .get_property_value("previousOwners")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_relationship)
        .map(Identifiable::fully_qualified_identifier)
        .collect();
    assert_eq!(
        previous,
        ["org.acme.fleet.Mechanic#bob@acme.org", "org.acme.fleet.Person#carl@acme.org"]
    );
    Ok(())
}

#[test]
fn inline_resources_need_to_be_accepted() -> Result<(), ModelError> {
    let serializer = serializer();
    let json = json!({
        "$class": "org.acme.fleet.Vehicle",
        "vin": "V1",
        "owner": { "$class": "org.acme.fleet.Driver", "email": "ann@acme.org", "licence": "AB123" }
    });

    let err = serializer.from_json(&json).expect_err("object in relationship");
    assert!(matches!(err, ModelError::MalformedInput { .. }));

    let accepting = SerializerOptions {
        accept_resources_for_relationships: true,
        ..SerializerOptions::default()
    };
    let vehicle = serializer.from_json_with(&json, &accepting)?;
    let owner = vehicle.get_property_value("owner").and_then(Value::as_resource);
    let owner = owner.expect("inline owner");
    assert_eq!(owner, &licensed_driver());

    let missing_class =
        json!({ "$class": "org.acme.fleet.Vehicle", "vin": "V1", "owner": { "email": "x" } });
    let err = serializer.from_json_with(&missing_class, &accepting).expect_err("no inline $class");
    assert!(matches!(err, ModelError::MissingClassDiscriminator { .. }));
    Ok(())
}

#[test]
fn resources_in_relationship_fields_are_converted_or_inlined() -> Result<(), ModelError> {
    let serializer = serializer();
    let unchecked = FactoryOptions::unvalidated();
    let mut vehicle = factory().new_resource(FLEET, "Vehicle", "V1", &unchecked)?;
    vehicle.set_property_value("owner", licensed_driver())?;

    let err = serializer.to_json(&vehicle).expect_err("validation");
    assert_eq!(err.violation_kind(), Some(ViolationKind::NotARelationship));
    let unvalidated = SerializerOptions::default().without_validation();
    let err = serializer.to_json_with(&vehicle, &unvalidated).expect_err("writer");
    assert!(matches!(err, ModelError::Generation { .. }));

    let converting = SerializerOptions {
        convert_resources_to_relationships: true,
        ..SerializerOptions::default()
    };
    assert_eq!(
        serializer.to_json_with(&vehicle, &converting)?,
        json!({
            "$class": "org.acme.fleet.Vehicle",
            "vin": "V1",
            "colour": "RED",
            "owner": "resource:org.acme.fleet.Driver#ann@acme.org"
        })
    );

    let inlining = SerializerOptions {
        permit_resources_for_relationships: true,
        ..SerializerOptions::default()
    };
    let written = serializer.to_json_with(&vehicle, &inlining)?;
    assert_eq!(
        written["owner"],
        json!({ "$class": "org.acme.fleet.Driver", "licence": "AB123", "email": "ann@acme.org" })
    );
    Ok(())
}

#[test]
fn deduplicates_repeated_resources() -> Result<(), ModelError> {
    let serializer = serializer();
    let unchecked = FactoryOptions::unvalidated();
    let mut vehicle = factory().new_resource(FLEET, "Vehicle", "V1", &unchecked)?;
    vehicle.set_property_value("owner", licensed_driver())?;
    vehicle.add_array_value("previousOwners", licensed_driver())?;

    let options = SerializerOptions {
        permit_resources_for_relationships: true,
        deduplicate_resources: true,
        ..SerializerOptions::default()
    };
    let written = serializer.to_json_with(&vehicle, &options)?;
    assert_eq!(
        written,
        json!({
            "$class": "org.acme.fleet.Vehicle",
            "$id": "resource:org.acme.fleet.Vehicle#V1",
            "vin": "V1",
            "colour": "RED",
            "owner": {
                "$class": "org.acme.fleet.Driver",
                "$id": "resource:org.acme.fleet.Driver#ann@acme.org",
                "licence": "AB123",
                "email": "ann@acme.org"
            },
            "previousOwners": ["resource:org.acme.fleet.Driver#ann@acme.org"]
        })
    );

    let accepting = SerializerOptions {
        accept_resources_for_relationships: true,
        ..SerializerOptions::default()
    };
    let read = serializer.from_json_with(&written, &accepting)?;
    assert!(read.get_property_value("owner").and_then(Value::as_resource).is_some());
    assert!(
        read.get_property_value("previousOwners")
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().all(|item| item.as_relationship().is_some()))
    );
    Ok(())
}

#[test]
fn refuses_untyped_values_and_invalid_output() -> Result<(), ModelError> {
    let serializer = serializer();

    let err = serializer.to_json(&Value::from(3)).expect_err("untyped");
    assert!(matches!(err, ModelError::NotTyped { .. }));

    let mut engine = factory().new_concept(FLEET, "Engine", &FactoryOptions::unvalidated())?;
    engine.set_property_value("capacity", f64::NAN)?;
    let unvalidated = SerializerOptions::default().without_validation();
    let err = serializer.to_json_with(&engine, &unvalidated).expect_err("NaN");
    assert!(matches!(err, ModelError::GeneratedInvalidJson { .. }));
    Ok(())
}

#[test]
fn default_options_are_configurable() -> Result<(), ModelError> {
    let mut serializer = serializer();
    let options = FactoryOptions::default();
    let driver = factory().new_resource(FLEET, "Driver", "ann@acme.org", &options)?;

    serializer.set_default_options(SerializerOptions::default().without_validation());
    assert!(!serializer.default_options().validate);
    assert!(serializer.to_json(&driver).is_ok());
    Ok(())
}

#[test]
fn integers_written_to_double_fields_read_back_unchanged() -> Result<(), ModelError> {
    let serializer = serializer();
    let mut vehicle = equipped_vehicle()?;
    let mut engine = factory().new_concept(FLEET, "Engine", &FactoryOptions::default())?;
    engine.set_property_value("capacity", 3)?;
    assert_eq!(engine.get_property_value("capacity"), Some(&Value::Double(3.0)));
    vehicle.set_property_value("engine", engine)?;

    let read = serializer.from_json(&serializer.to_json(&vehicle)?)?;
    assert_eq!(read, Instance::Resource(vehicle));
    Ok(())
}

#[test]
fn non_object_items_in_class_arrays_are_malformed() {
    let serializer = serializer();

    let json = json!({ "$class": "org.acme.tree.Branch", "label": "a", "children": [null] });
    let err = serializer.from_json(&json).expect_err("null child");
    assert!(matches!(err, ModelError::MalformedInput { .. }));
    assert!(err.to_string().contains("Expected a JSON object for type org.acme.tree.Branch"));

    let json = json!({ "$class": "org.acme.tree.Branch", "label": "a", "children": ["leaf"] });
    let err = serializer.from_json(&json).expect_err("string child");
    assert!(matches!(err, ModelError::MalformedInput { .. }));
}
