#![allow(dead_code)]

use mgraph_introspect::{DeclarationDefinition, ModelFile, ModelManager, PropertyDefinition};

pub const FLEET_MODEL: &str = r#"{
    "namespace": "org.acme.fleet",
    "imports": ["org.acme.base.Address"],
    "declarations": [
        { "kind": "enum", "name": "Colour", "values": ["RED", "GREEN", "BLUE"] },
        { "kind": "participant", "name": "Person", "abstract": true, "identifiedBy": "email",
          "properties": [
            { "name": "email", "type": "String" },
            { "name": "address", "type": "Address", "optional": true }
          ] },
        { "kind": "participant", "name": "Driver", "extends": "Person",
          "properties": [ { "name": "licence", "type": "String", "regex": "^[A-Z]{2}[0-9]+$" } ] },
        { "kind": "asset", "name": "Vehicle", "identifiedBy": "vin",
          "properties": [
            { "name": "vin", "type": "String" },
            { "name": "colour", "type": "Colour", "default": "RED" },
            { "name": "mileage", "type": "Integer", "range": [0, null], "optional": true },
            { "name": "owner", "type": "Person", "relationship": true, "optional": true }
          ] }
    ]
}"#;

pub fn base_model() -> ModelFile {
    ModelFile::new("org.acme.base").declare(
        DeclarationDefinition::concept("Address")
            .property(PropertyDefinition::field("street", "String"))
            .property(PropertyDefinition::field("city", "String")),
    )
}

pub fn fleet_model() -> ModelFile {
    ModelFile::from_json(FLEET_MODEL).expect("fleet fixture must decode")
}

pub fn manager() -> ModelManager {
    ModelManager::from_files([base_model(), fleet_model()]).expect("fixtures must resolve")
}
