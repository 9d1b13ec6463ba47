#![allow(dead_code)]

use mgraph_core::{Factory, Serializer};
use mgraph_introspect::{DeclarationDefinition, ModelFile, ModelManager, PropertyDefinition};

pub const FLEET: &str = "org.acme.fleet";
pub const TREE: &str = "org.acme.tree";

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
        { "kind": "participant", "name": "Mechanic", "extends": "Person" },
        { "kind": "concept", "name": "Engine",
          "properties": [
            { "name": "capacity", "type": "Double", "range": [0.5, 10] },
            { "name": "serviced", "type": "DateTime", "optional": true }
          ] },
        { "kind": "concept", "name": "Part", "abstract": true,
          "properties": [ { "name": "code", "type": "String" } ] },
        { "kind": "asset", "name": "Depot", "abstract": true, "identifiedBy": "code",
          "properties": [ { "name": "code", "type": "String" } ] },
        { "kind": "asset", "name": "Vehicle", "identifiedBy": "vin",
          "properties": [
            { "name": "vin", "type": "String" },
            { "name": "colour", "type": "Colour", "default": "RED" },
            { "name": "mileage", "type": "Integer", "range": [0, null], "optional": true },
            { "name": "owner", "type": "Person", "relationship": true, "optional": true },
            { "name": "previousOwners", "type": "Person", "relationship": true, "array": true,
              "optional": true },
            { "name": "tags", "type": "String", "array": true, "optional": true },
            { "name": "engine", "type": "Engine", "optional": true }
          ] },
        { "kind": "transaction", "name": "Deliver",
          "properties": [
            { "name": "vehicle", "type": "Vehicle", "relationship": true },
            { "name": "note", "type": "String", "optional": true }
          ] },
        { "kind": "event", "name": "Delivered",
          "properties": [ { "name": "vehicle", "type": "Vehicle", "relationship": true } ] }
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

/// Types that refer back to themselves: through an array, optionally, and unavoidably.
pub fn tree_model() -> ModelFile {
    ModelFile::new(TREE)
        .declare(
            DeclarationDefinition::concept("Branch")
                .property(PropertyDefinition::field("label", "String"))
                .property(PropertyDefinition::field("children", "Branch").array()),
        )
        .declare(
            DeclarationDefinition::concept("Link")
                .property(PropertyDefinition::field("weight", "Long"))
                .property(PropertyDefinition::field("next", "Link").optional()),
        )
        .declare(
            DeclarationDefinition::concept("Loop")
                .property(PropertyDefinition::field("next", "Loop")),
        )
}

pub fn manager() -> ModelManager {
    ModelManager::from_files([base_model(), fleet_model(), tree_model()])
        .expect("fixtures must resolve")
}

pub fn factory() -> Factory {
    Factory::new(manager())
}

pub fn serializer() -> Serializer {
    let manager = manager();
    Serializer::new(Factory::new(manager.clone()), manager)
}
