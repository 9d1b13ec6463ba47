mod fixtures;

use fixtures::{base_model, fleet_model, manager};
use mgraph_introspect::*;

#[test]
fn resolves_inheritance_and_identifiers() -> Result<(), IntrospectError> {
    let manager = manager();
    let driver = manager.get_type("org.acme.fleet.Driver")?;

    assert_eq!(driver.kind(), DeclarationKind::Participant);
    assert_eq!(driver.super_type(), Some("org.acme.fleet.Person"));
    assert_eq!(driver.super_types(), ["org.acme.fleet.Person", "mgraph.system.Participant"]);
    assert_eq!(driver.identifier_field_name(), Some("email"));
    assert!(!driver.is_abstract());
    assert!(driver.is_assignable_to("org.acme.fleet.Person"));

    let names: Vec<_> = driver.properties().iter().map(Property::name).collect();
    assert_eq!(names, ["licence", "email", "address"]);
    assert_eq!(driver.own_properties().len(), 1);
    Ok(())
}

#[test]
fn resolves_field_targets() -> Result<(), IntrospectError> {
    let vehicle = manager().get_type("org.acme.fleet.Vehicle")?;

    let colour = vehicle.property("colour").and_then(Property::as_field).expect("colour field");
    assert!(colour.is_type_enum());
    assert_eq!(colour.fully_qualified_type_name(), "org.acme.fleet.Colour");
    assert_eq!(colour.default_value(), Some("RED"));

    let mileage = vehicle.property("mileage").and_then(Property::as_field).expect("mileage field");
    assert_eq!(mileage.primitive_type(), Some(PrimitiveType::Integer));
    assert!(mileage.validator().is_some_and(|v| !v.accepts_number(-1.0)));

    let owner = vehicle.property("owner").expect("owner relationship");
    assert!(owner.is_relationship());
    assert_eq!(owner.fully_qualified_type_name(), "org.acme.fleet.Person");

    let person = manager().get_type("org.acme.fleet.Person")?;
    let address = person.property("address").expect("address field");
    assert_eq!(address.fully_qualified_type_name(), "org.acme.base.Address");
    Ok(())
}

#[test]
fn reports_unresolved_names() {
    let manager = manager();

    let err = manager.get_type("org.acme.empty.Person").expect_err("unknown namespace");
    assert!(matches!(err, IntrospectError::NamespaceNotRegistered { .. }));
    assert!(err.to_string().contains("Namespace is not defined for type org.acme.empty.Person"));

    let err = manager.get_type("org.acme.fleet.Unknown").expect_err("unknown type");
    assert!(matches!(err, IntrospectError::TypeNotDeclared { .. }));
    assert!(err.to_string().contains("Type Unknown is not defined in namespace org.acme.fleet"));
}

#[test]
fn system_types_are_always_present() -> Result<(), IntrospectError> {
    let manager = ModelManager::new()?;
    let tx = manager.get_type("mgraph.system.Transaction")?;
    assert!(tx.is_abstract());
    assert!(tx.is_system_type());
    assert_eq!(tx.identifier_field_name(), Some(TRANSACTION_ID_FIELD));
    assert!(tx.property(TIMESTAMP_FIELD).is_some());
    assert_eq!(manager.namespaces(), [SYSTEM_NAMESPACE]);
    Ok(())
}

#[test]
fn finds_concrete_subtypes_in_declaration_order() {
    let manager = manager();
    let direct: Vec<_> = manager
        .direct_concrete_subtypes("org.acme.fleet.Person")
        .iter()
        .map(|d| d.fully_qualified_name().to_owned())
        .collect();
    assert_eq!(direct, ["org.acme.fleet.Driver"]);

    let assets = manager.concrete_descendants("mgraph.system.Asset");
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].name(), "Vehicle");

    let assignable = manager.assignable_declarations("org.acme.fleet.Person");
    assert_eq!(assignable.len(), 2);
}

#[test]
fn assignability_follows_the_supertype_chain() -> Result<(), IntrospectError> {
    let manager = manager();
    let vehicle = manager.get_type("org.acme.fleet.Vehicle")?;
    let owner = vehicle.property("owner").expect("owner relationship");
    let vin = vehicle.property("vin").expect("vin field");

    assert!(model_util::is_assignable_to(&manager, "org.acme.fleet.Driver", owner));
    assert!(model_util::is_assignable_to(&manager, "org.acme.fleet.Person", owner));
    assert!(!model_util::is_assignable_to(&manager, "org.acme.fleet.Vehicle", owner));
    assert!(model_util::is_assignable_to(&manager, "String", vin));
    assert!(!model_util::is_assignable_to(&manager, "Integer", vin));
    Ok(())
}

#[test]
fn rejects_files_that_do_not_resolve() {
    let manager = ModelManager::new().expect("system namespace");

    let err = manager.add_model_file(fleet_model()).expect_err("missing import target");
    assert!(matches!(err, IntrospectError::IllegalModel { .. }));
    assert!(manager.model_files().is_empty(), "failed registration must not be applied");

    manager.add_model_file(base_model()).expect("base model resolves alone");
    let err = manager.add_model_file(base_model()).expect_err("namespace registered twice");
    assert!(err.to_string().contains("declared more than once"));
}

#[test]
fn rejects_structural_violations() {
    let cases = [
        ModelFile::new("a").declare(DeclarationDefinition::asset("NoId")),
        ModelFile::new("a").declare(
            DeclarationDefinition::asset("BadId")
                .identified_by("id")
                .property(PropertyDefinition::field("id", "Integer")),
        ),
        ModelFile::new("a").declare(
            DeclarationDefinition::concept("C")
                .property(PropertyDefinition::field("x", "String"))
                .property(PropertyDefinition::field("x", "String")),
        ),
        ModelFile::new("a")
            .declare(DeclarationDefinition::concept("C"))
            .declare(DeclarationDefinition::asset("A").extends("C")),
        ModelFile::new("a").declare(
            DeclarationDefinition::concept("C")
                .property(PropertyDefinition::field("n", "Integer").default_value("ten")),
        ),
        ModelFile::new("a").declare(
            DeclarationDefinition::concept("C")
                .property(PropertyDefinition::field("s", "String").regex("(")),
        ),
        ModelFile::new("a")
            .declare(DeclarationDefinition::concept("C"))
            .declare(
                DeclarationDefinition::concept("D")
                    .property(PropertyDefinition::relationship("c", "C")),
            ),
        ModelFile::new("a").declare(
            DeclarationDefinition::concept("Loop").extends("Loop"),
        ),
    ];

    for file in cases {
        let described = file.clone();
        let manager = ModelManager::new().expect("system namespace");
        let err = manager.add_model_file(file).expect_err("model must be rejected");
        assert!(
            matches!(err, IntrospectError::IllegalModel { .. }),
            "unexpected error {err} for {described:?}"
        );
    }
}

#[test]
fn update_and_delete_swap_snapshots() -> Result<(), IntrospectError> {
    let manager = manager();
    let clone = manager.clone();

    let updated = ModelFile::new("org.acme.base").declare(
        DeclarationDefinition::concept("Address")
            .property(PropertyDefinition::field("street", "String"))
            .property(PropertyDefinition::field("city", "String"))
            .property(PropertyDefinition::field("zip", "String").optional()),
    );
    manager.update_model_file(updated)?;
    let address = clone.get_type("org.acme.base.Address")?;
    assert!(address.property("zip").is_some(), "clones share the registry");

    let err = manager.delete_model_file("org.acme.base").expect_err("fleet still imports base");
    assert!(matches!(err, IntrospectError::IllegalModel { .. }));

    manager.delete_model_file("org.acme.fleet")?;
    manager.delete_model_file("org.acme.base")?;
    assert!(manager.model_files().is_empty());

    let err = manager.delete_model_file("org.acme.base").expect_err("already gone");
    assert!(matches!(err, IntrospectError::NamespaceNotRegistered { .. }));

    manager.add_model_file(base_model())?;
    manager.clear_model_files()?;
    assert_eq!(manager.namespaces(), [SYSTEM_NAMESPACE]);
    Ok(())
}

struct Counter;

impl Visitor<Vec<String>> for Counter {
    type Output = usize;
    type Error = IntrospectError;

    fn visit_class_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut Vec<String>,
    ) -> Result<usize, IntrospectError> {
        params.push(format!("class {}", declaration.name()));
        let mut total = 0;
        for property in declaration.properties() {
            total += property.accept(self, params)?;
        }
        Ok(total)
    }

    fn visit_enum_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut Vec<String>,
    ) -> Result<usize, IntrospectError> {
        params.push(format!("enum {}", declaration.name()));
        Ok(declaration.enum_values().len())
    }

    fn visit_field(
        &self,
        field: &Field,
        params: &mut Vec<String>,
    ) -> Result<usize, IntrospectError> {
        params.push(format!("field {}", field.name()));
        Ok(1)
    }

    fn visit_relationship_declaration(
        &self,
        relationship: &RelationshipDeclaration,
        params: &mut Vec<String>,
    ) -> Result<usize, IntrospectError> {
        params.push(format!("relationship {}", relationship.name()));
        Ok(1)
    }
}

#[test]
fn accept_dispatches_on_declaration_and_property_kind() -> Result<(), IntrospectError> {
    let manager = manager();
    let mut trail = Vec::new();

    let fields = manager.get_type("org.acme.fleet.Vehicle")?.accept(&Counter, &mut trail)?;
    assert_eq!(fields, 4);
    assert_eq!(trail.first().map(String::as_str), Some("class Vehicle"));
    assert!(trail.contains(&"relationship owner".to_owned()));

    let values = manager.get_type("org.acme.fleet.Colour")?.accept(&Counter, &mut trail)?;
    assert_eq!(values, 3);
    assert_eq!(trail.last().map(String::as_str), Some("enum Colour"));
    Ok(())
}
