//! Name handling helpers shared by the registry and the instance layer.

use crate::manager::ModelManager;
use crate::property::{PrimitiveType, Property};
use std::str::FromStr;

/// Prefix marking system properties such as `$class` and `$id`.
pub const SYSTEM_PROPERTY_PREFIX: char = '$';

/// Returns the namespace part of a fully qualified name, or `""` when there is none.
///
/// ```rust
/// use mgraph_introspect::model_util::get_namespace;
///
/// assert_eq!(get_namespace("org.acme.Vehicle"), "org.acme");
/// assert_eq!(get_namespace("Vehicle"), "");
/// ```
#[must_use]
pub fn get_namespace(fqn: &str) -> &str {
    fqn.rfind('.').map_or("", |idx| &fqn[..idx])
}

/// Returns the short type name of a fully qualified name.
#[must_use]
pub fn get_short_name(fqn: &str) -> &str {
    fqn.rfind('.').map_or(fqn, |idx| &fqn[idx + 1..])
}

/// Joins a namespace and a short name.
#[must_use]
pub fn fully_qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() { name.to_owned() } else { format!("{namespace}.{name}") }
}

#[must_use]
pub fn is_primitive_type(name: &str) -> bool {
    PrimitiveType::from_str(name).is_ok()
}

#[must_use]
pub fn is_system_property(name: &str) -> bool {
    name.starts_with(SYSTEM_PROPERTY_PREFIX)
}

/// Checks whether a value of type `type_fqn` may be stored in `property`.
///
/// Assignable when the names match exactly, or when the declared type is a class
/// that appears in the supertype chain of `type_fqn`. A primitive declared type only
/// accepts itself.
#[must_use]
pub fn is_assignable_to(model_manager: &ModelManager, type_fqn: &str, property: &Property) -> bool {
    let declared = property.fully_qualified_type_name();
    if declared == type_fqn {
        return true;
    }
    if property.is_primitive() {
        return false;
    }
    model_manager
        .get_type(type_fqn)
        .is_ok_and(|decl| decl.super_types().iter().any(|ancestor| ancestor == declared))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_names() {
        assert_eq!(get_namespace("org.acme.l1.Person"), "org.acme.l1");
        assert_eq!(get_short_name("org.acme.l1.Person"), "Person");
        assert_eq!(get_short_name("Person"), "Person");
        assert_eq!(get_namespace("org.acme.l1."), "org.acme.l1");
        assert_eq!(get_short_name("org.acme.l1."), "");
    }

    #[test]
    fn joins_names() {
        assert_eq!(fully_qualified_name("org.acme", "Vehicle"), "org.acme.Vehicle");
        assert_eq!(fully_qualified_name("", "Vehicle"), "Vehicle");
    }

    #[test]
    fn recognises_primitives_and_system_properties() {
        assert!(is_primitive_type("DateTime"));
        assert!(is_primitive_type("Long"));
        assert!(!is_primitive_type("string"));
        assert!(!is_primitive_type("Vehicle"));
        assert!(is_system_property("$class"));
        assert!(!is_system_property("class"));
    }
}
