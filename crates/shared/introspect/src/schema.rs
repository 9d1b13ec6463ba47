use crate::declaration::{ClassDeclaration, DeclarationKind};
use crate::definition::{DeclarationDefinition, ModelFile, PropertyDefinition};
use crate::error::{IntrospectError, IntrospectErrorExt};
use crate::model_util::{fully_qualified_name, get_namespace, get_short_name, is_system_property};
use crate::property::{
    Field, FieldTarget, FieldValidator, PrimitiveType, Property, RelationshipDeclaration,
};
use crate::system::{self, SYSTEM_NAMESPACE};
use fxhash::{FxHashMap, FxHashSet};
use regex::Regex;
use std::str::FromStr;
use std::sync::Arc;

/// An immutable, fully resolved view of every registered declaration.
#[derive(Debug, Default)]
pub(crate) struct Schema {
    declarations: Vec<Arc<ClassDeclaration>>,
    index: FxHashMap<String, usize>,
    namespaces: Vec<String>,
}

impl Schema {
    pub(crate) fn declarations(&self) -> &[Arc<ClassDeclaration>] {
        &self.declarations
    }

    pub(crate) fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub(crate) fn get(&self, fqn: &str) -> Result<Arc<ClassDeclaration>, IntrospectError> {
        if let Some(&idx) = self.index.get(fqn) {
            return Ok(Arc::clone(&self.declarations[idx]));
        }
        Err(unresolved(fqn, |ns| self.namespaces.iter().any(|n| n == ns)))
    }

    /// Resolves the system model followed by `files`, in order.
    pub(crate) fn resolve(files: &[ModelFile]) -> Result<Self, IntrospectError> {
        let system = system::system_model();
        let sources: Vec<(&ModelFile, bool)> =
            std::iter::once((&system, true)).chain(files.iter().map(|f| (f, false))).collect();

        let mut namespaces: Vec<String> = Vec::with_capacity(sources.len());
        for (file, _) in &sources {
            if file.namespace.trim().is_empty() {
                return Err(IntrospectError::illegal("Model file has an empty namespace"));
            }
            if namespaces.contains(&file.namespace) {
                return Err(IntrospectError::illegal(format!(
                    "Namespace {} is declared more than once",
                    file.namespace
                )));
            }
            namespaces.push(file.namespace.clone());
        }

        let mut pending = Vec::new();
        let mut index = FxHashMap::default();
        for &(file, is_system) in &sources {
            for def in &file.declarations {
                if def.name.is_empty() || def.name.contains('.') {
                    return Err(IntrospectError::illegal(format!(
                        "Invalid declaration name '{}' in namespace {}",
                        def.name, file.namespace
                    )));
                }
                let fqn = fully_qualified_name(&file.namespace, &def.name);
                if index.insert(fqn.clone(), pending.len()).is_some() {
                    return Err(IntrospectError::illegal(format!("Duplicate declaration {fqn}")));
                }
                pending.push(Pending { file, def, fqn, system: is_system });
            }
        }

        let resolver = Resolver { pending: &pending, index: &index, namespaces: &namespaces };

        let supers = pending
            .iter()
            .map(|p| resolver.super_type(p).context(format!("Resolving supertype of {}", p.fqn)))
            .collect::<Result<Vec<_>, _>>()?;
        let chains = (0..pending.len())
            .map(|i| resolver.ancestry(i, &supers))
            .collect::<Result<Vec<_>, _>>()?;
        let own = pending
            .iter()
            .map(|p| {
                resolver.own_properties(p).context(format!("Resolving properties of {}", p.fqn))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut declarations = Vec::with_capacity(pending.len());
        for (i, p) in pending.iter().enumerate() {
            let mut properties = own[i].clone();
            for ancestor in &chains[i] {
                for inherited in &own[index[ancestor]] {
                    if properties.iter().any(|x| x.name() == inherited.name()) {
                        return Err(IntrospectError::illegal(format!(
                            "Property {} of {} redeclares an inherited property",
                            inherited.name(),
                            p.fqn
                        )));
                    }
                    properties.push(inherited.clone());
                }
            }

            let identifier = p.def.identified_by.clone().or_else(|| {
                chains[i].iter().find_map(|a| pending[index[a]].def.identified_by.clone())
            });
            check_identifier(p, identifier.as_deref(), &properties)?;

            declarations.push(Arc::new(ClassDeclaration {
                namespace: p.file.namespace.clone(),
                name: p.def.name.clone(),
                fqn: p.fqn.clone(),
                kind: p.def.kind,
                is_abstract: p.def.is_abstract,
                system: p.system,
                super_type: supers[i].clone(),
                super_types: chains[i].clone(),
                identifier_field_name: identifier,
                own_properties: own[i].clone(),
                properties,
                enum_values: p.def.values.clone(),
            }));
        }

        Ok(Self { declarations, index, namespaces })
    }
}

struct Pending<'a> {
    file: &'a ModelFile,
    def: &'a DeclarationDefinition,
    fqn: String,
    system: bool,
}

struct Resolver<'a> {
    pending: &'a [Pending<'a>],
    index: &'a FxHashMap<String, usize>,
    namespaces: &'a [String],
}

impl Resolver<'_> {
    /// Resolves a type reference written inside `file` to a declared fully qualified name.
    fn class_name(&self, file: &ModelFile, name: &str) -> Result<String, IntrospectError> {
        let fqn = if name.contains('.') {
            name.to_owned()
        } else if let Some(import) = file.imports.iter().find(|i| get_short_name(i) == name) {
            import.clone()
        } else {
            let local = fully_qualified_name(&file.namespace, name);
            let system = fully_qualified_name(SYSTEM_NAMESPACE, name);
            if !self.index.contains_key(&local) && self.index.contains_key(&system) {
                system
            } else {
                local
            }
        };

        if self.index.contains_key(&fqn) {
            return Ok(fqn);
        }
        let err = unresolved(&fqn, |ns| self.namespaces.iter().any(|n| n == ns));
        Err(IntrospectError::illegal(err.to_string()))
    }

    fn declaration(&self, fqn: &str) -> &Pending<'_> {
        &self.pending[self.index[fqn]]
    }

    fn super_type(&self, p: &Pending<'_>) -> Result<Option<String>, IntrospectError> {
        let kind = p.def.kind;
        if kind == DeclarationKind::Enum {
            if p.def.extends.is_some() {
                return Err(IntrospectError::illegal("Enumerations cannot extend other types"));
            }
            return Ok(None);
        }

        let written = match (&p.def.extends, p.system) {
            (Some(name), _) => name.as_str(),
            (None, true) => return Ok(None),
            (None, false) => match system::implicit_super_type(kind) {
                Some(name) => return Ok(Some(fully_qualified_name(SYSTEM_NAMESPACE, name))),
                None => return Ok(None),
            },
        };

        let fqn = self.class_name(p.file, written)?;
        let target = self.declaration(&fqn);
        if target.def.kind != kind {
            return Err(IntrospectError::illegal(format!(
                "{} {} cannot extend {} {}",
                kind, p.fqn, target.def.kind, fqn
            )));
        }
        Ok(Some(fqn))
    }

    fn ancestry(
        &self,
        start: usize,
        supers: &[Option<String>],
    ) -> Result<Vec<String>, IntrospectError> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(start);
        let mut current = supers[start].as_deref();
        while let Some(fqn) = current {
            let idx = self.index[fqn];
            if !seen.insert(idx) {
                return Err(IntrospectError::illegal(format!(
                    "Circular inheritance involving {}",
                    self.pending[start].fqn
                )));
            }
            chain.push(fqn.to_owned());
            current = supers[idx].as_deref();
        }
        Ok(chain)
    }

    fn own_properties(&self, p: &Pending<'_>) -> Result<Vec<Property>, IntrospectError> {
        if p.def.kind == DeclarationKind::Enum {
            if !p.def.properties.is_empty() {
                return Err(IntrospectError::illegal("Enumerations declare values, not properties"));
            }
            let mut seen = FxHashSet::default();
            if p.def.values.is_empty() || !p.def.values.iter().all(|v| seen.insert(v.as_str())) {
                return Err(IntrospectError::illegal(
                    "Enumeration values must be non-empty and unique",
                ));
            }
            return Ok(Vec::new());
        }
        if !p.def.values.is_empty() {
            return Err(IntrospectError::illegal("Only enumerations declare values"));
        }

        let mut names = FxHashSet::default();
        let mut properties = Vec::with_capacity(p.def.properties.len());
        for def in &p.def.properties {
            if def.name.is_empty() || is_system_property(&def.name) {
                let message = format!("Invalid property name '{}'", def.name);
                return Err(IntrospectError::illegal(message));
            }
            if !names.insert(def.name.as_str()) {
                return Err(IntrospectError::illegal(format!("Duplicate property {}", def.name)));
            }
            let property = if def.relationship {
                self.relationship(p, def)?
            } else {
                self.field(p, def)?
            };
            properties.push(property);
        }
        Ok(properties)
    }

    fn relationship(
        &self,
        p: &Pending<'_>,
        def: &PropertyDefinition,
    ) -> Result<Property, IntrospectError> {
        if PrimitiveType::from_str(&def.type_name).is_ok() {
            return Err(IntrospectError::illegal(format!(
                "Relationship {} must point at a class, not {}",
                def.name, def.type_name
            )));
        }
        if def.default.is_some() || def.regex.is_some() || def.range.is_some() {
            return Err(IntrospectError::illegal(format!(
                "Relationship {} cannot carry defaults or validators",
                def.name
            )));
        }
        let fqtn = self.class_name(p.file, &def.type_name)?;
        if !self.declaration(&fqtn).def.kind.is_identifiable() {
            return Err(IntrospectError::illegal(format!(
                "Relationship {} must target an identifiable type, not {fqtn}",
                def.name
            )));
        }
        Ok(Property::Relationship(RelationshipDeclaration {
            name: def.name.clone(),
            type_name: def.type_name.clone(),
            fqtn,
            array: def.array,
            optional: def.optional,
            parent: p.fqn.clone(),
        }))
    }

    fn field(
        &self,
        p: &Pending<'_>,
        def: &PropertyDefinition,
    ) -> Result<Property, IntrospectError> {
        let (fqtn, target) = match PrimitiveType::from_str(&def.type_name) {
            Ok(kind) => (def.type_name.clone(), FieldTarget::Primitive(kind)),
            Err(_) => {
                let fqtn = self.class_name(p.file, &def.type_name)?;
                let target = if self.declaration(&fqtn).def.kind == DeclarationKind::Enum {
                    FieldTarget::Enum
                } else {
                    FieldTarget::Class
                };
                (fqtn, target)
            },
        };

        let validator = match (&def.regex, def.range, target) {
            (None, None, _) => None,
            (Some(pattern), None, FieldTarget::Primitive(PrimitiveType::String)) => {
                let regex = Regex::new(pattern).map_err(|e| {
                    IntrospectError::illegal(format!("Invalid regex for field {}: {e}", def.name))
                })?;
                Some(FieldValidator::Pattern(regex))
            },
            (None, Some((lower, upper)), FieldTarget::Primitive(kind)) if kind.is_numeric() => {
                Some(FieldValidator::Range { lower, upper })
            },
            _ => {
                return Err(IntrospectError::illegal(format!(
                    "Field {} of type {} cannot carry this validator",
                    def.name, def.type_name
                )));
            },
        };

        if let Some(literal) = &def.default {
            let valid = match target {
                FieldTarget::Primitive(kind) => kind.accepts_literal(literal),
                FieldTarget::Enum => self.declaration(&fqtn).def.values.contains(literal),
                FieldTarget::Class => false,
            };
            if !valid {
                return Err(IntrospectError::illegal(format!(
                    "Default value '{literal}' is not valid for field {} of type {}",
                    def.name, def.type_name
                )));
            }
        }

        Ok(Property::Field(Field {
            name: def.name.clone(),
            type_name: def.type_name.clone(),
            fqtn,
            array: def.array,
            optional: def.optional,
            default_value: def.default.clone(),
            validator,
            target,
            parent: p.fqn.clone(),
        }))
    }
}

fn check_identifier(
    p: &Pending<'_>,
    identifier: Option<&str>,
    properties: &[Property],
) -> Result<(), IntrospectError> {
    let kind = p.def.kind;
    match identifier {
        Some(_) if !kind.is_identifiable() => Err(IntrospectError::illegal(format!(
            "{kind} {} cannot declare an identifying field",
            p.fqn
        ))),
        Some(name) => {
            let valid = properties.iter().any(|prop| {
                prop.name() == name
                    && !prop.is_array()
                    && prop.as_field().and_then(Field::primitive_type)
                        == Some(PrimitiveType::String)
            });
            if valid {
                Ok(())
            } else {
                Err(IntrospectError::illegal(format!(
                    "Identifying field {name} of {} must be a declared String field",
                    p.fqn
                )))
            }
        },
        None if kind.is_identifiable() && !p.def.is_abstract => Err(IntrospectError::illegal(
            format!("Class {} is not abstract but has no identifying field", p.fqn),
        )),
        None => Ok(()),
    }
}

fn unresolved(fqn: &str, is_registered: impl Fn(&str) -> bool) -> IntrospectError {
    let namespace = get_namespace(fqn);
    if namespace.is_empty() || !is_registered(namespace) {
        IntrospectError::NamespaceNotRegistered {
            message: format!("Namespace is not defined for type {fqn}").into(),
            context: None,
        }
    } else {
        IntrospectError::TypeNotDeclared {
            message: format!("Type {} is not defined in namespace {namespace}", get_short_name(fqn))
                .into(),
            context: None,
        }
    }
}
