use crate::declaration::ClassDeclaration;
use crate::definition::ModelFile;
use crate::error::{IntrospectError, IntrospectErrorExt};
use crate::schema::Schema;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct Registry {
    files: Vec<ModelFile>,
    schema: Arc<Schema>,
}

/// The schema registry shared by factories, serializers and instances.
///
/// Cloning is cheap and every clone sees the same registry. Each mutation resolves the
/// complete candidate set of model files first and only then swaps the new snapshot in,
/// so a rejected file leaves the registry untouched and readers never observe a partial
/// update.
///
/// # Example
/// ```rust
/// use mgraph_introspect::{DeclarationDefinition, ModelFile, ModelManager, PropertyDefinition};
///
/// # fn main() -> Result<(), mgraph_introspect::IntrospectError> {
/// let manager = ModelManager::new()?;
/// manager.add_model_file(
///     ModelFile::new("org.acme").declare(
///         DeclarationDefinition::asset("Vehicle")
///             .identified_by("vin")
///             .property(PropertyDefinition::field("vin", "String")),
///     ),
/// )?;
///
/// let vehicle = manager.get_type("org.acme.Vehicle")?;
/// assert_eq!(vehicle.identifier_field_name(), Some("vin"));
/// assert_eq!(vehicle.super_type(), Some("mgraph.system.Asset"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ModelManager {
    inner: Arc<RwLock<Registry>>,
}

impl ModelManager {
    /// Creates a registry holding only the system namespace.
    ///
    /// # Errors
    /// Returns [`IntrospectError::IllegalModel`] if the system namespace fails to resolve.
    pub fn new() -> Result<Self, IntrospectError> {
        let schema = Schema::resolve(&[]).context("Resolving the system namespace")?;
        Ok(Self {
            inner: Arc::new(RwLock::new(Registry { files: Vec::new(), schema: Arc::new(schema) })),
        })
    }

    /// Creates a registry from a batch of model files.
    ///
    /// # Errors
    /// See [`ModelManager::add_model_files`].
    pub fn from_files(files: impl IntoIterator<Item = ModelFile>) -> Result<Self, IntrospectError> {
        let manager = Self::new()?;
        manager.add_model_files(files)?;
        Ok(manager)
    }

    /// Registers a single model file.
    ///
    /// # Errors
    /// See [`ModelManager::add_model_files`].
    pub fn add_model_file(&self, file: ModelFile) -> Result<(), IntrospectError> {
        self.add_model_files(std::iter::once(file))
    }

    /// Registers several model files at once; they may reference each other.
    ///
    /// # Errors
    /// Returns [`IntrospectError::IllegalModel`] when a namespace is already registered or
    /// any declaration fails to resolve. Nothing is registered in that case.
    pub fn add_model_files(
        &self,
        files: impl IntoIterator<Item = ModelFile>,
    ) -> Result<(), IntrospectError> {
        let mut registry = self.inner.write();
        let mut candidate = registry.files.clone();
        candidate.extend(files);
        let schema = Schema::resolve(&candidate)?;
        debug!("Registered model files, {} namespace(s) now known", schema.namespaces().len());
        registry.files = candidate;
        registry.schema = Arc::new(schema);
        Ok(())
    }

    /// Replaces the registered model file with the same namespace.
    ///
    /// # Errors
    /// Returns [`IntrospectError::IllegalModel`] if no file with that namespace is
    /// registered or the updated set fails to resolve.
    pub fn update_model_file(&self, file: ModelFile) -> Result<(), IntrospectError> {
        let mut registry = self.inner.write();
        let Some(pos) = registry.files.iter().position(|f| f.namespace == file.namespace) else {
            return Err(IntrospectError::illegal(format!(
                "Model file for namespace {} is not registered",
                file.namespace
            )));
        };
        let mut candidate = registry.files.clone();
        candidate[pos] = file;
        let schema = Schema::resolve(&candidate)?;
        registry.files = candidate;
        registry.schema = Arc::new(schema);
        Ok(())
    }

    /// Removes the model file for `namespace`.
    ///
    /// # Errors
    /// Returns [`IntrospectError::NamespaceNotRegistered`] for an unknown namespace and
    /// [`IntrospectError::IllegalModel`] if other files still depend on it.
    pub fn delete_model_file(&self, namespace: &str) -> Result<(), IntrospectError> {
        let mut registry = self.inner.write();
        let Some(pos) = registry.files.iter().position(|f| f.namespace == namespace) else {
            return Err(IntrospectError::NamespaceNotRegistered {
                message: format!("Namespace {namespace} is not registered").into(),
                context: None,
            });
        };
        let mut candidate = registry.files.clone();
        candidate.remove(pos);
        let schema = Schema::resolve(&candidate)?;
        registry.files = candidate;
        registry.schema = Arc::new(schema);
        Ok(())
    }

    /// Drops every user model file, keeping the system namespace.
    ///
    /// # Errors
    /// Only fails if the system namespace itself cannot be resolved.
    pub fn clear_model_files(&self) -> Result<(), IntrospectError> {
        let schema = Schema::resolve(&[])?;
        let mut registry = self.inner.write();
        registry.files.clear();
        registry.schema = Arc::new(schema);
        Ok(())
    }

    /// The registered user model files, in registration order.
    #[must_use]
    pub fn model_files(&self) -> Vec<ModelFile> {
        self.inner.read().files.clone()
    }

    /// Every known namespace, the system namespace first.
    #[must_use]
    pub fn namespaces(&self) -> Vec<String> {
        self.schema().namespaces().to_vec()
    }

    /// Resolves a fully qualified type name.
    ///
    /// # Errors
    /// Returns [`IntrospectError::NamespaceNotRegistered`] when the namespace is unknown
    /// and [`IntrospectError::TypeNotDeclared`] when the namespace lacks the type.
    pub fn get_type(&self, fqn: &str) -> Result<Arc<ClassDeclaration>, IntrospectError> {
        self.schema().get(fqn)
    }

    /// Every declaration in declaration order (system types first).
    #[must_use]
    pub fn class_declarations(&self) -> Vec<Arc<ClassDeclaration>> {
        self.schema().declarations().to_vec()
    }

    /// Non-abstract, non-system declarations whose direct supertype is `fqn`.
    #[must_use]
    pub fn direct_concrete_subtypes(&self, fqn: &str) -> Vec<Arc<ClassDeclaration>> {
        self.filter(|d| d.super_type() == Some(fqn) && !d.is_abstract() && !d.is_system_type())
    }

    /// Non-abstract, non-system declarations that inherit from `fqn` at any depth.
    #[must_use]
    pub fn concrete_descendants(&self, fqn: &str) -> Vec<Arc<ClassDeclaration>> {
        self.filter(|d| {
            d.super_types().iter().any(|s| s == fqn) && !d.is_abstract() && !d.is_system_type()
        })
    }

    /// `fqn` itself followed by every declaration assignable to it.
    #[must_use]
    pub fn assignable_declarations(&self, fqn: &str) -> Vec<Arc<ClassDeclaration>> {
        let schema = self.schema();
        let mut out: Vec<_> = schema.get(fqn).into_iter().collect();
        let descendants =
            schema.declarations().iter().filter(|d| d.super_types().iter().any(|s| s == fqn));
        out.extend(descendants.cloned());
        out
    }

    /// The supertype declarations of `declaration`, nearest first.
    ///
    /// # Errors
    /// Fails only if the registry changed and a supertype disappeared.
    pub fn super_type_declarations(
        &self,
        declaration: &ClassDeclaration,
    ) -> Result<Vec<Arc<ClassDeclaration>>, IntrospectError> {
        let schema = self.schema();
        declaration.super_types().iter().map(|fqn| schema.get(fqn)).collect()
    }

    fn filter(&self, keep: impl Fn(&ClassDeclaration) -> bool) -> Vec<Arc<ClassDeclaration>> {
        self.schema().declarations().iter().filter(|d| keep(d)).cloned().collect()
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.inner.read().schema)
    }
}
