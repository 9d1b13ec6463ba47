use mgraph_introspect::{ClassDeclaration, ModelManager};
use std::fmt;
use std::sync::Arc;

/// Schema binding shared by every instance: the registry and the resolved declaration.
#[derive(Clone)]
pub struct Typed {
    model_manager: ModelManager,
    declaration: Arc<ClassDeclaration>,
}

impl Typed {
    pub(crate) const fn new(
        model_manager: ModelManager,
        declaration: Arc<ClassDeclaration>,
    ) -> Self {
        Self { model_manager, declaration }
    }

    #[must_use]
    pub const fn model_manager(&self) -> &ModelManager {
        &self.model_manager
    }

    #[must_use]
    pub fn class_declaration(&self) -> &Arc<ClassDeclaration> {
        &self.declaration
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        self.declaration.namespace()
    }

    /// The short type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.declaration.name()
    }

    #[must_use]
    pub fn fully_qualified_type(&self) -> &str {
        self.declaration.fully_qualified_name()
    }

    /// Whether this instance's type is `fqn` or inherits from it.
    #[must_use]
    pub fn instance_of(&self, fqn: &str) -> bool {
        self.declaration.is_assignable_to(fqn)
    }
}

impl fmt::Debug for Typed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Typed").field(&self.fully_qualified_type()).finish()
    }
}
