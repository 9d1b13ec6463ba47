use crate::declaration::ClassDeclaration;
use crate::property::{Field, RelationshipDeclaration};

/// Double-dispatch target for walking declarations.
///
/// `P` is the per-traversal parameter bag; every traversal owns its own, so a visitor
/// itself is usually stateless and shareable. Dispatch happens in
/// [`ClassDeclaration::accept`] and [`crate::Property::accept`].
pub trait Visitor<P> {
    type Output;
    type Error;

    /// Called for every non-enum declaration.
    ///
    /// # Errors
    /// Implementation defined.
    fn visit_class_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut P,
    ) -> Result<Self::Output, Self::Error>;

    /// # Errors
    /// Implementation defined.
    fn visit_enum_declaration(
        &self,
        declaration: &ClassDeclaration,
        params: &mut P,
    ) -> Result<Self::Output, Self::Error>;

    /// # Errors
    /// Implementation defined.
    fn visit_field(&self, field: &Field, params: &mut P) -> Result<Self::Output, Self::Error>;

    /// # Errors
    /// Implementation defined.
    fn visit_relationship_declaration(
        &self,
        relationship: &RelationshipDeclaration,
        params: &mut P,
    ) -> Result<Self::Output, Self::Error>;
}
