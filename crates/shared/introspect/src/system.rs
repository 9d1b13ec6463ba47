//! The built-in system namespace every registry starts with.

use crate::declaration::DeclarationKind;
use crate::definition::{DeclarationDefinition, ModelFile, PropertyDefinition};

pub const SYSTEM_NAMESPACE: &str = "mgraph.system";

/// Identifying field of system transactions.
pub const TRANSACTION_ID_FIELD: &str = "transactionId";
/// Identifying field of system events.
pub const EVENT_ID_FIELD: &str = "eventId";
/// Creation time stamped onto transactions and events.
pub const TIMESTAMP_FIELD: &str = "timestamp";

pub(crate) fn system_model() -> ModelFile {
    ModelFile::new(SYSTEM_NAMESPACE)
        .declare(DeclarationDefinition::asset("Asset").abstract_type())
        .declare(DeclarationDefinition::participant("Participant").abstract_type())
        .declare(
            DeclarationDefinition::transaction("Transaction")
                .abstract_type()
                .identified_by(TRANSACTION_ID_FIELD)
                .property(PropertyDefinition::field(TRANSACTION_ID_FIELD, "String"))
                .property(PropertyDefinition::field(TIMESTAMP_FIELD, "DateTime")),
        )
        .declare(
            DeclarationDefinition::event("Event")
                .abstract_type()
                .identified_by(EVENT_ID_FIELD)
                .property(PropertyDefinition::field(EVENT_ID_FIELD, "String"))
                .property(PropertyDefinition::field(TIMESTAMP_FIELD, "DateTime")),
        )
}

/// Short name of the system type a declaration of `kind` extends when it names none.
pub(crate) const fn implicit_super_type(kind: DeclarationKind) -> Option<&'static str> {
    match kind {
        DeclarationKind::Asset => Some("Asset"),
        DeclarationKind::Participant => Some("Participant"),
        DeclarationKind::Transaction => Some("Transaction"),
        DeclarationKind::Event => Some("Event"),
        DeclarationKind::Concept | DeclarationKind::Enum => None,
    }
}
