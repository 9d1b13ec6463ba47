use crate::model::Typed;
use crate::model::relationship::format_uri;

/// Instances addressed by namespace, type and identifier.
pub trait Identifiable {
    fn typed(&self) -> &Typed;

    fn identifier(&self) -> &str;

    fn fully_qualified_type(&self) -> &str {
        self.typed().fully_qualified_type()
    }

    /// `ns.Type#id`.
    fn fully_qualified_identifier(&self) -> String {
        format!("{}#{}", self.fully_qualified_type(), self.identifier())
    }

    /// `resource:ns.Type#<percent-encoded id>`.
    fn to_uri(&self) -> String {
        format_uri(self.fully_qualified_type(), self.identifier())
    }
}
