use crate::model::attribute::Attribute;
use indexmap::IndexMap;

///
/// SqlDialect
///
/// Schema-descriptor generator seam. The engine never renders SQL itself;
/// it consumes per-attribute descriptor strings (and the autoincrement
/// scan) from whichever dialect the owning process wires in.
///
/// Primary-key derivation reads the descriptor strings, so a dialect must
/// mark key columns with the literal `PRIMARY KEY`.
///

pub trait SqlDialect: Send + Sync {
    /// Render one attribute descriptor into its SQL type/constraint string.
    fn attribute_to_sql(&self, attribute: &Attribute) -> String;

    /// Render the whole attribute map, preserving declaration order.
    fn attributes_to_sql(
        &self,
        attributes: &IndexMap<String, Attribute>,
    ) -> IndexMap<String, String> {
        attributes
            .iter()
            .map(|(name, attribute)| (name.clone(), self.attribute_to_sql(attribute)))
            .collect()
    }

    /// Names of attributes the dialect treats as autoincrement columns.
    fn auto_increment_fields(&self, attributes: &IndexMap<String, Attribute>) -> Vec<String> {
        attributes
            .iter()
            .filter(|(_, attribute)| attribute.is_auto_increment())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Quote an identifier for use inside a projection expression.
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{ident}`")
    }
}
