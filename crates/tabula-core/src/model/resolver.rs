//! One-shot attribute resolution at definition time.
//!
//! Runs exactly once inside [`ModelRegistry::define`]: default-attribute
//! injection, autoincrement detection, and the shared primary-key
//! derivation. After that pass the attribute set is frozen.
//!
//! [`ModelRegistry::define`]: crate::db::registry::ModelRegistry::define

use crate::{
    db::dialect::SqlDialect,
    model::{
        attribute::{Attribute, AttributeType},
        options::DefinitionOptions,
    },
    naming,
};
use indexmap::IndexMap;
use thiserror::Error as ThisError;

///
/// DefinitionError
///
/// Misuse of the definition surface: fatal configuration errors raised
/// while a definition initializes (these abort `define`), and unknown
/// names on the definition-level behavior surface.
///

#[derive(Debug, ThisError)]
pub enum DefinitionError {
    #[error("invalid definition '{name}': only one autoincrement field allowed, found {fields:?}")]
    MultipleAutoIncrementFields { name: String, fields: Vec<String> },

    #[error("unknown definition behavior '{name}' on '{definition}'")]
    UnknownBehavior { definition: String, name: String },
}

/// Inject the surrogate key and timestamp columns into a raw attribute map.
///
/// The surrogate `id` is injected only when the derived primary-key set is
/// empty. That derivation excludes any attribute literally named `"id"`
/// (see [`derive_primary_keys`]), so a definition whose only primary key
/// is called `id` still receives the surrogate descriptor.
pub(crate) fn inject_default_attributes(
    attributes: &mut IndexMap<String, Attribute>,
    options: &DefinitionOptions,
    dialect: &dyn SqlDialect,
) {
    if derive_primary_keys(attributes, dialect).is_empty() {
        attributes.insert(
            "id".to_string(),
            Attribute::new(AttributeType::Integer)
                .allow_null(false)
                .primary_key()
                .auto_increment(),
        );
    }

    if options.has_timestamps() {
        let underscored = options.is_underscored();
        // No default rule on the injected columns: a built record exposes
        // them as null until persistence stamps them.
        attributes.insert(
            naming::underscored_if("createdAt", underscored),
            Attribute::new(AttributeType::Date).allow_null(false),
        );
        attributes.insert(
            naming::underscored_if("updatedAt", underscored),
            Attribute::new(AttributeType::Date).allow_null(false),
        );

        if options.is_paranoid() {
            attributes.insert(
                naming::underscored_if("deletedAt", underscored),
                Attribute::new(AttributeType::Date),
            );
        }
    }
}

/// Ask the dialect for autoincrement-flagged attributes; at most one may exist.
pub(crate) fn find_auto_increment_field(
    name: &str,
    attributes: &IndexMap<String, Attribute>,
    dialect: &dyn SqlDialect,
) -> Result<Option<String>, DefinitionError> {
    let mut fields = dialect.auto_increment_fields(attributes);

    if fields.len() > 1 {
        return Err(DefinitionError::MultipleAutoIncrementFields {
            name: name.to_string(),
            fields,
        });
    }

    Ok(fields.pop())
}

/// Derive the primary-key view from the dialect's SQL descriptor strings.
///
/// Recomputed on every access, never cached. An attribute qualifies when
/// its descriptor marks it PRIMARY KEY and its name is not `"id"`; the
/// `id` exclusion is long-standing engine behavior that multi-argument
/// `find` relies on, and it is preserved deliberately.
pub(crate) fn derive_primary_keys(
    attributes: &IndexMap<String, Attribute>,
    dialect: &dyn SqlDialect,
) -> IndexMap<String, String> {
    dialect
        .attributes_to_sql(attributes)
        .into_iter()
        .filter(|(name, sql)| name != "id" && sql.contains("PRIMARY KEY"))
        .collect()
}
