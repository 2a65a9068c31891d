use crate::{
    db::{dialect::SqlDialect, driver::StorageDriver},
    error::Error,
    model::{
        attribute::Attribute, definition::EntityDefinition, options::DefinitionOptions, resolver,
    },
    naming,
};
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("definition '{0}' not found")]
    DefinitionNotFound(String),

    #[error("definition '{0}' already registered")]
    AlreadyDefined(String),
}

///
/// ModelRegistry
///
/// Owns every entity definition plus the shared dialect and driver
/// collaborators. `define` is the only construction path for a
/// definition and runs the one-shot attribute resolution before the
/// definition becomes visible to lookups.
///

pub struct ModelRegistry {
    dialect: Arc<dyn SqlDialect>,
    driver: Arc<dyn StorageDriver>,
    definitions: RwLock<IndexMap<String, Arc<EntityDefinition>>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new(dialect: Arc<dyn SqlDialect>, driver: Arc<dyn StorageDriver>) -> Arc<Self> {
        Arc::new(Self {
            dialect,
            driver,
            definitions: RwLock::new(IndexMap::new()),
        })
    }

    /// Define an entity: inject default attributes, detect the
    /// autoincrement field, freeze the schema, and register the result.
    ///
    /// Configuration errors abort before anything is registered.
    pub fn define(
        self: &Arc<Self>,
        name: &str,
        attributes: IndexMap<String, Attribute>,
        options: DefinitionOptions,
    ) -> Result<Arc<EntityDefinition>, Error> {
        let mut definitions = self
            .definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if definitions.contains_key(name) {
            return Err(RegistryError::AlreadyDefined(name.to_string()).into());
        }

        let mut attributes = attributes;
        resolver::inject_default_attributes(&mut attributes, &options, self.dialect.as_ref());
        let auto_increment_field =
            resolver::find_auto_increment_field(name, &attributes, self.dialect.as_ref())?;

        let table_name = if options.is_table_name_frozen() {
            name.to_string()
        } else {
            naming::pluralize(name)
        };

        let definition = EntityDefinition::new(
            name.to_string(),
            table_name,
            attributes,
            options,
            auto_increment_field,
            Arc::clone(&self.dialect),
            Arc::clone(&self.driver),
            Arc::downgrade(self),
        );

        definitions.insert(name.to_string(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Look up a definition by entity name.
    pub fn try_get(&self, name: &str) -> Result<Arc<EntityDefinition>, RegistryError> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::DefinitionNotFound(name.to_string()))
    }

    /// Registered entity names, in definition order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::attribute::AttributeType,
        test_support::{attribute_map, registry},
    };

    #[test]
    fn define_registers_and_try_get_resolves() {
        let (registry, _driver) = registry();
        registry
            .define(
                "User",
                attribute_map([("name", Attribute::new(AttributeType::Text))]),
                DefinitionOptions::new(),
            )
            .expect("definition should register");

        let definition = registry.try_get("User").expect("lookup should resolve");
        assert_eq!(definition.name(), "User");
        assert_eq!(definition.table_name(), "Users");
        assert_eq!(registry.names(), vec!["User".to_string()]);
    }

    #[test]
    fn duplicate_definition_names_are_rejected() {
        let (registry, _driver) = registry();
        registry
            .define("User", IndexMap::new(), DefinitionOptions::new())
            .expect("first definition should register");

        let err = registry
            .define("User", IndexMap::new(), DefinitionOptions::new())
            .expect_err("duplicate should fail");
        assert!(matches!(
            err,
            Error::Registry(RegistryError::AlreadyDefined(name)) if name == "User"
        ));
    }

    #[test]
    fn missing_definitions_fail_lookup() {
        let (registry, _driver) = registry();
        let err = registry.try_get("Ghost").expect_err("lookup should fail");
        assert!(matches!(err, RegistryError::DefinitionNotFound(name) if name == "Ghost"));
    }

    #[test]
    fn frozen_table_names_skip_pluralization() {
        let (registry, _driver) = registry();
        let definition = registry
            .define(
                "person",
                IndexMap::new(),
                DefinitionOptions::new().freeze_table_name(true),
            )
            .expect("definition should register");

        assert_eq!(definition.table_name(), "person");
    }

    #[test]
    fn duplicate_autoincrement_aborts_define_and_registers_nothing() {
        let (registry, _driver) = registry();
        let err = registry
            .define(
                "Broken",
                attribute_map([
                    ("a", Attribute::new(AttributeType::Integer).auto_increment()),
                    ("b", Attribute::new(AttributeType::Integer).auto_increment()),
                ]),
                DefinitionOptions::new(),
            )
            .expect_err("duplicate autoincrement should abort define");

        assert!(matches!(err, Error::Definition(_)));
        assert!(registry.try_get("Broken").is_err());
    }
}
