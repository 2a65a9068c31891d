use crate::{
    db::{
        dialect::SqlDialect,
        driver::StorageDriver,
        query::{FindTarget, FinderOptions, QueryError, aggregate, aggregate::Aggregate, finder},
        registry::ModelRegistry,
        relation::Association,
        response::Completion,
        sync::{self, SyncOptions},
    },
    instance::{BuildOptions, Instance, build},
    model::{
        attribute::Attribute,
        options::DefinitionOptions,
        resolver::{self, DefinitionError},
    },
    value::Value,
};
use indexmap::IndexMap;
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock, Weak},
};

///
/// DefinitionBehavior
///
/// Named capability attached to the definition itself rather than to
/// built instances; the definition-level sibling of
/// [`crate::instance::InstanceBehavior`].
///

pub trait DefinitionBehavior: Send + Sync {
    fn invoke(&self, definition: &EntityDefinition, args: &[Value]) -> Value;
}

///
/// EntityDefinition
///
/// Finalized, immutable-after-init schema descriptor for one relational
/// table, plus the operation surface built on it. Constructed only by
/// [`ModelRegistry::define`], which runs the one-shot attribute
/// resolution first; every later query or build call reads the frozen
/// attribute set.
///
/// Associations are the one late-bound piece: the relationship algebra
/// attaches its descriptors after definition, so that map sits behind a
/// lock. Everything else is read-only.
///

pub struct EntityDefinition {
    name: String,
    table_name: String,
    attributes: IndexMap<String, Attribute>,
    options: DefinitionOptions,
    auto_increment_field: Option<String>,
    dialect: Arc<dyn SqlDialect>,
    driver: Arc<dyn StorageDriver>,
    registry: Weak<ModelRegistry>,
    associations: RwLock<IndexMap<String, Arc<dyn Association>>>,
    this: Weak<Self>,
}

impl EntityDefinition {
    #[expect(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        table_name: String,
        attributes: IndexMap<String, Attribute>,
        options: DefinitionOptions,
        auto_increment_field: Option<String>,
        dialect: Arc<dyn SqlDialect>,
        driver: Arc<dyn StorageDriver>,
        registry: Weak<ModelRegistry>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            name,
            table_name,
            attributes,
            options,
            auto_increment_field,
            dialect,
            driver,
            registry,
            associations: RwLock::new(IndexMap::new()),
            this: this.clone(),
        })
    }

    // Construction goes through `Arc::new_cyclic`, so the self-reference
    // always upgrades once `new` has returned.
    fn shared(&self) -> Arc<Self> {
        self.this
            .upgrade()
            .expect("EntityDefinition is always Arc-backed")
    }

    pub(crate) fn this_weak(&self) -> Weak<Self> {
        self.this.clone()
    }

    //
    // Derived views
    //

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The frozen attribute set, in declared order.
    #[must_use]
    pub const fn attributes(&self) -> &IndexMap<String, Attribute> {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    #[must_use]
    pub const fn options(&self) -> &DefinitionOptions {
        &self.options
    }

    #[must_use]
    pub fn auto_increment_field(&self) -> Option<&str> {
        self.auto_increment_field.as_deref()
    }

    /// Attribute map rendered into SQL descriptor strings by the dialect.
    #[must_use]
    pub fn attributes_sql(&self) -> IndexMap<String, String> {
        self.dialect.attributes_to_sql(&self.attributes)
    }

    /// Primary-key view, recomputed from the SQL descriptor strings on
    /// every access. Attributes named `"id"` never appear here even when
    /// marked primary key; multi-argument [`find`](Self::find) binding
    /// depends on that exclusion.
    #[must_use]
    pub fn primary_keys(&self) -> IndexMap<String, String> {
        resolver::derive_primary_keys(&self.attributes, self.dialect.as_ref())
    }

    #[must_use]
    pub fn primary_key_count(&self) -> usize {
        self.primary_keys().len()
    }

    #[must_use]
    pub fn has_primary_keys(&self) -> bool {
        self.primary_key_count() > 0
    }

    //
    // Collaborator access
    //

    pub(crate) fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub(crate) fn driver(&self) -> &dyn StorageDriver {
        self.driver.as_ref()
    }

    pub(crate) fn registry(&self) -> Option<Arc<ModelRegistry>> {
        self.registry.upgrade()
    }

    //
    // Definition-level behaviors
    //

    #[must_use]
    pub fn behavior(&self, name: &str) -> Option<&Arc<dyn DefinitionBehavior>> {
        self.options.definition_behaviors().get(name)
    }

    /// Invoke a named definition-level behavior.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, DefinitionError> {
        let behavior =
            self.behavior(name)
                .ok_or_else(|| DefinitionError::UnknownBehavior {
                    definition: self.name.clone(),
                    name: name.to_string(),
                })?;

        Ok(behavior.invoke(self, args))
    }

    //
    // Associations
    //

    /// Register an association descriptor under its name.
    pub fn associate(&self, name: impl Into<String>, association: Arc<dyn Association>) {
        self.associations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), association);
    }

    /// Snapshot of the registered associations, in registration order.
    #[must_use]
    pub fn associations(&self) -> Vec<(String, Arc<dyn Association>)> {
        self.associations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, association)| (name.clone(), Arc::clone(association)))
            .collect()
    }

    //
    // Instance materialization
    //

    /// Materialize values into a live instance: boolean coercion,
    /// defaulting, validator binding, behavior installation, association
    /// hook injection. Purely synchronous.
    #[must_use]
    pub fn build(&self, values: IndexMap<String, Value>, options: BuildOptions) -> Instance {
        build::materialize(self, values, options)
    }

    /// Build then persist, forwarding `fields` as a column-restriction
    /// hint to the instance's persist operation.
    pub fn create(
        &self,
        values: IndexMap<String, Value>,
        fields: Option<Vec<String>>,
    ) -> Completion<Instance> {
        self.build(values, BuildOptions::default()).save(fields)
    }

    //
    // Finders
    //

    /// Single-record fetch; see [`FindTarget`] for the accepted targets.
    /// `None` resolves to a `None` row, asynchronously like every other
    /// path.
    pub fn find(
        &self,
        target: Option<FindTarget>,
    ) -> Result<Completion<Option<Instance>>, QueryError> {
        finder::find(&self.shared(), target)
    }

    /// Multi-record fetch.
    pub fn find_all(
        &self,
        options: Option<FinderOptions>,
    ) -> Result<Completion<Vec<Instance>>, QueryError> {
        finder::find_all(&self.shared(), options)
    }

    /// Alias for [`find_all`](Self::find_all), forwarding the options.
    pub fn all(
        &self,
        options: Option<FinderOptions>,
    ) -> Result<Completion<Vec<Instance>>, QueryError> {
        self.find_all(options)
    }

    /// Fetch through a join table; the caller supplies the where clause.
    pub fn find_all_join(
        &self,
        join_table: &str,
        options: FinderOptions,
    ) -> Completion<Vec<Instance>> {
        finder::find_all_join(&self.shared(), join_table, options)
    }

    //
    // Aggregates
    //

    pub fn count(&self, options: Option<FinderOptions>) -> Completion<i64> {
        aggregate::aggregate(&self.shared(), Aggregate::Count, "*", options)
    }

    pub fn max(&self, field: &str, options: Option<FinderOptions>) -> Completion<i64> {
        aggregate::aggregate(&self.shared(), Aggregate::Max, field, options)
    }

    pub fn min(&self, field: &str, options: Option<FinderOptions>) -> Completion<i64> {
        aggregate::aggregate(&self.shared(), Aggregate::Min, field, options)
    }

    //
    // Schema sync
    //

    /// Provision the table, dropping first when forced.
    pub fn sync(&self, options: SyncOptions) -> Completion<()> {
        sync::sync(&self.shared(), options)
    }

    /// Drop the table. Named to stay callable through the `Arc` every
    /// caller holds; a method named `drop` would resolve to `Arc`'s own.
    pub fn drop_table(&self) -> Completion<()> {
        sync::drop_table(&self.shared())
    }
}

impl fmt::Debug for EntityDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDefinition")
            .field("name", &self.name)
            .field("table_name", &self.table_name)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
