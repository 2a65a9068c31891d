use crate::{
    instance::{InstanceBehavior, ModelRule},
    model::definition::DefinitionBehavior,
};
use indexmap::IndexMap;
use std::{fmt, sync::Arc};

///
/// DefinitionOptions
///
/// Configuration carried by every entity definition. Named behavior
/// extensions are explicit capabilities: instance behaviors install on
/// every built instance through the [`InstanceBehavior`] extension
/// point, definition behaviors attach to the definition itself, and
/// model-wide rules bind into every instance's validation pass. Nothing
/// is ever attached ad hoc.
///

#[derive(Clone)]
pub struct DefinitionOptions {
    timestamps: bool,
    underscored: bool,
    paranoid: bool,
    freeze_table_name: bool,
    behaviors: IndexMap<String, Arc<dyn InstanceBehavior>>,
    definition_behaviors: IndexMap<String, Arc<dyn DefinitionBehavior>>,
    validate: IndexMap<String, ModelRule>,
}

impl Default for DefinitionOptions {
    fn default() -> Self {
        Self {
            timestamps: true,
            underscored: false,
            paranoid: false,
            freeze_table_name: false,
            behaviors: IndexMap::new(),
            definition_behaviors: IndexMap::new(),
            validate: IndexMap::new(),
        }
    }
}

impl DefinitionOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn timestamps(mut self, on: bool) -> Self {
        self.timestamps = on;
        self
    }

    #[must_use]
    pub const fn underscored(mut self, on: bool) -> Self {
        self.underscored = on;
        self
    }

    /// Soft-delete mode: deletion is a `deletedAt` timestamp, not row removal.
    #[must_use]
    pub const fn paranoid(mut self, on: bool) -> Self {
        self.paranoid = on;
        self
    }

    /// Use the entity name verbatim as the table name (no pluralization).
    #[must_use]
    pub const fn freeze_table_name(mut self, on: bool) -> Self {
        self.freeze_table_name = on;
        self
    }

    /// Register a named behavior installed on every built instance.
    #[must_use]
    pub fn behavior(mut self, name: impl Into<String>, behavior: Arc<dyn InstanceBehavior>) -> Self {
        self.behaviors.insert(name.into(), behavior);
        self
    }

    /// Register a named behavior attached to the definition itself.
    #[must_use]
    pub fn definition_behavior(
        mut self,
        name: impl Into<String>,
        behavior: Arc<dyn DefinitionBehavior>,
    ) -> Self {
        self.definition_behaviors.insert(name.into(), behavior);
        self
    }

    /// Register a model-wide validation rule, keyed by its name.
    #[must_use]
    pub fn validate_rule(mut self, rule: ModelRule) -> Self {
        self.validate.insert(rule.name().to_string(), rule);
        self
    }

    #[must_use]
    pub const fn has_timestamps(&self) -> bool {
        self.timestamps
    }

    #[must_use]
    pub const fn is_underscored(&self) -> bool {
        self.underscored
    }

    #[must_use]
    pub const fn is_paranoid(&self) -> bool {
        self.paranoid
    }

    #[must_use]
    pub const fn is_table_name_frozen(&self) -> bool {
        self.freeze_table_name
    }

    #[must_use]
    pub const fn behaviors(&self) -> &IndexMap<String, Arc<dyn InstanceBehavior>> {
        &self.behaviors
    }

    #[must_use]
    pub const fn definition_behaviors(&self) -> &IndexMap<String, Arc<dyn DefinitionBehavior>> {
        &self.definition_behaviors
    }

    #[must_use]
    pub const fn validate(&self) -> &IndexMap<String, ModelRule> {
        &self.validate
    }
}

impl fmt::Debug for DefinitionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionOptions")
            .field("timestamps", &self.timestamps)
            .field("underscored", &self.underscored)
            .field("paranoid", &self.paranoid)
            .field("freeze_table_name", &self.freeze_table_name)
            .field("behaviors", &self.behaviors.keys().collect::<Vec<_>>())
            .field(
                "definition_behaviors",
                &self.definition_behaviors.keys().collect::<Vec<_>>(),
            )
            .field("validate", &self.validate.keys().collect::<Vec<_>>())
            .finish()
    }
}
