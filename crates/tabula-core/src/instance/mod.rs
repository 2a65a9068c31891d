//! Live records: materialized instances and their builder.

pub mod build;

pub use build::BuildOptions;

use crate::{
    db::response::Completion,
    model::{attribute::Validator, definition::EntityDefinition},
    value::Value,
};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::{
    fmt,
    sync::{Arc, Weak},
};
use thiserror::Error as ThisError;

///
/// InstanceError
///

#[derive(Debug, ThisError)]
pub enum InstanceError {
    #[error("unknown instance behavior '{0}'")]
    UnknownBehavior(String),

    #[error("instance is detached from its entity definition")]
    Detached,
}

///
/// InstanceBehavior
///
/// The one stable extension point for named per-instance capabilities.
/// Definition options carry a name→behavior mapping; the builder installs
/// each entry on every instance it materializes.
///

pub trait InstanceBehavior: Send + Sync {
    fn invoke(&self, instance: &Instance, args: &[Value]) -> Value;
}

///
/// ModelRule
///
/// One named model-wide validation rule, run against the whole instance
/// rather than a single attribute. Bound to every built instance from
/// the definition options.
///

#[derive(Clone)]
pub struct ModelRule {
    name: String,
    check: Arc<dyn Fn(&Instance) -> Result<(), String> + Send + Sync>,
}

impl ModelRule {
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Instance) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the rule against an instance.
    pub fn check(&self, instance: &Instance) -> Result<(), String> {
        (self.check)(instance)
    }
}

impl fmt::Debug for ModelRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRule").field("name", &self.name).finish_non_exhaustive()
    }
}

///
/// ValidationIssue
/// One failed validator rule, addressed by attribute and rule name.
/// Model-wide rules report under their own name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationIssue {
    pub attribute: String,
    pub rule: String,
    pub message: String,
}

///
/// Instance
///
/// One in-memory record bound to its entity definition. The back-pointer
/// is non-owning: it is used for lookups (persist, behaviors), never for
/// lifecycle control — the registry owns the definition.
///

pub struct Instance {
    definition: Weak<EntityDefinition>,
    values: IndexMap<String, Value>,
    selected_values: IndexMap<String, Value>,
    is_new_record: bool,
    validators: IndexMap<String, Vec<Validator>>,
    model_rules: IndexMap<String, ModelRule>,
    behaviors: IndexMap<String, Arc<dyn InstanceBehavior>>,
}

impl Instance {
    pub(crate) fn new(definition: Weak<EntityDefinition>, values: IndexMap<String, Value>) -> Self {
        let selected_values = values.clone();

        Self {
            definition,
            values,
            selected_values,
            is_new_record: true,
            validators: IndexMap::new(),
            model_rules: IndexMap::new(),
            behaviors: IndexMap::new(),
        }
    }

    //
    // Attribute access
    //

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set (or register) an attribute value. Registration makes the
    /// attribute visible to serialization and change tracking even when
    /// the value is null.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Current attribute values, in registration order.
    #[must_use]
    pub const fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// The exact values this instance was built from.
    #[must_use]
    pub const fn selected_values(&self) -> &IndexMap<String, Value> {
        &self.selected_values
    }

    #[must_use]
    pub const fn is_new_record(&self) -> bool {
        self.is_new_record
    }

    pub(crate) const fn set_new_record(&mut self, is_new: bool) {
        self.is_new_record = is_new;
    }

    /// Upgrade the non-owning definition reference.
    #[must_use]
    pub fn definition(&self) -> Option<Arc<EntityDefinition>> {
        self.definition.upgrade()
    }

    //
    // Validators
    //

    /// Bind an attribute's validator rules to this instance.
    pub fn bind_validators(&mut self, attribute: impl Into<String>, rules: &[Validator]) {
        self.validators
            .entry(attribute.into())
            .or_default()
            .extend_from_slice(rules);
    }

    /// Validator rules bound to this instance, by attribute.
    #[must_use]
    pub const fn validators(&self) -> &IndexMap<String, Vec<Validator>> {
        &self.validators
    }

    /// Bind a model-wide rule, keyed by its name.
    pub fn bind_model_rule(&mut self, rule: ModelRule) {
        self.model_rules.insert(rule.name().to_string(), rule);
    }

    /// Run every bound rule against the current values, collecting all
    /// failures instead of stopping at the first. Attribute rules run
    /// first, then the model-wide rules.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for (attribute, rules) in &self.validators {
            let value = self.values.get(attribute).unwrap_or(&Value::Null);
            for rule in rules {
                if let Err(message) = rule.check(value) {
                    issues.push(ValidationIssue {
                        attribute: attribute.clone(),
                        rule: rule.name().to_string(),
                        message,
                    });
                }
            }
        }

        for (name, rule) in &self.model_rules {
            if let Err(message) = rule.check(self) {
                issues.push(ValidationIssue {
                    attribute: name.clone(),
                    rule: name.clone(),
                    message,
                });
            }
        }

        issues
    }

    //
    // Behaviors
    //

    /// Install a named behavior. Used by the builder for configured
    /// extensions and by association hooks for injected accessors.
    pub fn install_behavior(
        &mut self,
        name: impl Into<String>,
        behavior: Arc<dyn InstanceBehavior>,
    ) {
        self.behaviors.insert(name.into(), behavior);
    }

    #[must_use]
    pub fn behavior(&self, name: &str) -> Option<&Arc<dyn InstanceBehavior>> {
        self.behaviors.get(name)
    }

    /// Invoke a named behavior against this instance.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, InstanceError> {
        let behavior = self
            .behaviors
            .get(name)
            .ok_or_else(|| InstanceError::UnknownBehavior(name.to_string()))?;

        Ok(behavior.invoke(self, args))
    }

    //
    // Persistence delegation
    //

    /// Persist this record through the storage driver, restricted to
    /// `fields` when given. The returned completion carries the instance
    /// back with driver-assigned values merged in.
    pub fn save(mut self, fields: Option<Vec<String>>) -> Completion<Self> {
        let Some(definition) = self.definition() else {
            return Completion::resolved(Err(InstanceError::Detached.into()));
        };

        Completion::from_blocking(move |sink| {
            let row: IndexMap<String, Value> = match &fields {
                Some(restricted) => self
                    .values
                    .iter()
                    .filter(|(name, _)| restricted.contains(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
                None => self.values.clone(),
            };

            let stored = definition
                .driver()
                .insert(definition.table_name(), &row, sink)?;
            for (name, value) in stored {
                self.set(name, value);
            }
            self.set_new_record(false);

            Ok(self)
        })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("values", &self.values)
            .field("is_new_record", &self.is_new_record)
            .finish_non_exhaustive()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::attribute::{Attribute, AttributeType},
        model::options::DefinitionOptions,
        test_support::{DriverCall, attribute_map, registry},
    };

    fn sample_instance() -> Instance {
        let (registry, _driver) = registry();
        let definition = registry
            .define(
                "Person",
                attribute_map([
                    ("name", Attribute::new(AttributeType::Text)),
                    ("age", Attribute::new(AttributeType::Integer)),
                ]),
                DefinitionOptions::new().timestamps(false),
            )
            .expect("definition should register");

        definition.build(
            IndexMap::from([("name".to_string(), Value::from("ada"))]),
            BuildOptions::default(),
        )
    }

    #[test]
    fn validate_collects_every_failure() {
        let mut instance = sample_instance();
        instance.bind_validators(
            "name",
            &[
                Validator::new("always_fails", |_| Err("nope".to_string())),
                Validator::new("always_passes", |_| Ok(())),
            ],
        );
        instance.bind_validators(
            "age",
            &[Validator::new("required", |value| {
                if value.is_null() {
                    Err("age is required".to_string())
                } else {
                    Ok(())
                }
            })],
        );

        let issues = instance.validate();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].attribute, "name");
        assert_eq!(issues[0].rule, "always_fails");
        assert_eq!(issues[1].attribute, "age");
        assert_eq!(issues[1].message, "age is required");
    }

    #[test]
    fn model_rules_report_under_their_own_name() {
        let mut instance = sample_instance();
        instance.bind_model_rule(ModelRule::new("name_and_age", |instance| {
            if instance.get("age").is_some_and(Value::is_null) {
                Err("age must accompany a name".to_string())
            } else {
                Ok(())
            }
        }));

        let issues = instance.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].attribute, "name_and_age");
        assert_eq!(issues[0].rule, "name_and_age");

        instance.set("age", 36_i64);
        assert!(instance.validate().is_empty());
    }

    #[test]
    fn unknown_behaviors_are_reported() {
        let instance = sample_instance();
        let err = instance
            .invoke("missing", &[])
            .expect_err("unknown behavior should fail");
        assert!(matches!(err, InstanceError::UnknownBehavior(name) if name == "missing"));
    }

    #[test]
    fn serialization_exposes_registered_attributes() {
        let instance = sample_instance();
        let json = serde_json::to_value(&instance).expect("instance should serialize");

        assert_eq!(json["name"], serde_json::json!("ada"));
        // Defaulted attribute is registered, hence visible as null.
        assert_eq!(json["age"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn create_persists_and_merges_assigned_values() {
        let (registry, driver) = registry();
        let definition = registry
            .define(
                "User",
                attribute_map([("name", Attribute::new(AttributeType::Text))]),
                DefinitionOptions::new().timestamps(false),
            )
            .expect("definition should register");
        driver.script_insert_assigned(IndexMap::from([("id".to_string(), Value::Int(41))]));

        let saved = definition
            .create(
                IndexMap::from([("name".to_string(), Value::from("ada"))]),
                None,
            )
            .await
            .expect("insert succeeds");

        assert!(!saved.is_new_record());
        assert_eq!(saved.get("id"), Some(&Value::Int(41)));
        assert_eq!(saved.get("name"), Some(&Value::from("ada")));

        let calls = driver.calls();
        assert_eq!(calls.len(), 1);
        let DriverCall::Insert { table, row } = &calls[0] else {
            panic!("expected an insert call");
        };
        assert_eq!(table, "Users");
        assert_eq!(row.get("name"), Some(&Value::from("ada")));
    }

    #[tokio::test]
    async fn save_restricts_the_row_to_requested_fields() {
        let (registry, driver) = registry();
        let definition = registry
            .define(
                "User",
                attribute_map([
                    ("name", Attribute::new(AttributeType::Text)),
                    ("nick", Attribute::new(AttributeType::Text)),
                ]),
                DefinitionOptions::new().timestamps(false),
            )
            .expect("definition should register");

        let instance = definition.build(
            IndexMap::from([
                ("name".to_string(), Value::from("ada")),
                ("nick".to_string(), Value::from("al")),
            ]),
            BuildOptions::default(),
        );

        instance
            .save(Some(vec!["name".to_string()]))
            .await
            .expect("insert succeeds");

        let calls = driver.calls();
        let DriverCall::Insert { row, .. } = &calls[0] else {
            panic!("expected an insert call");
        };
        let fields: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["name"]);
    }

    #[tokio::test]
    async fn detached_instances_cannot_save() {
        let instance = {
            let (registry, _driver) = registry();
            let definition = registry
                .define(
                    "Orphan",
                    attribute_map([("n", Attribute::new(AttributeType::Integer))]),
                    DefinitionOptions::new().timestamps(false),
                )
                .expect("definition should register");
            definition.build(IndexMap::new(), BuildOptions::default())
        };
        assert!(instance.definition().is_none());

        let err = instance.save(None).await.expect_err("save should fail");
        assert!(matches!(
            err,
            crate::Error::Instance(InstanceError::Detached)
        ));
    }
}
