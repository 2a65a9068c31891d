//! Instance materialization.
//!
//! One synchronous pass over the definition's frozen attribute set:
//! coerce, default, bind validators, install behaviors, run association
//! hooks, then stamp the new-record flag.

use crate::{
    instance::Instance,
    model::{attribute::DefaultValue, definition::EntityDefinition},
    value::Value,
};
use indexmap::IndexMap;
use std::sync::Arc;

///
/// BuildOptions
///

#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOptions {
    /// New-record flag override; unset means new.
    pub is_new_record: Option<bool>,
}

impl BuildOptions {
    #[must_use]
    pub const fn new_record(is_new: bool) -> Self {
        Self {
            is_new_record: Some(is_new),
        }
    }

    /// Rows fetched from storage are never new.
    pub(crate) const fn existing() -> Self {
        Self {
            is_new_record: Some(false),
        }
    }
}

/// Materialize raw values into a live instance.
///
/// Supplied values outside the declared attribute set pass through
/// untouched; declared attributes are coerced (numeric-to-boolean) or
/// defaulted, and a defaulted attribute is registered even when its
/// resolved value is null.
pub(crate) fn materialize(
    definition: &EntityDefinition,
    values: IndexMap<String, Value>,
    options: BuildOptions,
) -> Instance {
    let mut instance = Instance::new(definition.this_weak(), values);

    for (name, attribute) in definition.attributes() {
        match instance.get(name) {
            Some(value) => {
                if attribute.ty().is_boolean()
                    && let Some(coerced) = coerce_boolean(value)
                {
                    instance.set(name.clone(), coerced);
                }
            }
            None => {
                let value = attribute.default().map_or(Value::Null, DefaultValue::resolve);
                instance.set(name.clone(), value);
            }
        }

        if !attribute.validators().is_empty() {
            instance.bind_validators(name.clone(), attribute.validators());
        }
    }

    for rule in definition.options().validate().values() {
        instance.bind_model_rule(rule.clone());
    }

    for (name, behavior) in definition.options().behaviors() {
        instance.install_behavior(name.clone(), Arc::clone(behavior));
    }

    for (_, association) in definition.associations() {
        association.inject_getter(&mut instance);
        association.inject_setter(&mut instance);
    }

    instance.set_new_record(options.is_new_record.unwrap_or(true));
    instance
}

/// Numeric values supplied for boolean attributes collapse to their
/// truthiness; anything else is left alone.
fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Int(i) => Some(Value::Bool(*i != 0)),
        Value::Float(f) => Some(Value::Bool(*f != 0.0)),
        _ => None,
    }
}
