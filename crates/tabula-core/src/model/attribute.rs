use crate::value::Value;
use chrono::Utc;
use std::{fmt, sync::Arc};

///
/// AttributeType
/// Column type surface the dialect generator maps onto SQL.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttributeType {
    Integer,
    BigInt,
    Float,
    Text,
    VarChar(u32),
    Boolean,
    Date,
}

impl AttributeType {
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self, Self::Boolean)
    }
}

///
/// DefaultValue
///
/// Declared default for an attribute. `Now` resolves at build time so
/// every materialized instance gets a fresh timestamp.
///

#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Literal(Value),
    Now,
}

impl DefaultValue {
    /// Resolve the declared rule into a concrete value.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Now => Value::Timestamp(Utc::now()),
        }
    }
}

///
/// Validator
///
/// One named validation rule bound to an attribute. The rule body is an
/// opaque check; the engine's contract is binding rules to built
/// instances and collecting their failures, not interpreting them.
///

#[derive(Clone)]
pub struct Validator {
    name: String,
    check: Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>,
}

impl Validator {
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
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

    /// Run the rule against a value.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        (self.check)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish_non_exhaustive()
    }
}

///
/// Attribute
///
/// Type/constraint descriptor for one declared attribute. Chainable
/// constructors; the set is frozen once the definition initializes.
///

#[derive(Clone, Debug)]
pub struct Attribute {
    ty: AttributeType,
    allow_null: bool,
    default_value: Option<DefaultValue>,
    primary_key: bool,
    auto_increment: bool,
    validators: Vec<Validator>,
}

impl Attribute {
    #[must_use]
    pub const fn new(ty: AttributeType) -> Self {
        Self {
            ty,
            allow_null: true,
            default_value: None,
            primary_key: false,
            auto_increment: false,
            validators: Vec::new(),
        }
    }

    #[must_use]
    pub const fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(DefaultValue::Literal(value.into()));
        self
    }

    #[must_use]
    pub fn default_now(mut self) -> Self {
        self.default_value = Some(DefaultValue::Now);
        self
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub const fn ty(&self) -> AttributeType {
        self.ty
    }

    #[must_use]
    pub const fn allows_null(&self) -> bool {
        self.allow_null
    }

    #[must_use]
    pub const fn default(&self) -> Option<&DefaultValue> {
        self.default_value.as_ref()
    }

    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    #[must_use]
    pub const fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}
