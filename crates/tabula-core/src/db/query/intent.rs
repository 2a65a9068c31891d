use crate::{model::definition::EntityDefinition, value::Value};
use indexmap::IndexMap;
use std::sync::Arc;

///
/// Where
///

#[derive(Clone, Debug, PartialEq)]
pub enum Where {
    /// Lookup by the single primary key.
    Id(i64),
    /// Attribute equality, in insertion order.
    Eq(IndexMap<String, Value>),
    /// Caller-supplied clause text, passed through to the driver.
    Raw(String),
}

///
/// Projection
/// One projected column, optionally aliased.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Projection {
    pub expression: String,
    pub alias: Option<String>,
}

impl Projection {
    #[must_use]
    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            alias: None,
        }
    }

    #[must_use]
    pub fn aliased(expression: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            alias: Some(alias.into()),
        }
    }
}

///
/// Include
///
/// Eager-load request: declared as related-entity names, rewritten into a
/// name→definition mapping during query assembly.
///

#[derive(Clone, Debug, Default)]
pub enum Include {
    #[default]
    None,
    Names(Vec<String>),
    Resolved(IndexMap<String, Arc<EntityDefinition>>),
}

///
/// FinderOptions
///

#[derive(Clone, Debug, Default)]
pub struct FinderOptions {
    pub where_clause: Option<Where>,
    pub attributes: Vec<Projection>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order: Option<String>,
    pub include: Include,
}

impl FinderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, clause: Where) -> Self {
        self.where_clause = Some(clause);
        self
    }

    #[must_use]
    pub fn attribute(mut self, projection: Projection) -> Self {
        self.attributes.push(projection);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Request eager loading of the named relations.
    #[must_use]
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Include::Names(names.into_iter().map(Into::into).collect());
        self
    }
}

///
/// FindTarget
///
/// The single-record finder argument. `Text` must parse as an integer id;
/// `Keys` binds positionally to the declared primary keys.
///

#[derive(Clone, Debug)]
pub enum FindTarget {
    Id(i64),
    Text(String),
    Keys(Vec<Value>),
    Options(FinderOptions),
}

impl From<i64> for FindTarget {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for FindTarget {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_string())
    }
}

impl From<String> for FindTarget {
    fn from(raw: String) -> Self {
        Self::Text(raw)
    }
}

impl From<Vec<Value>> for FindTarget {
    fn from(keys: Vec<Value>) -> Self {
        Self::Keys(keys)
    }
}

impl From<FinderOptions> for FindTarget {
    fn from(options: FinderOptions) -> Self {
        Self::Options(options)
    }
}
