//! Core runtime for Tabula: entity definitions, finder queries, instance
//! materialization, schema sync, and the completion objects every
//! query-producing operation returns.
//!
//! The SQL dialect and the storage driver are consumed through traits and
//! never implemented here; see [`db::dialect`] and [`db::driver`].
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod instance;
pub mod model;
pub mod naming;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use error::Error;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// Driver and dialect implementations should import their traits directly.
///

pub mod prelude {
    pub use crate::{
        db::{
            query::{FindTarget, FinderOptions, Include, Projection, Where},
            registry::ModelRegistry,
            response::Completion,
            sync::SyncOptions,
        },
        instance::{BuildOptions, Instance, InstanceBehavior, ModelRule},
        model::{
            attribute::{Attribute, AttributeType, DefaultValue, Validator},
            definition::{DefinitionBehavior, EntityDefinition},
            options::DefinitionOptions,
        },
        value::Value,
    };
}
