use crate::{
    db::{driver::DriverError, query::QueryError, registry::RegistryError, response::ResponseError},
    instance::InstanceError,
    model::resolver::DefinitionError,
};
use thiserror::Error as ThisError;

///
/// Error
///
/// Crate-level aggregate over the per-module error enums.
///
/// Configuration errors (definition, registry, query-argument) are
/// returned synchronously at call time; execution errors travel through
/// the completion object's terminal error event.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Response(#[from] ResponseError),
}
