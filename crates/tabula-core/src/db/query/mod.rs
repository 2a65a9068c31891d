//! Finder and aggregate query assembly.
//!
//! Operations here build fetch requests from high-level finder calls and
//! delegate execution to the storage driver; result rows come back as
//! materialized instances.

pub mod aggregate;
pub mod finder;
pub mod intent;

pub use aggregate::Aggregate;
pub use intent::{FindTarget, FinderOptions, Include, Projection, Where};

use crate::db::registry::RegistryError;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Synchronous, fatal misuse of the finder surface, raised at call time
/// outside the asynchronous channel.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("invalid argument to find(): '{argument}' is not a numeric id")]
    InvalidFindArgument { argument: String },

    #[error(
        "find() received {found} positional key values but '{name}' declares {expected} primary keys"
    )]
    PrimaryKeyArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("model registry is no longer available")]
    RegistryUnavailable,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
