//! Query assembly, schema sync, and the collaborator seams (dialect,
//! driver, registry, associations) plus the completion objects every
//! asynchronous operation returns.

pub mod dialect;
pub mod driver;
pub mod query;
pub mod registry;
pub mod relation;
pub mod response;
pub mod sync;
