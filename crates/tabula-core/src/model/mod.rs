//! Entity description: attribute descriptors, definition options, the
//! finalized [`definition::EntityDefinition`], and the one-shot attribute
//! resolver that runs at definition time.

pub mod attribute;
pub mod definition;
pub mod options;
pub mod resolver;
