//! Schema sync: create/drop sequencing against the storage driver.

use crate::{db::response::Completion, model::definition::EntityDefinition};
use std::sync::Arc;

///
/// SyncOptions
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SyncOptions {
    /// Drop the table before creating it.
    pub force: bool,
}

impl SyncOptions {
    #[must_use]
    pub const fn force() -> Self {
        Self { force: true }
    }
}

/// Provision the table. With `force`, the drop must complete before the
/// create is attempted; a drop failure becomes the sync error and the
/// create never runs. Without `force`, create directly.
pub(crate) fn sync(definition: &Arc<EntityDefinition>, options: SyncOptions) -> Completion<()> {
    let definition = Arc::clone(definition);

    Completion::from_blocking(move |sink| {
        if options.force {
            definition.driver().drop_table(definition.table_name(), sink)?;
        }

        let attributes = definition.attributes_sql();
        definition
            .driver()
            .create_table(definition.table_name(), &attributes, sink)?;

        Ok(())
    })
}

/// Drop the table, delegating straight to the driver.
pub(crate) fn drop_table(definition: &Arc<EntityDefinition>) -> Completion<()> {
    let definition = Arc::clone(definition);

    Completion::from_blocking(move |sink| {
        definition.driver().drop_table(definition.table_name(), sink)?;
        Ok(())
    })
}
