//! Aggregate finders: count / max / min.

use crate::{
    db::{
        driver::ScalarRequest,
        query::intent::{FinderOptions, Projection},
        response::{Completion, ResponseError},
    },
    model::definition::EntityDefinition,
};
use std::sync::Arc;

///
/// Aggregate
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Aggregate {
    Count,
    Max,
    Min,
}

impl Aggregate {
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    #[must_use]
    pub fn expression(self, field: &str) -> String {
        format!("{}({field})", self.alias())
    }
}

/// Append exactly one synthesized aggregate projection, delegate to the
/// raw-scalar fetch, and force integer parsing of the result.
pub(crate) fn aggregate(
    definition: &Arc<EntityDefinition>,
    aggregate: Aggregate,
    field: &str,
    options: Option<FinderOptions>,
) -> Completion<i64> {
    let mut options = options.unwrap_or_default();
    options
        .attributes
        .push(Projection::aliased(aggregate.expression(field), aggregate.alias()));

    let definition = Arc::clone(definition);

    Completion::from_blocking(move |sink| {
        let request = ScalarRequest {
            table: definition.table_name().to_string(),
            options,
            aggregate,
        };
        let value = definition.driver().raw_scalar(&request, sink)?;

        value
            .parse_int()
            .ok_or_else(|| ResponseError::NonNumericScalar { value }.into())
    })
}
