//! Single- and multi-record finders.

use crate::{
    db::{
        driver::{QueryType, SelectKind, SelectRequest},
        query::{
            QueryError,
            intent::{FindTarget, FinderOptions, Include, Projection, Where},
        },
        response::Completion,
    },
    instance::{BuildOptions, Instance},
    model::definition::EntityDefinition,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Multi-record fetch. An include list is resolved through the registry
/// into a name→definition mapping and flags the request as a join.
pub(crate) fn find_all(
    definition: &Arc<EntityDefinition>,
    options: Option<FinderOptions>,
) -> Result<Completion<Vec<Instance>>, QueryError> {
    let mut options = options.unwrap_or_default();
    let has_join = resolve_include(definition, &mut options)?;

    Ok(select_many(
        definition,
        vec![definition.table_name().to_string()],
        options,
        SelectKind {
            query_type: QueryType::Select,
            has_join,
            plain: false,
        },
    ))
}

/// Single-record fetch. Limit is forced to 1 and the request is marked
/// plain on every path; a missing target resolves to `None`, always
/// asynchronously.
pub(crate) fn find(
    definition: &Arc<EntityDefinition>,
    target: Option<FindTarget>,
) -> Result<Completion<Option<Instance>>, QueryError> {
    let Some(target) = target else {
        return Ok(Completion::resolved(Ok(None)));
    };

    let mut has_join = false;
    let mut options = match target {
        FindTarget::Id(id) => FinderOptions::new().filter(Where::Id(id)),
        FindTarget::Text(raw) => FinderOptions::new().filter(Where::Id(parse_find_id(&raw)?)),
        FindTarget::Keys(values) => {
            FinderOptions::new().filter(bind_primary_keys(definition, values)?)
        }
        FindTarget::Options(mut options) => {
            has_join = resolve_include(definition, &mut options)?;
            options
        }
    };
    options.limit = Some(1);

    Ok(select_plain(
        definition,
        vec![definition.table_name().to_string()],
        options,
        SelectKind {
            query_type: QueryType::Select,
            has_join,
            plain: true,
        },
    ))
}

/// Join-table fetch. The caller owns the where clause; the projection
/// defaults to every column of the owning table.
pub(crate) fn find_all_join(
    definition: &Arc<EntityDefinition>,
    join_table: &str,
    options: FinderOptions,
) -> Completion<Vec<Instance>> {
    let mut options = options;
    if options.attributes.is_empty() {
        let quoted = definition.dialect().quote_identifier(definition.table_name());
        options.attributes.push(Projection::expression(format!("{quoted}.*")));
    }

    select_many(
        definition,
        vec![
            definition.table_name().to_string(),
            join_table.to_string(),
        ],
        options,
        SelectKind {
            query_type: QueryType::Select,
            has_join: false,
            plain: false,
        },
    )
}

/// The strict numeric-string rule: the text must round-trip through an
/// integer unchanged, anything else is a programming error.
fn parse_find_id(raw: &str) -> Result<i64, QueryError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| id.to_string() == raw)
        .ok_or_else(|| QueryError::InvalidFindArgument {
            argument: raw.to_string(),
        })
}

/// Bind positional values to the declared primary keys, in declared
/// insertion order.
fn bind_primary_keys(
    definition: &Arc<EntityDefinition>,
    values: Vec<crate::value::Value>,
) -> Result<Where, QueryError> {
    let keys = definition.primary_keys();
    if keys.len() != values.len() {
        return Err(QueryError::PrimaryKeyArity {
            name: definition.name().to_string(),
            expected: keys.len(),
            found: values.len(),
        });
    }

    let bound: IndexMap<String, crate::value::Value> =
        keys.into_keys().zip(values).collect();
    Ok(Where::Eq(bound))
}

/// Rewrite an include name list into definitions via the owning registry.
/// Returns the join flag: present include lists always mark the request
/// as a join, even when empty.
fn resolve_include(
    definition: &Arc<EntityDefinition>,
    options: &mut FinderOptions,
) -> Result<bool, QueryError> {
    let Include::Names(names) = &options.include else {
        return Ok(matches!(options.include, Include::Resolved(_)));
    };

    let registry = definition
        .registry()
        .ok_or(QueryError::RegistryUnavailable)?;

    let mut resolved = IndexMap::with_capacity(names.len());
    for name in names {
        resolved.insert(name.clone(), registry.try_get(name)?);
    }

    options.include = Include::Resolved(resolved);
    Ok(true)
}

fn select_many(
    definition: &Arc<EntityDefinition>,
    tables: Vec<String>,
    options: FinderOptions,
    kind: SelectKind,
) -> Completion<Vec<Instance>> {
    let definition = Arc::clone(definition);

    Completion::from_blocking(move |sink| {
        let request = SelectRequest {
            definition: Arc::clone(&definition),
            tables,
            options,
            kind,
        };
        let rows = definition.driver().select(&request, sink)?;

        Ok(rows
            .into_iter()
            .map(|row| definition.build(row, BuildOptions::existing()))
            .collect())
    })
}

fn select_plain(
    definition: &Arc<EntityDefinition>,
    tables: Vec<String>,
    options: FinderOptions,
    kind: SelectKind,
) -> Completion<Option<Instance>> {
    let definition = Arc::clone(definition);

    Completion::from_blocking(move |sink| {
        let request = SelectRequest {
            definition: Arc::clone(&definition),
            tables,
            options,
            kind,
        };
        let rows = definition.driver().select(&request, sink)?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| definition.build(row, BuildOptions::existing())))
    })
}
