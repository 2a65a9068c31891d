use crate::{
    db::{
        query::{Aggregate, FinderOptions},
        response::SqlSink,
    },
    model::definition::EntityDefinition,
    value::Value,
};
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// One raw result row, attribute name to value, in projection order.
pub type Row = IndexMap<String, Value>;

///
/// DriverError
///
/// Opaque execution failure reported by the storage collaborator. The
/// engine performs no retry and no classification; a failed fetch yields
/// nothing usable.
///

#[derive(Debug, ThisError)]
#[error("storage driver failure: {message}")]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// QueryType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryType {
    Select,
}

///
/// SelectKind
/// Shape markers on a row-fetch request.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SelectKind {
    pub query_type: QueryType,
    /// Eager-loaded relations are part of the request.
    pub has_join: bool,
    /// Single-record result shape (`find`).
    pub plain: bool,
}

///
/// SelectRequest
/// Row-fetch request: (definition, table name(s), options, kind).
///

#[derive(Clone)]
pub struct SelectRequest {
    pub definition: Arc<EntityDefinition>,
    pub tables: Vec<String>,
    pub options: FinderOptions,
    pub kind: SelectKind,
}

///
/// ScalarRequest
/// Raw-scalar fetch request for aggregates.
///

#[derive(Clone)]
pub struct ScalarRequest {
    pub table: String,
    pub options: FinderOptions,
    pub aggregate: Aggregate,
}

///
/// StorageDriver
///
/// Statement execution seam. Implementations generate and run the actual
/// SQL, reporting every generated statement through the [`SqlSink`].
/// Cancellation, timeouts, and retry policy live entirely on this side
/// of the boundary; calls are made from a blocking-friendly context.
///

pub trait StorageDriver: Send + Sync {
    /// Fetch rows for a finder request.
    fn select(&self, request: &SelectRequest, sql: &SqlSink) -> Result<Vec<Row>, DriverError>;

    /// Fetch one aggregate scalar.
    fn raw_scalar(&self, request: &ScalarRequest, sql: &SqlSink) -> Result<Value, DriverError>;

    /// Persist one row, returning the stored row (with engine-assigned
    /// values such as the autoincrement key).
    fn insert(&self, table: &str, row: &Row, sql: &SqlSink) -> Result<Row, DriverError>;

    /// Create a table from the attributes-to-SQL projection.
    fn create_table(
        &self,
        table: &str,
        attributes: &IndexMap<String, String>,
        sql: &SqlSink,
    ) -> Result<(), DriverError>;

    /// Drop a table.
    fn drop_table(&self, table: &str, sql: &SqlSink) -> Result<(), DriverError>;
}
