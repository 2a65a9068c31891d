//! Shared test fixtures: a minimal ANSI-ish dialect, a scripted
//! call-recording driver, and registry/attribute-map helpers.

use crate::{
    db::{
        dialect::SqlDialect,
        driver::{DriverError, Row, ScalarRequest, SelectRequest, StorageDriver},
        registry::ModelRegistry,
        response::SqlSink,
    },
    model::attribute::{Attribute, AttributeType},
    value::Value,
};
use indexmap::IndexMap;
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

///
/// AnsiDialect
///

pub(crate) struct AnsiDialect;

impl SqlDialect for AnsiDialect {
    fn attribute_to_sql(&self, attribute: &Attribute) -> String {
        let mut sql = match attribute.ty() {
            AttributeType::Integer => "INTEGER".to_string(),
            AttributeType::BigInt => "BIGINT".to_string(),
            AttributeType::Float => "FLOAT".to_string(),
            AttributeType::Text => "TEXT".to_string(),
            AttributeType::VarChar(len) => format!("VARCHAR({len})"),
            AttributeType::Boolean => "BOOLEAN".to_string(),
            AttributeType::Date => "DATETIME".to_string(),
        };

        if !attribute.allows_null() {
            sql.push_str(" NOT NULL");
        }
        if attribute.is_primary_key() {
            sql.push_str(" PRIMARY KEY");
        }
        if attribute.is_auto_increment() {
            sql.push_str(" AUTOINCREMENT");
        }

        sql
    }
}

///
/// DriverCall
/// One recorded driver invocation, in call order.
///

#[derive(Clone)]
pub(crate) enum DriverCall {
    Select(SelectRequest),
    Scalar(ScalarRequest),
    Insert { table: String, row: Row },
    CreateTable { table: String },
    DropTable { table: String },
}

impl DriverCall {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Scalar(_) => "scalar",
            Self::Insert { .. } => "insert",
            Self::CreateTable { .. } => "create_table",
            Self::DropTable { .. } => "drop_table",
        }
    }
}

///
/// RecordingDriver
///
/// Scripted in-memory driver: returns pre-loaded rows and scalars,
/// records every call, and emits one pseudo-SQL line per call so sink
/// behavior is observable.
///

#[derive(Default)]
pub(crate) struct RecordingDriver {
    calls: Mutex<Vec<DriverCall>>,
    rows: Mutex<Vec<Row>>,
    scalar: Mutex<Option<Value>>,
    insert_assigned: Mutex<Row>,
    fail_drop: AtomicBool,
}

impl RecordingDriver {
    pub(crate) fn script_rows(&self, rows: Vec<Row>) {
        *self.rows.lock().unwrap_or_else(PoisonError::into_inner) = rows;
    }

    pub(crate) fn script_scalar(&self, value: Value) {
        *self.scalar.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Values the driver pretends the engine assigned on insert.
    pub(crate) fn script_insert_assigned(&self, assigned: Row) {
        *self
            .insert_assigned
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = assigned;
    }

    pub(crate) fn fail_next_drop(&self) {
        self.fail_drop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<DriverCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn call_labels(&self) -> Vec<&'static str> {
        self.calls().iter().map(DriverCall::label).collect()
    }

    fn record(&self, call: DriverCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl StorageDriver for RecordingDriver {
    fn select(&self, request: &SelectRequest, sql: &SqlSink) -> Result<Vec<Row>, DriverError> {
        sql.emit(format!("SELECT * FROM {}", request.tables.join(", ")));
        self.record(DriverCall::Select(request.clone()));

        Ok(self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn raw_scalar(&self, request: &ScalarRequest, sql: &SqlSink) -> Result<Value, DriverError> {
        sql.emit(format!("SELECT aggregate FROM {}", request.table));
        self.record(DriverCall::Scalar(request.clone()));

        Ok(self
            .scalar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or(Value::Int(0)))
    }

    fn insert(&self, table: &str, row: &Row, sql: &SqlSink) -> Result<Row, DriverError> {
        sql.emit(format!("INSERT INTO {table}"));
        self.record(DriverCall::Insert {
            table: table.to_string(),
            row: row.clone(),
        });

        let mut stored = row.clone();
        for (name, value) in self
            .insert_assigned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            stored.insert(name.clone(), value.clone());
        }
        Ok(stored)
    }

    fn create_table(
        &self,
        table: &str,
        _attributes: &IndexMap<String, String>,
        sql: &SqlSink,
    ) -> Result<(), DriverError> {
        sql.emit(format!("CREATE TABLE {table}"));
        self.record(DriverCall::CreateTable {
            table: table.to_string(),
        });
        Ok(())
    }

    fn drop_table(&self, table: &str, sql: &SqlSink) -> Result<(), DriverError> {
        if self.fail_drop.swap(false, Ordering::SeqCst) {
            return Err(DriverError::new(format!("cannot drop {table}")));
        }

        sql.emit(format!("DROP TABLE {table}"));
        self.record(DriverCall::DropTable {
            table: table.to_string(),
        });
        Ok(())
    }
}

/// Fresh registry wired to a recording driver.
pub(crate) fn registry() -> (Arc<ModelRegistry>, Arc<RecordingDriver>) {
    let driver = Arc::new(RecordingDriver::default());
    let registry = ModelRegistry::new(Arc::new(AnsiDialect), driver.clone());

    (registry, driver)
}

/// Build an attribute map from (name, attribute) pairs.
pub(crate) fn attribute_map<const N: usize>(
    entries: [(&str, Attribute); N],
) -> IndexMap<String, Attribute> {
    entries
        .into_iter()
        .map(|(name, attribute)| (name.to_string(), attribute))
        .collect()
}
