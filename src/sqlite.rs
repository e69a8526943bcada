//! SQLite store driver
//!
//! Implements `StoreDriver` on a single `rusqlite` connection. Column
//! descriptors carry the declared column type reported by SQLite.

use config::DatabaseConfig;
use rusqlite::types::Value as RawValue;
use rusqlite::{params_from_iter, Connection};
use std::time::Duration;
use store_object::{DriverError, ExecuteOutcome, RowSet, StoreDriver};
use type_mapping::{ColumnDescriptor, SqlValue};

pub struct SqliteDriver {
    conn: Connection,
}

impl std::fmt::Debug for SqliteDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDriver")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteDriver {
    /// Open the database described by `config` and apply its settings
    pub fn open(config: &DatabaseConfig) -> Result<Self, rusqlite::Error> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.path)?
        };

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        let journal_mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            &config.journal_mode,
            |row| row.get(0),
        )?;

        crate::debug_log!(
            path = %config.path,
            journal_mode = %journal_mode,
            foreign_keys = config.foreign_keys,
            "opened SQLite database"
        );
        Ok(Self { conn })
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::open(&DatabaseConfig::in_memory())
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StoreDriver for SqliteDriver {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecuteOutcome, DriverError> {
        crate::trace_log!(%sql, params = params.len(), "sqlite execute");
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DriverError::new("prepare", e))?;
        let affected = stmt
            .execute(params_from_iter(params.iter().map(to_raw)))
            .map_err(|e| DriverError::new("execute", e))?;

        let last_insert_id = Some(self.conn.last_insert_rowid()).filter(|id| *id != 0);
        Ok(ExecuteOutcome {
            affected_rows: affected as u64,
            last_insert_id,
        })
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RowSet, DriverError> {
        crate::trace_log!(%sql, params = params.len(), "sqlite query");
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DriverError::new("prepare", e))?;

        let columns: Vec<ColumnDescriptor> = stmt
            .columns()
            .iter()
            .map(|column| {
                ColumnDescriptor::new(column.name(), column.decl_type().map(str::to_string))
            })
            .collect();
        let width = columns.len();
        let mut row_set = RowSet::new(columns);

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_raw)))
            .map_err(|e| DriverError::new("query", e))?;
        while let Some(row) = rows.next().map_err(|e| DriverError::new("fetch", e))? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                let raw: RawValue = row.get(index).map_err(|e| DriverError::new("fetch", e))?;
                values.push(from_raw(raw));
            }
            row_set.push(values);
        }

        Ok(row_set)
    }

    fn quote(&self, literal: &str) -> String {
        format!("'{}'", literal.replace('\'', "''"))
    }
}

/// SQLite has no boolean storage class; booleans bind as 0/1
fn to_raw(value: &SqlValue) -> RawValue {
    match value {
        SqlValue::Null => RawValue::Null,
        SqlValue::Integer(i) => RawValue::Integer(*i),
        SqlValue::Real(f) => RawValue::Real(*f),
        SqlValue::Text(s) => RawValue::Text(s.clone()),
        SqlValue::Blob(b) => RawValue::Blob(b.clone()),
        SqlValue::Boolean(b) => RawValue::Integer(i64::from(*b)),
    }
}

fn from_raw(value: RawValue) -> SqlValue {
    match value {
        RawValue::Null => SqlValue::Null,
        RawValue::Integer(i) => SqlValue::Integer(i),
        RawValue::Real(f) => SqlValue::Real(f),
        RawValue::Text(s) => SqlValue::Text(s),
        RawValue::Blob(b) => SqlValue::Blob(b),
    }
}
