//! Store driver contract
//!
//! The mapping core never talks to a database directly. It hands SQL text
//! and positional parameters to a `StoreDriver` and reads rows back as
//! column descriptors plus raw values.

use crate::errors::DriverError;
use type_mapping::{ColumnDescriptor, SqlValue};

/// Result of a statement that returns no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOutcome {
    pub affected_rows: u64,
    /// Key generated by the last insert on this handle, if any
    pub last_insert_id: Option<i64>,
}

/// Rows returned by a query, all sharing one set of column descriptors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<SqlValue>>,
}

impl RowSet {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, values: Vec<SqlValue>) {
        self.rows.push(values);
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consume the set, yielding rows in store order
    pub fn into_rows(self) -> impl Iterator<Item = (Vec<ColumnDescriptor>, Vec<SqlValue>)> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(move |values| (columns.clone(), values))
    }
}

/// Store handle used by the repository
///
/// Implementations are synchronous and blocking; the mapping core adds no
/// retries, timeouts or transactions on top of them.
pub trait StoreDriver {
    /// Run a statement that returns no rows
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecuteOutcome, DriverError>;

    /// Run a statement that returns rows
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RowSet, DriverError>;

    /// Quote a literal for inline use in DDL
    fn quote(&self, literal: &str) -> String;
}

impl<D: StoreDriver + ?Sized> StoreDriver for &D {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecuteOutcome, DriverError> {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RowSet, DriverError> {
        (**self).query(sql, params)
    }

    fn quote(&self, literal: &str) -> String {
        (**self).quote(literal)
    }
}
