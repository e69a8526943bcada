//! Repository
//!
//! Runs generated statements for one record type against an explicit store
//! handle. Every operation issues its statements in sequence and stops at
//! the first error; nothing is retried or wrapped in a transaction.

use crate::errors::MapperError;
use crate::hydrate::RowHydrator;
use crate::record::Record;
use crate::schema::SchemaGenerator;
use crate::statements::{Statement, StatementBuilder};
use crate::traits::{Entity, ExecuteOutcome, RowSet, StoreDriver};
use std::marker::PhantomData;
use type_mapping::Value;

pub struct Repository<T: Entity, D: StoreDriver> {
    driver: D,
    _phantom: PhantomData<T>,
}

impl<T: Entity, D: StoreDriver> std::fmt::Debug for Repository<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &T::metadata().type_name())
            .field("schema", &T::metadata().schema_name())
            .finish()
    }
}

impl<T: Entity, D: StoreDriver> Repository<T, D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            _phantom: PhantomData,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Execute the CREATE TABLE and CREATE INDEX statements in order.
    /// A failing statement leaves the earlier ones applied.
    pub fn create_schema(&self) -> Result<(), MapperError> {
        let statements =
            SchemaGenerator::create_statements(T::metadata(), |literal| self.driver.quote(literal))?;
        for sql in &statements {
            self.driver.execute(sql, &[])?;
        }
        tracing::debug!(
            schema = %T::metadata().schema_name(),
            statements = statements.len(),
            "schema created"
        );
        Ok(())
    }

    pub fn drop_schema(&self) -> Result<(), MapperError> {
        let sql = SchemaGenerator::drop_statement(T::metadata());
        self.driver.execute(&sql, &[])?;
        tracing::debug!(schema = %T::metadata().schema_name(), "schema dropped");
        Ok(())
    }

    /// Insert the entity and return the persisted row
    pub fn add(&self, entity: &T) -> Result<T, MapperError> {
        self.add_record(entity.to_record()?)
    }

    /// Insert a record and return the persisted row.
    ///
    /// The row is read back by the record's own primary key when set, else
    /// by the key the store generated.
    pub fn add_record(&self, record: Record) -> Result<T, MapperError> {
        let metadata = T::metadata();
        let primary_key = metadata.primary_key_field()?;
        let statement = StatementBuilder::insert(metadata, &record)?;
        let outcome = self.execute(&statement)?;

        let key = match record.get(primary_key.name()) {
            Some(value) if !value.is_null() => value.clone(),
            _ => outcome.last_insert_id.map(Value::Integer).ok_or_else(|| {
                MapperError::validation(
                    primary_key.name(),
                    "Store did not report a generated primary key",
                )
            })?,
        };

        tracing::debug!(schema = %metadata.schema_name(), key = ?key, "record added");
        self.get(key)
    }

    /// Fetch one row by primary key
    pub fn get(&self, key: impl Into<Value>) -> Result<T, MapperError> {
        let metadata = T::metadata();
        let key = key.into();
        let statement = StatementBuilder::select_by_primary_key(metadata, &key)?;
        let rows = self.query(&statement)?;

        let (columns, values) = rows
            .into_rows()
            .next()
            .ok_or_else(|| MapperError::not_found(&metadata.schema_name(), &key))?;
        let record = RowHydrator::hydrate(metadata, &columns, values)?;
        T::from_record(record)
    }

    /// Fetch every row, in store order
    pub fn get_all(&self) -> Result<Vec<T>, MapperError> {
        let metadata = T::metadata();
        let rows = self.query(&StatementBuilder::select_all(metadata))?;

        let mut entities = Vec::with_capacity(rows.len());
        for (columns, values) in rows.into_rows() {
            let record = RowHydrator::hydrate(metadata, &columns, values)?;
            entities.push(T::from_record(record)?);
        }
        Ok(entities)
    }

    /// Update the entity's row and return the persisted row
    pub fn update(&self, entity: &T) -> Result<T, MapperError> {
        self.update_record(entity.to_record()?)
    }

    pub fn update_record(&self, record: Record) -> Result<T, MapperError> {
        let metadata = T::metadata();
        let statement = StatementBuilder::update(metadata, &record)?;
        let outcome = self.execute(&statement)?;

        let key = Self::key_of(&record)?;
        tracing::debug!(
            schema = %metadata.schema_name(),
            key = ?key,
            affected_rows = outcome.affected_rows,
            "record updated"
        );
        self.get(key)
    }

    /// Delete the entity's row; returns the number of rows removed
    pub fn delete(&self, entity: &T) -> Result<u64, MapperError> {
        self.delete_record(&entity.to_record()?)
    }

    pub fn delete_record(&self, record: &Record) -> Result<u64, MapperError> {
        let metadata = T::metadata();
        let key = Self::key_of(record)?;
        let statement = StatementBuilder::delete(metadata, &key)?;
        let outcome = self.execute(&statement)?;
        tracing::debug!(
            schema = %metadata.schema_name(),
            key = ?key,
            affected_rows = outcome.affected_rows,
            "record deleted"
        );
        Ok(outcome.affected_rows)
    }

    fn key_of(record: &Record) -> Result<Value, MapperError> {
        let primary_key = T::metadata().primary_key_field()?;
        record
            .get(primary_key.name())
            .filter(|value| !value.is_null())
            .cloned()
            .ok_or_else(|| MapperError::uninitialized(primary_key.name()))
    }

    fn execute(&self, statement: &Statement) -> Result<ExecuteOutcome, MapperError> {
        tracing::trace!(sql = %statement.sql, "execute");
        Ok(self.driver.execute(&statement.sql, &statement.params)?)
    }

    fn query(&self, statement: &Statement) -> Result<RowSet, MapperError> {
        tracing::trace!(sql = %statement.sql, "query");
        Ok(self.driver.query(&statement.sql, &statement.params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DriverError;
    use crate::metadata::{Constraint, EntityMetadata, FieldMetadata, MarkerValue};
    use crate::traits::{put_field, put_key, take_field};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::OnceLock;
    use type_mapping::{ColumnDescriptor, FieldKind, FieldType, SqlValue};

    #[derive(Debug, Clone, PartialEq)]
    struct Test {
        id: Option<i64>,
        value: String,
        has_default: String,
    }

    impl Entity for Test {
        fn metadata() -> &'static EntityMetadata {
            static METADATA: OnceLock<EntityMetadata> = OnceLock::new();
            METADATA.get_or_init(|| {
                EntityMetadata::new("Test")
                    .field(
                        FieldMetadata::new("id", <Option<i64> as FieldType>::kind(), true)
                            .with(Constraint::PrimaryKey),
                    )
                    .field(FieldMetadata::new("value", FieldKind::Text, false))
                    .field(
                        FieldMetadata::new("has_default", FieldKind::Text, false)
                            .with(Constraint::SqlDefault(MarkerValue::literal("bar"))),
                    )
            })
        }

        fn to_record(&self) -> Result<Record, MapperError> {
            let mut record = Record::new();
            put_key(&mut record, "id", &self.id)?;
            put_field(&mut record, "value", &self.value)?;
            put_field(&mut record, "has_default", &self.has_default)?;
            Ok(record)
        }

        fn from_record(mut record: Record) -> Result<Self, MapperError> {
            Ok(Self {
                id: take_field(&mut record, "id")?,
                value: take_field(&mut record, "value")?,
                has_default: take_field(&mut record, "has_default")?,
            })
        }
    }

    /// Entity with two indexed fields, so schema creation issues three statements
    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: i64,
        label: String,
        slug: String,
    }

    impl Entity for Tag {
        fn metadata() -> &'static EntityMetadata {
            static METADATA: OnceLock<EntityMetadata> = OnceLock::new();
            METADATA.get_or_init(|| {
                EntityMetadata::new("Tag")
                    .field(FieldMetadata::new("id", FieldKind::Integer, false).with(Constraint::PrimaryKey))
                    .field(FieldMetadata::new("label", FieldKind::Text, false).with(Constraint::Indexed))
                    .field(FieldMetadata::new("slug", FieldKind::Text, false).with(Constraint::Indexed))
            })
        }

        fn to_record(&self) -> Result<Record, MapperError> {
            let mut record = Record::new();
            put_key(&mut record, "id", &self.id)?;
            put_field(&mut record, "label", &self.label)?;
            put_field(&mut record, "slug", &self.slug)?;
            Ok(record)
        }

        fn from_record(mut record: Record) -> Result<Self, MapperError> {
            Ok(Self {
                id: take_field(&mut record, "id")?,
                label: take_field(&mut record, "label")?,
                slug: take_field(&mut record, "slug")?,
            })
        }
    }

    #[derive(Default)]
    struct MockDriver {
        statements: RefCell<Vec<(String, Vec<SqlValue>)>>,
        responses: RefCell<VecDeque<RowSet>>,
        last_insert_id: Option<i64>,
        fail_on: Option<&'static str>,
    }

    impl MockDriver {
        fn respond(&self, rows: RowSet) {
            self.responses.borrow_mut().push_back(rows);
        }

        fn sql(&self) -> Vec<String> {
            self.statements.borrow().iter().map(|(sql, _)| sql.clone()).collect()
        }
    }

    impl StoreDriver for MockDriver {
        fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecuteOutcome, DriverError> {
            self.statements
                .borrow_mut()
                .push((sql.to_string(), params.to_vec()));
            if self.fail_on.is_some_and(|prefix| sql.starts_with(prefix)) {
                return Err(DriverError::new("execute", "disk I/O error"));
            }
            Ok(ExecuteOutcome {
                affected_rows: 1,
                last_insert_id: self.last_insert_id,
            })
        }

        fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RowSet, DriverError> {
            self.statements
                .borrow_mut()
                .push((sql.to_string(), params.to_vec()));
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| RowSet::new(columns())))
        }

        fn quote(&self, literal: &str) -> String {
            format!("'{}'", literal.replace('\'', "''"))
        }
    }

    fn columns() -> Vec<ColumnDescriptor> {
        ["id", "value", "has_default"]
            .iter()
            .map(|name| ColumnDescriptor::new(*name, None))
            .collect()
    }

    fn row(id: i64, value: &str, has_default: &str) -> RowSet {
        let mut rows = RowSet::new(columns());
        rows.push(vec![
            SqlValue::Integer(id),
            SqlValue::Text(value.to_string()),
            SqlValue::Text(has_default.to_string()),
        ]);
        rows
    }

    #[test]
    fn test_create_schema_executes_ddl() {
        let driver = MockDriver::default();
        Repository::<Test, _>::new(&driver).create_schema().unwrap();
        assert_eq!(
            driver.sql(),
            vec![
                r#"CREATE TABLE "test" ("id" integer PRIMARY KEY, "value" string NOT NULL, "has_default" string NOT NULL DEFAULT ('bar'))"#
            ]
        );
    }

    #[test]
    fn test_add_record_reads_back_generated_key() {
        let driver = MockDriver {
            last_insert_id: Some(7),
            ..Default::default()
        };
        driver.respond(row(7, "foo", "bar"));

        let repository = Repository::<Test, _>::new(&driver);
        let record = Test::create_record([("value", "foo")]).unwrap();
        let added = repository.add_record(record).unwrap();

        assert_eq!(
            added,
            Test {
                id: Some(7),
                value: "foo".to_string(),
                has_default: "bar".to_string(),
            }
        );
        let statements = driver.statements.borrow();
        assert_eq!(statements[0].0, r#"INSERT INTO "test" ("value") VALUES (?)"#);
        assert_eq!(statements[1].0, r#"SELECT * FROM "test" WHERE "id" = ?"#);
        assert_eq!(statements[1].1, vec![SqlValue::Integer(7)]);
    }

    #[test]
    fn test_add_prefers_explicit_key() {
        let driver = MockDriver {
            last_insert_id: Some(99),
            ..Default::default()
        };
        driver.respond(row(3, "x", "y"));
        let entity = Test {
            id: Some(3),
            value: "x".to_string(),
            has_default: "y".to_string(),
        };
        Repository::<Test, _>::new(&driver).add(&entity).unwrap();
        assert_eq!(driver.statements.borrow()[1].1, vec![SqlValue::Integer(3)]);
    }

    #[test]
    fn test_get_missing_row_is_not_found() {
        let driver = MockDriver::default();
        let err = Repository::<Test, _>::new(&driver).get(42).unwrap_err();
        assert!(matches!(err, MapperError::NotFound { .. }));
    }

    #[test]
    fn test_get_all_keeps_store_order() {
        let driver = MockDriver::default();
        let mut rows = row(2, "b", "bar");
        rows.push(vec![
            SqlValue::Integer(1),
            SqlValue::Text("a".to_string()),
            SqlValue::Text("bar".to_string()),
        ]);
        driver.respond(rows);

        let all = Repository::<Test, _>::new(&driver).get_all().unwrap();
        let ids: Vec<_> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![Some(2), Some(1)]);
    }

    #[test]
    fn test_update_requires_key() {
        let driver = MockDriver::default();
        let entity = Test {
            id: None,
            value: "x".to_string(),
            has_default: "y".to_string(),
        };
        let err = Repository::<Test, _>::new(&driver).update(&entity).unwrap_err();
        assert_eq!(err.field(), Some("id"));
        assert!(driver.sql().is_empty());
    }

    #[test]
    fn test_update_then_reads_back() {
        let driver = MockDriver::default();
        driver.respond(row(5, "new", "bar"));
        let entity = Test {
            id: Some(5),
            value: "new".to_string(),
            has_default: "bar".to_string(),
        };
        let updated = Repository::<Test, _>::new(&driver).update(&entity).unwrap();
        assert_eq!(updated, entity);
        assert_eq!(
            driver.sql()[0],
            r#"UPDATE "test" SET "value" = ?, "has_default" = ? WHERE "id" = ?"#
        );
    }

    #[test]
    fn test_delete_by_key() {
        let driver = MockDriver::default();
        let entity = Test {
            id: Some(9),
            value: "x".to_string(),
            has_default: "y".to_string(),
        };
        let removed = Repository::<Test, _>::new(&driver).delete(&entity).unwrap();
        assert_eq!(removed, 1);
        let statements = driver.statements.borrow();
        assert_eq!(statements[0].0, r#"DELETE FROM "test" WHERE "id" = ?"#);
        assert_eq!(statements[0].1, vec![SqlValue::Integer(9)]);
    }

    #[test]
    fn test_driver_errors_propagate_without_retry() {
        let driver = MockDriver {
            fail_on: Some("INSERT"),
            ..Default::default()
        };
        let record = Test::create_record([("value", "foo")]).unwrap();
        let err = Repository::<Test, _>::new(&driver).add_record(record).unwrap_err();
        assert!(matches!(err, MapperError::Driver(_)));
        assert_eq!(driver.sql().len(), 1);
    }

    #[test]
    fn test_create_schema_stops_at_failing_statement() {
        let driver = MockDriver {
            fail_on: Some("CREATE INDEX"),
            ..Default::default()
        };
        let err = Repository::<Tag, _>::new(&driver).create_schema().unwrap_err();
        assert!(matches!(err, MapperError::Driver(_)));

        // the table stays created; the second index is never attempted
        assert_eq!(
            driver.sql(),
            vec![
                r#"CREATE TABLE "tag" ("id" integer NOT NULL PRIMARY KEY, "label" string NOT NULL, "slug" string NOT NULL)"#,
                r#"CREATE INDEX "idx_label" ON "tag"("label")"#,
            ]
        );
    }
}
