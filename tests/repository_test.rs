//! Integration tests for the repository against SQLite
//!
//! Covers schema creation, the add/get/update/delete round trips, store
//! defaults, on-update markers and error reporting, using private
//! in-memory databases.

use rowhaus::prelude::*;

#[model]
#[entity(schema = "test")]
pub struct Test {
    #[primary_key]
    pub id: Option<i64>,

    pub value: String,

    #[sql_default("bar")]
    pub has_default: String,
}

#[model]
#[entity(schema = "articles")]
pub struct Article {
    #[primary_key]
    #[auto_increment]
    pub id: Option<i64>,

    #[indexed]
    pub title: String,

    #[unique]
    pub slug: String,

    pub rating: f64,

    pub published: bool,

    pub published_at: Option<DateTime<Utc>>,

    #[sql_default(CurrentTimestamp)]
    #[sql_on_update(CurrentTimestamp)]
    pub updated_at: DateTime<Utc>,

    #[sql_default("draft")]
    #[sql_on_update("edited")]
    pub status: String,
}

/// Entity whose schema name comes from its type name
#[model]
pub struct AuditEntry {
    #[primary_key]
    pub id: i64,
    pub message: String,
}

fn setup() -> RowHaus {
    let rowhaus = RowHaus::in_memory().expect("Failed to open in-memory database");
    rowhaus
        .auto_migrate::<Test>(true)
        .expect("Failed to migrate test");
    rowhaus
        .auto_migrate::<Article>(true)
        .expect("Failed to migrate articles");
    rowhaus
}

fn article_record(title: &str, slug: &str) -> Record {
    Article::create_record([
        ("title", Value::from(title)),
        ("slug", Value::from(slug)),
        ("rating", Value::from(4.5)),
        ("published", Value::from(false)),
        ("published_at", Value::Null),
    ])
    .expect("Failed to build article record")
}

#[test]
fn test_generated_ddl_for_test_entity() {
    let statements = SchemaGenerator::create_statements(Test::metadata(), |literal| {
        format!("'{}'", literal.replace('\'', "''"))
    })
    .unwrap();
    assert_eq!(
        statements,
        vec![
            r#"CREATE TABLE "test" ("id" integer PRIMARY KEY, "value" string NOT NULL, "has_default" string NOT NULL DEFAULT ('bar'))"#
        ]
    );
}

#[test]
fn test_metadata_from_derive() {
    let metadata = Article::metadata();
    assert_eq!(metadata.schema_name(), "articles");
    assert_eq!(metadata.primary_key_field().unwrap().name(), "id");

    let names: Vec<_> = metadata.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        [
            "id",
            "title",
            "slug",
            "rating",
            "published",
            "published_at",
            "updated_at",
            "status"
        ]
    );
    assert!(metadata.find_field("id").unwrap().is_nullable());
    assert!(!metadata.find_field("title").unwrap().is_nullable());
    assert_eq!(metadata.find_field("rating").unwrap().kind(), &FieldKind::Real);

    assert_eq!(AuditEntry::metadata().schema_name(), "audit_entry");
}

#[test]
fn test_create_requires_value() {
    let err = Test::create_record(Vec::<(&str, Value)>::new()).unwrap_err();
    assert!(matches!(err, MapperError::Validation { .. }));
    assert_eq!(err.field(), Some("value"));

    let record = Test::create_record([("value", "foo")]).unwrap();
    assert!(!record.is_initialized("has_default"));
}

#[test]
fn test_add_applies_store_default() {
    let rowhaus = setup();
    let tests = rowhaus.repository::<Test>();

    let record = Test::create_record([("value", "foo")]).unwrap();
    let added = tests.add_record(record).unwrap();

    assert_eq!(added.id, Some(1));
    assert_eq!(added.value, "foo");
    assert_eq!(added.has_default, "bar");
}

#[test]
fn test_add_typed_entity_round_trip() {
    let rowhaus = setup();
    let tests = rowhaus.repository::<Test>();

    let entity = Test {
        id: None,
        value: "hello".to_string(),
        has_default: "explicit".to_string(),
    };
    let added = tests.add(&entity).unwrap();
    assert!(added.id.is_some());
    assert_eq!(added.value, entity.value);
    assert_eq!(added.has_default, entity.has_default);

    let fetched = tests.get(added.id).unwrap();
    assert_eq!(fetched.value, "hello");
}

#[test]
fn test_add_with_explicit_key() {
    let rowhaus = setup();
    let tests = rowhaus.repository::<Test>();

    let added = tests
        .add(&Test {
            id: Some(42),
            value: "keyed".to_string(),
            has_default: "x".to_string(),
        })
        .unwrap();
    assert_eq!(added.id, Some(42));
}

#[test]
fn test_get_missing_is_not_found() {
    let rowhaus = setup();
    let err = rowhaus.repository::<Test>().get(999).unwrap_err();
    assert!(matches!(err, MapperError::NotFound { .. }));
}

#[test]
fn test_get_all_in_store_order() {
    let rowhaus = setup();
    let tests = rowhaus.repository::<Test>();
    for value in ["a", "b", "c"] {
        tests
            .add_record(Test::create_record([("value", value)]).unwrap())
            .unwrap();
    }

    let all = tests.get_all().unwrap();
    let values: Vec<_> = all.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["a", "b", "c"]);
}

#[test]
fn test_get_all_on_empty_table() {
    let rowhaus = setup();
    assert!(rowhaus.repository::<Test>().get_all().unwrap().is_empty());
}

#[test]
fn test_article_defaults_and_types() {
    let rowhaus = setup();
    let articles = rowhaus.repository::<Article>();

    let before = Utc::now().timestamp() - 5;
    let added = articles.add_record(article_record("Hello", "hello")).unwrap();

    assert_eq!(added.title, "Hello");
    assert_eq!(added.rating, 4.5);
    assert!(!added.published);
    assert_eq!(added.published_at, None);
    assert_eq!(added.status, "draft");
    assert!(added.updated_at.timestamp() >= before);
}

#[test]
fn test_update_applies_on_update_markers() {
    let rowhaus = setup();
    let articles = rowhaus.repository::<Article>();

    let mut article = articles.add_record(article_record("Draft", "draft")).unwrap();
    assert_eq!(article.status, "draft");

    let published_at = Utc::now();
    article.title = "Published".to_string();
    article.published = true;
    article.published_at = Some(published_at);
    article.status = "ignored".to_string();

    let updated = articles.update(&article).unwrap();
    assert_eq!(updated.id, article.id);
    assert_eq!(updated.title, "Published");
    assert!(updated.published);
    assert_eq!(
        updated.published_at.map(|dt| dt.timestamp_micros()),
        Some(published_at.timestamp_micros())
    );
    // sql_on_update literal wins over the in-memory value
    assert_eq!(updated.status, "edited");
}

#[test]
fn test_update_without_key_fails() {
    let rowhaus = setup();
    let err = rowhaus
        .repository::<Test>()
        .update(&Test {
            id: None,
            value: "x".to_string(),
            has_default: "y".to_string(),
        })
        .unwrap_err();
    assert_eq!(err.field(), Some("id"));
}

#[test]
fn test_delete_removes_row() {
    let rowhaus = setup();
    let tests = rowhaus.repository::<Test>();
    let added = tests
        .add_record(Test::create_record([("value", "gone")]).unwrap())
        .unwrap();

    assert_eq!(tests.delete(&added).unwrap(), 1);
    assert!(matches!(
        tests.get(added.id),
        Err(MapperError::NotFound { .. })
    ));
    assert_eq!(tests.delete(&added).unwrap(), 0);
}

#[test]
fn test_unique_violation_is_driver_error() {
    let rowhaus = setup();
    let articles = rowhaus.repository::<Article>();
    articles.add_record(article_record("One", "same")).unwrap();

    let err = articles
        .add_record(article_record("Two", "same"))
        .unwrap_err();
    assert!(matches!(err, MapperError::Driver(_)));
}

#[test]
fn test_missing_required_column_is_rejected_by_store() {
    let rowhaus = setup();
    let mut record = Record::new();
    record.set("has_default", "only default");
    let err = rowhaus
        .repository::<Test>()
        .add_record(record)
        .unwrap_err();
    assert!(matches!(err, MapperError::Driver(_)));
}

#[test]
fn test_numeric_text_round_trips() {
    let rowhaus = setup();
    let tests = rowhaus.repository::<Test>();
    let added = tests
        .add_record(Test::create_record([("value", "123")]).unwrap())
        .unwrap();
    assert_eq!(added.value, "123");
}

#[test]
fn test_index_is_created() {
    let rowhaus = setup();
    let rows = rowhaus
        .driver()
        .query(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name = ?",
            &[SqlValue::Text("idx_title".to_string())],
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_auto_migrate_keeps_existing_table() {
    let rowhaus = setup();
    let tests = rowhaus.repository::<Test>();
    tests
        .add_record(Test::create_record([("value", "kept")]).unwrap())
        .unwrap();

    rowhaus.auto_migrate::<Test>(false).unwrap();
    assert_eq!(tests.get_all().unwrap().len(), 1);

    rowhaus.auto_migrate::<Test>(true).unwrap();
    assert!(tests.get_all().unwrap().is_empty());
}

#[test]
fn test_schema_exists() {
    let rowhaus = RowHaus::in_memory().unwrap();
    assert!(!rowhaus.schema_exists::<AuditEntry>().unwrap());
    rowhaus.auto_migrate::<AuditEntry>(false).unwrap();
    assert!(rowhaus.schema_exists::<AuditEntry>().unwrap());
    rowhaus.health_check().unwrap();
}
