//! # Basic Usage Example
//!
//! This example walks through the core RowHaus workflow:
//! - Defining entities with the `#[model]` macro and field markers
//! - Creating the schema with `auto_migrate`
//! - Add, get, update and delete through a `Repository`
//! - Store defaults and on-update values coming back from the database
//!
//! Run with `cargo run --example basic_usage`.

use rowhaus::prelude::*;

/// A simple user entity
#[model]
#[entity(schema = "users")]
pub struct User {
    /// Primary key, assigned by the store when left empty
    #[primary_key]
    #[auto_increment]
    pub id: Option<i64>,

    #[unique]
    pub email: String,

    #[indexed]
    pub name: String,

    /// Optional field, stored as a nullable column
    pub phone: Option<String>,

    pub age: Option<i64>,

    #[sql_default("active")]
    pub status: String,

    #[sql_default(CurrentTimestamp)]
    #[sql_on_update(CurrentTimestamp)]
    pub updated_at: DateTime<Utc>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("RowHaus Basic Usage Example");
    println!("===========================");

    // 1. Open a private in-memory database
    let rowhaus = RowHaus::in_memory()?;
    rowhaus.health_check()?;
    println!("\nStep 1: opened in-memory SQLite database");

    // 2. Create the table from the entity's metadata
    let statements = SchemaGenerator::create_statements(User::metadata(), |literal| {
        rowhaus.driver().quote(literal)
    })?;
    for statement in &statements {
        println!("  {}", statement);
    }
    rowhaus.auto_migrate::<User>(true)?;
    println!("Step 2: migrated '{}'", User::metadata().schema_name());

    let users = rowhaus.repository::<User>();

    // 3. CREATE - typed entities and partial records
    println!("\nStep 3: creating records");
    let alice = users.add(&User {
        id: None,
        email: "alice@example.com".to_string(),
        name: "Alice Johnson".to_string(),
        phone: Some("+1-555-0101".to_string()),
        age: Some(28),
        status: "invited".to_string(),
        updated_at: Utc::now(),
    })?;
    println!("  created #{:?} {} ({})", alice.id, alice.name, alice.email);

    // Fields left out of a record pick up their store defaults
    let bob = users.add_record(User::create_record([
        ("email", Value::from("bob@example.com")),
        ("name", Value::from("Bob Smith")),
        ("phone", Value::Null),
        ("age", Value::from(35_i64)),
    ])?)?;
    println!(
        "  created #{:?} {} with default status '{}' at {}",
        bob.id, bob.name, bob.status, bob.updated_at
    );

    // 4. READ
    println!("\nStep 4: reading records");
    let fetched = users.get(alice.id)?;
    println!("  found {} (age {:?})", fetched.name, fetched.age);

    for user in users.get_all()? {
        println!("  - {}: {} (phone {:?})", user.name, user.email, user.phone);
    }

    match users.get(999) {
        Err(MapperError::NotFound { .. }) => println!("  no user with key 999"),
        Err(e) => return Err(e.into()),
        Ok(user) => println!("  unexpected user {}", user.name),
    }

    // 5. UPDATE
    println!("\nStep 5: updating records");
    let mut changed = bob.clone();
    changed.phone = Some("+1-555-0102".to_string());
    changed.age = Some(36);
    let updated = users.update(&changed)?;
    println!(
        "  updated {} (phone {:?}, age {:?})",
        updated.name, updated.phone, updated.age
    );

    // 6. DELETE
    println!("\nStep 6: deleting records");
    let removed = users.delete(&alice)?;
    println!("  deleted {} row(s)", removed);
    println!("  remaining users: {}", users.get_all()?.len());

    println!("\nBasic usage demo complete");
    Ok(())
}
