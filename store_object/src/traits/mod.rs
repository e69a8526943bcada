//! Traits for mapping and store access
//!
//! `Entity` is implemented by record types (normally through
//! `#[derive(Entity)]`), `StoreDriver` by store handles.

pub mod driver;
pub mod entity;

pub use driver::{ExecuteOutcome, RowSet, StoreDriver};
pub use entity::{put_field, put_key, take_field, Entity};
