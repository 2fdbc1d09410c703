//! Data-access layer for the forum.
//!
//! Holds the [`models`], the table [`schema`]s derived from them, and the
//! migratable [`store`]s that apply those schemas to Postgres or SQLite.

pub mod auth;
pub mod errors;
pub mod models;
pub mod schema;
pub mod store;

pub use errors::StoreError;
pub use store::{PgStore, SchemaStore, SqliteStore, connect};
