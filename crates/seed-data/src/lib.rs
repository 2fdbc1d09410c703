//! Seed data for the forum.
//!
//! Resets the forum schema and inserts a small set of users, each with the
//! post they author.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let store = forum::connect(&database_url).await?;
//! let config = SeedConfig::default().with_password("dev-only");
//! let report = load(store.as_ref(), &config).await?;
//! ```

pub mod config;
pub mod db;

pub use db::{SeedError, SeedReport, Seeder, load};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{SeedConfig, SeedEntry, SeedPost, SeedUser};
    pub use crate::db::{SeedError, SeedReport, SeededPost, SeededUser, Seeder, load};
    pub use forum::{SchemaStore, SqliteStore, PgStore};
}
