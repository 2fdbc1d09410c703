//! Database integration for seeding the forum.
//!
//! The [`Seeder`] resets the forum tables on any [`forum::SchemaStore`] and
//! inserts the configured users and posts.

mod seeder;

pub use seeder::{SeedError, SeedReport, SeededPost, SeededUser, Seeder, load};
