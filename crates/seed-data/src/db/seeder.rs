//! Database seeding utilities.

use forum::auth::hash_password;
use forum::models::{Comment, Like, NewPost, NewUser, Post, User};
use forum::schema::{Entity, Migratable};
use forum::{SchemaStore, StoreError};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{SeedConfig, password_for};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Invalid seed config: {0}")]
    InvalidConfig(String),
    #[error("cannot drop table")]
    DropTables(#[source] StoreError),
    #[error("cannot migrate table")]
    Migrate(#[source] StoreError),
    #[error("attaching foreign key error")]
    ForeignKey(#[source] StoreError),
    #[error("cannot seed users table (entry {index})")]
    SeedUser { index: usize, source: StoreError },
    #[error("cannot seed posts table (entry {index})")]
    SeedPost { index: usize, source: StoreError },
}

/// A user as inserted by the seeder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededPost {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
}

/// What a successful run inserted, index-aligned with the config entries.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub users: Vec<SeededUser>,
    pub posts: Vec<SeededPost>,
}

/// Tables dropped before migrating, in order. Every run resets all of them,
/// whatever the seed input holds.
const RESET_TABLES: [&str; 4] = [Post::TABLE, User::TABLE, Like::TABLE, Comment::TABLE];

/// Resets the forum tables and fills them with seed data.
pub struct Seeder<'a> {
    store: &'a dyn SchemaStore,
}

impl<'a> Seeder<'a> {
    /// Creates a new seeder working against the given store.
    pub fn new(store: &'a dyn SchemaStore) -> Self {
        Self { store }
    }

    /// Runs the full sequence: drop, migrate, attach the author foreign key,
    /// then insert every entry. Stops at the first failure; nothing is rolled
    /// back.
    pub async fn run(&self, config: &SeedConfig) -> Result<SeedReport, SeedError> {
        config.validate().map_err(SeedError::InvalidConfig)?;

        self.drop_tables().await?;
        self.migrate().await?;
        self.attach_author_key().await?;
        self.seed_entries(config).await
    }

    async fn drop_tables(&self) -> Result<(), SeedError> {
        info!("Dropping tables: {}", RESET_TABLES.join(", "));

        self.store
            .drop_tables(&RESET_TABLES)
            .await
            .map_err(SeedError::DropTables)
    }

    async fn migrate(&self) -> Result<(), SeedError> {
        info!("Migrating {} and {}", User::schema().name, Post::schema().name);

        self.store
            .auto_migrate(&[User::schema(), Post::schema()])
            .await
            .map_err(SeedError::Migrate)
    }

    async fn attach_author_key(&self) -> Result<(), SeedError> {
        let fk = Post::author_foreign_key();
        info!("Attaching foreign key {}", fk.name());

        self.store
            .add_foreign_key(&Post::schema(), &fk)
            .await
            .map_err(SeedError::ForeignKey)
    }

    /// Inserts each user, then the post they author.
    async fn seed_entries(&self, config: &SeedConfig) -> Result<SeedReport, SeedError> {
        info!("Seeding {} users with their posts...", config.entries.len());

        let mut report = SeedReport::default();

        for (index, entry) in config.entries.iter().enumerate() {
            let password = password_for(&entry.user, &mut rand::thread_rng());
            let password_hash = hash_password(&password)
                .map_err(|source| SeedError::SeedUser { index, source })?;

            let user = NewUser {
                username: entry.user.username.clone(),
                email: entry.user.email.clone(),
                password_hash,
            };
            let author_id = self
                .store
                .insert_user(&user)
                .await
                .map_err(|source| SeedError::SeedUser { index, source })?;
            debug!("Inserted user {} with id {author_id}", user.username);

            let post = NewPost {
                title: entry.post.title.clone(),
                content: entry.post.content.clone(),
                author_id,
            };
            let post_id = self
                .store
                .insert_post(&post)
                .await
                .map_err(|source| SeedError::SeedPost { index, source })?;
            debug!("Inserted post {:?} with id {post_id}", post.title);

            report.users.push(SeededUser {
                id: author_id,
                username: user.username,
                email: user.email,
            });
            report.posts.push(SeededPost {
                id: post_id,
                title: post.title,
                author_id,
            });
        }

        info!(
            "Seeded {} users and {} posts",
            report.users.len(),
            report.posts.len()
        );
        Ok(report)
    }
}

/// Seeds `store` with `config`. Shorthand for [`Seeder::run`].
pub async fn load(store: &dyn SchemaStore, config: &SeedConfig) -> Result<SeedReport, SeedError> {
    Seeder::new(store).run(config).await
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_reset_covers_every_forum_table() {
        assert_eq!(RESET_TABLES, ["posts", "users", "likes", "comments"]);
    }

    #[test]
    fn test_error_message_leaves_cause_to_source() {
        let err = SeedError::SeedUser {
            index: 1,
            source: StoreError::PasswordHash("bad salt".to_string()),
        };
        assert_eq!(err.to_string(), "cannot seed users table (entry 1)");

        let source = err.source().expect("cause is kept as the source");
        assert!(source.to_string().contains("bad salt"), "{source}");

        let err = SeedError::ForeignKey(StoreError::UnsupportedUrl("mysql".to_string()));
        assert_eq!(err.to_string(), "attaching foreign key error");
    }
}
