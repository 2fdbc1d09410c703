use std::{collections::HashSet, str::FromStr};

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use time::OffsetDateTime;
use tracing::debug;

use super::SchemaStore;
use crate::{
    errors::StoreError,
    models::{NewPost, NewUser},
    schema::{self, DatabaseBackend, ForeignKey, TableSchema},
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `database_url` with
    /// foreign keys enforced.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// In-memory database unique to this store. sqlx opens `:memory:` as a
    /// named shared-cache database that is discarded when its last
    /// connection closes, so the pool keeps one connection that never idles
    /// out or expires.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the pool for advanced usage.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn execute(&self, sql: &str) -> Result<(), StoreError> {
        debug!("{sql}");
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn existing_columns(&self, table: &str) -> Result<HashSet<String>, StoreError> {
        let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?1)")
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(columns.into_iter().collect())
    }
}

#[async_trait]
impl SchemaStore for SqliteStore {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    async fn drop_tables(&self, tables: &[&str]) -> Result<(), StoreError> {
        for table in tables {
            self.execute(&schema::drop_table_sql(self.backend(), table))
                .await?;
        }
        Ok(())
    }

    async fn auto_migrate(&self, tables: &[TableSchema]) -> Result<(), StoreError> {
        for table in tables {
            self.execute(&table.create_sql(self.backend())).await?;

            let existing = self.existing_columns(table.name).await?;
            for column in table.missing_columns(&existing) {
                self.execute(&table.add_column_sql(self.backend(), column))
                    .await?;
            }
        }
        Ok(())
    }

    async fn add_foreign_key(
        &self,
        table: &TableSchema,
        fk: &ForeignKey,
    ) -> Result<(), StoreError> {
        // SQLite has no ALTER TABLE ... ADD CONSTRAINT
        let mut tx = self.pool.begin().await?;
        for sql in schema::rebuild_with_foreign_key_sql(table, fk) {
            debug!("{sql}");
            sqlx::query(&sql).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<i64, StoreError> {
        let now = OffsetDateTime::now_utc();
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<i64, StoreError> {
        let now = OffsetDateTime::now_utc();
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, content, author_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, User};
    use crate::schema::Migratable;

    async fn migrated_store() -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .auto_migrate(&[User::schema(), Post::schema()])
            .await
            .unwrap();
        store
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "$argon2id$v=19$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn test_auto_migrate_is_repeatable() {
        let store = migrated_store().await;
        store
            .auto_migrate(&[User::schema(), Post::schema()])
            .await
            .unwrap();

        let columns = store.existing_columns("users").await.unwrap();
        assert_eq!(columns.len(), User::schema().columns.len());
    }

    #[tokio::test]
    async fn test_auto_migrate_adds_missing_column() {
        let store = SqliteStore::in_memory().await.unwrap();
        sqlx::query(r#"CREATE TABLE "users" ("id" INTEGER PRIMARY KEY AUTOINCREMENT, "username" VARCHAR(255))"#)
            .execute(store.pool())
            .await
            .unwrap();

        store.auto_migrate(&[User::schema()]).await.unwrap();

        let columns = store.existing_columns("users").await.unwrap();
        for column in ["email", "password", "created_at", "updated_at"] {
            assert!(columns.contains(column), "missing {column}");
        }
    }

    #[tokio::test]
    async fn test_foreign_key_rejects_orphan_post() {
        let store = migrated_store().await;
        store
            .add_foreign_key(&Post::schema(), &Post::author_foreign_key())
            .await
            .unwrap();

        let orphan = NewPost {
            title: "Orphan".to_string(),
            content: "nobody wrote this".to_string(),
            author_id: 999,
        };
        assert!(matches!(
            store.insert_post(&orphan).await,
            Err(StoreError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_key_rebuild_keeps_rows() {
        let store = migrated_store().await;
        let author_id = store.insert_user(&new_user("early")).await.unwrap();
        store
            .insert_post(&NewPost {
                title: "Before the constraint".to_string(),
                content: "still here".to_string(),
                author_id,
            })
            .await
            .unwrap();

        store
            .add_foreign_key(&Post::schema(), &Post::author_foreign_key())
            .await
            .unwrap();

        let posts: Vec<Post> = sqlx::query_as("SELECT * FROM posts")
            .fetch_all(store.pool())
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author_id, author_id);
    }

    #[tokio::test]
    async fn test_insert_returns_generated_ids() {
        let store = migrated_store().await;
        let first = store.insert_user(&new_user("first")).await.unwrap();
        let second = store.insert_user(&new_user("second")).await.unwrap();
        assert_ne!(first, second);

        let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
            .bind(second)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(user.username, "second");
        assert_eq!(user.email, "second@example.com");
    }

    #[tokio::test]
    async fn test_drop_tables_ignores_missing() {
        let store = migrated_store().await;
        store
            .drop_tables(&["posts", "users", "likes", "comments"])
            .await
            .unwrap();

        let remaining: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'posts')",
        )
        .fetch_one(store.pool())
        .await
        .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_separate() {
        let migrated = migrated_store().await;
        let fresh = SqliteStore::in_memory().await.unwrap();

        migrated.insert_user(&new_user("kept")).await.unwrap();
        assert!(fresh.existing_columns("users").await.unwrap().is_empty());

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(migrated.pool())
            .await
            .unwrap();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn test_migrated_columns_keep_constraints() {
        let store = migrated_store().await;
        store.insert_user(&new_user("taken")).await.unwrap();

        let duplicate = NewUser {
            email: "other@example.com".to_string(),
            ..new_user("taken")
        };
        assert!(matches!(
            store.insert_user(&duplicate).await,
            Err(StoreError::Database(_))
        ));

        let missing_title = sqlx::query(
            r#"INSERT INTO "posts" ("content", "author_id", "created_at", "updated_at") VALUES ('x', 1, '', '')"#,
        )
        .execute(store.pool())
        .await;
        assert!(missing_title.is_err());
    }
}
