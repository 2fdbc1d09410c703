use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use time::OffsetDateTime;
use tracing::debug;

use super::SchemaStore;
use crate::{
    errors::StoreError,
    models::{NewPost, NewUser},
    schema::{self, DatabaseBackend, ForeignKey, TableSchema},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the pool for advanced usage.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn execute(&self, sql: &str) -> Result<(), StoreError> {
        debug!("{sql}");
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn existing_columns(&self, table: &str) -> Result<HashSet<String>, StoreError> {
        let columns: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT column_name::text
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(columns.into_iter().collect())
    }
}

#[async_trait]
impl SchemaStore for PgStore {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
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
        _table: &TableSchema,
        fk: &ForeignKey,
    ) -> Result<(), StoreError> {
        self.execute(&fk.add_sql()).await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<i64, StoreError> {
        let now = OffsetDateTime::now_utc();
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
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
            VALUES ($1, $2, $3, $4, $4)
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
