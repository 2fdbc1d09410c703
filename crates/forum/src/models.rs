use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::schema::{
    ColumnDef, ColumnType, Entity, ForeignKey, Migratable, ReferenceAction, TableSchema,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never the plain password.
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Entity for User {
    const TABLE: &'static str = "users";
}

impl Migratable for User {
    fn schema() -> TableSchema {
        TableSchema::new(
            Self::TABLE,
            vec![
                ColumnDef::new("id", ColumnType::Id),
                ColumnDef::new("username", ColumnType::Varchar(255))
                    .not_null()
                    .unique(),
                ColumnDef::new("email", ColumnType::Varchar(100))
                    .not_null()
                    .unique(),
                ColumnDef::new("password", ColumnType::Varchar(255)).not_null(),
                ColumnDef::new("created_at", ColumnType::Timestamp).not_null(),
                ColumnDef::new("updated_at", ColumnType::Timestamp).not_null(),
            ],
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Post {
    /// Foreign key tying every post to its author. Deleting or re-keying the
    /// user carries over to their posts.
    pub fn author_foreign_key() -> ForeignKey {
        ForeignKey {
            table: Self::TABLE,
            column: "author_id",
            ref_table: User::TABLE,
            ref_column: "id",
            on_delete: ReferenceAction::Cascade,
            on_update: ReferenceAction::Cascade,
        }
    }
}

impl Entity for Post {
    const TABLE: &'static str = "posts";
}

impl Migratable for Post {
    fn schema() -> TableSchema {
        TableSchema::new(
            Self::TABLE,
            vec![
                ColumnDef::new("id", ColumnType::Id),
                ColumnDef::new("title", ColumnType::Varchar(255))
                    .not_null()
                    .unique(),
                ColumnDef::new("content", ColumnType::Text).not_null(),
                ColumnDef::new("author_id", ColumnType::BigInt).not_null(),
                ColumnDef::new("created_at", ColumnType::Timestamp).not_null(),
                ColumnDef::new("updated_at", ColumnType::Timestamp).not_null(),
            ],
        )
    }
}

/// Likes live in their own table; only the table itself matters here.
#[derive(Debug, Clone, Copy)]
pub struct Like;

impl Entity for Like {
    const TABLE: &'static str = "likes";
}

#[derive(Debug, Clone, Copy)]
pub struct Comment;

impl Entity for Comment {
    const TABLE: &'static str = "comments";
}

/// User row ready for insertion; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
}
