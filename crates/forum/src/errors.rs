use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Unsupported database URL scheme: {0}")]
    UnsupportedUrl(String),
}
