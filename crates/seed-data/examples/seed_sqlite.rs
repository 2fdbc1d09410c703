//! Example: Seed a local SQLite file and read the posts back with their authors.
//!
//! Run with:
//! ```
//! cargo run --example seed_sqlite
//! ```

use seed_data::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:forum.db".to_string());
    let store = SqliteStore::connect(&database_url).await?;

    tracing::info!("Connected to {database_url}");

    let config = SeedConfig::default().with_password("forum.rs");
    let report = load(&store, &config).await?;

    tracing::info!("Scenario seeded successfully!");
    tracing::info!("  Users: {}", report.users.len());
    tracing::info!("  Posts: {}", report.posts.len());

    // Read the posts back through the foreign key
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT posts.title, users.username
        FROM posts
        JOIN users ON users.id = posts.author_id
        ORDER BY posts.id
        "#,
    )
    .fetch_all(store.pool())
    .await?;

    for (title, author) in rows {
        tracing::info!("  {title:?} by {author}");
    }

    Ok(())
}
