mod models;

pub mod error;
pub mod geo;
pub mod properties;
pub mod requests;

pub use error::DomainError;
pub use models::*;

use anyhow::Result;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("lettr.db");

    info!("Initializing database at {}", db_path.display());

    // WAL for concurrent readers; foreign keys must be on for the shortlist
    // and request cascades, and the option applies to every pooled connection
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    execute_sql(pool, include_str!("../../migrations/001_users.sql")).await?;
    execute_sql(pool, include_str!("../../migrations/002_properties.sql")).await?;
    execute_sql(pool, include_str!("../../migrations/003_requests.sql")).await?;
    execute_sql(pool, include_str!("../../migrations/004_audit_logs.sql")).await?;

    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for operation tests: an in-memory database with the
    //! full schema applied, plus seed helpers.

    use super::*;

    /// Fresh in-memory pool. A single never-recycled connection keeps every
    /// query on the same memory database.
    pub async fn test_pool() -> DbPool {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("in-memory pool");

        run_migrations(&pool).await.expect("migrations");
        pool
    }

    pub async fn seed_user(pool: &DbPool, email: &str, role: &str) -> User {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, phone, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind("$argon2id$test")
        .bind("Test User")
        .bind("+46700000000")
        .bind(role)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .expect("seed user");

        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
            .expect("fetch seeded user")
    }

    pub fn property_input(title: &str, price: f64, bedrooms: i64) -> CreatePropertyRequest {
        CreatePropertyRequest {
            title: title.to_string(),
            description: "A bright flat close to transit".to_string(),
            address: "12 Elm Street".to_string(),
            price,
            bedrooms,
            bathrooms: 1,
            location: GeoPoint::new(18.0686, 59.3293),
            images: vec!["https://cdn.example.com/front.jpg".to_string()],
        }
    }
}
