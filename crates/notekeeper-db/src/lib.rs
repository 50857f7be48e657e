//! # notekeeper-db
//!
//! Storage layer for notekeeper.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL implementations of the core repositories
//! - An in-memory store with the same semantics
//! - Argon2id password hashing
//!
//! ## Example
//!
//! ```rust,ignore
//! use notekeeper_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notekeeper").await?;
//!     db.migrate().await?;
//!     Ok(())
//! }
//! ```
pub mod credentials;
pub mod memory;
pub mod notes;
pub mod pool;
pub mod users;

// Always compiled so integration tests (in tests/) can share the fixtures
pub mod test_fixtures;

pub use notekeeper_core::*;

pub use credentials::{Argon2PasswordHasher, HashParams};
pub use memory::MemoryStore;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, PoolConfig};
pub use users::PgUserRepository;

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// PostgreSQL database context with both repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub users: PgUserRepository,
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
