//! SQLite persistence layer for Pager.
//!
//! This crate stores on-call users, rotations, assignments and escalations
//! using SQLx with SQLite. All four tables share one generic CRUD path
//! ([`Repository`] and [`Transaction`]), driven by the [`Entity`] description
//! of each model.
//!
//! The one hard rule it owns: a rotation has at most one assignment with
//! `is_current` set. Creating or updating a current assignment clears the flag
//! on every other assignment of that rotation in the same transaction.
//!
//! # Example
//!
//! ```no_run
//! use database::{Assignment, Database, Rotation, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:pager.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let mut user = User::new("alice", "Alice");
//!     db.users().create(&mut user).await?;
//!
//!     let mut rotation = Rotation::new("Primary", "", "acme/repo");
//!     db.rotations().create(&mut rotation).await?;
//!
//!     // Clears any other current assignment of the rotation
//!     let mut assignment = Assignment::new(&rotation.id, &user.id, true);
//!     db.assignments().create(&mut assignment).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod assignment;
pub mod entity;
pub mod error;
pub mod escalation;
pub mod models;
pub mod repository;
pub mod rotation;
pub mod transaction;
pub mod user;

pub use entity::{Entity, ExclusiveFlag};
pub use error::{DatabaseError, Result};
pub use models::{Assignment, Escalation, EscalationStatus, Rotation, User};
pub use repository::Repository;
pub use transaction::Transaction;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Connection, SqlitePool};

/// Tables the on-call schema must provide.
const REQUIRED_TABLES: [&str; 4] = ["users", "rotations", "assignments", "escalations"];

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Webhook dispatch and the sweeper write concurrently; SQLite serialises
    /// the writers, so a small pool is enough.
    const DEFAULT_POOL_SIZE: u32 = 8;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/pager.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Check that every on-call table exists.
    pub async fn ensure_schema(&self) -> Result<()> {
        for table in REQUIRED_TABLES {
            let found = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*) FROM sqlite_master
                WHERE type = 'table' AND name = ?
                "#,
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;

            if found == 0 {
                return Err(DatabaseError::SchemaMissing(table));
            }
        }
        Ok(())
    }

    /// Round-trip a connection to check the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    /// Start a transaction spanning any of the entity tables.
    pub async fn begin(&self) -> Result<Transaction> {
        Transaction::begin(&self.pool).await
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.pool.clone())
    }

    pub fn rotations(&self) -> Repository<Rotation> {
        Repository::new(self.pool.clone())
    }

    pub fn assignments(&self) -> Repository<Assignment> {
        Repository::new(self.pool.clone())
    }

    pub fn escalations(&self) -> Repository<Escalation> {
        Repository::new(self.pool.clone())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
