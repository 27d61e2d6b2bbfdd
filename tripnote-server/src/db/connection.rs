use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;

use super::schema::{DROP_ALL, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

/// Unicode lowercase, for case-insensitive matching beyond ASCII.
/// SQLite's own `lower()` and `LIKE` only fold A-Z.
pub const UNICODE_LOWER_FN: &str = "unicode_lower";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

/// Scalar functions every pooled connection provides
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

impl Database {
    /// Create a new database connection pool
    ///
    /// Every pooled connection has foreign key enforcement switched on. An
    /// in-memory database is private to its connection, so the pool for
    /// ":memory:" holds exactly one.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let in_memory = Self::is_memory_path(path.as_ref());
        let manager = if in_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path)
        }
        .with_init(|c| {
            c.execute_batch("PRAGMA foreign_keys = ON;")?;
            register_functions(c)
        });

        let mut builder = Pool::builder();
        if in_memory {
            builder = builder.max_size(1);
        }
        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    fn is_memory_path(path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        path_str.trim().eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Drop every table and recreate the schema
    pub fn reset(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(DROP_ALL)
            .context("Failed to drop existing tables")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to recreate database schema")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
