//! SQLite error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl SqliteError {
    /// Map a unique-constraint violation to `Conflict`, pass everything else through
    pub fn unique_or(e: sqlx::Error, conflict_msg: impl FnOnce() -> String) -> Self {
        let is_unique = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if is_unique {
            Self::Conflict(conflict_msg())
        } else {
            Self::Database(e)
        }
    }
}
