//! Unified error type for data layer

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Conflict error (duplicate natural key or unique name)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected by the store (bad reference, malformed custom value)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DataError {
    /// Create a migration failed error
    pub fn migration_failed(backend: &'static str, version: i32, name: &str, error: &str) -> Self {
        Self::MigrationFailed {
            backend,
            version,
            name: name.to_string(),
            error: error.to_string(),
        }
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Sqlite(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

/// Convert from the backend-specific SqliteError type
impl From<crate::data::sqlite::SqliteError> for DataError {
    fn from(e: crate::data::sqlite::SqliteError) -> Self {
        use crate::data::sqlite::SqliteError;
        match e {
            SqliteError::Database(e) => Self::Sqlite(e),
            SqliteError::MigrationFailed {
                version,
                name,
                error,
            } => Self::MigrationFailed {
                backend: "sqlite",
                version,
                name,
                error,
            },
            SqliteError::Io(e) => Self::Io(e),
            SqliteError::Conflict(msg) => Self::Conflict(msg),
            SqliteError::InvalidInput(msg) => Self::InvalidInput(msg),
            SqliteError::NotFound(msg) => Self::NotFound(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteError;

    #[test]
    fn test_migration_failed_error_display() {
        let err = DataError::migration_failed("sqlite", 2, "add_box_game_index", "syntax error");
        assert_eq!(
            err.to_string(),
            "Migration 2 (add_box_game_index) failed on sqlite: syntax error"
        );
    }

    #[test]
    fn test_from_sqlite_error_keeps_kind() {
        let err: DataError = SqliteError::Conflict("system 'SNES' already exists".into()).into();
        assert!(matches!(err, DataError::Conflict(ref m) if m.contains("SNES")));

        let err: DataError = SqliteError::InvalidInput("bad value".into()).into();
        assert!(matches!(err, DataError::InvalidInput(_)));

        let err: DataError = SqliteError::MigrationFailed {
            version: 3,
            name: "x".into(),
            error: "y".into(),
        }
        .into();
        assert!(matches!(
            err,
            DataError::MigrationFailed {
                backend: "sqlite",
                version: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_is_transient() {
        assert!(DataError::Sqlite(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!DataError::Conflict("dup".into()).is_transient());
        assert!(!DataError::migration_failed("sqlite", 1, "test", "error").is_transient());
    }
}
