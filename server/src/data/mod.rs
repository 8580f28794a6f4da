//! Data storage layer
//!
//! - `sqlite` - embedded collection store (custom fields, toys, systems, games, boxes)
//! - `types` - row and input types shared across the layer
//! - `traits` - `CollectionRepository`, the backend-agnostic interface
//! - `error` - unified error type

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteService;

pub use error::DataError;

pub use traits::CollectionRepository;

pub use types::{CompiledQuery, CustomFieldType, FilterValue};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::config::DatabaseConfig;
use crate::core::storage::AppStorage;

/// Transactional database service enum
///
/// Wraps the backend-specific service. Services are stored as Arc so
/// repository handles can be handed out cheaply.
pub enum TransactionalService {
    /// SQLite backend (embedded)
    Sqlite(Arc<SqliteService>),
}

impl TransactionalService {
    pub async fn init(storage: &AppStorage, config: &DatabaseConfig) -> Result<Self, DataError> {
        let service = SqliteService::init(storage, config.max_connections).await?;
        Ok(Self::Sqlite(Arc::new(service)))
    }

    /// Wrap an already opened SQLite service
    pub fn from_sqlite(service: Arc<SqliteService>) -> Self {
        Self::Sqlite(service)
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &sqlx::SqlitePool {
        match self {
            Self::Sqlite(s) => s.pool(),
        }
    }

    /// Run a WAL checkpoint
    pub async fn checkpoint(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.checkpoint().await.map_err(Into::into),
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
        }
    }

    /// Start the background checkpoint task
    pub fn start_checkpoint_task(&self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        match self {
            Self::Sqlite(s) => s.start_checkpoint_task(shutdown_rx),
        }
    }

    /// Get the repository trait object for data operations
    pub fn repository(&self) -> Box<dyn CollectionRepository + Send + Sync> {
        match self {
            Self::Sqlite(s) => Box::new(Arc::clone(s)),
        }
    }

    /// In-memory SQLite service with the current schema
    #[cfg(test)]
    pub async fn in_memory() -> Arc<Self> {
        Arc::new(Self::from_sqlite(SqliteService::in_memory().await))
    }
}
