// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Hoard";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "hoard";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".hoard";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "hoard.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "HOARD_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "HOARD_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "HOARD_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "HOARD_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8744;

/// Default request body limit (1 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "HOARD_DATA_DIR";

/// Environment variable for the SQLite connection pool size
pub const ENV_DB_MAX_CONNECTIONS: &str = "HOARD_DB_MAX_CONNECTIONS";

// =============================================================================
// SQLite
// =============================================================================

/// Database file name inside the sqlite data subdirectory
pub const SQLITE_DB_FILENAME: &str = "hoard.db";

/// Default maximum pool connections
pub const SQLITE_DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Busy timeout before a locked write gives up
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// Page cache size (negative = KiB)
pub const SQLITE_CACHE_SIZE: &str = "-16000";

/// Pages between automatic WAL checkpoints
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// Interval for the background WAL checkpoint task
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Filters
// =============================================================================

/// Environment variable for the maximum number of filters per request
pub const ENV_MAX_FILTERS: &str = "HOARD_MAX_FILTERS";

/// Default maximum number of filters per request
pub const DEFAULT_MAX_FILTERS: usize = 50;

/// Maximum size of the `filters` query parameter in bytes (64KB)
pub const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

// =============================================================================
// Backup Import
// =============================================================================

/// Environment variable for the maximum backup import body size
pub const ENV_IMPORT_MAX_BODY_BYTES: &str = "HOARD_IMPORT_MAX_BODY_BYTES";

/// Default maximum backup import body size (32 MiB)
pub const DEFAULT_IMPORT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
