use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_IMPORT_MAX_BODY_BYTES,
    DEFAULT_MAX_FILTERS, DEFAULT_PORT, SQLITE_DEFAULT_MAX_CONNECTIONS,
};

// =============================================================================
// File Config Structs (parsed from JSON)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub max_connections: Option<u32>,
}

/// Filter configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FiltersFileConfig {
    pub max_filters: Option<usize>,
}

/// Backup import configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ImportFileConfig {
    pub max_body_bytes: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub filters: Option<FiltersFileConfig>,
    pub import: Option<ImportFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.max_connections.is_some() {
                tracing::trace!(
                    max_connections = ?database.max_connections,
                    "Merging database.max_connections"
                );
                current.max_connections = database.max_connections;
            }
        }

        if let Some(filters) = other.filters {
            let current = self.filters.get_or_insert_with(FiltersFileConfig::default);
            if filters.max_filters.is_some() {
                tracing::trace!(max_filters = ?filters.max_filters, "Merging filters.max_filters");
                current.max_filters = filters.max_filters;
            }
        }

        if let Some(import) = other.import {
            let current = self.import.get_or_insert_with(ImportFileConfig::default);
            if import.max_body_bytes.is_some() {
                tracing::trace!(
                    max_body_bytes = ?import.max_body_bytes,
                    "Merging import.max_body_bytes"
                );
                current.max_body_bytes = import.max_body_bytes;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: SQLITE_DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Filter configuration
#[derive(Debug, Clone)]
pub struct FiltersConfig {
    pub max_filters: usize,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            max_filters: DEFAULT_MAX_FILTERS,
        }
    }
}

/// Backup import configuration
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub max_body_bytes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_IMPORT_MAX_BODY_BYTES,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub filters: FiltersConfig,
    pub import: ImportConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.hoard/hoard.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_filters = file_config.filters.unwrap_or_default();
        let file_import = file_config.import.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let max_connections = cli
            .db_max_connections
            .or(file_database.max_connections)
            .unwrap_or(SQLITE_DEFAULT_MAX_CONNECTIONS);

        let max_filters = cli
            .max_filters
            .or(file_filters.max_filters)
            .unwrap_or(DEFAULT_MAX_FILTERS);

        let max_body_bytes = cli
            .import_max_body_bytes
            .or(file_import.max_body_bytes)
            .unwrap_or(DEFAULT_IMPORT_MAX_BODY_BYTES);

        let config = Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig { max_connections },
            filters: FiltersConfig { max_filters },
            import: ImportConfig { max_body_bytes },
        };

        config.validate()?;

        if is_all_interfaces(&config.server.host) {
            tracing::warn!(
                host = %config.server.host,
                "Binding to all interfaces; the API has no authentication"
            );
        }

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            db_max_connections = config.database.max_connections,
            max_filters = config.filters.max_filters,
            import_max_body_bytes = config.import.max_body_bytes,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Configuration error: database.max_connections must be greater than 0");
        }

        if self.filters.max_filters == 0 {
            anyhow::bail!("Configuration error: filters.max_filters must be greater than 0");
        }

        if self.import.max_body_bytes == 0 {
            anyhow::bail!("Configuration error: import.max_body_bytes must be greater than 0");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.hoard/hoard.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "database": { "max_connections": 2 },
            "filters": { "max_filters": 20 },
            "import": { "max_body_bytes": 1024 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host, Some("0.0.0.0".to_string()));
        assert_eq!(server.port, Some(8080));
        assert_eq!(config.database.as_ref().unwrap().max_connections, Some(2));
        assert_eq!(config.filters.as_ref().unwrap().max_filters, Some(20));
        assert_eq!(config.import.as_ref().unwrap().max_body_bytes, Some(1024));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.filters.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("localhost".to_string())
        );
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig =
            serde_json::from_str(r#"{ "server": { "host": "base", "port": 1000 } }"#).unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{ "server": { "port": 2000 }, "filters": { "max_filters": 5 } }"#,
        )
        .unwrap();

        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host, Some("base".to_string()));
        assert_eq!(server.port, Some(2000));
        assert_eq!(base.filters.as_ref().unwrap().max_filters, Some(5));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::load(&CliConfig::default()).unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.filters.max_filters, DEFAULT_MAX_FILTERS);
        assert_eq!(config.import.max_body_bytes, DEFAULT_IMPORT_MAX_BODY_BYTES);
        assert_eq!(
            config.database.max_connections,
            SQLITE_DEFAULT_MAX_CONNECTIONS
        );
    }

    #[test]
    fn test_app_config_cli_overrides_file() {
        let json = r#"{
            "server": { "host": "file.host", "port": 4000 },
            "filters": { "max_filters": 7 }
        }"#;
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();

        let cli = CliConfig {
            port: Some(3000),
            config: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();

        assert_eq!(config.server.host, "file.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.filters.max_filters, 7);
    }

    #[test]
    fn test_app_config_missing_config_file() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/hoard.json")),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(result.unwrap_err().to_string().contains("Config file not found"));
    }

    #[test]
    fn test_app_config_validation_server_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server.port must be greater than 0")
        );
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("server.host must not be empty")
        );
    }

    #[test]
    fn test_app_config_validation_zero_max_filters() {
        let cli = CliConfig {
            max_filters: Some(0),
            ..Default::default()
        };
        let result = AppConfig::load(&cli);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("filters.max_filters must be greater than 0")
        );
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));

        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
        assert!(!is_all_interfaces("::1"));
    }
}
