//! SQLite schema definitions
//!
//! Fresh databases get the complete schema at `SCHEMA_VERSION` in one step;
//! older databases are brought forward by the migrations in `migrations.rs`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Custom field definitions
-- =============================================================================
CREATE TABLE IF NOT EXISTS custom_fields (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    type TEXT NOT NULL CHECK(type IN ('text', 'number', 'boolean')),
    entity_key TEXT NOT NULL CHECK(entity_key IN ('toy', 'system', 'video_game', 'video_game_box')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(name, entity_key)
);

CREATE INDEX IF NOT EXISTS idx_custom_fields_entity_key ON custom_fields(entity_key);

-- =============================================================================
-- 2. Custom field values (one row per field per entity, value stored as text)
-- =============================================================================
CREATE TABLE IF NOT EXISTS custom_field_values (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    custom_field_id INTEGER NOT NULL REFERENCES custom_fields(id) ON DELETE CASCADE,
    entity_id INTEGER NOT NULL,
    entity_key TEXT NOT NULL,
    value TEXT NOT NULL,
    UNIQUE(custom_field_id, entity_id)
);

CREATE INDEX IF NOT EXISTS idx_custom_field_values_entity ON custom_field_values(entity_key, entity_id);

-- =============================================================================
-- 3. Systems
-- =============================================================================
CREATE TABLE IF NOT EXISTS systems (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    generation INTEGER NOT NULL,
    handheld INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_systems_name_live ON systems(name) WHERE deleted_at IS NULL;

-- =============================================================================
-- 4. Toys (the "set" field lives in set_name; SET is reserved in SQL)
-- =============================================================================
CREATE TABLE IF NOT EXISTS toys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    set_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_toys_name_set_live ON toys(name, set_name) WHERE deleted_at IS NULL;

-- =============================================================================
-- 5. Video games (references systems)
-- =============================================================================
CREATE TABLE IF NOT EXISTS video_games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    system_id INTEGER NOT NULL REFERENCES systems(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_video_games_system ON video_games(system_id);

-- =============================================================================
-- 6. Video game boxes (references systems)
-- =============================================================================
CREATE TABLE IF NOT EXISTS video_game_boxes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    system_id INTEGER NOT NULL REFERENCES systems(id),
    is_physical INTEGER NOT NULL DEFAULT 1,
    is_collection INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_video_game_boxes_title_system_live
    ON video_game_boxes(title, system_id) WHERE deleted_at IS NULL;

-- =============================================================================
-- 7. Box contents (references boxes + games)
-- =============================================================================
CREATE TABLE IF NOT EXISTS video_game_box_games (
    video_game_box_id INTEGER NOT NULL REFERENCES video_game_boxes(id) ON DELETE CASCADE,
    video_game_id INTEGER NOT NULL REFERENCES video_games(id) ON DELETE CASCADE,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (video_game_box_id, video_game_id)
);

CREATE INDEX IF NOT EXISTS idx_box_games_game ON video_game_box_games(video_game_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    fn test_schema_contains_required_tables() {
        let tables = [
            "schema_version",
            "schema_migrations",
            "custom_fields",
            "custom_field_values",
            "systems",
            "toys",
            "video_games",
            "video_game_boxes",
            "video_game_box_games",
        ];
        for table in tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "schema missing table {}",
                table
            );
        }
    }

    #[test]
    fn test_schema_soft_delete_columns() {
        for table in ["systems", "toys", "video_games", "video_game_boxes"] {
            let start = SCHEMA
                .find(&format!("CREATE TABLE IF NOT EXISTS {} (", table))
                .unwrap();
            let body = &SCHEMA[start..];
            let end = body.find(");").unwrap();
            assert!(body[..end].contains("deleted_at TEXT"), "{} lacks deleted_at", table);
        }
    }
}
