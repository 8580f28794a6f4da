//! Backup import: reconcile an exported snapshot into the live store
//!
//! Stages run in dependency order and each produces an ID map (origin ID to
//! persisted ID) consumed by later stages:
//!
//! ```text
//! custom fields (fatal gate) -> toys, systems -> video game boxes (+ nested games)
//! ```
//!
//! Only the custom field stage can abort the import. Later stages are
//! best-effort: a failing row is recorded and skipped. Rows created before a
//! failure are kept.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::data::types::{NewCustomFieldValue, NewSystem, NewToy, NewVideoGame, NewVideoGameBox};
use crate::data::{CollectionRepository, TransactionalService};
use crate::domain::filters::{ResourceKey, is_reserved_field_name};
use crate::domain::records::{
    CustomFieldRecord, CustomFieldValueRecord, SystemRecord, ToyRecord, VideoGameBoxRecord,
    VideoGameRecord,
};

use super::report::{EntityCounts, ImportReport};
use super::types::BackupSnapshot;

/// Origin ID to persisted ID for one entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap(HashMap<i64, i64>);

impl IdMap {
    pub fn insert(&mut self, origin: i64, persisted: i64) {
        self.0.insert(origin, persisted);
    }

    pub fn get(&self, origin: i64) -> Option<i64> {
        self.0.get(&origin).copied()
    }

    pub fn contains(&self, origin: i64) -> bool {
        self.0.contains_key(&origin)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// ID maps built by one import call
#[derive(Debug, Clone, Default)]
pub struct IdMaps {
    pub custom_fields: IdMap,
    pub toys: IdMap,
    pub systems: IdMap,
    pub video_games: IdMap,
    pub video_game_boxes: IdMap,
}

/// Rewrite attached values onto persisted custom field IDs
///
/// Returns the first origin custom field ID missing from the map.
fn remap_values(
    values: &[CustomFieldValueRecord],
    custom_fields: &IdMap,
) -> Result<Vec<NewCustomFieldValue>, i64> {
    values
        .iter()
        .map(|v| {
            custom_fields
                .get(v.custom_field_id)
                .map(|id| NewCustomFieldValue {
                    custom_field_id: id,
                    value: v.value.clone(),
                })
                .ok_or(v.custom_field_id)
        })
        .collect()
}

fn dangling_custom_field(what: &str, missing: i64) -> String {
    format!(
        "{} skipped: custom field relationship not found but expected (custom field id {})",
        what, missing
    )
}

fn validate_custom_fields(custom_fields: &[CustomFieldRecord]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for cf in custom_fields {
        if cf.id <= 0 {
            errors.push(format!(
                "custom field '{}' has invalid id {}, ids must be positive",
                cf.name, cf.id
            ));
        } else if !seen.insert(cf.id) {
            errors.push(format!(
                "custom field id {} appears more than once (at '{}')",
                cf.id, cf.name
            ));
        }
        if cf.name.trim().is_empty() {
            errors.push(format!("custom field {} has an empty name", cf.id));
        }
        match ResourceKey::parse(&cf.entity_key) {
            None => errors.push(format!(
                "custom field '{}' has unknown entity key '{}'",
                cf.name, cf.entity_key
            )),
            Some(resource) if is_reserved_field_name(resource, &cf.name) => errors.push(format!(
                "custom field '{}' clashes with a standard field of '{}'",
                cf.name, resource
            )),
            Some(_) => {}
        }
    }
    errors
}

/// A new game waiting for its box to be created
struct StagedGame {
    origin_id: i64,
    input: NewVideoGame,
}

/// A box whose references all resolved
struct ResolvedBox<'s> {
    record: &'s VideoGameBoxRecord,
    system_id: i64,
    custom_field_values: Vec<NewCustomFieldValue>,
}

pub struct BackupImportService {
    database: Arc<TransactionalService>,
}

impl BackupImportService {
    pub fn new(database: Arc<TransactionalService>) -> Self {
        Self { database }
    }

    pub async fn import_backup_data(&self, snapshot: &BackupSnapshot) -> ImportReport {
        self.reconcile(snapshot).await.0
    }

    /// Import a snapshot, returning the report and the ID maps it built
    pub async fn reconcile(&self, snapshot: &BackupSnapshot) -> (ImportReport, IdMaps) {
        let repo = self.database.repository();
        let mut maps = IdMaps::default();

        tracing::debug!(
            custom_fields = snapshot.custom_fields.len(),
            toys = snapshot.toys.len(),
            systems = snapshot.systems.len(),
            video_game_boxes = snapshot.video_game_boxes.len(),
            "Importing backup"
        );

        let pre_errors = validate_custom_fields(&snapshot.custom_fields);
        if !pre_errors.is_empty() {
            tracing::warn!(errors = pre_errors.len(), "Backup rejected before import");
            return (ImportReport::aborted(EntityCounts::default(), pre_errors), maps);
        }

        let (counts, errors) =
            import_custom_fields(&*repo, &snapshot.custom_fields, &mut maps.custom_fields).await;
        if !errors.is_empty() {
            tracing::warn!(errors = errors.len(), "Custom field import failed, aborting");
            return (ImportReport::aborted(counts, errors), maps);
        }

        let mut report = ImportReport {
            custom_fields: counts,
            ..Default::default()
        };
        import_toys(&*repo, &snapshot.toys, &mut maps, &mut report).await;
        import_systems(&*repo, &snapshot.systems, &mut maps, &mut report).await;
        import_video_game_boxes(&*repo, &snapshot.video_game_boxes, &mut maps, &mut report).await;

        let report = report.finish();
        tracing::info!(
            outcome = ?report.outcome,
            errors = report.error_count(),
            "Backup import finished"
        );
        (report, maps)
    }
}

async fn import_custom_fields(
    repo: &dyn CollectionRepository,
    custom_fields: &[CustomFieldRecord],
    map: &mut IdMap,
) -> (EntityCounts, Vec<String>) {
    let mut counts = EntityCounts::default();
    let mut errors = Vec::new();

    for cf in custom_fields {
        match repo
            .get_custom_field_by_name_and_key(&cf.name, &cf.entity_key)
            .await
        {
            Ok(Some(existing)) if existing.field_type == cf.field_type => {
                counts.existing += 1;
                map.insert(cf.id, existing.id);
            }
            Ok(Some(existing)) => errors.push(format!(
                "custom field '{}' for '{}' already exists with type '{}', cannot import it as '{}'",
                cf.name, cf.entity_key, existing.field_type, cf.field_type
            )),
            Ok(None) => match repo
                .create_custom_field(&cf.name, cf.field_type, &cf.entity_key)
                .await
            {
                Ok(created) => {
                    counts.created += 1;
                    map.insert(cf.id, created.id);
                }
                Err(e) => errors.push(format!(
                    "failed to create custom field '{}' for '{}': {}",
                    cf.name, cf.entity_key, e
                )),
            },
            Err(e) => errors.push(format!(
                "failed to look up custom field '{}' for '{}': {}",
                cf.name, cf.entity_key, e
            )),
        }
    }
    (counts, errors)
}

async fn import_toys(
    repo: &dyn CollectionRepository,
    toys: &[ToyRecord],
    maps: &mut IdMaps,
    report: &mut ImportReport,
) {
    for toy in toys {
        let label = format!("toy '{}' ({})", toy.name, toy.set);
        let custom_field_values = match remap_values(&toy.custom_field_values, &maps.custom_fields)
        {
            Ok(values) => values,
            Err(missing) => {
                report.errors.toys.push(dangling_custom_field(&label, missing));
                continue;
            }
        };

        match repo.find_toy_id(&toy.name, &toy.set).await {
            Ok(Some(id)) => {
                report.toys.existing += 1;
                maps.toys.insert(toy.id, id);
            }
            Ok(None) => {
                let input = NewToy {
                    name: toy.name.clone(),
                    set: toy.set.clone(),
                    custom_field_values,
                };
                match repo.create_toy(&input).await {
                    Ok(created) => {
                        report.toys.created += 1;
                        maps.toys.insert(toy.id, created.id);
                    }
                    Err(e) => report
                        .errors
                        .toys
                        .push(format!("failed to import {}: {}", label, e)),
                }
            }
            Err(e) => report
                .errors
                .toys
                .push(format!("failed to look up {}: {}", label, e)),
        }
    }
}

async fn import_systems(
    repo: &dyn CollectionRepository,
    systems: &[SystemRecord],
    maps: &mut IdMaps,
    report: &mut ImportReport,
) {
    for system in systems {
        let label = format!("system '{}'", system.name);
        let custom_field_values =
            match remap_values(&system.custom_field_values, &maps.custom_fields) {
                Ok(values) => values,
                Err(missing) => {
                    report
                        .errors
                        .systems
                        .push(dangling_custom_field(&label, missing));
                    continue;
                }
            };

        match repo.find_system_id(&system.name).await {
            Ok(Some(id)) => {
                report.systems.existing += 1;
                maps.systems.insert(system.id, id);
            }
            Ok(None) => {
                let input = NewSystem {
                    name: system.name.clone(),
                    generation: system.generation,
                    handheld: system.handheld,
                    custom_field_values,
                };
                match repo.create_system(&input).await {
                    Ok(created) => {
                        report.systems.created += 1;
                        maps.systems.insert(system.id, created.id);
                    }
                    Err(e) => report
                        .errors
                        .systems
                        .push(format!("failed to import {}: {}", label, e)),
                }
            }
            Err(e) => report
                .errors
                .systems
                .push(format!("failed to look up {}: {}", label, e)),
        }
    }
}

fn resolve_box<'s>(
    record: &'s VideoGameBoxRecord,
    maps: &IdMaps,
) -> Result<ResolvedBox<'s>, String> {
    let label = format!("video game box '{}'", record.title);
    if record.video_games.is_empty() {
        return Err(format!(
            "{} skipped: a box must contain at least one video game",
            label
        ));
    }
    let system_id = maps.systems.get(record.system.id).ok_or_else(|| {
        format!(
            "{} skipped: system relationship not found but expected (system id {})",
            label, record.system.id
        )
    })?;
    let custom_field_values = remap_values(&record.custom_field_values, &maps.custom_fields)
        .map_err(|missing| dangling_custom_field(&label, missing))?;
    Ok(ResolvedBox {
        record,
        system_id,
        custom_field_values,
    })
}

fn stage_game(game: &VideoGameRecord, box_title: &str, maps: &IdMaps) -> Result<StagedGame, String> {
    let label = format!("video game '{}' in box '{}'", game.title, box_title);
    let system_id = maps.systems.get(game.system.id).ok_or_else(|| {
        format!(
            "{} skipped: system relationship not found but expected (system id {})",
            label, game.system.id
        )
    })?;
    let custom_field_values = remap_values(&game.custom_field_values, &maps.custom_fields)
        .map_err(|missing| dangling_custom_field(&label, missing))?;
    Ok(StagedGame {
        origin_id: game.id,
        input: NewVideoGame {
            title: game.title.clone(),
            system_id,
            custom_field_values,
        },
    })
}

async fn import_video_game_boxes(
    repo: &dyn CollectionRepository,
    boxes: &[VideoGameBoxRecord],
    maps: &mut IdMaps,
    report: &mut ImportReport,
) {
    let mut resolved = Vec::with_capacity(boxes.len());
    for record in boxes {
        match resolve_box(record, maps) {
            Ok(r) => resolved.push(r),
            Err(message) => report.errors.video_game_boxes.push(message),
        }
    }

    for vgb in resolved {
        if let Err(message) = import_video_game_box(repo, &vgb, maps, report).await {
            report.errors.video_game_boxes.push(message);
        }
    }
}

async fn import_video_game_box(
    repo: &dyn CollectionRepository,
    vgb: &ResolvedBox<'_>,
    maps: &mut IdMaps,
    report: &mut ImportReport,
) -> Result<(), String> {
    let record = vgb.record;
    let label = format!("video game box '{}'", record.title);

    let existing = repo
        .find_video_game_box_id(&record.title, vgb.system_id)
        .await
        .map_err(|e| format!("failed to look up {}: {}", label, e))?;
    if let Some(id) = existing {
        report.video_game_boxes.existing += 1;
        maps.video_game_boxes.insert(record.id, id);
        return Ok(());
    }

    let mut existing_ids = Vec::new();
    let mut staged: Vec<StagedGame> = Vec::new();
    for game in &record.video_games {
        if let Some(id) = maps.video_games.get(game.id) {
            if !existing_ids.contains(&id) {
                existing_ids.push(id);
            }
            continue;
        }
        if staged.iter().any(|s| s.origin_id == game.id) {
            continue;
        }
        match stage_game(game, &record.title, maps) {
            Ok(s) => staged.push(s),
            Err(message) => report.errors.video_game_boxes.push(message),
        }
    }

    if existing_ids.is_empty() && staged.is_empty() {
        return Err(format!("{} skipped: no valid video games included", label));
    }

    let input = NewVideoGameBox {
        title: record.title.clone(),
        system_id: vgb.system_id,
        is_physical: record.is_physical,
        is_collection: record.is_collection,
        existing_video_game_ids: existing_ids.clone(),
        new_video_games: staged.iter().map(|s| s.input.clone()).collect(),
        custom_field_values: vgb.custom_field_values.clone(),
    };
    let created = repo
        .create_video_game_box(&input)
        .await
        .map_err(|e| format!("failed to import {}: {}", label, e))?;

    // Created games come back in request order
    for (staged_game, game) in staged.iter().zip(&created.created_video_games) {
        if staged_game.input.title != game.title || staged_game.input.system_id != game.system_id {
            tracing::warn!(
                origin_id = staged_game.origin_id,
                expected = %staged_game.input.title,
                actual = %game.title,
                "Created video game does not match staged game"
            );
        }
        maps.video_games.insert(staged_game.origin_id, game.id);
    }

    report.video_games.created += created.created_video_games.len();
    report.video_games.reused += existing_ids.len();
    report.video_game_boxes.created += 1;
    maps.video_game_boxes.insert(record.id, created.video_game_box.id);
    Ok(())
}
