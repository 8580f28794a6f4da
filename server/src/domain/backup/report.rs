//! Import report and its text summary

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

pub const ABORTED_HEADER: &str =
    "Custom field import failed, no data was imported. Fix the following errors and retry:";
pub const PARTIAL_HEADER: &str =
    "Valid data was imported, invalid data was skipped. The following errors were found:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct EntityCounts {
    pub existing: usize,
    pub created: usize,
}

/// Video games are only created through boxes; `reused` counts links to games
/// already created earlier in the same import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct VideoGameCounts {
    pub reused: usize,
    pub created: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
    #[default]
    Complete,
    /// Non-fatal errors: some rows were skipped
    Partial,
    /// Custom field stage failed; nothing after it ran
    Aborted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportErrors {
    pub custom_fields: Vec<String>,
    pub toys: Vec<String>,
    pub systems: Vec<String>,
    pub video_game_boxes: Vec<String>,
}

impl ImportErrors {
    pub fn len(&self) -> usize {
        self.custom_fields.len() + self.toys.len() + self.systems.len() + self.video_game_boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All messages, in stage order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.custom_fields
            .iter()
            .chain(&self.toys)
            .chain(&self.systems)
            .chain(&self.video_game_boxes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub outcome: ImportOutcome,
    pub custom_fields: EntityCounts,
    pub toys: EntityCounts,
    pub systems: EntityCounts,
    pub video_game_boxes: EntityCounts,
    pub video_games: VideoGameCounts,
    pub errors: ImportErrors,
}

impl ImportReport {
    /// Report for an import stopped at the custom field stage
    pub fn aborted(custom_fields: EntityCounts, errors: Vec<String>) -> Self {
        Self {
            outcome: ImportOutcome::Aborted,
            custom_fields,
            errors: ImportErrors {
                custom_fields: errors,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Settle the outcome once every stage has run
    pub(super) fn finish(mut self) -> Self {
        if self.outcome != ImportOutcome::Aborted && !self.errors.is_empty() {
            self.outcome = ImportOutcome::Partial;
        }
        self
    }

    pub fn header(&self) -> Option<&'static str> {
        match self.outcome {
            ImportOutcome::Complete => None,
            ImportOutcome::Partial => Some(PARTIAL_HEADER),
            ImportOutcome::Aborted => Some(ABORTED_HEADER),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = [
            ("Custom fields", self.custom_fields),
            ("Toys", self.toys),
            ("Systems", self.systems),
            ("Video game boxes", self.video_game_boxes),
        ];
        writeln!(f, "Import summary")?;
        for (label, c) in counts {
            writeln!(f, "{}: {} existing, {} created", label, c.existing, c.created)?;
        }
        writeln!(
            f,
            "Video games: {} reused, {} created",
            self.video_games.reused, self.video_games.created
        )?;
        write!(f, "Errors: {}", self.error_count())?;
        if let Some(header) = self.header() {
            write!(f, "\n{}", header)?;
        }
        for message in self.errors.iter() {
            write!(f, " \n - {}", message)?;
        }
        Ok(())
    }
}
