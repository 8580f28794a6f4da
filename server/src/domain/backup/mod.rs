//! Backup export and import
//!
//! - `export` - snapshot of the live collection
//! - `import` - ID-reconciling, partial-failure tolerant import
//! - `report` - import counts, errors and text summary

mod export;
mod import;
mod report;
mod types;

pub use export::BackupExportService;
pub use import::{BackupImportService, IdMap, IdMaps};
pub use report::{
    ABORTED_HEADER, EntityCounts, ImportErrors, ImportOutcome, ImportReport, PARTIAL_HEADER,
    VideoGameCounts,
};
pub use types::BackupSnapshot;
