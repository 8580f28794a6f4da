//! Domain logic for the collection service
//!
//! - `filters` - filter validation, ordering and SQL compilation
//! - `backup` - snapshot export and reconciling import
//! - `records` - response-shaped entity records

pub mod backup;
pub mod filters;
pub mod records;

pub use backup::{BackupExportService, BackupImportService};
pub use filters::FilterService;
