//! Backup API types

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::backup::ImportReport;

/// Import result: the structured report plus its text summary
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub report: ImportReport,
    pub summary: String,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        let summary = report.to_string();
        Self { report, summary }
    }
}
