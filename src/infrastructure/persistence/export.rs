use std::path::Path;

use thiserror::Error;

use crate::domain::snapshot_repository::SnapshotRepository;

use super::csv_export::export_latest_to_csv;
use super::xlsx_export::export_latest_to_xlsx;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Failed to create the export file")]
    FailedToCreateFile,
    #[error("Failed to write a row")]
    FailedToWriteRow,
}

/// Column headers shared by every export format.
pub const EXPORT_HEADERS: [&str; 11] = [
    "id",
    "rank",
    "name",
    "price",
    "1h_change",
    "24h_change",
    "7d_change",
    "market_cap",
    "volume_24h",
    "circulating_supply",
    "scraped_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// `.xlsx` files get a workbook; anything else is written as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("xlsx") => ExportFormat::Xlsx,
            _ => ExportFormat::Csv,
        }
    }
}

/// Exports the newest `limit` snapshots in the format implied by `path`. Returns the
/// number of data rows written. With no data nothing is written and 0 is returned.
pub async fn export_latest(
    repository: &dyn SnapshotRepository,
    path: &Path,
    limit: u32,
) -> error_stack::Result<usize, ExportError> {
    match ExportFormat::from_path(path) {
        ExportFormat::Csv => export_latest_to_csv(repository, path, limit).await,
        ExportFormat::Xlsx => export_latest_to_xlsx(repository, path, limit).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.xlsx")), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::from_path(Path::new("OUT.XLSX")), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Csv);
    }
}
