use std::path::Path;

use error_stack::ResultExt;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::instrument;

use super::export::{ExportError, EXPORT_HEADERS};
use crate::domain::crypto::{format_timestamp, StoredSnapshot};
use crate::domain::snapshot_repository::SnapshotRepository;

const SHEET_NAME: &str = "crypto_currency";

fn write_row(
    worksheet: &mut Worksheet,
    row: u32,
    snapshot: &StoredSnapshot,
) -> Result<(), XlsxError> {
    worksheet.write_number(row, 0, snapshot.id as f64)?;
    if let Some(rank) = snapshot.rank {
        worksheet.write_number(row, 1, rank)?;
    }
    let text = [
        &snapshot.name,
        &snapshot.price,
        &snapshot.one_hour_change,
        &snapshot.twenty_four_hour_change,
        &snapshot.seven_day_change,
        &snapshot.market_cap,
        &snapshot.volume_24h,
        &snapshot.circulating_supply,
    ];
    for (offset, value) in text.into_iter().enumerate() {
        worksheet.write_string(row, 2 + offset as u16, value.as_str())?;
    }
    worksheet.write_string(row, 10, format_timestamp(snapshot.scraped_at))?;
    Ok(())
}

/// Writes the newest `limit` snapshots to `path` as a single-sheet workbook.
#[instrument(skip(repository))]
pub async fn export_latest_to_xlsx(
    repository: &dyn SnapshotRepository,
    path: &Path,
    limit: u32,
) -> error_stack::Result<usize, ExportError> {
    let snapshots = repository.read_latest(limit).await;
    if snapshots.is_empty() {
        tracing::warn!("No data to export");
        return Ok(0);
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .change_context(ExportError::FailedToWriteRow)?;
    for (column, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, column as u16, *header)
            .change_context(ExportError::FailedToWriteRow)?;
    }
    for (index, snapshot) in snapshots.iter().enumerate() {
        write_row(worksheet, index as u32 + 1, snapshot)
            .change_context(ExportError::FailedToWriteRow)
            .attach_printable_lazy(|| format!("Snapshot id {}", snapshot.id))?;
    }

    workbook
        .save(path)
        .change_context(ExportError::FailedToCreateFile)
        .attach_printable_lazy(|| format!("Path: {}", path.display()))?;

    tracing::info!(rows = snapshots.len(), path = %path.display(), "📤 Exported snapshots");
    Ok(snapshots.len())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::infrastructure::persistence::sqlite_snapshot_repository::tests::{
        record, TempDatabase,
    };

    #[tokio::test]
    async fn test_export_writes_a_workbook() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        repository
            .insert_batch(
                &[
                    record(Some(1), "Bitcoin", "1.00%"),
                    record(None, "Mystery", "2.00%"),
                ],
                Utc::now(),
            )
            .await
            .unwrap();
        let path = db.path.with_extension("xlsx");

        let written = export_latest_to_xlsx(&repository, &path, 10).await.unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(written, 2);
        // Workbooks are zip archives.
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_empty_store_writes_no_workbook() {
        let db = TempDatabase::new();
        let repository = db.repository();
        repository.ensure_schema().await.unwrap();
        let path = db.path.with_extension("xlsx");

        let written = export_latest_to_xlsx(&repository, &path, 10).await.unwrap();

        assert_eq!(written, 0);
        assert!(!path.exists());
    }
}
