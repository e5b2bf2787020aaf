use std::path::Path;

use error_stack::ResultExt;
use tracing::instrument;

use super::export::ExportError;
use crate::domain::snapshot_repository::SnapshotRepository;

/// Writes the newest `limit` snapshots to `path` as CSV with a header row.
#[instrument(skip(repository))]
pub async fn export_latest_to_csv(
    repository: &dyn SnapshotRepository,
    path: &Path,
    limit: u32,
) -> error_stack::Result<usize, ExportError> {
    let snapshots = repository.read_latest(limit).await;
    if snapshots.is_empty() {
        tracing::warn!("No data to export");
        return Ok(0);
    }

    let mut writer = csv::Writer::from_path(path)
        .change_context(ExportError::FailedToCreateFile)
        .attach_printable_lazy(|| format!("Path: {}", path.display()))?;
    for snapshot in &snapshots {
        writer
            .serialize(snapshot)
            .change_context(ExportError::FailedToWriteRow)
            .attach_printable_lazy(|| format!("Snapshot id {}", snapshot.id))?;
    }
    writer
        .flush()
        .change_context(ExportError::FailedToWriteRow)?;

    tracing::info!(rows = snapshots.len(), path = %path.display(), "📤 Exported snapshots");
    Ok(snapshots.len())
}
