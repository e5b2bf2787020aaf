use std::path::PathBuf;
use std::sync::Arc;

use error_stack::ResultExt;
use tracing::instrument;

use crate::domain::routine::{Routine, RoutineError};
use crate::domain::snapshot_repository::SnapshotRepository;
use crate::infrastructure::persistence::export::{export_latest, ExportFormat};

pub const DEFAULT_EXPORT_LIMIT: u32 = 10_000;

pub struct ExportRoutine {
    repository: Arc<dyn SnapshotRepository>,
    path: PathBuf,
    limit: u32,
}

impl std::fmt::Debug for ExportRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportRoutine")
            .field("path", &self.path)
            .field("limit", &self.limit)
            .finish()
    }
}

impl ExportRoutine {
    pub fn new(repository: Arc<dyn SnapshotRepository>, path: PathBuf, limit: u32) -> Self {
        Self {
            repository,
            path,
            limit,
        }
    }
}

#[async_trait::async_trait]
impl Routine for ExportRoutine {
    fn name(&self) -> &str {
        "Export"
    }

    #[instrument(skip(self), name = "ExportRoutine::run")]
    async fn run(&self) -> error_stack::Result<String, RoutineError> {
        let written = export_latest(self.repository.as_ref(), &self.path, self.limit)
            .await
            .change_context(RoutineError::ExportFailed)?;

        if written == 0 {
            tracing::warn!("No data to export");
            return Ok(format!("No data to export to {}", self.path.display()));
        }
        Ok(format!(
            "📤 Exported {} records to {} ({})",
            written,
            self.path.display(),
            ExportFormat::from_path(&self.path)
        ))
    }
}
