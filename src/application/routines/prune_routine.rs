use std::sync::Arc;

use error_stack::ResultExt;
use tracing::instrument;

use crate::domain::routine::{Routine, RoutineError};
use crate::domain::snapshot_repository::SnapshotRepository;

pub struct PruneRoutine {
    repository: Arc<dyn SnapshotRepository>,
    retention_days: u32,
}

impl std::fmt::Debug for PruneRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PruneRoutine")
            .field("retention_days", &self.retention_days)
            .finish()
    }
}

impl PruneRoutine {
    pub fn new(repository: Arc<dyn SnapshotRepository>, retention_days: u32) -> Self {
        Self {
            repository,
            retention_days,
        }
    }
}

#[async_trait::async_trait]
impl Routine for PruneRoutine {
    fn name(&self) -> &str {
        "Prune old snapshots"
    }

    #[instrument(skip(self), name = "PruneRoutine::run")]
    async fn run(&self) -> error_stack::Result<String, RoutineError> {
        self.repository
            .ensure_schema()
            .await
            .change_context(RoutineError::PruneFailed)?;

        let deleted = self
            .repository
            .prune_older_than(self.retention_days)
            .await
            .change_context(RoutineError::PruneFailed)
            .attach_printable_lazy(|| format!("Retention: {} days", self.retention_days))?;

        Ok(format!(
            "🧹 Deleted {} snapshots older than {} days",
            deleted, self.retention_days
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::infrastructure::persistence::sqlite_snapshot_repository::tests::{
        record, TempDatabase,
    };

    #[tokio::test]
    async fn test_prune_routine_creates_schema_and_reports_count() {
        let db = TempDatabase::new();
        let repository = Arc::new(db.repository());

        let empty = PruneRoutine::new(repository.clone(), 7).run().await.unwrap();
        assert!(empty.contains("Deleted 0 snapshots"));

        repository
            .insert_batch(
                &[record(Some(1), "Bitcoin", "1%")],
                Utc::now() - Duration::days(8),
            )
            .await
            .unwrap();
        let summary = PruneRoutine::new(repository, 7).run().await.unwrap();
        assert!(summary.contains("Deleted 1 snapshots older than 7 days"));
    }
}
