use chrono::{DateTime, Utc};
use thiserror::Error;

use super::crypto::{CryptoRecord, StoredSnapshot, SummaryStatistics, TopMovers};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Failed to connect to the database")]
    FailedToConnect,
    #[error("Failed to create schema")]
    SchemaCreationFailed,
    #[error("Refusing to insert an empty batch")]
    EmptyBatch,
    #[error("Failed to insert batch")]
    InsertFailed,
    #[error("Failed to prune old snapshots")]
    PruneFailed,
    #[error("Failed to read snapshots")]
    ReadFailed,
}

/// Append-only store of scraped snapshots.
///
/// Writes are transactional and surface their failures. Reads are diagnostic and fail
/// soft: on error they log and return an empty or default value.
#[async_trait::async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Creates the snapshot table and its indexes when missing. Safe to call on every run.
    async fn ensure_schema(&self) -> error_stack::Result<(), PersistenceError>;

    /// Writes every record stamped with `scraped_at` in a single transaction and
    /// returns the number of rows written. On failure nothing is committed.
    async fn insert_batch(
        &self,
        records: &[CryptoRecord],
        scraped_at: DateTime<Utc>,
    ) -> error_stack::Result<u64, PersistenceError>;

    /// Deletes snapshots scraped more than `retention_days` days ago.
    async fn prune_older_than(
        &self,
        retention_days: u32,
    ) -> error_stack::Result<u64, PersistenceError>;

    async fn read_latest(&self, limit: u32) -> Vec<StoredSnapshot>;

    async fn summary_statistics(&self) -> SummaryStatistics;

    async fn search_by_name(&self, fragment: &str) -> Vec<StoredSnapshot>;

    async fn top_movers(&self, limit: u32) -> TopMovers;
}
