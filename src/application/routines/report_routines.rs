use std::sync::Arc;

use tracing::instrument;

use crate::domain::crypto::{format_timestamp, StoredSnapshot};
use crate::domain::routine::{Routine, RoutineError};
use crate::domain::snapshot_repository::SnapshotRepository;

/// Read-only views; the store already turns read errors into empty results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    Statistics,
    Latest { limit: u32 },
    Search { name: String },
    Movers { limit: u32 },
}

pub struct ReportRoutine {
    repository: Arc<dyn SnapshotRepository>,
    report: ReportKind,
}

impl std::fmt::Debug for ReportRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportRoutine")
            .field("report", &self.report)
            .finish()
    }
}

impl ReportRoutine {
    pub fn new(repository: Arc<dyn SnapshotRepository>, report: ReportKind) -> Self {
        Self { repository, report }
    }

    async fn statistics(&self) -> String {
        let stats = self.repository.summary_statistics().await;
        let when = |at: Option<chrono::DateTime<chrono::Utc>>| {
            at.map(format_timestamp).unwrap_or_else(|| "-".to_string())
        };
        format!(
            "📊 Total records: {}\n   Unique cryptocurrencies: {}\n   Scrape days: {}\n   First scrape: {}\n   Last scrape: {}",
            stats.total_records,
            stats.unique_cryptos,
            stats.total_scrape_days,
            when(stats.first_scrape),
            when(stats.last_scrape),
        )
    }

    async fn movers(&self, limit: u32) -> String {
        let movers = self.repository.top_movers(limit).await;
        format!(
            "📈 Top gainers (24h)\n{}\n📉 Top losers (24h)\n{}",
            snapshot_table(&movers.gainers),
            snapshot_table(&movers.losers)
        )
    }
}

pub fn snapshot_table(snapshots: &[StoredSnapshot]) -> String {
    if snapshots.is_empty() {
        return "   (no data)".to_string();
    }

    let header = format!(
        "{:>5}  {:<24} {:>16} {:>9} {:>9} {:>9}  {}",
        "#", "Name", "Price", "1h", "24h", "7d", "Scraped at"
    );
    let rows = snapshots.iter().map(|snapshot| {
        let rank = snapshot
            .rank
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{:>5}  {:<24} {:>16} {:>9} {:>9} {:>9}  {}",
            rank,
            snapshot.name,
            snapshot.price,
            snapshot.one_hour_change,
            snapshot.twenty_four_hour_change,
            snapshot.seven_day_change,
            format_timestamp(snapshot.scraped_at)
        )
    });
    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait::async_trait]
impl Routine for ReportRoutine {
    fn name(&self) -> &str {
        match self.report {
            ReportKind::Statistics => "Statistics",
            ReportKind::Latest { .. } => "Latest snapshots",
            ReportKind::Search { .. } => "Search",
            ReportKind::Movers { .. } => "Top movers",
        }
    }

    #[instrument(skip(self), name = "ReportRoutine::run", fields(report = ?self.report))]
    async fn run(&self) -> error_stack::Result<String, RoutineError> {
        let output = match &self.report {
            ReportKind::Statistics => self.statistics().await,
            ReportKind::Latest { limit } => {
                snapshot_table(&self.repository.read_latest(*limit).await)
            }
            ReportKind::Search { name } => {
                snapshot_table(&self.repository.search_by_name(name).await)
            }
            ReportKind::Movers { limit } => self.movers(*limit).await,
        };
        Ok(output)
    }
}
