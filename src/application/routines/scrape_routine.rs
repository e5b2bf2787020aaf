use error_stack::Report;
use tracing::instrument;

use crate::application::scrape_and_store::{ScrapeAndStore, ScrapeOutcome};
use crate::domain::routine::{Routine, RoutineError};

/// Resolves on the first Ctrl-C. If the handler cannot be installed it never resolves,
/// so the run is simply not cancellable.
pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl-C handler unavailable: {}", error);
        std::future::pending::<()>().await;
    }
    tracing::warn!("Ctrl-C received, cancelling");
}

#[derive(Debug)]
pub struct ScrapeRoutine {
    pipeline: ScrapeAndStore,
}

impl ScrapeRoutine {
    pub fn new(pipeline: ScrapeAndStore) -> Self {
        Self { pipeline }
    }
}

#[async_trait::async_trait]
impl Routine for ScrapeRoutine {
    fn name(&self) -> &str {
        "Scrape and store"
    }

    #[instrument(skip(self), name = "ScrapeRoutine::run")]
    async fn run(&self) -> error_stack::Result<String, RoutineError> {
        match self
            .pipeline
            .run_scrape_and_store_until(shutdown_signal())
            .await
        {
            ScrapeOutcome::Stored {
                rows_inserted,
                rows_skipped,
                completeness,
                scraped_at,
            } => Ok(format!(
                "Stored {} rows at {} ({} content, {} rows skipped)",
                rows_inserted,
                scraped_at.format("%Y-%m-%d %H:%M:%S"),
                completeness,
                rows_skipped
            )),
            ScrapeOutcome::Failed(error) => Err(Report::new(RoutineError::ScrapeFailed {
                reason: error.to_string(),
            })),
        }
    }
}
