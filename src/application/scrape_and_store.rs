use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use error_stack::{Report, ResultExt};
use thiserror::Error;
use tracing::{instrument, Instrument};

use crate::domain::crypto::Batch;
use crate::domain::page::{PageDriver, SessionLauncher};
use crate::domain::snapshot_repository::SnapshotRepository;
use crate::infrastructure::coinmarketcap::content_loader::{
    Completeness, ContentLoadError, ContentLoader, LoadReport,
};
use crate::infrastructure::coinmarketcap::table_extractor::{
    Extraction, ExtractorError, TableExtractor,
};
use crate::infrastructure::config::scraping_config::ScrapingConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeRunError {
    #[error("Browser session could not be started")]
    SessionStart,
    #[error("Navigation to the market page failed")]
    Navigation,
    #[error("Market table not found")]
    ContentNotFound,
    #[error("Browser failed while loading the page")]
    ContentLoad,
    #[error("No rows extracted; nothing to store")]
    EmptyBatch,
    #[error("Failed to persist the batch")]
    Persistence,
    #[error("Run cancelled")]
    Cancelled,
    #[error("Run exceeded its deadline")]
    TimedOut,
}

/// Terminal result of one scrape run. Failures are values, never panics or reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Stored {
        rows_inserted: u64,
        rows_skipped: usize,
        completeness: Completeness,
        scraped_at: DateTime<Utc>,
    },
    Failed(ScrapeRunError),
}

impl ScrapeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Stored { .. })
    }

    pub fn rows_inserted(&self) -> u64 {
        match self {
            ScrapeOutcome::Stored { rows_inserted, .. } => *rows_inserted,
            ScrapeOutcome::Failed(_) => 0,
        }
    }
}

/// Browser session → scroll loader → table extractor → snapshot store, as one run.
pub struct ScrapeAndStore {
    launcher: Arc<dyn SessionLauncher>,
    repository: Arc<dyn SnapshotRepository>,
    loader: ContentLoader,
    extractor: TableExtractor,
    url: String,
    run_timeout: Option<Duration>,
}

impl std::fmt::Debug for ScrapeAndStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeAndStore")
            .field("url", &self.url)
            .field("run_timeout", &self.run_timeout)
            .finish()
    }
}

impl ScrapeAndStore {
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        repository: Arc<dyn SnapshotRepository>,
        config: &ScrapingConfig,
    ) -> error_stack::Result<Self, ExtractorError> {
        Ok(Self {
            launcher,
            repository,
            loader: ContentLoader::new(config),
            extractor: TableExtractor::new(&config.table_selector)?,
            url: config.url.to_string(),
            run_timeout: config.run_timeout(),
        })
    }

    pub fn with_run_timeout(mut self, run_timeout: Option<Duration>) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    pub async fn run_scrape_and_store(&self) -> ScrapeOutcome {
        self.run_scrape_and_store_until(std::future::pending::<()>())
            .await
    }

    /// Like [`Self::run_scrape_and_store`], but gives up as soon as `cancel` resolves.
    /// The in-flight work is dropped, which releases the browser session and rolls back
    /// any open transaction.
    pub async fn run_scrape_and_store_until<C>(&self, cancel: C) -> ScrapeOutcome
    where
        C: Future<Output = ()>,
    {
        let span = tracing::info_span!("scrape_and_store", url = %self.url);

        let run = async {
            match self.run_timeout {
                Some(deadline) => tokio::time::timeout(deadline, self.scrape_and_store())
                    .await
                    .unwrap_or_else(|_| {
                        Err(Report::new(ScrapeRunError::TimedOut)
                            .attach_printable(format!("Deadline: {:?}", deadline)))
                    }),
                None => self.scrape_and_store().await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel => Err(Report::new(ScrapeRunError::Cancelled)),
            result = run.instrument(span) => result,
        };

        match result {
            Ok(outcome) => {
                tracing::info!("✅ Scrape run finished: {:?}", outcome);
                outcome
            }
            Err(report) => {
                tracing::error!("❌ Scrape run failed: {:?}", report);
                ScrapeOutcome::Failed(report.current_context().clone())
            }
        }
    }

    async fn scrape_and_store(&self) -> error_stack::Result<ScrapeOutcome, ScrapeRunError> {
        let (extraction, load) = self.scrape().await?;
        let rows_skipped = extraction.skipped;

        // Millisecond precision, as persisted.
        let scraped_at = Utc::now().trunc_subsecs(3);
        let batch = Batch::new(extraction.records, scraped_at).ok_or_else(|| {
            Report::new(ScrapeRunError::EmptyBatch).attach_printable(format!(
                "table found: {}, rows skipped: {}",
                extraction.table_found, rows_skipped
            ))
        })?;
        tracing::info!(
            rows = batch.len(),
            skipped = rows_skipped,
            completeness = %load.completeness,
            "📋 Scraped market table"
        );

        self.repository
            .ensure_schema()
            .await
            .change_context(ScrapeRunError::Persistence)?;
        let rows_inserted = self
            .repository
            .insert_batch(batch.records(), batch.scraped_at())
            .await
            .change_context(ScrapeRunError::Persistence)?;

        Ok(ScrapeOutcome::Stored {
            rows_inserted,
            rows_skipped,
            completeness: load.completeness,
            scraped_at: batch.scraped_at(),
        })
    }

    /// Owns the browser session for the whole browsing phase and releases it before
    /// any database work starts.
    #[instrument(skip(self))]
    async fn scrape(&self) -> error_stack::Result<(Extraction, LoadReport), ScrapeRunError> {
        let mut page = self
            .launcher
            .acquire()
            .await
            .change_context(ScrapeRunError::SessionStart)?;

        let result = self.browse(page.as_ref()).await;
        page.release().await;
        result
    }

    async fn browse(
        &self,
        page: &dyn PageDriver,
    ) -> error_stack::Result<(Extraction, LoadReport), ScrapeRunError> {
        page.goto(&self.url)
            .await
            .change_context(ScrapeRunError::Navigation)?;

        let load = self.loader.load(page).await.map_err(|report| {
            let context = match report.current_context() {
                ContentLoadError::ContentNotFound => ScrapeRunError::ContentNotFound,
                ContentLoadError::DriverFailure => ScrapeRunError::ContentLoad,
            };
            report.change_context(context)
        })?;

        let source = page
            .page_source()
            .await
            .change_context(ScrapeRunError::ContentLoad)?;
        Ok((self.extractor.extract(&source), load))
    }
}
