use std::time::Duration;

use error_stack::{Report, ResultExt};
use thiserror::Error;
use tracing::{event, instrument, Level};

use crate::domain::page::PageDriver;
use crate::infrastructure::config::scraping_config::ScrapingConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentLoadError {
    #[error("Content table never appeared")]
    ContentNotFound,
    #[error("Browser failed while loading content")]
    DriverFailure,
}

/// Whether the page stopped growing on its own or we gave up scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Completeness {
    Complete,
    Partial,
}

/// Scroll loop state. `Loading` is the only state that scrolls again; each transition
/// out of it either stops or strictly increases `attempt`, and `attempt` never exceeds
/// the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading { attempt: u32, height: u64 },
    Stable { attempts: u32, height: u64 },
    Exhausted { attempts: u32, height: u64 },
}

impl LoadState {
    pub fn start(height: u64, max_attempts: u32) -> Self {
        if max_attempts == 0 {
            LoadState::Exhausted {
                attempts: 0,
                height,
            }
        } else {
            LoadState::Loading { attempt: 0, height }
        }
    }

    /// Feeds the height observed after a full scroll pass.
    pub fn observe(self, new_height: u64, max_attempts: u32) -> Self {
        match self {
            LoadState::Loading { attempt, height } if new_height == height => LoadState::Stable {
                attempts: attempt,
                height,
            },
            LoadState::Loading { attempt, .. } if attempt + 1 >= max_attempts => {
                LoadState::Exhausted {
                    attempts: attempt + 1,
                    height: new_height,
                }
            }
            LoadState::Loading { attempt, .. } => LoadState::Loading {
                attempt: attempt + 1,
                height: new_height,
            },
            terminal => terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Loading { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub completeness: Completeness,
    pub attempts: u32,
    pub final_height: u64,
}

#[derive(Debug, Clone)]
pub struct ContentLoader {
    table_selector: String,
    table_wait_timeout: Duration,
    scroll_step: u64,
    scroll_pause: Duration,
    settle_pause: Duration,
    max_attempts: u32,
}

impl ContentLoader {
    pub fn new(config: &ScrapingConfig) -> Self {
        Self {
            table_selector: config.table_selector.to_string(),
            table_wait_timeout: config.table_wait_timeout(),
            scroll_step: config.scroll_step_px.max(1),
            scroll_pause: config.scroll_pause(),
            settle_pause: config.settle_pause(),
            max_attempts: config.max_scroll_attempts,
        }
    }

    /// Waits for the table, then scrolls until the page height stops changing or the
    /// attempt cap is reached. The page must already be at the target URL.
    #[instrument(skip(self, page))]
    pub async fn load(
        &self,
        page: &dyn PageDriver,
    ) -> error_stack::Result<LoadReport, ContentLoadError> {
        let found = page
            .wait_for_element(&self.table_selector, self.table_wait_timeout)
            .await
            .change_context(ContentLoadError::DriverFailure)?;
        if !found {
            return Err(Report::new(ContentLoadError::ContentNotFound).attach_printable(
                format!(
                    "No '{}' within {:?}",
                    self.table_selector, self.table_wait_timeout
                ),
            ));
        }
        tracing::info!("📋 Table present, scrolling to load remaining rows");

        let initial_height = page
            .scroll_height()
            .await
            .change_context(ContentLoadError::DriverFailure)?;
        let mut state = LoadState::start(initial_height, self.max_attempts);

        let report = loop {
            match state {
                LoadState::Loading { attempt, height } => {
                    self.scroll_pass(page, height).await?;
                    tokio::time::sleep(self.settle_pause).await;

                    let new_height = page
                        .scroll_height()
                        .await
                        .change_context(ContentLoadError::DriverFailure)?;
                    state = state.observe(new_height, self.max_attempts);

                    event!(
                        Level::DEBUG,
                        attempt,
                        height,
                        new_height,
                        "Scroll pass finished"
                    );
                }
                LoadState::Stable { attempts, height } => {
                    break LoadReport {
                        completeness: Completeness::Complete,
                        attempts,
                        final_height: height,
                    }
                }
                LoadState::Exhausted { attempts, height } => {
                    break LoadReport {
                        completeness: Completeness::Partial,
                        attempts,
                        final_height: height,
                    }
                }
            }
        };

        match report.completeness {
            Completeness::Complete => tracing::info!(
                attempts = report.attempts,
                "✅ Page height stabilised"
            ),
            Completeness::Partial => tracing::warn!(
                attempts = report.attempts,
                "Scroll attempt cap reached, continuing with what is rendered"
            ),
        }
        Ok(report)
    }

    async fn scroll_pass(
        &self,
        page: &dyn PageDriver,
        height: u64,
    ) -> error_stack::Result<(), ContentLoadError> {
        for y in (0..height).step_by(self.scroll_step as usize) {
            page.scroll_to(y)
                .await
                .change_context(ContentLoadError::DriverFailure)?;
            tokio::time::sleep(self.scroll_pause).await;
        }
        Ok(())
    }
}
