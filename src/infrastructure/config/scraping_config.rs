use std::time::Duration;

/// Where to scrape and how patiently to drive the page.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScrapingConfig {
    pub url: Box<str>,
    /// CSS selector of the ranked table; it doubles as the "page is ready" marker.
    pub table_selector: Box<str>,
    pub table_wait_timeout_secs: u64,
    pub scroll_step_px: u64,
    pub scroll_pause_ms: u64,
    pub settle_pause_ms: u64,
    pub max_scroll_attempts: u32,
    /// Hard deadline for a whole scrape-and-store run. Zero disables it.
    pub run_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            url: "https://coinmarketcap.com/".into(),
            table_selector: "table.cmc-table".into(),
            table_wait_timeout_secs: 20,
            scroll_step_px: 500,
            scroll_pause_ms: 300,
            settle_pause_ms: 1000,
            max_scroll_attempts: 10,
            run_timeout_secs: 600,
        }
    }
}

impl ScrapingConfig {
    pub fn table_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.table_wait_timeout_secs)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn settle_pause(&self) -> Duration {
        Duration::from_millis(self.settle_pause_ms)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        (self.run_timeout_secs > 0).then(|| Duration::from_secs(self.run_timeout_secs))
    }
}
